//! Sheet tables
//!
//! Every sheet of both workbooks is first laid out as a `SheetTable`: a
//! header row, cell rows, and the highlighting the writer should apply.
//! Keeping layout separate from the xlsx writer lets the column order be
//! tested without opening a workbook.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use ticketsla_core::report::{DimensionTable, MonthlySummary};
use ticketsla_core::timeutil::start_of_day;
use ticketsla_core::{
    columns, CellValue, DelayStatus, Report, SlaConfig, TicketRecord, DUE_SOON_LABEL, NO_LABEL,
    OTHERS_LABEL, STOCK_LABEL, YES_LABEL,
};

/// Longest sheet name Excel accepts
pub const MAX_SHEET_NAME: usize = 31;

/// Derived column names of the processed sheet
pub mod derived {
    pub const UF_MAPA: &str = "UF_Mapa";
    pub const PRAZO_INICIO_AJUSTADO: &str = "Prazo_Inicio_Ajustado";
    pub const PRAZO_CONCLUSAO_AJUSTADO: &str = "Prazo_Conclusao_Ajustado";
    pub const STATUS_CHAMADO: &str = "Status_Chamado";
    pub const STATUS_FECHAMENTO: &str = "Status_Fechamento";
    pub const STATUS_FINANCEIRO: &str = "Status_Financeiro";
    pub const ESTOQUE_ATUAL: &str = "Estoque_Atual";
    pub const DATA_CONCLUSAO_AJUSTADA: &str = "Data_Conclusao_Ajustada";
    pub const DATA_ESTOQUE: &str = "Data_Estoque";
    pub const FECHAMENTO_PENDENTE: &str = "Fechamento_Pendente";
    pub const DURACAO_CHAMADO: &str = "DURACAO_CHAMADO";
    pub const DIAS_ATRASOS: &str = "Dias_Atrasos";
    pub const DIAS_CHEGADA: &str = "Dias_Chegada";
    pub const DIAS_CONCLUSAO: &str = "Dias_Conclusao";
    pub const DIAS_FECHADOS: &str = "Dias_Fechados";
    pub const TEMPO_ATENDIMENTO: &str = "Tempo_Atendimento";
    pub const HORAS_CHEGADA_X_CRIACAO: &str = "Horas_Chegada_x_Criacao";
    pub const FAIXA_DIAS_EM_ABERTO: &str = "Faixa_Dias_em_Aberto";
    pub const A_VENCER_WTM_30_DIAS: &str = "A_VENCER_WTM_30_DIAS";
    pub const MES_ANO: &str = "Mes_Ano";
    pub const ANO: &str = "Ano";
    pub const MES: &str = "Mes";
    pub const NOME_MES: &str = "Nome_Mes";
    pub const STATUS_ATRASO: &str = "Status_Atraso";
    pub const DIAS_ATRASO: &str = "Dias_Atraso";
    pub const STATUS_PRAZO_INICIO: &str = "Status_Prazo_Inicio";
    pub const STATUS_PRAZO_CONCLUSAO: &str = "Status_Prazo_Conclusao";
    pub const DIAS_ATRASO_INICIO: &str = "Dias_Atraso_Inicio";
    pub const DIAS_ATRASO_CONCLUSAO: &str = "Dias_Atraso_Conclusao";
    pub const DURACAO_DIAS_UTEIS: &str = "Duracao_Chamado_Dias_Uteis";

    /// Columns carrying "No Prazo" / "Atrasado" / "Pendente" labels
    pub const STATUS_COLUMNS: [&str; 5] = [
        PRAZO_INICIO_AJUSTADO,
        PRAZO_CONCLUSAO_AJUSTADO,
        STATUS_CHAMADO,
        STATUS_PRAZO_INICIO,
        STATUS_PRAZO_CONCLUSAO,
    ];
}

/// Background fill colors
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Fill {
    Green,
    Yellow,
    Orange,
    Red,
}

impl Fill {
    pub fn color(self) -> u32 {
        match self {
            Fill::Green => 0xC6EFCE,
            Fill::Yellow => 0xFFEB9C,
            Fill::Orange => 0xFFD966,
            Fill::Red => 0xFFC7CE,
        }
    }

    /// Row fill of a late-call listing
    pub fn for_delay(status: DelayStatus) -> Option<Fill> {
        match status {
            DelayStatus::Late => Some(Fill::Red),
            DelayStatus::CompletedLate => Some(Fill::Orange),
            DelayStatus::OpenWithoutForecast => Some(Fill::Yellow),
            _ => None,
        }
    }
}

/// Conditional highlighting rule
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Highlight {
    /// "No Prazo" green, "Atrasado" red, "Pendente" yellow
    Status,
    /// At or above `meta` green, within 5 points below yellow, else red
    Percent { meta: f64 },
    /// Non-negative green, negative red
    Comparison,
}

/// Rectangle of data cells, zero-based, inclusive
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellRange {
    pub first_row: u32,
    pub first_col: u16,
    pub last_row: u32,
    pub last_col: u16,
}

impl CellRange {
    pub fn cell(row: u32, col: u16) -> Self {
        Self {
            first_row: row,
            first_col: col,
            last_row: row,
            last_col: col,
        }
    }
}

/// One worksheet's content and styling hints
#[derive(Clone, Debug, PartialEq)]
pub struct SheetTable {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
    pub highlights: Vec<(CellRange, Highlight)>,
    /// Per-row background, parallel to `rows` when non-empty
    pub row_fills: Vec<Option<Fill>>,
    pub autofilter: bool,
}

impl SheetTable {
    pub fn new(name: &str, headers: &[&str]) -> Self {
        Self {
            name: name.chars().take(MAX_SHEET_NAME).collect(),
            headers: headers.iter().map(|h| (*h).to_string()).collect(),
            rows: Vec::new(),
            highlights: Vec::new(),
            row_fills: Vec::new(),
            autofilter: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column(&self, header: &str) -> Option<u16> {
        self.headers
            .iter()
            .position(|h| h == header)
            .map(|i| i as u16)
    }

    /// Highlight a whole data column
    pub fn highlight_column(&mut self, header: &str, highlight: Highlight) {
        let Some(col) = self.column(header) else {
            return;
        };
        if self.rows.is_empty() {
            return;
        }
        let range = CellRange {
            first_row: 1,
            first_col: col,
            last_row: self.rows.len() as u32,
            last_col: col,
        };
        self.highlights.push((range, highlight));
    }
}

fn text(value: Option<&str>) -> CellValue {
    CellValue::from(value)
}

fn count(n: usize) -> CellValue {
    CellValue::from(n as i64)
}

fn money(value: Decimal) -> CellValue {
    CellValue::Number(value.to_f64().unwrap_or(0.0))
}

fn yes_no(flag: bool) -> CellValue {
    CellValue::from(if flag { YES_LABEL } else { NO_LABEL })
}

// ============================================================================
// Processed records
// ============================================================================

/// Column name and cell of every processed-sheet column, in sheet order
pub fn processed_fields(record: &TicketRecord) -> Vec<(&'static str, CellValue)> {
    let m = &record.metrics;
    let mut fields = vec![
        (columns::NUMERO_CHAMADO, text(record.numero_chamado.as_deref())),
        (columns::UF, text(record.uf.as_deref())),
        (columns::DIVISAO, CellValue::from(record.divisao.as_str())),
        (columns::GERENCIA, CellValue::from(record.gerencia.as_str())),
        (derived::UF_MAPA, CellValue::from(m.uf_mapa.as_str())),
        (columns::REGIONAL, text(record.regional.as_deref())),
        (columns::TIPO, text(record.tipo.as_deref())),
        (columns::PRIORIDADE, text(record.prioridade.as_deref())),
        (columns::FORNECEDOR, text(record.fornecedor.as_deref())),
        (columns::RESPONSAVEL, text(record.responsavel.as_deref())),
        (columns::UNIORG_COMERCIAL, text(record.uniorg_comercial.as_deref())),
        (columns::VALOR_TOTAL, record.valor_total.map_or(CellValue::Empty, money)),
        (columns::PRAZO_INICIO, text(record.prazo_inicio.as_deref())),
        (columns::PRAZO_CONCLUSAO, text(record.prazo_conclusao.as_deref())),
    ];

    for column in columns::PASSTHROUGH_COLUMNS {
        fields.push((column, text(record.attributes.get(column).map(String::as_str))));
    }
    for column in columns::DATE_COLUMNS {
        fields.push((column, record.dates.get(column).into()));
    }

    let period = m.periodo;
    fields.extend([
        (derived::PRAZO_INICIO_AJUSTADO, CellValue::from(m.prazo_inicio_ajustado.label())),
        (derived::PRAZO_CONCLUSAO_AJUSTADO, CellValue::from(m.prazo_conclusao_ajustado.label())),
        (derived::STATUS_CHAMADO, CellValue::from(m.status_chamado.as_str())),
        (derived::STATUS_FECHAMENTO, CellValue::from(m.status_fechamento.as_str())),
        (derived::STATUS_FINANCEIRO, CellValue::from(m.status_financeiro.as_str())),
        (
            derived::ESTOQUE_ATUAL,
            CellValue::from(if m.in_stock { STOCK_LABEL } else { NO_LABEL }),
        ),
        (derived::DATA_CONCLUSAO_AJUSTADA, m.data_conclusao_ajustada.into()),
        (derived::DATA_ESTOQUE, m.data_estoque.into()),
        (derived::FECHAMENTO_PENDENTE, yes_no(m.pending_closure)),
        (
            derived::DURACAO_CHAMADO,
            m.duracao_chamado.map_or(CellValue::Empty, CellValue::from),
        ),
        (derived::DIAS_ATRASOS, m.dias_atrasos.into()),
        (derived::DIAS_CHEGADA, m.dias_chegada.into()),
        (derived::DIAS_CONCLUSAO, m.dias_conclusao.into()),
        (derived::DIAS_FECHADOS, m.dias_fechados.into()),
        (derived::TEMPO_ATENDIMENTO, m.tempo_atendimento.into()),
        (derived::HORAS_CHEGADA_X_CRIACAO, m.segundos_chegada.into()),
        (derived::FAIXA_DIAS_EM_ABERTO, CellValue::from(m.faixa_dias_em_aberto.as_str())),
        (
            derived::A_VENCER_WTM_30_DIAS,
            CellValue::from(if m.due_soon { DUE_SOON_LABEL } else { OTHERS_LABEL }),
        ),
        (derived::MES_ANO, period.map_or(CellValue::Empty, |p| p.key().into())),
        (derived::ANO, period.map_or(CellValue::Empty, |p| i64::from(p.year).into())),
        (derived::MES, period.map_or(CellValue::Empty, |p| i64::from(p.month).into())),
        (derived::NOME_MES, period.map_or(CellValue::Empty, |p| p.month_name().into())),
        (derived::STATUS_ATRASO, CellValue::from(m.status_atraso.as_str())),
        (derived::DIAS_ATRASO, m.dias_atraso.into()),
        (derived::STATUS_PRAZO_INICIO, CellValue::from(m.status_prazo_inicio.as_str())),
        (derived::STATUS_PRAZO_CONCLUSAO, CellValue::from(m.status_prazo_conclusao.as_str())),
        (derived::DIAS_ATRASO_INICIO, m.dias_atraso_inicio.into()),
        (derived::DIAS_ATRASO_CONCLUSAO, m.dias_atraso_conclusao.into()),
        (derived::DURACAO_DIAS_UTEIS, m.duracao_dias_uteis.into()),
    ]);
    fields
}

/// Processed-sheet header row
pub fn processed_headers() -> Vec<&'static str> {
    processed_fields(&TicketRecord::default())
        .into_iter()
        .map(|(name, _)| name)
        .collect()
}

/// Processed-sheet cells of one record
pub fn processed_row(record: &TicketRecord) -> Vec<CellValue> {
    processed_fields(record)
        .into_iter()
        .map(|(_, value)| value)
        .collect()
}

/// Record listing sheet with status highlighting and an autofilter
pub fn records_table<'a>(name: &str, records: impl Iterator<Item = &'a TicketRecord>) -> SheetTable {
    let mut table = SheetTable::new(name, &processed_headers());
    table.rows = records.map(processed_row).collect();
    table.autofilter = true;
    for column in derived::STATUS_COLUMNS {
        table.highlight_column(column, Highlight::Status);
    }
    table
}

/// Late and open listing, each row filled by its delay status
pub fn late_calls_table<'a>(name: &str, records: impl Iterator<Item = &'a TicketRecord>) -> SheetTable {
    let records: Vec<&TicketRecord> = records.collect();
    let mut table = records_table(name, records.iter().copied());
    table.row_fills = records
        .iter()
        .map(|r| Fill::for_delay(r.metrics.status_atraso))
        .collect();
    table
}

// ============================================================================
// Summary sheets
// ============================================================================

/// Statistic / value pairs, SLA and comparison cells highlighted
pub fn stats_table(report: &Report) -> SheetTable {
    let mut table = SheetTable::new("Estatísticas_Gerais", &["Métrica", "Valor"]);
    for (i, (name, value)) in report.stats.entries().into_iter().enumerate() {
        let row = i as u32 + 1;
        if name.starts_with("SLA") {
            table.highlights.push((
                CellRange::cell(row, 1),
                Highlight::Percent {
                    meta: report.config.meta_sla,
                },
            ));
        } else if name.starts_with("Comparação") {
            table.highlights.push((CellRange::cell(row, 1), Highlight::Comparison));
        }
        table.rows.push(vec![CellValue::from(name), value]);
    }
    table
}

pub fn measures_table(report: &Report) -> SheetTable {
    let mut table = SheetTable::new("Medidas_DAX_Equivalentes", &["Medida DAX", "Valor", "Descrição"]);
    table.rows = report
        .stats
        .measures()
        .into_iter()
        .map(|m| vec![CellValue::from(m.name), m.value, CellValue::from(m.description)])
        .collect();
    table
}

const PCT_SLA_INICIO: &str = "% SLA Início";
const PCT_SLA_CONCLUSAO: &str = "% SLA Conclusão";

fn highlight_sla_columns(table: &mut SheetTable, config: &SlaConfig) {
    for column in [PCT_SLA_INICIO, PCT_SLA_CONCLUSAO] {
        table.highlight_column(column, Highlight::Percent { meta: config.meta_sla });
    }
}

/// Per-dimension summary sheet, named `Por_<column>`
pub fn dimension_sheet(summary: &DimensionTable, config: &SlaConfig) -> SheetTable {
    let key = summary.dimension.column();
    let name = format!("Por_{key}");
    let mut table = SheetTable::new(
        &name,
        &[
            key,
            "Total_Chamados",
            "NP_Inicio",
            "NP_Conclusao",
            "Tempo_Medio_Resolucao",
            "Valor_Total_OS",
            PCT_SLA_INICIO,
            PCT_SLA_CONCLUSAO,
        ],
    );
    table.rows = summary
        .rows
        .iter()
        .map(|r| {
            vec![
                CellValue::from(r.key.as_str()),
                count(r.total_chamados),
                count(r.np_inicio),
                count(r.np_conclusao),
                r.tempo_medio_resolucao.into(),
                money(r.valor_total_os),
                r.pct_sla_inicio.into(),
                r.pct_sla_conclusao.into(),
            ]
        })
        .collect();
    highlight_sla_columns(&mut table, config);
    table
}

pub fn monthly_table(months: &[MonthlySummary], config: &SlaConfig) -> SheetTable {
    let mut table = SheetTable::new(
        "Evolução_Mensal",
        &[
            "Período",
            "Total_Chamados",
            "NP_Inicio",
            "NP_Conclusao",
            PCT_SLA_INICIO,
            PCT_SLA_CONCLUSAO,
        ],
    );
    table.rows = months
        .iter()
        .map(|m| {
            vec![
                m.period.label().into(),
                count(m.total_chamados),
                count(m.np_inicio),
                count(m.np_conclusao),
                m.pct_sla_inicio.into(),
                m.pct_sla_conclusao.into(),
            ]
        })
        .collect();
    highlight_sla_columns(&mut table, config);
    table
}

pub fn responsibles_table(report: &Report) -> SheetTable {
    let mut table = SheetTable::new("Top_Responsáveis", &[columns::RESPONSAVEL, "Total_Chamados"]);
    table.rows = report
        .top_responsibles
        .iter()
        .map(|r| vec![r.responsavel.as_str().into(), count(r.total_chamados)])
        .collect();
    table
}

pub fn accumulated_table(report: &Report) -> SheetTable {
    let mut table = SheetTable::new(
        "Métricas_Acumuladas",
        &[columns::DATA_CRIACAO, "Acumulado_Criados", "Acumulado_Concluidos"],
    );
    table.rows = report
        .accumulated
        .iter()
        .map(|p| {
            vec![
                CellValue::DateTime(p.criacao),
                count(p.acumulado_criados),
                count(p.acumulado_concluidos),
            ]
        })
        .collect();
    table
}

pub fn calendar_table(report: &Report) -> SheetTable {
    let mut table = SheetTable::new(
        "Calendario",
        &["Date", "Ano", "Mes", "Nome_Mes", "Dia_Semana", "Dia_Util", "Semana_Ano", "Mes_Ano"],
    );
    table.rows = report
        .calendar
        .iter()
        .map(|day| {
            vec![
                CellValue::DateTime(start_of_day(day.date)),
                i64::from(day.year).into(),
                i64::from(day.month).into(),
                day.month_name.into(),
                day.weekday_name.into(),
                day.business_day_flag().into(),
                i64::from(day.iso_week).into(),
                day.month_key.as_str().into(),
            ]
        })
        .collect();
    table
}

// ============================================================================
// Workbooks
// ============================================================================

pub const PROCESSED_SHEET: &str = "Dados_Processados";

/// Sheets of the analysis workbook, in order. Optional sheets are left out
/// when they have no rows.
pub fn analysis_tables(report: &Report) -> Vec<SheetTable> {
    let mut tables = vec![
        records_table(PROCESSED_SHEET, report.records.iter()),
        stats_table(report),
        measures_table(report),
    ];

    let optional = report
        .dimensions
        .iter()
        .map(|d| dimension_sheet(d, &report.config))
        .chain([
            monthly_table(&report.monthly, &report.config),
            responsibles_table(report),
            records_table("FP_Início", report.fp_inicio_records()),
            records_table("FP_Conclusão", report.fp_conclusao_records()),
            late_calls_table("Chamados_Atrasados", report.late_and_open_records()),
            accumulated_table(report),
            calendar_table(report),
        ]);
    tables.extend(optional.filter(|t| !t.is_empty()));
    tables
}
