//! Report model produced by the aggregator
//!
//! `Report` bundles the enriched records with every summary table the
//! exporter writes. Statistic names follow the Power BI measures the
//! workbook has always mirrored ("Total Chamados", "SLA Início", ...).

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::{CalendarDay, CellValue, Dimension, SlaConfig, TicketRecord, YearMonth};

/// Round to two decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `part / whole` in percent, 0 when `whole` is 0
pub fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

// ============================================================================
// General statistics
// ============================================================================

/// Whole-table SLA statistics
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct GeneralStats {
    pub total_chamados: usize,
    pub total_chamados_termino: usize,
    pub total_conclusao_np: usize,
    pub total_inicio_np: usize,
    pub sla_inicio: f64,
    pub sla_termino: f64,
    pub comparacao_meta_inicio: f64,
    pub comparacao_meta_termino: f64,
    pub comparacao_meta_limpeza_termino: f64,
    pub total_estoque: usize,
    pub total_fornecedor: usize,
    pub total_chamados_concluidos: usize,
    pub total_chamados_fp: usize,
    pub fechamento_pendente: usize,
    pub a_vencer_wtm_30_dias: usize,
    pub chamados_atrasados: usize,
    pub chamados_em_aberto: usize,
    pub media_dias_atrasos: f64,
    pub media_dias_chegada: f64,
    pub media_dias_conclusao: f64,
    pub media_dias_fechamento: f64,
    pub media_tempo_atendimento: f64,
    pub media_valor_os: f64,
    pub qtd_agencias: usize,
    pub total_valor_os: Decimal,
    /// `HH:MM:SS`
    pub media_tempo_chegada: String,
    /// `HH:MM:SS`
    pub tempo_chegada: String,
}

/// One row of the measures sheet
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Measure {
    pub name: &'static str,
    pub value: CellValue,
    pub description: &'static str,
}

impl Measure {
    fn new(name: &'static str, value: impl Into<CellValue>, description: &'static str) -> Self {
        Self {
            name,
            value: value.into(),
            description,
        }
    }
}

impl GeneralStats {
    /// Raw statistic values, in sheet order
    pub fn entries(&self) -> Vec<(&'static str, CellValue)> {
        vec![
            ("Total Chamados", (self.total_chamados as i64).into()),
            ("Total Chamados Termino", (self.total_chamados_termino as i64).into()),
            ("Total Conclusão NP", (self.total_conclusao_np as i64).into()),
            ("Total Inicio NP", (self.total_inicio_np as i64).into()),
            ("SLA Início", self.sla_inicio.into()),
            ("SLA Término", self.sla_termino.into()),
            ("Comparação Meta Inicio", self.comparacao_meta_inicio.into()),
            ("Comparação Meta Término", self.comparacao_meta_termino.into()),
            (
                "Comparação Meta Limpeza Término",
                self.comparacao_meta_limpeza_termino.into(),
            ),
            ("Total Estoque", (self.total_estoque as i64).into()),
            ("Total Fornecedor", (self.total_fornecedor as i64).into()),
            ("Total Chamados Concluídos", (self.total_chamados_concluidos as i64).into()),
            ("Total Chamados FP", (self.total_chamados_fp as i64).into()),
            ("Fechamento Pendente", (self.fechamento_pendente as i64).into()),
            ("À VENCER WTM 30 DIAS", (self.a_vencer_wtm_30_dias as i64).into()),
            ("Chamados Atrasados", (self.chamados_atrasados as i64).into()),
            ("Chamados Em Aberto", (self.chamados_em_aberto as i64).into()),
            ("Media Dias Atrasos", self.media_dias_atrasos.into()),
            ("Média Dias Chegada", self.media_dias_chegada.into()),
            ("Média Dias Conclusão", self.media_dias_conclusao.into()),
            ("Média Dias Fechamento", self.media_dias_fechamento.into()),
            ("Media Tempo Atendimento", self.media_tempo_atendimento.into()),
            ("Média Valor OS", self.media_valor_os.into()),
            ("Qtd Agencias", (self.qtd_agencias as i64).into()),
            ("Total Valor OS", self.total_valor_os.to_f64().unwrap_or(0.0).into()),
            ("Media Tempo Chegada", CellValue::from(self.media_tempo_chegada.as_str())),
            ("Tempo Chegada", CellValue::from(self.tempo_chegada.as_str())),
        ]
    }

    /// Statistic values formatted for reading, with the measure each one mirrors
    pub fn measures(&self) -> Vec<Measure> {
        let count = |n: usize| CellValue::from(n as i64);
        let pct = |v: f64| CellValue::from(format!("{:.2}%", v));
        let pp = |v: f64| CellValue::from(format!("{:.2} pp", v));
        let dec = |v: f64| CellValue::from(format!("{:.2}", v));
        let total_valor = self.total_valor_os.round_dp(2).to_f64().unwrap_or(0.0);

        vec![
            Measure::new("Total Chamados", count(self.total_chamados), "COUNTA('Base WTM'[Numero_Chamado])"),
            Measure::new(
                "Total Chamados Termino",
                count(self.total_chamados_termino),
                "CALCULATE([Total Chamados], USERELATIONSHIP('Base WTM'[Data_Conclusao], Dcalendario[Date]))",
            ),
            Measure::new(
                "Total Conclusão NP",
                count(self.total_conclusao_np),
                "CALCULATE([total chamados termino], 'Base WTM'[Prazo Conclusão Ajustado] = 'NP')",
            ),
            Measure::new(
                "Total Inicio NP",
                count(self.total_inicio_np),
                "CALCULATE([Total Chamados], 'Base WTM'[Prazo Inicio Ajustado] = 'NP')",
            ),
            Measure::new("SLA Início", pct(self.sla_inicio), "[Total Inicio NP]/[Total Chamados]"),
            Measure::new("SLA Término", pct(self.sla_termino), "[Total Conclusão NP]/[total chamados termino]"),
            Measure::new("Comparação Meta Inicio", pp(self.comparacao_meta_inicio), "[SLA Início] - [Meta]"),
            Measure::new("Comparação Meta Término", pp(self.comparacao_meta_termino), "[SLA Término] - [Meta]"),
            Measure::new(
                "Comparação Meta Limpeza Término",
                pp(self.comparacao_meta_limpeza_termino),
                "[SLA Término] - [Meta limpeza]",
            ),
            Measure::new(
                "Total Estoque",
                count(self.total_estoque),
                "CALCULATE([Total Chamados]-[Total Chamados Concluídos])",
            ),
            Measure::new("Total Fornecedor", count(self.total_fornecedor), "DISTINCTCOUNT('Base WTM'[Fornecedor])"),
            Measure::new(
                "Total Chamados Concluídos",
                count(self.total_chamados_concluidos),
                "CALCULATE([Total Chamados], 'Base WTM'[Data Conclusão Ajustada] <> BLANK())",
            ),
            Measure::new("Total Chamados FP", count(self.total_chamados_fp), "[Total Chamados] - [Total Conclusão NP]"),
            Measure::new(
                "Fechamento Pendente",
                count(self.fechamento_pendente),
                "Concluídos há mais de 30 dias sem Data_de_Fechamento",
            ),
            Measure::new(
                "À VENCER WTM 30 DIAS",
                count(self.a_vencer_wtm_30_dias),
                "IF(AND('Base WTM'[DURAÇÃO CHAMADO] < 30, 'Base WTM'[DURAÇÃO CHAMADO] >= 20), 'À VENCER WTM +30 DIAS', 'OUTROS')",
            ),
            Measure::new(
                "Chamados Atrasados",
                count(self.chamados_atrasados),
                "Chamados com prazo vencido ou concluídos com atraso",
            ),
            Measure::new("Chamados Em Aberto", count(self.chamados_em_aberto), "Chamados sem previsão de conclusão"),
            Measure::new("Media Dias Atrasos", dec(self.media_dias_atrasos), "AVERAGE('Base WTM'[Dias atrasos])"),
            Measure::new(
                "Média Dias Chegada",
                dec(self.media_dias_chegada),
                "CALCULATE(AVERAGE('Base WTM'[Dias Chegada]), 'Base WTM'[Data_Chegada] <> BLANK())",
            ),
            Measure::new(
                "Média Dias Conclusão",
                dec(self.media_dias_conclusao),
                "CALCULATE(AVERAGE('Base WTM'[Dias Conclusão]), 'Base WTM'[Data_Conclusao] <> BLANK())",
            ),
            Measure::new(
                "Média Dias Fechamento",
                dec(self.media_dias_fechamento),
                "CALCULATE(AVERAGE('Base WTM'[Dias Fechados]), 'Base WTM'[Data_de_Fechamento] <> BLANK())",
            ),
            Measure::new(
                "Media Tempo Atendimento",
                dec(self.media_tempo_atendimento),
                "AVERAGE('Base WTM'[Tempo Atendimento])",
            ),
            Measure::new("Média Valor OS", dec(self.media_valor_os), "AVERAGE('Base WTM'[Valor_Total])"),
            Measure::new("Qtd Agencias", count(self.qtd_agencias), "DISTINCTCOUNT('Base WTM'[Uniorg_Comercial])"),
            Measure::new("Total Valor OS", dec(total_valor), "SUM('Base WTM'[Valor_Total])"),
            Measure::new(
                "Media Tempo Chegada",
                CellValue::from(self.media_tempo_chegada.as_str()),
                "Formato HHMMSS",
            ),
            Measure::new("Tempo Chegada", CellValue::from(self.tempo_chegada.as_str()), "Formato HHMMSS"),
        ]
    }
}

// ============================================================================
// Summary tables
// ============================================================================

/// One group of a per-dimension summary
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DimensionRow {
    pub key: String,
    pub total_chamados: usize,
    pub np_inicio: usize,
    pub np_conclusao: usize,
    /// Mean business-day duration, 2 decimals
    pub tempo_medio_resolucao: f64,
    pub valor_total_os: Decimal,
    pub pct_sla_inicio: f64,
    pub pct_sla_conclusao: f64,
}

/// Summary of one grouping dimension, largest groups first
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DimensionTable {
    pub dimension: Dimension,
    pub rows: Vec<DimensionRow>,
}

/// One month of the monthly evolution table
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MonthlySummary {
    pub period: YearMonth,
    pub total_chamados: usize,
    pub np_inicio: usize,
    pub np_conclusao: usize,
    pub pct_sla_inicio: f64,
    pub pct_sla_conclusao: f64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ResponsibleCount {
    pub responsavel: String,
    pub total_chamados: usize,
}

/// Running totals at one creation timestamp
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AccumulatedPoint {
    pub criacao: NaiveDateTime,
    pub acumulado_criados: usize,
    pub acumulado_concluidos: usize,
}

// ============================================================================
// Report
// ============================================================================

/// Everything the exporter writes
#[derive(Clone, Debug, Default, Serialize)]
pub struct Report {
    /// Reference date all elapsed-day metrics were computed against
    pub as_of: NaiveDate,
    pub config: SlaConfig,
    pub records: Vec<TicketRecord>,
    pub calendar: Vec<CalendarDay>,
    pub stats: GeneralStats,
    pub dimensions: Vec<DimensionTable>,
    pub monthly: Vec<MonthlySummary>,
    pub top_responsibles: Vec<ResponsibleCount>,
    pub accumulated: Vec<AccumulatedPoint>,
    /// Indices into `records` whose start deadline was missed
    pub fp_inicio: Vec<usize>,
    /// Indices into `records` whose completion deadline was missed
    pub fp_conclusao: Vec<usize>,
    /// Indices into `records` that are late or open without forecast
    pub late_and_open: Vec<usize>,
}

impl Report {
    fn pick<'a>(&'a self, indices: &'a [usize]) -> impl Iterator<Item = &'a TicketRecord> + 'a {
        indices.iter().filter_map(|&i| self.records.get(i))
    }

    pub fn fp_inicio_records(&self) -> impl Iterator<Item = &TicketRecord> + '_ {
        self.pick(&self.fp_inicio)
    }

    pub fn fp_conclusao_records(&self) -> impl Iterator<Item = &TicketRecord> + '_ {
        self.pick(&self.fp_conclusao)
    }

    pub fn late_and_open_records(&self) -> impl Iterator<Item = &TicketRecord> + '_ {
        self.pick(&self.late_and_open)
    }

    /// Summary table for one dimension
    pub fn dimension(&self, dimension: Dimension) -> Option<&DimensionTable> {
        self.dimensions.iter().find(|t| t.dimension == dimension)
    }
}
