//! # ticketsla-core
//!
//! Core domain model for the ticketsla SLA pipeline.
//!
//! This crate provides:
//! - Domain types: `TicketRecord`, `TicketDates`, `TicketMetrics`, `CellValue`
//! - Status classifications with their report labels
//! - SLA thresholds (`SlaConfig`) and the UF → division table (`DivisionMap`)
//! - Report types produced by the aggregator (`Report`, `GeneralStats`, ...)
//! - The `ReportRenderer` trait and error types
//!
//! ## Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use ticketsla_core::{TicketRecord, DivisionMap};
//!
//! let created = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
//! let mut record = TicketRecord::new("CH-1").uf("PE").created(created);
//! DivisionMap::default().assign(&mut record);
//! assert_eq!(record.divisao, "DIV 01");
//! ```

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;

pub mod calendar;
pub mod division;
pub mod report;
pub mod timeutil;

pub use calendar::{CalendarDay, YearMonth};
pub use division::{DivisionDef, DivisionMap};
pub use report::{
    AccumulatedPoint, DimensionRow, DimensionTable, GeneralStats, Measure, MonthlySummary, Report,
    ResponsibleCount,
};

// ============================================================================
// Column schema
// ============================================================================

/// Column names of the input schema and of the derived columns.
pub mod columns {
    pub const DIVISAO: &str = "Divisão";
    pub const GERENCIA: &str = "Gerência Operacional";
    pub const UF: &str = "UF";
    pub const NUMERO_CHAMADO: &str = "Numero_Chamado";
    pub const PRIORIDADE: &str = "Prioridade";
    pub const TIPO: &str = "Tipo";
    pub const VALOR_TOTAL: &str = "Valor_Total";
    pub const UNIORG_COMERCIAL: &str = "Uniorg_Comercial";
    pub const FORNECEDOR: &str = "Fornecedor";
    pub const REGIONAL: &str = "regional";
    pub const RESPONSAVEL: &str = "Responsavel";
    pub const PRAZO_INICIO: &str = "prazo_inicio";
    pub const PRAZO_CONCLUSAO: &str = "prazo_conclusao";

    pub const DATA_CRIACAO: &str = "Data_Criacao";
    pub const DATA_CHEGADA: &str = "Data_Chegada";
    pub const DATA_PREVISAO_CONCLUSAO: &str = "Data_Previsao_Conclusao";
    pub const DATA_PREVISAO_CHEGADA: &str = "Data_Previsao_Chegada";
    pub const DATA_CONCLUSAO: &str = "Data_Conclusao";
    pub const DATA_FECHAMENTO: &str = "Data_de_Fechamento";
    pub const DATA_PRIMEIRO_ENCAMINHAMENTO: &str = "Data_do_Primeiro_Encaminhamento";

    /// Date-valued input columns, in export order.
    pub const DATE_COLUMNS: [&str; 7] = [
        DATA_CRIACAO,
        DATA_CHEGADA,
        DATA_PREVISAO_CONCLUSAO,
        DATA_PREVISAO_CHEGADA,
        DATA_CONCLUSAO,
        DATA_FECHAMENTO,
        DATA_PRIMEIRO_ENCAMINHAMENTO,
    ];

    /// Text columns carried through to the export without interpretation.
    pub const PASSTHROUGH_COLUMNS: [&str; 16] = [
        "Base",
        "Origem",
        "Classificacao",
        "Solicitante",
        "Fila",
        "Grupo",
        "Substatus",
        "Status",
        "SubTipo",
        "Negocio",
        "Local_Nome",
        "Tempo_de_Custo",
        "Nota_Inicial",
        "originador",
        "rede",
        "modulo",
    ];

    /// Typed identity and dimension columns read from the input.
    pub const KEY_COLUMNS: [&str; 12] = [
        UF,
        NUMERO_CHAMADO,
        PRIORIDADE,
        TIPO,
        VALOR_TOTAL,
        UNIORG_COMERCIAL,
        FORNECEDOR,
        REGIONAL,
        RESPONSAVEL,
        PRAZO_INICIO,
        PRAZO_CONCLUSAO,
        DATA_CRIACAO,
    ];

    /// Every column the loader expects to find.
    pub fn expected() -> Vec<&'static str> {
        let mut all: Vec<&'static str> = KEY_COLUMNS.to_vec();
        for col in DATE_COLUMNS.iter().chain(PASSTHROUGH_COLUMNS.iter()) {
            if !all.contains(col) {
                all.push(col);
            }
        }
        all
    }
}

// ============================================================================
// Cell values
// ============================================================================

/// A single spreadsheet cell, as read by the loader and written by the exporter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Text rendering of the cell; `None` for empty cells.
    ///
    /// Whole numbers lose their decimal point so that identifiers stored as
    /// numbers ("12345.0") read back as "12345".
    pub fn as_text(&self) -> Option<String> {
        match self {
            CellValue::Empty => None,
            CellValue::Text(s) => Some(s.clone()),
            CellValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    Some(format!("{}", *n as i64))
                } else {
                    Some(format!("{}", n))
                }
            }
            CellValue::Bool(b) => Some(if *b { "TRUE" } else { "FALSE" }.to_string()),
            CellValue::DateTime(dt) => Some(dt.format("%Y-%m-%d %H:%M:%S").to_string()),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        if s.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(s.to_string())
        }
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        if s.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(s)
        }
    }
}

impl From<Option<&str>> for CellValue {
    fn from(s: Option<&str>) -> Self {
        s.map_or(CellValue::Empty, CellValue::from)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<Option<NaiveDateTime>> for CellValue {
    fn from(dt: Option<NaiveDateTime>) -> Self {
        dt.map_or(CellValue::Empty, CellValue::DateTime)
    }
}

// ============================================================================
// Status classifications
// ============================================================================

/// On-time / late classification of a deadline pair.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeadlineStatus {
    /// "No Prazo" (NP)
    OnTime,
    /// "Atrasado" (A)
    Late,
    /// Deadline exists but the event has not happened yet
    Pending,
    /// No deadline, or no event date to compare
    #[default]
    Undefined,
}

impl DeadlineStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeadlineStatus::OnTime => "No Prazo",
            DeadlineStatus::Late => "Atrasado",
            DeadlineStatus::Pending => "Pendente",
            DeadlineStatus::Undefined => "Não Definido",
        }
    }

    /// Short code used by the source system ("NP" / "A").
    pub fn code(&self) -> &'static str {
        match self {
            DeadlineStatus::OnTime => "NP",
            DeadlineStatus::Late => "A",
            DeadlineStatus::Pending => "P",
            DeadlineStatus::Undefined => "ND",
        }
    }

    /// Compare an event date with its deadline: on or before is on time.
    pub fn compare(event: NaiveDateTime, deadline: NaiveDateTime) -> Self {
        if event <= deadline {
            DeadlineStatus::OnTime
        } else {
            DeadlineStatus::Late
        }
    }
}

impl std::fmt::Display for DeadlineStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Deadline flag as recorded by the source system (`prazo_inicio`, `prazo_conclusao`),
/// with unset values resolved to on time.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AdjustedDeadline {
    #[default]
    OnTime,
    Late,
    Other(String),
}

impl AdjustedDeadline {
    /// Resolve a raw deadline flag. Unset, blank and "NA" count as on time.
    pub fn resolve(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return AdjustedDeadline::OnTime;
        };
        match raw.to_uppercase().as_str() {
            "NA" | "NP" | "NO PRAZO" => AdjustedDeadline::OnTime,
            "FP" | "A" | "ATRASADO" | "FORA DO PRAZO" => AdjustedDeadline::Late,
            _ => AdjustedDeadline::Other(raw.to_string()),
        }
    }

    pub fn is_on_time(&self) -> bool {
        matches!(self, AdjustedDeadline::OnTime)
    }

    pub fn label(&self) -> &str {
        match self {
            AdjustedDeadline::OnTime => DeadlineStatus::OnTime.as_str(),
            AdjustedDeadline::Late => DeadlineStatus::Late.as_str(),
            AdjustedDeadline::Other(raw) => raw,
        }
    }
}

/// Delay situation of a ticket relative to its expected completion.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DelayStatus {
    CompletedLate,
    Late,
    OpenWithoutForecast,
    OnSchedule,
    #[default]
    Undefined,
}

impl DelayStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DelayStatus::CompletedLate => "Concluído com Atraso",
            DelayStatus::Late => "Atrasado",
            DelayStatus::OpenWithoutForecast => "Em Aberto (Sem Previsão)",
            DelayStatus::OnSchedule => "Em Dia",
            DelayStatus::Undefined => "Status Indefinido",
        }
    }

    /// Late or completed late.
    pub fn is_late(&self) -> bool {
        matches!(self, DelayStatus::Late | DelayStatus::CompletedLate)
    }

    /// Belongs in the late-and-open listing.
    pub fn needs_attention(&self) -> bool {
        matches!(
            self,
            DelayStatus::Late | DelayStatus::CompletedLate | DelayStatus::OpenWithoutForecast
        )
    }
}

/// Age bucket of a ticket. Variants are ordered from youngest to oldest.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DelayBucket {
    #[default]
    UpTo30,
    Over30,
    Over60,
    Over90,
}

impl DelayBucket {
    /// Bucket for an elapsed-day count given ascending `[30, 60, 90]`-style limits.
    pub fn classify(days: i64, limits: [i64; 3]) -> Self {
        if days > limits[2] {
            DelayBucket::Over90
        } else if days > limits[1] {
            DelayBucket::Over60
        } else if days > limits[0] {
            DelayBucket::Over30
        } else {
            DelayBucket::UpTo30
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DelayBucket::UpTo30 => "-30 dias",
            DelayBucket::Over30 => "+30 dias",
            DelayBucket::Over60 => "+60 dias",
            DelayBucket::Over90 => "+90 dias",
        }
    }
}

/// Pendente / Concluído flag used by `Status_Chamado` and `Status_Fechamento`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompletionState {
    #[default]
    Pending,
    Completed,
}

impl CompletionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompletionState::Pending => "Pendente",
            CompletionState::Completed => "Concluído",
        }
    }
}

/// Financial closure flag (`Status_Financeiro`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinancialStatus {
    #[default]
    Pending,
    Closed,
}

impl FinancialStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FinancialStatus::Pending => "Pendente",
            FinancialStatus::Closed => "Fechado",
        }
    }
}

pub const STOCK_LABEL: &str = "Estoque Atual";
pub const DUE_SOON_LABEL: &str = "À VENCER WTM +30 DIAS";
pub const OTHERS_LABEL: &str = "OUTROS";
pub const YES_LABEL: &str = "Sim";
pub const NO_LABEL: &str = "Não";

// ============================================================================
// Configuration
// ============================================================================

/// SLA targets and classification thresholds
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SlaConfig {
    /// SLA target in percent
    pub meta_sla: f64,
    /// Cleanup target in percent
    pub meta_limpeza: f64,
    /// Days after completion before a missing closure is flagged
    pub pending_closure_days: i64,
    /// Lower bound (inclusive) of the due-soon window, in elapsed days
    pub due_soon_min: i64,
    /// Upper bound (exclusive) of the due-soon window, in elapsed days
    pub due_soon_max: i64,
    /// Ascending limits of the age buckets
    pub delay_buckets: [i64; 3],
    /// Rows in the top-responsibles table
    pub top_responsibles: usize,
    /// Rows in each per-dimension table
    pub top_dimension: usize,
}

impl Default for SlaConfig {
    fn default() -> Self {
        Self {
            meta_sla: 96.0,
            meta_limpeza: 98.0,
            pending_closure_days: 30,
            due_soon_min: 20,
            due_soon_max: 30,
            delay_buckets: [30, 60, 90],
            top_responsibles: 15,
            top_dimension: 20,
        }
    }
}

impl SlaConfig {
    /// Check that thresholds are ordered and non-degenerate.
    pub fn validate(&self) -> Result<(), ThresholdError> {
        let [a, b, c] = self.delay_buckets;
        if !(a < b && b < c) {
            return Err(ThresholdError::UnorderedBuckets(self.delay_buckets));
        }
        if self.due_soon_min >= self.due_soon_max {
            return Err(ThresholdError::EmptyDueSoonWindow {
                min: self.due_soon_min,
                max: self.due_soon_max,
            });
        }
        for target in [self.meta_sla, self.meta_limpeza] {
            if !(0.0..=100.0).contains(&target) {
                return Err(ThresholdError::TargetOutOfRange(target));
            }
        }
        Ok(())
    }
}

// ============================================================================
// Ticket record
// ============================================================================

/// Normalized date columns of a ticket
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TicketDates {
    pub criacao: Option<NaiveDateTime>,
    pub chegada: Option<NaiveDateTime>,
    pub previsao_conclusao: Option<NaiveDateTime>,
    pub previsao_chegada: Option<NaiveDateTime>,
    pub conclusao: Option<NaiveDateTime>,
    pub fechamento: Option<NaiveDateTime>,
    pub primeiro_encaminhamento: Option<NaiveDateTime>,
}

impl TicketDates {
    /// Look up a date by its input column name.
    pub fn get(&self, column: &str) -> Option<NaiveDateTime> {
        match column {
            columns::DATA_CRIACAO => self.criacao,
            columns::DATA_CHEGADA => self.chegada,
            columns::DATA_PREVISAO_CONCLUSAO => self.previsao_conclusao,
            columns::DATA_PREVISAO_CHEGADA => self.previsao_chegada,
            columns::DATA_CONCLUSAO => self.conclusao,
            columns::DATA_FECHAMENTO => self.fechamento,
            columns::DATA_PRIMEIRO_ENCAMINHAMENTO => self.primeiro_encaminhamento,
            _ => None,
        }
    }

    /// Mutable slot for a date column; `None` for unknown columns.
    pub fn slot_mut(&mut self, column: &str) -> Option<&mut Option<NaiveDateTime>> {
        match column {
            columns::DATA_CRIACAO => Some(&mut self.criacao),
            columns::DATA_CHEGADA => Some(&mut self.chegada),
            columns::DATA_PREVISAO_CONCLUSAO => Some(&mut self.previsao_conclusao),
            columns::DATA_PREVISAO_CHEGADA => Some(&mut self.previsao_chegada),
            columns::DATA_CONCLUSAO => Some(&mut self.conclusao),
            columns::DATA_FECHAMENTO => Some(&mut self.fechamento),
            columns::DATA_PRIMEIRO_ENCAMINHAMENTO => Some(&mut self.primeiro_encaminhamento),
            _ => None,
        }
    }
}

/// Derived SLA columns. Every field is a pure function of the record's dates,
/// its raw deadline flags, the reference date and `SlaConfig`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TicketMetrics {
    pub prazo_inicio_ajustado: AdjustedDeadline,
    pub prazo_conclusao_ajustado: AdjustedDeadline,
    pub status_chamado: CompletionState,
    pub status_fechamento: CompletionState,
    pub status_financeiro: FinancialStatus,
    pub in_stock: bool,
    pub data_conclusao_ajustada: Option<NaiveDateTime>,
    pub data_estoque: Option<NaiveDateTime>,
    pub pending_closure: bool,
    /// Days since creation (`DURACAO_CHAMADO`)
    pub duracao_chamado: Option<i64>,
    pub dias_atrasos: i64,
    pub dias_chegada: i64,
    pub dias_conclusao: i64,
    pub dias_fechados: i64,
    pub tempo_atendimento: i64,
    /// Seconds between creation and arrival
    pub segundos_chegada: i64,
    pub faixa_dias_em_aberto: DelayBucket,
    pub due_soon: bool,
    pub uf_mapa: String,
    pub periodo: Option<YearMonth>,
    pub status_atraso: DelayStatus,
    pub dias_atraso: i64,
    pub status_prazo_inicio: DeadlineStatus,
    pub status_prazo_conclusao: DeadlineStatus,
    pub dias_atraso_inicio: i64,
    pub dias_atraso_conclusao: i64,
    pub duracao_dias_uteis: i64,
}

/// One ticket/call record
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TicketRecord {
    pub numero_chamado: Option<String>,
    pub uf: Option<String>,
    /// Division mapped from the UF
    pub divisao: String,
    /// Operational management mapped from the UF
    pub gerencia: String,
    pub regional: Option<String>,
    pub tipo: Option<String>,
    pub prioridade: Option<String>,
    pub fornecedor: Option<String>,
    pub responsavel: Option<String>,
    pub uniorg_comercial: Option<String>,
    pub valor_total: Option<Decimal>,
    /// Raw start-deadline flag
    pub prazo_inicio: Option<String>,
    /// Raw completion-deadline flag
    pub prazo_conclusao: Option<String>,
    pub dates: TicketDates,
    /// Pass-through text columns
    pub attributes: HashMap<String, String>,
    pub metrics: TicketMetrics,
    /// File this record was loaded from
    pub source: Option<PathBuf>,
}

impl TicketRecord {
    /// Create a record with the given ticket number
    pub fn new(numero_chamado: impl Into<String>) -> Self {
        Self {
            numero_chamado: Some(numero_chamado.into()),
            ..Self::default()
        }
    }

    pub fn uf(mut self, uf: impl Into<String>) -> Self {
        self.uf = Some(uf.into());
        self
    }

    pub fn tipo(mut self, tipo: impl Into<String>) -> Self {
        self.tipo = Some(tipo.into());
        self
    }

    pub fn prioridade(mut self, prioridade: impl Into<String>) -> Self {
        self.prioridade = Some(prioridade.into());
        self
    }

    pub fn responsavel(mut self, responsavel: impl Into<String>) -> Self {
        self.responsavel = Some(responsavel.into());
        self
    }

    pub fn fornecedor(mut self, fornecedor: impl Into<String>) -> Self {
        self.fornecedor = Some(fornecedor.into());
        self
    }

    pub fn valor(mut self, valor: Decimal) -> Self {
        self.valor_total = Some(valor);
        self
    }

    pub fn prazos(mut self, inicio: impl Into<String>, conclusao: impl Into<String>) -> Self {
        self.prazo_inicio = Some(inicio.into());
        self.prazo_conclusao = Some(conclusao.into());
        self
    }

    pub fn created(mut self, at: NaiveDateTime) -> Self {
        self.dates.criacao = Some(at);
        self
    }

    pub fn arrived(mut self, at: NaiveDateTime) -> Self {
        self.dates.chegada = Some(at);
        self
    }

    pub fn expected_arrival(mut self, at: NaiveDateTime) -> Self {
        self.dates.previsao_chegada = Some(at);
        self
    }

    pub fn expected_completion(mut self, at: NaiveDateTime) -> Self {
        self.dates.previsao_conclusao = Some(at);
        self
    }

    pub fn completed(mut self, at: NaiveDateTime) -> Self {
        self.dates.conclusao = Some(at);
        self
    }

    pub fn closed(mut self, at: NaiveDateTime) -> Self {
        self.dates.fechamento = Some(at);
        self
    }

    /// Value of a grouping dimension, if set and non-blank
    pub fn dimension(&self, dimension: Dimension) -> Option<&str> {
        let value = match dimension {
            Dimension::Division => Some(self.divisao.as_str()),
            Dimension::Regional => self.regional.as_deref(),
            Dimension::Type => self.tipo.as_deref(),
            Dimension::Priority => self.prioridade.as_deref(),
            Dimension::Supplier => self.fornecedor.as_deref(),
            Dimension::Uf => self.uf.as_deref(),
            Dimension::Responsible => self.responsavel.as_deref(),
        };
        value.filter(|v| !v.trim().is_empty())
    }
}

/// Grouping dimension for summary tables
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dimension {
    Division,
    Regional,
    Type,
    Priority,
    Supplier,
    Uf,
    Responsible,
}

impl Dimension {
    /// Dimensions summarized in the analysis workbook, in sheet order
    pub const ALL: [Dimension; 7] = [
        Dimension::Division,
        Dimension::Regional,
        Dimension::Type,
        Dimension::Priority,
        Dimension::Supplier,
        Dimension::Uf,
        Dimension::Responsible,
    ];

    /// Column name of the dimension
    pub fn column(&self) -> &'static str {
        match self {
            Dimension::Division => columns::DIVISAO,
            Dimension::Regional => columns::REGIONAL,
            Dimension::Type => columns::TIPO,
            Dimension::Priority => columns::PRIORIDADE,
            Dimension::Supplier => columns::FORNECEDOR,
            Dimension::Uf => columns::UF,
            Dimension::Responsible => columns::RESPONSAVEL,
        }
    }
}

// ============================================================================
// Traits
// ============================================================================

/// Output rendering
pub trait ReportRenderer {
    type Output;

    /// Render a finished report to the output format
    fn render(&self, report: &Report) -> Result<Self::Output, RenderError>;
}

// ============================================================================
// Errors
// ============================================================================

/// Input loading error
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cannot read workbook {path}: {message}")]
    Workbook { path: PathBuf, message: String },

    #[error("Workbook has no worksheet: {0}")]
    NoWorksheet(PathBuf),

    #[error("No input could be loaded")]
    NoInput,
}

/// Inconsistent `SlaConfig` thresholds
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ThresholdError {
    #[error("delay_buckets must be ascending, got {0:?}")]
    UnorderedBuckets([i64; 3]),

    #[error("due-soon window is empty: {min}..{max}")]
    EmptyDueSoonWindow { min: i64, max: i64 },

    #[error("SLA target {0} is not a percentage between 0 and 100")]
    TargetOutOfRange(f64),
}

/// Rendering error
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Format error: {0}")]
    Format(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn dt(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn unset_deadline_flag_is_on_time() {
        assert_eq!(AdjustedDeadline::resolve(None), AdjustedDeadline::OnTime);
        assert_eq!(AdjustedDeadline::resolve(Some("  ")), AdjustedDeadline::OnTime);
        assert_eq!(AdjustedDeadline::resolve(Some("NA")), AdjustedDeadline::OnTime);
        assert_eq!(AdjustedDeadline::resolve(Some("na")), AdjustedDeadline::OnTime);
        assert_eq!(AdjustedDeadline::resolve(None).label(), "No Prazo");
    }

    #[test]
    fn deadline_flags_resolve_by_code() {
        assert_eq!(AdjustedDeadline::resolve(Some("NP")), AdjustedDeadline::OnTime);
        assert_eq!(AdjustedDeadline::resolve(Some("FP")), AdjustedDeadline::Late);
        assert_eq!(AdjustedDeadline::resolve(Some("Atrasado")), AdjustedDeadline::Late);
        assert_eq!(
            AdjustedDeadline::resolve(Some("Revisar")),
            AdjustedDeadline::Other("Revisar".into())
        );
        assert_eq!(AdjustedDeadline::resolve(Some("FP")).label(), "Atrasado");
    }

    #[test]
    fn compare_on_or_before_deadline() {
        let deadline = dt(2024, 1, 10);
        assert_eq!(DeadlineStatus::compare(dt(2024, 1, 5), deadline), DeadlineStatus::OnTime);
        assert_eq!(DeadlineStatus::compare(deadline, deadline), DeadlineStatus::OnTime);
        assert_eq!(DeadlineStatus::compare(dt(2024, 1, 11), deadline), DeadlineStatus::Late);
        assert_eq!(DeadlineStatus::OnTime.to_string(), "No Prazo");
        assert_eq!(DeadlineStatus::Late.code(), "A");
    }

    #[test]
    fn buckets_follow_limits() {
        let limits = [30, 60, 90];
        assert_eq!(DelayBucket::classify(0, limits), DelayBucket::UpTo30);
        assert_eq!(DelayBucket::classify(30, limits), DelayBucket::UpTo30);
        assert_eq!(DelayBucket::classify(31, limits), DelayBucket::Over30);
        assert_eq!(DelayBucket::classify(61, limits), DelayBucket::Over60);
        assert_eq!(DelayBucket::classify(91, limits), DelayBucket::Over90);
        assert_eq!(DelayBucket::Over90.as_str(), "+90 dias");
    }

    #[test]
    fn buckets_are_monotonic() {
        let limits = [30, 60, 90];
        let mut previous = DelayBucket::classify(-5, limits);
        for days in -4..200 {
            let bucket = DelayBucket::classify(days, limits);
            assert!(bucket >= previous, "bucket for {days} dropped");
            previous = bucket;
        }
    }

    #[test]
    fn cell_text_drops_integral_decimals() {
        assert_eq!(CellValue::Number(12345.0).as_text(), Some("12345".into()));
        assert_eq!(CellValue::Number(1.5).as_text(), Some("1.5".into()));
        assert_eq!(CellValue::from(""), CellValue::Empty);
        assert_eq!(CellValue::Empty.as_text(), None);
    }

    #[test]
    fn default_config_is_valid() {
        assert!(SlaConfig::default().validate().is_ok());
        let bad = SlaConfig {
            delay_buckets: [60, 30, 90],
            ..SlaConfig::default()
        };
        assert_eq!(bad.validate(), Err(ThresholdError::UnorderedBuckets([60, 30, 90])));

        let window = SlaConfig {
            due_soon_min: 30,
            due_soon_max: 30,
            ..SlaConfig::default()
        };
        assert_eq!(
            window.validate(),
            Err(ThresholdError::EmptyDueSoonWindow { min: 30, max: 30 })
        );

        let target = SlaConfig {
            meta_limpeza: 120.0,
            ..SlaConfig::default()
        };
        assert_eq!(target.validate(), Err(ThresholdError::TargetOutOfRange(120.0)));
    }

    #[test]
    fn expected_columns_have_no_duplicates() {
        let cols = columns::expected();
        let mut sorted = cols.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), cols.len());
        assert!(cols.contains(&"Data_de_Fechamento"));
    }

    #[test]
    fn dimension_skips_blank_values() {
        let record = TicketRecord::new("1").tipo("  ").prioridade("Alta");
        assert_eq!(record.dimension(Dimension::Type), None);
        assert_eq!(record.dimension(Dimension::Priority), Some("Alta"));
    }
}
