//! # ticketsla-metrics
//!
//! SLA metric derivation and aggregation.
//!
//! This crate provides:
//! - Per-record derived columns (`derive_metrics`)
//! - The calendar table over the observed creation range
//! - Whole-table statistics and per-dimension, monthly and accumulated summaries
//!
//! ## Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use ticketsla_core::{SlaConfig, TicketRecord};
//! use ticketsla_metrics::Analyzer;
//!
//! let day = |d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap().and_hms_opt(0, 0, 0).unwrap();
//! let record = TicketRecord::new("CH-1")
//!     .created(day(1))
//!     .expected_completion(day(10))
//!     .completed(day(5));
//!
//! let as_of = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
//! let report = Analyzer::new(SlaConfig::default()).as_of(as_of).analyze(vec![record]);
//! assert_eq!(report.records[0].metrics.status_prazo_conclusao.as_str(), "No Prazo");
//! assert_eq!(report.records[0].metrics.tempo_atendimento, 4);
//! ```

pub mod aggregate;
pub mod calendar;
pub mod derive;

pub use aggregate::{
    accumulated, dimension_table, fp_conclusao, fp_inicio, general_stats, late_and_open,
    monthly_evolution, top_responsibles,
};
pub use calendar::build_calendar;
pub use derive::{apply_metrics, derive_metrics};

use chrono::{Local, NaiveDate};
use ticketsla_core::timeutil::start_of_day;
use ticketsla_core::{Dimension, Report, SlaConfig, TicketRecord};
use tracing::info;

/// Runs the metric and aggregation stages
#[derive(Clone, Debug)]
pub struct Analyzer {
    config: SlaConfig,
    as_of: NaiveDate,
}

impl Analyzer {
    /// Analyzer measuring elapsed time against today
    pub fn new(config: SlaConfig) -> Self {
        Self {
            config,
            as_of: Local::now().date_naive(),
        }
    }

    /// Fix the reference date
    pub fn as_of(mut self, date: NaiveDate) -> Self {
        self.as_of = date;
        self
    }

    pub fn config(&self) -> &SlaConfig {
        &self.config
    }

    /// Enrich the records and build every summary table
    pub fn analyze(&self, mut records: Vec<TicketRecord>) -> Report {
        info!(records = records.len(), as_of = %self.as_of, "Computing SLA metrics");
        apply_metrics(&mut records, start_of_day(self.as_of), &self.config);

        let calendar = build_calendar(&records);
        let stats = general_stats(&records, &self.config);
        let dimensions = Dimension::ALL
            .iter()
            .map(|&d| dimension_table(&records, d, self.config.top_dimension))
            .collect();

        let report = Report {
            as_of: self.as_of,
            config: self.config.clone(),
            calendar,
            stats,
            dimensions,
            monthly: monthly_evolution(&records),
            top_responsibles: top_responsibles(&records, self.config.top_responsibles),
            accumulated: accumulated(&records),
            fp_inicio: fp_inicio(&records),
            fp_conclusao: fp_conclusao(&records),
            late_and_open: late_and_open(&records),
            records,
        };

        info!(
            sla_inicio = report.stats.sla_inicio,
            sla_termino = report.stats.sla_termino,
            late = report.late_and_open.len(),
            "Analysis complete"
        );
        report
    }
}

/// Analyze against a fixed reference date
pub fn analyze(records: Vec<TicketRecord>, as_of: NaiveDate, config: &SlaConfig) -> Report {
    Analyzer::new(config.clone()).as_of(as_of).analyze(records)
}
