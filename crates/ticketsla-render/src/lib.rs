//! # ticketsla-render
//!
//! Output backends for ticketsla reports.
//!
//! This crate provides:
//! - The processed-records workbook (`Base_Tratada.xlsx`)
//! - The full analysis workbook with summary sheets and conditional formatting
//! - A plain-text console summary
//!
//! ## Example
//!
//! ```rust,ignore
//! use ticketsla_core::ReportRenderer;
//! use ticketsla_render::{AnalysisRenderer, ProcessedRenderer, SummaryRenderer};
//!
//! let processed = ProcessedRenderer::new().render(&report)?;
//! std::fs::write("Base_Tratada.xlsx", processed)?;
//!
//! let analysis = AnalysisRenderer::new().render(&report)?;
//! std::fs::write("Analise_Chamados_Completa.xlsx", analysis)?;
//!
//! println!("{}", SummaryRenderer::new().render(&report)?);
//! ```

pub mod excel;
pub mod summary;
pub mod table;

pub use excel::{save, AnalysisRenderer, ProcessedRenderer};
pub use summary::SummaryRenderer;
pub use table::{processed_headers, processed_row, SheetTable, PROCESSED_SHEET};
