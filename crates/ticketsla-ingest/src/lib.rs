//! # ticketsla-ingest
//!
//! Reads ticket spreadsheets into typed records.
//!
//! Loading happens in two steps: `load_all` merges the first worksheet of
//! every readable file into a `RawTable`, then `build_records` maps UFs to
//! divisions and normalizes the date columns.
//!
//! ## Example
//!
//! ```rust,no_run
//! use ticketsla_core::DivisionMap;
//! use ticketsla_ingest::load_records;
//!
//! let loaded = load_records(&["Base Geral STD.xlsx"], &DivisionMap::default())?;
//! println!("{} records", loaded.records.len());
//! # Ok::<(), ticketsla_core::IngestError>(())
//! ```

pub mod dates;
pub mod loader;
pub mod records;

pub use dates::{from_excel_serial, in_supported_range, parse_date, parse_date_text};
pub use loader::{convert_cell, load_all, load_file, LoadFailure, LoadOutcome, RawRow, RawTable};
pub use records::{build_records, missing_columns, parse_decimal};

use std::path::Path;
use ticketsla_core::{DivisionMap, IngestError, TicketRecord};

/// Records loaded from a batch of files
#[derive(Debug)]
pub struct LoadedRecords {
    pub records: Vec<TicketRecord>,
    /// Files that were skipped
    pub failures: Vec<LoadFailure>,
    pub files_loaded: usize,
}

/// Load, merge and type every input file
pub fn load_records<P: AsRef<Path>>(
    paths: &[P],
    divisions: &DivisionMap,
) -> Result<LoadedRecords, IngestError> {
    let outcome = load_all(paths)?;
    let records = build_records(&outcome.table, divisions);
    Ok(LoadedRecords {
        records,
        failures: outcome.failures,
        files_loaded: outcome.files_loaded,
    })
}
