//! Workbook loading
//!
//! Reads the first worksheet of each input file into a `RawTable`. The first
//! row is the header. Files that cannot be read are recorded as failures and
//! skipped so one bad export does not abort the batch.

use calamine::{open_workbook_auto, Data, Reader};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use ticketsla_core::timeutil::{format_hms, round_to_second};
use ticketsla_core::{CellValue, IngestError};
use tracing::{debug, error, info, warn};

use crate::dates::{in_supported_range, parse_date_text};

static EMPTY: CellValue = CellValue::Empty;

/// One data row, keyed by header
#[derive(Clone, Debug, PartialEq)]
pub struct RawRow {
    pub cells: HashMap<String, CellValue>,
    /// File the row came from
    pub source: PathBuf,
}

impl RawRow {
    /// Cell for a column; `Empty` when the column is absent
    pub fn get(&self, column: &str) -> &CellValue {
        self.cells.get(column).unwrap_or(&EMPTY)
    }

    /// Cell rendered as trimmed text, `None` when blank
    pub fn text(&self, column: &str) -> Option<String> {
        self.get(column)
            .as_text()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }
}

/// Rows of one or more files with the union of their headers
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawTable {
    /// Headers in first-seen order
    pub columns: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl RawTable {
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Append another table's rows, extending the header union.
    pub fn merge(&mut self, other: RawTable) {
        for column in other.columns {
            if !self.has_column(&column) {
                self.columns.push(column);
            }
        }
        self.rows.extend(other.rows);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A file that could not be loaded
#[derive(Debug)]
pub struct LoadFailure {
    pub path: PathBuf,
    pub error: IngestError,
}

/// Result of loading a batch of files
#[derive(Debug, Default)]
pub struct LoadOutcome {
    pub table: RawTable,
    pub failures: Vec<LoadFailure>,
    pub files_loaded: usize,
}

/// Read one workbook's first worksheet
pub fn load_file(path: &Path) -> Result<RawTable, IngestError> {
    info!(path = %path.display(), "Reading workbook");
    if !path.exists() {
        return Err(IngestError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("file not found: {}", path.display()),
        )));
    }

    let mut workbook = open_workbook_auto(path).map_err(|e| IngestError::Workbook {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| IngestError::NoWorksheet(path.to_path_buf()))?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| IngestError::Workbook {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        warn!(path = %path.display(), sheet = %sheet_name, "Worksheet is empty");
        return Ok(RawTable::default());
    };

    // (column index, header) for every usable header cell
    let mut headers: Vec<(usize, String)> = Vec::new();
    for (idx, cell) in header_row.iter().enumerate() {
        let Some(name) = convert_cell(cell).as_text().map(|s| s.trim().to_string()) else {
            continue;
        };
        if name.is_empty() {
            continue;
        }
        if headers.iter().any(|(_, existing)| *existing == name) {
            warn!(path = %path.display(), column = %name, "Duplicate header ignored");
            continue;
        }
        headers.push((idx, name));
    }

    let mut table = RawTable {
        columns: headers.iter().map(|(_, name)| name.clone()).collect(),
        rows: Vec::new(),
    };

    for row in rows {
        let cells: HashMap<String, CellValue> = headers
            .iter()
            .filter_map(|(idx, name)| {
                let value = row.get(*idx).map_or(CellValue::Empty, convert_cell);
                (!value.is_empty()).then(|| (name.clone(), value))
            })
            .collect();
        if cells.is_empty() {
            continue;
        }
        table.rows.push(RawRow {
            cells,
            source: path.to_path_buf(),
        });
    }

    info!(
        path = %path.display(),
        sheet = %sheet_name,
        records = table.rows.len(),
        "Records read"
    );
    debug!(columns = ?table.columns, "Available columns");
    Ok(table)
}

/// Read every file, tolerating per-file failures.
///
/// Fails with `IngestError::NoInput` only when no file could be read.
pub fn load_all<P: AsRef<Path>>(paths: &[P]) -> Result<LoadOutcome, IngestError> {
    let mut outcome = LoadOutcome::default();

    for path in paths {
        let path = path.as_ref();
        match load_file(path) {
            Ok(table) => {
                outcome.table.merge(table);
                outcome.files_loaded += 1;
            }
            Err(e) => {
                error!(path = %path.display(), error = %e, "Skipping unreadable input");
                outcome.failures.push(LoadFailure {
                    path: path.to_path_buf(),
                    error: e,
                });
            }
        }
    }

    if outcome.files_loaded == 0 {
        return Err(IngestError::NoInput);
    }
    Ok(outcome)
}

/// Map a calamine cell to a `CellValue`
pub fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty | Data::Error(_) => CellValue::Empty,
        Data::String(s) => CellValue::from(s.trim()),
        Data::Int(n) => CellValue::Number(*n as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        // Duration formats such as [h]:mm:ss keep their clock text
        Data::DateTime(dt) if dt.is_duration() => {
            CellValue::Text(format_hms((dt.as_f64() * 86_400.0).round()))
        }
        // as_datetime honours the workbook's 1900 or 1904 date system
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(round_to_second)
            .filter(in_supported_range)
            .map_or(CellValue::Number(dt.as_f64()), CellValue::DateTime),
        Data::DateTimeIso(s) => {
            parse_date_text(s).map_or_else(|| CellValue::from(s.trim()), CellValue::DateTime)
        }
        Data::DurationIso(s) => CellValue::from(s.trim()),
    }
}
