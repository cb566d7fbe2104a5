//! Date normalization
//!
//! Every date-valued cell is coerced to a `NaiveDateTime` rounded to whole
//! seconds. Text is read day-first (`31/01/2024`) unless it is ISO
//! (`2024-01-31`). Unparseable values become unset, and so do dates outside
//! 1677-09-22..=2262-04-11.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use ticketsla_core::timeutil::{round_to_second, start_of_day};
use ticketsla_core::CellValue;

/// Largest serial Excel accepts (9999-12-31)
const MAX_EXCEL_SERIAL: f64 = 2_958_465.999_999;

const ISO_DATETIME_FORMATS: [&str; 5] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
];

const DAY_FIRST_DATETIME_FORMATS: [&str; 4] = [
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d-%m-%Y %H:%M:%S",
    "%d-%m-%Y %H:%M",
];

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y"];

/// Whether a date-time falls in the accepted window
pub fn in_supported_range(dt: &NaiveDateTime) -> bool {
    let date = dt.date();
    NaiveDate::from_ymd_opt(1677, 9, 22).is_some_and(|min| date >= min)
        && NaiveDate::from_ymd_opt(2262, 4, 11).is_some_and(|max| date <= max)
}

/// Parse any cell into a canonical date-time
pub fn parse_date(cell: &CellValue) -> Option<NaiveDateTime> {
    match cell {
        CellValue::DateTime(dt) => Some(round_to_second(*dt)).filter(in_supported_range),
        CellValue::Number(serial) => from_excel_serial(*serial),
        CellValue::Text(text) => parse_date_text(text),
        CellValue::Empty | CellValue::Bool(_) => None,
    }
}

/// Parse a date string, ISO or day-first
pub fn parse_date_text(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    // Drop a trailing UTC marker or offset-free "Z"
    let text = text.strip_suffix('Z').unwrap_or(text);

    ISO_DATETIME_FORMATS
        .iter()
        .chain(DAY_FIRST_DATETIME_FORMATS.iter())
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
                .map(start_of_day)
        })
        .map(round_to_second)
        .filter(in_supported_range)
}

/// Convert an Excel serial (1900 date system) to a date-time.
///
/// Serials below 60 are shifted by one day to skip the phantom 1900-02-29.
pub fn from_excel_serial(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || !(0.0..=MAX_EXCEL_SERIAL).contains(&serial) {
        return None;
    }
    let serial = if serial < 60.0 { serial + 1.0 } else { serial };
    let epoch = start_of_day(NaiveDate::from_ymd_opt(1899, 12, 30)?);
    let seconds = (serial * 86_400.0).round() as i64;
    epoch
        .checked_add_signed(Duration::seconds(seconds))
        .filter(in_supported_range)
}
