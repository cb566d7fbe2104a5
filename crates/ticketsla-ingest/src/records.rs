//! Raw rows to typed ticket records
//!
//! Applies the UF → division mapping and normalizes every date column.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;
use ticketsla_core::{columns, CellValue, DivisionMap, TicketRecord};
use tracing::{info, warn};

use crate::dates::parse_date;
use crate::loader::{RawRow, RawTable};

/// Expected columns absent from the table
pub fn missing_columns(table: &RawTable) -> Vec<&'static str> {
    columns::expected()
        .into_iter()
        .filter(|col| !table.has_column(col))
        .collect()
}

/// Build typed records from a merged table.
///
/// Missing expected columns are reported once each and read as empty.
pub fn build_records(table: &RawTable, divisions: &DivisionMap) -> Vec<TicketRecord> {
    for column in missing_columns(table) {
        warn!(column, "Expected column not found; treating as empty");
    }

    let mut records: Vec<TicketRecord> = table
        .rows
        .iter()
        .map(|row| {
            let mut record = record_from_row(row);
            divisions.assign(&mut record);
            record
        })
        .collect();

    for column in columns::DATE_COLUMNS {
        let mut converted = 0usize;
        for (record, row) in records.iter_mut().zip(&table.rows) {
            let value = parse_date(row.get(column));
            if value.is_some() {
                converted += 1;
            }
            if let Some(slot) = record.dates.slot_mut(column) {
                *slot = value;
            }
        }
        info!(column, converted, total = table.rows.len(), "Date column converted");
    }

    let mapped = records
        .iter()
        .filter(|r| r.divisao != ticketsla_core::division::UNDEFINED_DIVISION)
        .count();
    info!(records = records.len(), mapped, "Records built");
    records
}

fn record_from_row(row: &RawRow) -> TicketRecord {
    let mut record = TicketRecord {
        numero_chamado: row.text(columns::NUMERO_CHAMADO),
        uf: row.text(columns::UF),
        regional: row.text(columns::REGIONAL),
        tipo: row.text(columns::TIPO),
        prioridade: row.text(columns::PRIORIDADE),
        fornecedor: row.text(columns::FORNECEDOR),
        responsavel: row.text(columns::RESPONSAVEL),
        uniorg_comercial: row.text(columns::UNIORG_COMERCIAL),
        valor_total: parse_decimal(row.get(columns::VALOR_TOTAL)),
        prazo_inicio: row.text(columns::PRAZO_INICIO),
        prazo_conclusao: row.text(columns::PRAZO_CONCLUSAO),
        source: Some(row.source.clone()),
        ..TicketRecord::default()
    };

    for column in columns::PASSTHROUGH_COLUMNS {
        if let Some(value) = row.text(column) {
            record.attributes.insert(column.to_string(), value);
        }
    }
    record
}

/// Monetary cell to `Decimal`.
///
/// Accepts numbers and text such as `"1234.56"`, `"R$ 1.234,56"` or `"1234,5"`.
pub fn parse_decimal(cell: &CellValue) -> Option<Decimal> {
    match cell {
        CellValue::Number(n) if n.is_finite() => Decimal::from_f64(*n),
        CellValue::Text(text) => parse_decimal_text(text),
        _ => None,
    }
}

fn parse_decimal_text(text: &str) -> Option<Decimal> {
    let cleaned: String = text
        .trim()
        .trim_start_matches("R$")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    // A comma marks the decimal separator; dots before it group thousands
    let normalized = if cleaned.contains(',') {
        cleaned.replace('.', "").replace(',', ".")
    } else {
        cleaned
    };
    Decimal::from_str(&normalized).ok()
}
