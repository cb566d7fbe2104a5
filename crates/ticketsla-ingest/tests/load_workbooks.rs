//! Loader integration tests against workbooks written on the fly

use chrono::{NaiveDate, NaiveDateTime};
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;
use rust_xlsxwriter::{Format, Workbook};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use ticketsla_core::{DivisionMap, IngestError};
use ticketsla_ingest::{load_all, load_records};

fn at(y: i32, m: u32, d: u32, h: u32, mi: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, mi, 0)
        .unwrap()
}

/// Write a small base with a date-typed and a text-typed date column.
fn write_base(dir: &Path, name: &str, tickets: &[(&str, &str, f64)]) -> PathBuf {
    let path = dir.join(name);
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    let date_format = Format::new().set_num_format("dd/mm/yyyy hh:mm:ss");

    let headers = ["Numero_Chamado", "UF", "Valor_Total", "Data_Criacao", "Data_Conclusao", "Tipo"];
    for (col, header) in headers.iter().enumerate() {
        sheet.write_string(0, col as u16, *header).unwrap();
    }
    for (i, (numero, uf, valor)) in tickets.iter().enumerate() {
        let row = i as u32 + 1;
        sheet.write_string(row, 0, *numero).unwrap();
        sheet.write_string(row, 1, *uf).unwrap();
        sheet.write_number(row, 2, *valor).unwrap();
        sheet
            .write_datetime_with_format(row, 3, &at(2024, 1, 1, 8, 30), &date_format)
            .unwrap();
        sheet.write_string(row, 4, "05/01/2024").unwrap();
    }
    workbook.save(&path).unwrap();
    path
}

#[test]
fn reads_first_sheet_with_typed_dates() {
    let dir = TempDir::new().unwrap();
    let path = write_base(dir.path(), "base.xlsx", &[("CH-1", "PE", 120.5), ("CH-2", "RJ", 80.0)]);

    let loaded = load_records(&[&path], &DivisionMap::default()).unwrap();

    assert_eq!(loaded.files_loaded, 1);
    assert!(loaded.failures.is_empty());
    assert_eq!(loaded.records.len(), 2);

    let first = &loaded.records[0];
    assert_eq!(first.numero_chamado.as_deref(), Some("CH-1"));
    assert_eq!(first.divisao, "DIV 01");
    assert_eq!(first.valor_total, Some(dec!(120.5)));
    assert_eq!(first.dates.criacao, Some(at(2024, 1, 1, 8, 30)));
    assert_eq!(first.dates.conclusao, Some(at(2024, 1, 5, 0, 0)));
    assert_eq!(first.tipo, None);
    assert_eq!(first.source.as_deref(), Some(path.as_path()));

    assert_eq!(loaded.records[1].divisao, "DIV 09");
}

#[test]
fn merges_files_and_tolerates_bad_ones() {
    let dir = TempDir::new().unwrap();
    let first = write_base(dir.path(), "a.xlsx", &[("A-1", "SP", 10.0)]);
    let second = write_base(dir.path(), "b.xlsx", &[("B-1", "BA", 20.0), ("B-2", "XX", 30.0)]);
    let broken = dir.path().join("broken.xlsx");
    std::fs::write(&broken, b"not a workbook").unwrap();
    let missing = dir.path().join("missing.xlsx");

    let loaded = load_records(&[&first, &broken, &second, &missing], &DivisionMap::default()).unwrap();

    assert_eq!(loaded.files_loaded, 2);
    assert_eq!(loaded.failures.len(), 2);
    assert_eq!(loaded.failures[0].path, broken);
    assert_eq!(loaded.failures[1].path, missing);

    let numbers: Vec<_> = loaded
        .records
        .iter()
        .filter_map(|r| r.numero_chamado.as_deref())
        .collect();
    assert_eq!(numbers, vec!["A-1", "B-1", "B-2"]);
    assert_eq!(loaded.records[2].divisao, "Divisão Não Definida");
    assert_eq!(loaded.records[2].gerencia, "GO Não Definida");
}

#[test]
fn every_file_failing_is_an_error() {
    let dir = TempDir::new().unwrap();
    let broken = dir.path().join("broken.xlsx");
    std::fs::write(&broken, b"garbage").unwrap();

    let result = load_all(&[broken]);
    assert!(matches!(result, Err(IngestError::NoInput)));

    let empty: [&Path; 0] = [];
    assert!(matches!(load_all(&empty), Err(IngestError::NoInput)));
}

#[test]
fn blank_rows_are_skipped() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("gaps.xlsx");
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, " Numero_Chamado ").unwrap();
    sheet.write_string(0, 1, "UF").unwrap();
    sheet.write_string(1, 0, "X-1").unwrap();
    sheet.write_string(3, 0, "X-2").unwrap();
    sheet.write_string(3, 1, "CE").unwrap();
    workbook.save(&path).unwrap();

    let outcome = load_all(&[&path]).unwrap();
    assert_eq!(outcome.table.columns, vec!["Numero_Chamado", "UF"]);
    assert_eq!(outcome.table.len(), 2);

    let loaded = load_records(&[&path], &DivisionMap::default()).unwrap();
    // CE is listed by DIV 01 and DIV 03; the later entry wins
    assert_eq!(loaded.records[1].divisao, "DIV 03");
    assert_eq!(loaded.records[0].divisao, "Divisão Não Definida");
}

#[test]
fn duration_cells_keep_clock_text() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("durations.xlsx");
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    let duration = Format::new().set_num_format("[h]:mm:ss");
    let date_format = Format::new().set_num_format("dd/mm/yyyy");

    for (col, header) in ["Numero_Chamado", "Tempo_de_Custo", "Data_Criacao"].iter().enumerate() {
        sheet.write_string(0, col as u16, *header).unwrap();
    }
    sheet.write_string(1, 0, "D-1").unwrap();
    sheet.write_number_with_format(1, 1, 5.0 / 24.0, &duration).unwrap();
    sheet.write_number_with_format(1, 2, 45292.0, &date_format).unwrap();
    sheet.write_string(2, 0, "D-2").unwrap();
    sheet.write_number_with_format(2, 1, 1.5, &duration).unwrap();
    // 9999-12-31 is a valid Excel date but outside the accepted window
    sheet.write_number_with_format(2, 2, 2_958_465.0, &date_format).unwrap();
    workbook.save(&path).unwrap();

    let loaded = load_records(&[&path], &DivisionMap::default()).unwrap();

    let first = &loaded.records[0];
    assert_eq!(first.attributes.get("Tempo_de_Custo").map(String::as_str), Some("05:00:00"));
    assert_eq!(first.dates.criacao, Some(at(2024, 1, 1, 0, 0)));

    let second = &loaded.records[1];
    assert_eq!(second.attributes.get("Tempo_de_Custo").map(String::as_str), Some("36:00:00"));
    assert_eq!(second.dates.criacao, None);
}
