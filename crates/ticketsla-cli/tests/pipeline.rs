//! End-to-end tests of the `ticketsla` binary
//!
//! | Exit Code | Meaning |
//! |-----------|---------|
//! | 0 | Both workbooks written |
//! | 1 | No input loaded, bad config, or a write failure |

use chrono::{NaiveDate, NaiveDateTime};
use pretty_assertions::assert_eq;
use rust_xlsxwriter::{Format, Workbook};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

fn at(m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, m, d)
        .unwrap()
        .and_hms_opt(9, 0, 0)
        .unwrap()
}

/// Write a three-ticket base: one completed on time, one late, one open.
fn write_base(path: &Path) {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    let date_format = Format::new().set_num_format("dd/mm/yyyy hh:mm:ss");

    let headers = [
        "Numero_Chamado",
        "UF",
        "Tipo",
        "Responsavel",
        "Valor_Total",
        "prazo_inicio",
        "prazo_conclusao",
        "Data_Criacao",
        "Data_Previsao_Conclusao",
        "Data_Conclusao",
    ];
    for (col, header) in headers.iter().enumerate() {
        sheet.write_string(0, col as u16, *header).unwrap();
    }

    let tickets = [
        ("1", "PE", "NP", "NP", at(1, 2), Some(at(1, 10)), Some(at(1, 8))),
        ("2", "SP", "NP", "FP", at(1, 5), Some(at(1, 12)), Some(at(1, 20))),
        ("3", "RJ", "NA", "NA", at(2, 1), None, None),
    ];
    for (i, (numero, uf, inicio, conclusao, criacao, previsao, concluido)) in tickets.iter().enumerate() {
        let row = i as u32 + 1;
        sheet.write_string(row, 0, *numero).unwrap();
        sheet.write_string(row, 1, *uf).unwrap();
        sheet.write_string(row, 2, "Corretiva").unwrap();
        sheet.write_string(row, 3, "Equipe A").unwrap();
        sheet.write_number(row, 4, 100.0).unwrap();
        sheet.write_string(row, 5, *inicio).unwrap();
        sheet.write_string(row, 6, *conclusao).unwrap();
        sheet.write_datetime_with_format(row, 7, criacao, &date_format).unwrap();
        if let Some(previsao) = previsao {
            sheet.write_datetime_with_format(row, 8, previsao, &date_format).unwrap();
        }
        if let Some(concluido) = concluido {
            sheet.write_datetime_with_format(row, 9, concluido, &date_format).unwrap();
        }
    }
    workbook.save(path).unwrap();
}

fn ticketsla(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_ticketsla"))
        .current_dir(dir)
        .env_remove("TICKETSLA_CONFIG")
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("failed to execute ticketsla")
}

fn json_summary(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}

/// Test: no arguments reads the default base and writes both default outputs
#[test]
fn default_paths_in_working_directory() {
    let dir = TempDir::new().unwrap();
    write_base(&dir.path().join("Base Geral STD.xlsx"));

    let output = ticketsla(dir.path(), &["--as-of", "2024-03-01"]);

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(dir.path().join("Base_Tratada.xlsx").exists());
    assert!(dir.path().join("Analise_Chamados_Completa.xlsx").exists());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Total Chamados:"));
    assert!(stdout.contains("DIV 01"));
}

/// Test: JSON summary carries the headline statistics
#[test]
fn json_summary_reports_statistics() {
    let dir = TempDir::new().unwrap();
    write_base(&dir.path().join("base.xlsx"));

    let output = ticketsla(
        dir.path(),
        &["base.xlsx", "--as-of", "2024-03-01", "--format", "json", "--no-calendar"],
    );

    assert_eq!(output.status.code(), Some(0));
    let summary = json_summary(&output);
    assert_eq!(summary["as_of"], "2024-03-01");
    assert_eq!(summary["files_loaded"], 1);
    assert_eq!(summary["records"], 3);
    assert_eq!(summary["stats"]["total_chamados"], 3);
    assert_eq!(summary["stats"]["total_chamados_termino"], 2);
    assert_eq!(summary["stats"]["total_estoque"], 1);
}

/// Test: missing input ends with exit code 1 and no outputs
#[test]
fn missing_input_fails() {
    let dir = TempDir::new().unwrap();

    let output = ticketsla(dir.path(), &["absent.xlsx"]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(stderr.matches("Failed to load input workbooks").count(), 1, "stderr: {stderr}");
    assert!(!dir.path().join("Base_Tratada.xlsx").exists());
}

/// Test: one unreadable input among good ones is skipped
#[test]
fn broken_input_is_skipped() {
    let dir = TempDir::new().unwrap();
    write_base(&dir.path().join("good.xlsx"));
    std::fs::write(dir.path().join("bad.xlsx"), b"garbage").unwrap();

    let output = ticketsla(dir.path(), &["bad.xlsx", "good.xlsx", "--format", "json"]);

    assert_eq!(output.status.code(), Some(0));
    let summary = json_summary(&output);
    assert_eq!(summary["files_loaded"], 1);
    assert_eq!(summary["files_failed"], 1);
}

/// Test: config file supplies paths, flags override them
#[test]
fn config_file_and_flag_precedence() {
    let dir = TempDir::new().unwrap();
    write_base(&dir.path().join("from_config.xlsx"));
    std::fs::create_dir(dir.path().join("out")).unwrap();
    std::fs::write(
        dir.path().join("ticketsla.toml"),
        r#"
inputs = ["from_config.xlsx"]
processed_output = "out/base.xlsx"
analysis_output = "out/analysis.xlsx"

[sla]
meta_sla = 90.0
"#,
    )
    .unwrap();

    let output = ticketsla(
        dir.path(),
        &["-c", "ticketsla.toml", "--analysis-output", "flag.xlsx", "--format", "json"],
    );

    assert_eq!(output.status.code(), Some(0), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let summary = json_summary(&output);
    assert_eq!(summary["processed_output"], "out/base.xlsx");
    assert_eq!(summary["analysis_output"], "flag.xlsx");
    assert!(dir.path().join("out/base.xlsx").exists());
    assert!(dir.path().join("flag.xlsx").exists());
    assert!(!dir.path().join("out/analysis.xlsx").exists());
}

/// Test: malformed config file fails before reading inputs
#[test]
fn bad_config_fails() {
    let dir = TempDir::new().unwrap();
    write_base(&dir.path().join("Base Geral STD.xlsx"));
    std::fs::write(dir.path().join("bad.toml"), "inputs = [unterminated").unwrap();

    let output = ticketsla(dir.path(), &["--config", "bad.toml"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("bad.toml"));
    assert!(!dir.path().join("Base_Tratada.xlsx").exists());
}

/// Test: unwritable output path ends with exit code 1
#[test]
fn unwritable_output_fails() {
    let dir = TempDir::new().unwrap();
    write_base(&dir.path().join("base.xlsx"));
    let target: PathBuf = dir.path().join("no_such_dir").join("out.xlsx");

    let output = ticketsla(
        dir.path(),
        &["base.xlsx", "--processed-output", target.to_str().unwrap()],
    );

    assert_eq!(output.status.code(), Some(1));
}
