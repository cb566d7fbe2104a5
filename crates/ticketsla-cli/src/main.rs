//! ticketsla CLI - Ticket SLA report generator
//!
//! Reads the ticket base workbooks, computes SLA metrics and writes the
//! processed base and the analysis workbook.

mod config;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use ticketsla_core::{GeneralStats, ReportRenderer};
use ticketsla_ingest::load_records;
use ticketsla_metrics::Analyzer;
use ticketsla_render::{save, AnalysisRenderer, ProcessedRenderer, SummaryRenderer};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use config::{FileConfig, Overrides, Settings};

#[derive(Parser)]
#[command(name = "ticketsla")]
#[command(author, version, about = "Ticket SLA report generator", long_about = None)]
struct Cli {
    /// Input workbooks (default: "Base Geral STD.xlsx")
    #[arg(value_name = "INPUT")]
    inputs: Vec<PathBuf>,

    /// TOML config file
    #[arg(short, long, value_name = "FILE", env = "TICKETSLA_CONFIG")]
    config: Option<PathBuf>,

    /// Processed base output (default: Base_Tratada.xlsx)
    #[arg(long, value_name = "FILE")]
    processed_output: Option<PathBuf>,

    /// Analysis workbook output (default: Analise_Chamados_Completa.xlsx)
    #[arg(long, value_name = "FILE")]
    analysis_output: Option<PathBuf>,

    /// Reference date for open-ticket metrics (default: today)
    #[arg(long, value_name = "YYYY-MM-DD")]
    as_of: Option<NaiveDate>,

    /// Summary format
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Leave the calendar sheet out of the analysis workbook
    #[arg(long)]
    no_calendar: bool,

    /// Verbose output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

/// Machine-readable run summary
#[derive(Serialize)]
struct RunSummary<'a> {
    as_of: NaiveDate,
    files_loaded: usize,
    files_failed: usize,
    records: usize,
    processed_output: &'a Path,
    analysis_output: &'a Path,
    stats: &'a GeneralStats,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    // stdout carries the summary
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let file = match &cli.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    let settings = Settings::resolve(
        file,
        Overrides {
            inputs: cli.inputs.clone(),
            processed_output: cli.processed_output.clone(),
            analysis_output: cli.analysis_output.clone(),
        },
    )?;

    let loaded = load_records(&settings.inputs, &settings.divisions)
        .context("Failed to load input workbooks")?;
    for failure in &loaded.failures {
        warn!(path = %failure.path.display(), "Input skipped");
    }

    let mut analyzer = Analyzer::new(settings.sla.clone());
    if let Some(date) = cli.as_of {
        analyzer = analyzer.as_of(date);
    }
    let report = analyzer.analyze(loaded.records);

    let processed = ProcessedRenderer::new()
        .render(&report)
        .context("Failed to build processed base")?;
    save(&processed, &settings.processed_output).with_context(|| {
        format!("Failed to write {}", settings.processed_output.display())
    })?;

    let mut renderer = AnalysisRenderer::new();
    if cli.no_calendar {
        renderer = renderer.no_calendar();
    }
    let analysis = renderer
        .render(&report)
        .context("Failed to build analysis workbook")?;
    save(&analysis, &settings.analysis_output).with_context(|| {
        format!("Failed to write {}", settings.analysis_output.display())
    })?;

    info!(records = report.records.len(), "Run complete");

    match cli.format {
        Format::Text => {
            let text = SummaryRenderer::new().with_divisions().render(&report)?;
            print!("{text}");
            println!("Processed base: {}", settings.processed_output.display());
            println!("Analysis workbook: {}", settings.analysis_output.display());
        }
        Format::Json => {
            let summary = RunSummary {
                as_of: report.as_of,
                files_loaded: loaded.files_loaded,
                files_failed: loaded.failures.len(),
                records: report.records.len(),
                processed_output: &settings.processed_output,
                analysis_output: &settings.analysis_output,
                stats: &report.stats,
            };
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }
    Ok(())
}
