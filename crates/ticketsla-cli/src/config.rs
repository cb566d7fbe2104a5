//! Run configuration
//!
//! Settings come from three layers: built-in defaults, an optional TOML
//! file, and command-line flags. Later layers win.
//!
//! ```toml
//! inputs = ["Base Geral STD.xlsx"]
//! processed_output = "Base_Tratada.xlsx"
//! analysis_output = "Analise_Chamados_Completa.xlsx"
//!
//! [sla]
//! meta_sla = 96.0
//! delay_buckets = [30, 60, 90]
//!
//! [[divisions]]
//! name = "DIV 01"
//! management = ["GO 01"]
//! ufs = ["AL", "PE"]
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use ticketsla_core::{DivisionDef, DivisionMap, SlaConfig, ThresholdError};

pub const DEFAULT_INPUT: &str = "Base Geral STD.xlsx";
pub const DEFAULT_PROCESSED_OUTPUT: &str = "Base_Tratada.xlsx";
pub const DEFAULT_ANALYSIS_OUTPUT: &str = "Analise_Chamados_Completa.xlsx";

/// Configuration loading error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid SLA settings: {0}")]
    Invalid(#[from] ThresholdError),
}

/// Contents of the TOML config file
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub inputs: Vec<PathBuf>,
    pub processed_output: Option<PathBuf>,
    pub analysis_output: Option<PathBuf>,
    pub sla: SlaConfig,
    /// Replaces the built-in division table when non-empty
    pub divisions: Vec<DivisionDef>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}

/// Values given on the command line
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub inputs: Vec<PathBuf>,
    pub processed_output: Option<PathBuf>,
    pub analysis_output: Option<PathBuf>,
}

/// Fully resolved settings for one run
#[derive(Clone, Debug)]
pub struct Settings {
    pub inputs: Vec<PathBuf>,
    pub processed_output: PathBuf,
    pub analysis_output: PathBuf,
    pub sla: SlaConfig,
    pub divisions: DivisionMap,
}

impl Settings {
    pub fn resolve(file: FileConfig, overrides: Overrides) -> Result<Self, ConfigError> {
        file.sla.validate()?;

        let inputs = if !overrides.inputs.is_empty() {
            overrides.inputs
        } else if !file.inputs.is_empty() {
            file.inputs
        } else {
            vec![PathBuf::from(DEFAULT_INPUT)]
        };
        let divisions = if file.divisions.is_empty() {
            DivisionMap::default()
        } else {
            DivisionMap::from_definitions(file.divisions)
        };

        Ok(Self {
            inputs,
            processed_output: overrides
                .processed_output
                .or(file.processed_output)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_PROCESSED_OUTPUT)),
            analysis_output: overrides
                .analysis_output
                .or(file.analysis_output)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_ANALYSIS_OUTPUT)),
            sla: file.sla,
            divisions,
        })
    }
}
