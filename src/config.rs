//! Configuration System
//!
//! Layered configuration for a fusion run: built-in defaults, the user-level file, the project
//! file and `FUSION__` environment variables, in increasing precedence. Relative paths are
//! resolved against the directory of the project file.

use crate::logging::LoggingConfig;
use crate::resolution::Strategy;
use crate::tree::path::IdPath;
use crate::types::AttributePath;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FusionConfig {
    #[serde(default)]
    pub input: InputConfig,

    #[serde(default)]
    pub output: OutputConfig,

    /// Resolution strategy per attribute path
    #[serde(default)]
    pub strategies: BTreeMap<AttributePath, Strategy>,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Input documents and how records are located in them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputConfig {
    /// Root element name of the merged and fused documents
    #[serde(default = "default_root_element")]
    pub root_element: String,

    /// Absolute path to the record ID, e.g. `/data/movie/id`
    #[serde(default)]
    pub id_path: String,

    /// Absolute path to the provenance ID, e.g. `/data/provenance/id`
    #[serde(default = "default_provenance_id_path")]
    pub provenance_id_path: String,

    /// Duplicate-pair files
    #[serde(default)]
    pub duplicates: Vec<PathBuf>,

    /// Source dataset documents
    #[serde(default)]
    pub datasets: Vec<PathBuf>,

    /// Gold standard document, required for fusion
    #[serde(default)]
    pub gold: Option<PathBuf>,
}

fn default_root_element() -> String {
    "data".to_string()
}

fn default_provenance_id_path() -> String {
    "/data/provenance/id".to_string()
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            root_element: default_root_element(),
            id_path: String::new(),
            provenance_id_path: default_provenance_id_path(),
            duplicates: Vec::new(),
            datasets: Vec::new(),
            gold: None,
        }
    }
}

/// Output documents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_merged")]
    pub merged: PathBuf,

    #[serde(default = "default_fused")]
    pub fused: PathBuf,

    /// Report file; the report is printed to stdout when unset
    #[serde(default)]
    pub report: Option<PathBuf>,

    /// Pretty-print written documents
    #[serde(default = "default_true")]
    pub pretty: bool,
}

fn default_merged() -> PathBuf {
    PathBuf::from("merged.json")
}

fn default_fused() -> PathBuf {
    PathBuf::from("fused.json")
}

fn default_true() -> bool {
    true
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            merged: default_merged(),
            fused: default_fused(),
            report: None,
            pretty: default_true(),
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    Input(String),
    Output(String),
    Strategy(AttributePath, String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Input(msg) => write!(f, "Input: {}", msg),
            ValidationError::Output(msg) => write!(f, "Output: {}", msg),
            ValidationError::Strategy(path, msg) => write!(f, "Strategy '{}': {}", path, msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl FusionConfig {
    /// Validate the entire configuration, collecting every problem.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.input.root_element.trim().is_empty() {
            errors.push(ValidationError::Input("root_element cannot be empty".to_string()));
        }
        for (name, value) in [
            ("id_path", &self.input.id_path),
            ("provenance_id_path", &self.input.provenance_id_path),
        ] {
            match IdPath::parse(value) {
                Ok(parsed) if parsed.root != self.input.root_element => {
                    errors.push(ValidationError::Input(format!(
                        "{} must start at the root element '{}'",
                        name, self.input.root_element
                    )));
                }
                Ok(_) => {}
                Err(e) => errors.push(ValidationError::Input(format!("{}: {}", name, e))),
            }
        }
        if self.input.datasets.is_empty() {
            errors.push(ValidationError::Input("no datasets configured".to_string()));
        }
        if self.input.duplicates.is_empty() {
            errors.push(ValidationError::Input("no duplicate-pair files configured".to_string()));
        }
        if self.output.merged == self.output.fused {
            errors.push(ValidationError::Output(
                "merged and fused documents must be different files".to_string(),
            ));
        }

        for (path, strategy) in &self.strategies {
            match strategy {
                Strategy::MostTrusted(trusted) => {
                    if trusted.trust.is_empty() {
                        errors.push(ValidationError::Strategy(
                            path.clone(),
                            "trust table is empty".to_string(),
                        ));
                    }
                    for (source, weight) in &trusted.trust {
                        if !weight.is_finite() {
                            errors.push(ValidationError::Strategy(
                                path.clone(),
                                format!("trust weight for '{}' is not a finite number", source),
                            ));
                        }
                    }
                }
                Strategy::MostRecent(recent) if recent.date_format.trim().is_empty() => {
                    errors.push(ValidationError::Strategy(
                        path.clone(),
                        "date_format cannot be empty".to_string(),
                    ));
                }
                _ => {}
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Make every relative input and output path relative to `base`.
    pub fn resolve_paths(&mut self, base: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        self.input.duplicates.iter_mut().for_each(resolve);
        self.input.datasets.iter_mut().for_each(resolve);
        self.input.gold.iter_mut().for_each(resolve);
        resolve(&mut self.output.merged);
        resolve(&mut self.output.fused);
        self.output.report.iter_mut().for_each(resolve);
        if self.logging.output == "file" {
            resolve(&mut self.logging.file);
        }
    }
}
