//! Error types for the fusion pipeline.

use crate::types::{ProvenanceKey, RecordId};
use std::path::PathBuf;
use thiserror::Error;

/// A duplicate-pair line that is not exactly two comma-separated IDs.
#[derive(Debug, Error)]
#[error("Malformed duplicate pair in {file:?} at line {line_number}: {line:?}")]
pub struct FormatError {
    pub file: PathBuf,
    pub line_number: usize,
    pub line: String,
}

/// Cluster members that cannot be traced to exactly one dataset.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DataIntegrityError {
    #[error("Record {id} from the duplicate clusters is not found in any dataset")]
    MissingRecord { id: RecordId },

    #[error("Record {id} is found in multiple datasets: {}", sources.join(", "))]
    AmbiguousRecord {
        id: RecordId,
        sources: Vec<ProvenanceKey>,
    },

    #[error("Provenance key {key} is used by more than one dataset: {}", datasets.join(", "))]
    SharedProvenance { key: ProvenanceKey, datasets: Vec<String> },
}

/// Dataset document load failures.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Input file {0:?} could not be read: {1}")]
    Unreadable(PathBuf, #[source] std::io::Error),

    #[error("Input file {file:?} is not well-formed: {reason}")]
    Malformed { file: PathBuf, reason: String },

    #[error("No IDs ({path}) found in {file:?}")]
    MissingIdPath { file: PathBuf, path: String },

    #[error("Dataset {file:?} must contain exactly one provenance element, found {found}")]
    ProvenanceCount { file: PathBuf, found: usize },

    #[error("Invalid path expression: {0}")]
    InvalidPath(String),
}

/// Non-fatal reasons a resolution strategy leaves an attribute unresolved.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StrategyWarning {
    #[error("{strategy} cannot be applied to a non-numeric value {value:?}")]
    NonNumeric { strategy: &'static str, value: String },

    #[error("source {source_name:?} of provenance {provenance} has no trust weight")]
    UnknownSource {
        provenance: ProvenanceKey,
        source_name: String,
    },

    #[error("provenance {provenance} has no {field} field")]
    MissingProvenance {
        provenance: ProvenanceKey,
        field: &'static str,
    },

    #[error("no contribution carries a date parsable as {format:?}")]
    NoParsableDate { format: String },
}

/// Top-level error for pipeline stages.
#[derive(Debug, Error)]
pub enum FusionError {
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    DataIntegrity(#[from] DataIntegrityError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Cannot write {0:?}: {1}")]
    Write(PathBuf, #[source] std::io::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<config::ConfigError> for FusionError {
    fn from(err: config::ConfigError) -> Self {
        FusionError::Config(err.to_string())
    }
}
