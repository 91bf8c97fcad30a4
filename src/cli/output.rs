//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::FusionError;

/// Map pipeline errors to a string for CLI output.
pub fn map_error(e: &FusionError) -> String {
    match e {
        FusionError::DataIntegrity(_) => format!(
            "{}\nNo merged dataset was written; check the duplicate-pair files against the datasets.",
            e
        ),
        FusionError::Format(_) => format!("{}\nEach line must hold exactly two comma-separated IDs.", e),
        _ => e.to_string(),
    }
}
