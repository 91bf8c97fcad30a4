//! CLI presentation: text and JSON rendering of command results.

use crate::cluster::Clusters;
use crate::config::{FusionConfig, ValidationError};
use crate::error::FusionError;
use crate::evaluate::EvaluationReport;
use crate::report::{format_section_heading, UnionReport};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;
use serde_json::json;

/// Cluster count, average size and one row per cluster.
pub fn format_clusters_text(clusters: &Clusters, members: bool, styled: bool) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n\n", format_section_heading("Clusters", styled)));
    out.push_str(&format!("  Cluster count: {}\n", clusters.len()));
    out.push_str(&format!(
        "  Average cluster size: {:.4}\n",
        clusters.average_cluster_size()
    ));
    if clusters.is_empty() {
        return out;
    }

    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    if members {
        table.set_header(vec!["Cluster", "Size", "Members"]);
    } else {
        table.set_header(vec!["Cluster", "Size"]);
    }
    for (cluster, ids) in clusters.clusters() {
        let mut row = vec![cluster.to_string(), ids.len().to_string()];
        if members {
            row.push(ids.iter().cloned().collect::<Vec<_>>().join(", "));
        }
        table.add_row(row);
    }
    out.push_str(&format!("\n{}\n", table));
    out
}

/// Effective configuration rendered as TOML.
pub fn format_config_toml(config: &FusionConfig) -> Result<String, FusionError> {
    toml::to_string_pretty(config)
        .map_err(|e| FusionError::Config(format!("Failed to render configuration: {}", e)))
}

pub fn format_validation_text(result: &Result<(), Vec<ValidationError>>, styled: bool) -> String {
    match result {
        Ok(()) => {
            let msg = "Configuration is valid";
            if styled {
                format!("{}", msg.green())
            } else {
                msg.to_string()
            }
        }
        Err(errors) => {
            let mut out = format!("{}\n", format_section_heading("Configuration errors", styled));
            for error in errors {
                out.push_str(&format!("  - {}\n", error));
            }
            out
        }
    }
}

/// Union and fusion reports as a single JSON object. Absent parts are `null`.
pub fn format_evaluation_json(
    union: Option<&UnionReport>,
    evaluation: Option<&EvaluationReport>,
) -> Result<String, FusionError> {
    let value = json!({
        "union": union,
        "fusion": evaluation,
    });
    serde_json::to_string_pretty(&value)
        .map_err(|e| FusionError::Config(format!("Failed to render report: {}", e)))
}

/// One-line confirmation used when the report went to a file.
pub fn format_written(stage: &str, document: &std::path::Path, report: &std::path::Path) -> String {
    format!(
        "{} complete: wrote {} (report: {})",
        stage,
        document.display(),
        report.display()
    )
}
