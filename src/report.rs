//! Fusion report
//!
//! Human-readable text in two parts: the union part (clusters, density, consistency) written by
//! the union stage, and the fusion part (accuracy) appended by the fusion stage.

use crate::classify::AttributeSchema;
use crate::cluster::Clusters;
use crate::dataset::Dataset;
use crate::evaluate::EvaluationReport;
use crate::metrics::{ConsistencyReport, DensityConsistencyAnalyzer, DensityReport};
use crate::types::AttributePath;
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

const NOT_DEFINED: &str = "not defined for list attributes";

/// Statistics gathered by the union stage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnionReport {
    pub cluster_count: usize,
    pub average_cluster_size: f64,
    /// Density of each source dataset, keyed by provenance key.
    pub sources: BTreeMap<String, DensityReport>,
    pub merged: DensityReport,
    pub consistency: ConsistencyReport,
    /// Every observed attribute path; list paths render as not defined.
    pub attributes: BTreeSet<AttributePath>,
}

impl UnionReport {
    pub fn build(
        clusters: &Clusters,
        sources: &[Dataset],
        merged: &Dataset,
        schema: &AttributeSchema,
    ) -> Self {
        let analyzer = DensityConsistencyAnalyzer::new(schema);
        let sources = sources
            .iter()
            .map(|ds| {
                let key = ds.provenance_key().unwrap_or(ds.name()).to_string();
                (key, analyzer.density(ds))
            })
            .collect();
        Self {
            cluster_count: clusters.len(),
            average_cluster_size: clusters.average_cluster_size(),
            sources,
            merged: analyzer.density(merged),
            consistency: analyzer.consistency(merged),
            attributes: schema.all.clone(),
        }
    }
}

/// Section heading; bold and underlined only when `styled`.
pub fn format_section_heading(title: &str, styled: bool) -> String {
    if styled {
        format!("{}", title.bold().underline())
    } else {
        title.to_string()
    }
}

fn measure(map: &BTreeMap<AttributePath, f64>, attribute: &str) -> String {
    map.get(attribute)
        .map(|v| format!("{:.4}", v))
        .unwrap_or_else(|| NOT_DEFINED.to_string())
}

/// Format the union part of the report.
pub fn format_union_text(report: &UnionReport, styled: bool) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n\n", format_section_heading("Clusters", styled)));
    out.push_str(&format!("  Cluster count: {}\n", report.cluster_count));
    out.push_str(&format!(
        "  Average cluster size: {:.4}\n\n",
        report.average_cluster_size
    ));

    for (key, density) in &report.sources {
        out.push_str(&format!(
            "{}\n\n",
            format_section_heading(&format!("Source {} ({})", key, density.dataset), styled)
        ));
        out.push_str(&format!("  Records: {}\n", density.record_count));
        out.push_str(&format!("  Density: {:.4}\n", density.density));
        out.push_str(&format!(
            "  Average non-null attributes: {:.4}\n\n",
            density.average_non_null
        ));
        let mut table = Table::new();
        table.load_preset(UTF8_BORDERS_ONLY);
        table.set_header(vec!["Attribute", "Density"]);
        for attribute in &report.attributes {
            table.add_row(vec![attribute.clone(), measure(&density.per_attribute, attribute)]);
        }
        out.push_str(&format!("{}\n\n", table));
    }

    out.push_str(&format!("{}\n\n", format_section_heading("Merged dataset", styled)));
    out.push_str(&format!("  Records: {}\n", report.merged.record_count));
    out.push_str(&format!("  Density: {:.4}\n", report.merged.density));
    out.push_str(&format!(
        "  Average non-null attributes: {:.4}\n",
        report.merged.average_non_null
    ));
    out.push_str(&format!(
        "  Consistency: {:.4}\n\n",
        report.consistency.consistency
    ));
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Attribute", "Density", "Consistency"]);
    for attribute in &report.attributes {
        table.add_row(vec![
            attribute.clone(),
            measure(&report.merged.per_attribute, attribute),
            measure(&report.consistency.per_attribute, attribute),
        ]);
    }
    out.push_str(&format!("{}\n", table));
    out
}

/// Format the fusion part of the report.
pub fn format_fusion_text(report: &EvaluationReport, styled: bool) -> String {
    let mut out = String::new();
    out.push_str(&format!("\n{}\n\n", format_section_heading("Fused dataset", styled)));
    out.push_str(&format!(
        "  Records evaluated against the gold standard: {}\n",
        report.evaluated_records
    ));
    out.push_str(&format!(
        "  Resolved attributes: {} (skipped {})\n",
        report.resolution.resolved, report.resolution.skipped
    ));
    out.push_str(&format!("  Accuracy: {:.4}\n\n", report.accuracy));
    if report.per_attribute.is_empty() {
        return out;
    }
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Attribute", "Accuracy"]);
    for (attribute, accuracy) in &report.per_attribute {
        table.add_row(vec![attribute.clone(), format!("{:.4}", accuracy)]);
    }
    out.push_str(&format!("{}\n", table));
    out
}
