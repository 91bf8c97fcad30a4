//! Density and consistency
//!
//! Density measures how often an attribute carries a value; consistency measures how often all
//! sources of a merged record agree on it. Both are defined for scalar attributes only.

use crate::classify::AttributeSchema;
use crate::dataset::Dataset;
use crate::tree::{path, Element};
use crate::types::{AttributePath, PROVENANCE, VALUE};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Density figures for one dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DensityReport {
    pub dataset: String,
    pub record_count: usize,
    /// Average density over scalar attributes other than the ID.
    pub density: f64,
    /// Average number of non-empty measured attributes per record.
    pub average_non_null: f64,
    /// Density of every scalar attribute, the ID included.
    pub per_attribute: BTreeMap<AttributePath, f64>,
}

/// Consistency figures for a merged dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsistencyReport {
    pub consistency: f64,
    pub per_attribute: BTreeMap<AttributePath, f64>,
}

/// Computes density and consistency against one attribute schema.
#[derive(Debug, Clone, Copy)]
pub struct DensityConsistencyAnalyzer<'a> {
    schema: &'a AttributeSchema,
}

impl<'a> DensityConsistencyAnalyzer<'a> {
    pub fn new(schema: &'a AttributeSchema) -> Self {
        Self { schema }
    }

    pub fn density(&self, dataset: &Dataset) -> DensityReport {
        let mut per_attribute = BTreeMap::new();
        let mut non_null = 0usize;
        for attribute in &self.schema.scalar {
            let count = non_null_count(dataset, attribute);
            if *attribute != self.schema.id_attribute {
                non_null += count;
            }
            per_attribute.insert(attribute.clone(), ratio(count, dataset.len()));
        }

        let measured = self.schema.measured_count();
        let density = ratio(non_null, dataset.len() * measured);
        debug!(dataset = dataset.name(), density, "Density computed");
        DensityReport {
            dataset: dataset.name().to_string(),
            record_count: dataset.len(),
            density,
            average_non_null: density * measured as f64,
            per_attribute,
        }
    }

    /// Consistency of a merged dataset.
    pub fn consistency(&self, merged: &Dataset) -> ConsistencyReport {
        let id_attribute = merged.id_attribute();
        let mut per_attribute = BTreeMap::new();
        let mut consistent = 0usize;
        for attribute in &self.schema.scalar {
            let count = merged
                .records()
                .values()
                .filter(|record| is_consistent(record, attribute, id_attribute))
                .count();
            if *attribute != self.schema.id_attribute {
                consistent += count;
            }
            per_attribute.insert(attribute.clone(), ratio(count, merged.len()));
        }

        let consistency = ratio(consistent, merged.len() * self.schema.measured_count());
        debug!(dataset = merged.name(), consistency, "Consistency computed");
        ConsistencyReport {
            consistency,
            per_attribute,
        }
    }
}

/// Fraction of records with at least one non-empty value at `attribute`.
pub fn attribute_density(dataset: &Dataset, attribute: &str) -> f64 {
    ratio(non_null_count(dataset, attribute), dataset.len())
}

/// True when a merged record holds exactly one distinct value for `attribute` and every source
/// that contributed a member record also contributed that value.
pub fn is_consistent(record: &Element, attribute: &str, id_attribute: &str) -> bool {
    let values = record.select(&path::join(attribute, VALUE));
    let distinct: BTreeSet<String> = values.iter().map(|v| v.text_content()).collect();
    if distinct.len() != 1 {
        return false;
    }
    let agreeing = provenance_keys(&values);
    let contributors = provenance_keys(&record.select(&path::join(id_attribute, VALUE)));
    agreeing.len() == contributors.len()
}

fn provenance_keys<'e>(values: &[&'e Element]) -> BTreeSet<&'e str> {
    values
        .iter()
        .copied()
        .filter_map(|v| v.attribute(PROVENANCE))
        .collect()
}

fn non_null_count(dataset: &Dataset, attribute: &str) -> usize {
    dataset
        .records()
        .values()
        .filter(|record| record.has_non_empty_value(attribute))
        .count()
}

/// `numerator / denominator`, or 0.0 when the denominator is zero.
fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}
