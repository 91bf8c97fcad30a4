//! Fusion evaluation
//!
//! Applies the configured strategies to a merged dataset, then scores the fused records against
//! a gold standard keyed by the same merged record IDs.

use crate::classify::AttributeSchema;
use crate::dataset::Dataset;
use crate::resolution::numeric::parse_number;
use crate::resolution::{resolve_all, ResolutionStats, Strategy};
use crate::tree::{path, Element};
use crate::types::{AttributePath, VALUE};
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{info, instrument, warn};

/// Accuracy of a fused dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EvaluationReport {
    pub accuracy: f64,
    /// Accuracy per scalar attribute, the ID excluded.
    pub per_attribute: BTreeMap<AttributePath, f64>,
    /// Records found in the gold standard.
    pub evaluated_records: usize,
    pub resolution: ResolutionStats,
}

/// Resolves a merged dataset with a strategy map and scores it.
#[derive(Debug, Clone)]
pub struct Evaluator<'a> {
    strategies: &'a BTreeMap<AttributePath, Strategy>,
}

impl<'a> Evaluator<'a> {
    pub fn new(strategies: &'a BTreeMap<AttributePath, Strategy>) -> Self {
        Self { strategies }
    }

    /// Resolve `merged` in place, then score it against `gold`.
    #[instrument(skip_all, fields(records = merged.len(), gold = gold.len()))]
    pub fn evaluate(
        &self,
        merged: &mut Dataset,
        gold: &Dataset,
        schema: &AttributeSchema,
    ) -> EvaluationReport {
        let resolution = resolve_all(merged, self.strategies, schema);
        let mut report = score(merged, gold, schema);
        report.resolution = resolution;
        report
    }
}

/// Score an already fused dataset. Records absent from the gold standard are ignored.
pub fn score(fused: &Dataset, gold: &Dataset, schema: &AttributeSchema) -> EvaluationReport {
    let start = Instant::now();
    let mut correct: BTreeMap<AttributePath, usize> =
        schema.measured().map(|attr| (attr.clone(), 0)).collect();
    let mut evaluated = 0usize;
    let mut total_correct = 0usize;

    for (id, record) in fused.records() {
        let Some(gold_record) = gold.record(id) else {
            continue;
        };
        evaluated += 1;
        for (attribute, count) in correct.iter_mut() {
            let fused_values = attribute_values(record, attribute);
            let gold_values = attribute_values(gold_record, attribute);
            if values_match(&fused_values, &gold_values) {
                *count += 1;
                total_correct += 1;
            }
        }
    }

    if evaluated == 0 {
        warn!("No fused record was found in the gold standard, check the gold record IDs");
    }
    info!(
        evaluated_records = evaluated,
        duration_ms = start.elapsed().as_millis(),
        "Evaluated records against the gold standard"
    );

    let accuracy = if evaluated == 0 {
        0.0
    } else {
        total_correct as f64 / (schema.measured_count() * evaluated) as f64
    };
    let per_attribute = correct
        .into_iter()
        .map(|(attr, count)| {
            let acc = if evaluated == 0 {
                0.0
            } else {
                count as f64 / evaluated as f64
            };
            (attr, acc)
        })
        .collect();

    EvaluationReport {
        accuracy,
        per_attribute,
        evaluated_records: evaluated,
        resolution: ResolutionStats::default(),
    }
}

/// Values of an attribute: the `value` children when present, otherwise the non-empty texts at
/// the path itself.
pub fn attribute_values(record: &Element, attribute: &str) -> Vec<String> {
    let values = record.values(&path::join(attribute, VALUE));
    if !values.is_empty() {
        return values;
    }
    record
        .values(attribute)
        .into_iter()
        .filter(|v| !v.is_empty())
        .collect()
}

/// Fused values match gold values when counts agree and every fused value occurs in the gold
/// set. If every gold value is numeric, membership is numeric.
pub fn values_match(fused: &[String], gold: &[String]) -> bool {
    if fused.len() != gold.len() {
        return false;
    }
    let gold_numbers: Option<Vec<f64>> = gold.iter().map(|g| parse_number(g)).collect();
    match gold_numbers {
        Some(numbers) => fused
            .iter()
            .all(|v| parse_number(v).is_some_and(|n| numbers.contains(&n))),
        None => fused.iter().all(|v| gold.contains(v)),
    }
}
