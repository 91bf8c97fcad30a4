//! Conflict resolution
//!
//! A resolution function collapses the `(value, provenance)` pairs of one merged attribute into
//! the winning set. Strategies are chosen per attribute path and applied in place: the attribute
//! element of the record is replaced by one holding only the winners.

pub mod numeric;
pub mod recent;
pub mod trusted;
pub mod vote;

pub use numeric::{Average, Maximum};
pub use recent::MostRecent;
pub use trusted::MostTrusted;
pub use vote::Vote;

use crate::classify::AttributeSchema;
use crate::dataset::Dataset;
use crate::error::StrategyWarning;
use crate::tree::{path, Element};
use crate::types::{AttributePath, PROVENANCE, VALUE};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// One contributed value and the provenance key(s) it came from.
///
/// After resolution `provenance` may hold a comma-joined list of keys, or a synthetic marker.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ValuePair {
    pub value: String,
    pub provenance: String,
}

impl ValuePair {
    pub fn new(value: impl Into<String>, provenance: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            provenance: provenance.into(),
        }
    }

    fn to_element(&self) -> Element {
        Element::with_text(VALUE, self.value.clone()).with_attribute(PROVENANCE, self.provenance.clone())
    }
}

/// Capability shared by all strategies.
pub trait ResolutionFunction {
    /// Short name used in logs and warnings.
    fn name(&self) -> &'static str;

    /// Compute the winning pairs. `dataset` provides provenance metadata lookups.
    ///
    /// Returning a warning leaves the attribute unresolved.
    fn apply(&self, dataset: &Dataset, pairs: &[ValuePair]) -> Result<Vec<ValuePair>, StrategyWarning>;
}

/// Identity resolution: the contributed pairs are kept as they are.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassThrough;

impl ResolutionFunction for PassThrough {
    fn name(&self) -> &'static str {
        "pass_through"
    }

    fn apply(&self, _dataset: &Dataset, pairs: &[ValuePair]) -> Result<Vec<ValuePair>, StrategyWarning> {
        Ok(pairs.to_vec())
    }
}

/// Strategy selected for an attribute in configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Strategy {
    Vote(Vote),
    MostTrusted(MostTrusted),
    MostRecent(MostRecent),
    Maximum,
    Average,
    PassThrough,
}

impl Strategy {
    fn function(&self) -> &dyn ResolutionFunction {
        match self {
            Strategy::Vote(vote) => vote,
            Strategy::MostTrusted(trusted) => trusted,
            Strategy::MostRecent(recent) => recent,
            Strategy::Maximum => &Maximum,
            Strategy::Average => &Average,
            Strategy::PassThrough => &PassThrough,
        }
    }
}

impl ResolutionFunction for Strategy {
    fn name(&self) -> &'static str {
        self.function().name()
    }

    fn apply(&self, dataset: &Dataset, pairs: &[ValuePair]) -> Result<Vec<ValuePair>, StrategyWarning> {
        self.function().apply(dataset, pairs)
    }
}

/// Result of resolving one attribute of one record.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// The attribute was replaced by the winning pairs.
    Applied,
    /// The record has no element at the attribute path.
    Absent,
    /// The strategy did not apply; the original pairs are kept.
    Skipped(StrategyWarning),
}

/// Counts of attribute resolutions over a dataset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResolutionStats {
    pub resolved: usize,
    pub skipped: usize,
}

/// The `(value, provenance)` pairs of a merged attribute, in document order.
pub fn value_pairs(record: &Element, attribute: &str) -> Vec<ValuePair> {
    record
        .select(&path::join(attribute, VALUE))
        .into_iter()
        .map(|v| ValuePair::new(v.text_content(), v.attribute(PROVENANCE).unwrap_or_default()))
        .collect()
}

/// Resolve `attribute` of record `id` in place.
///
/// Strategy warnings are logged here and never returned as errors.
pub fn resolve(
    dataset: &mut Dataset,
    id: &str,
    attribute: &str,
    function: &dyn ResolutionFunction,
) -> Resolution {
    let Some(record) = dataset.record(id) else {
        return Resolution::Absent;
    };
    let Some(original) = record.select(attribute).into_iter().next() else {
        return Resolution::Absent;
    };
    let mut replacement = Element::new(original.name.clone());
    replacement.attributes = original.attributes.clone();

    let pairs = value_pairs(record, attribute);
    let winners = match function.apply(dataset, &pairs) {
        Ok(winners) => winners,
        Err(warning) => {
            warn!(
                record = id,
                attribute,
                strategy = function.name(),
                "Resolution skipped: {}",
                warning
            );
            return Resolution::Skipped(warning);
        }
    };
    for winner in &winners {
        replacement.push(winner.to_element());
    }

    if let Some(record) = dataset.records_mut().get_mut(id) {
        record.replace_first(attribute, replacement);
    }
    Resolution::Applied
}

/// Apply every configured strategy to every record of `dataset`.
///
/// Strategies naming a path that is not a scalar attribute are skipped with a warning.
#[instrument(skip_all, fields(records = dataset.len(), strategies = strategies.len()))]
pub fn resolve_all(
    dataset: &mut Dataset,
    strategies: &BTreeMap<AttributePath, Strategy>,
    schema: &AttributeSchema,
) -> ResolutionStats {
    let start = Instant::now();
    let mut stats = ResolutionStats::default();
    let ids: Vec<String> = dataset.records().keys().cloned().collect();

    for (attribute, strategy) in strategies {
        if !schema.is_scalar(attribute) {
            warn!(
                attribute = %attribute,
                kind = ?schema.kind(attribute),
                "Strategy configured for a path that is not a scalar attribute, skipping"
            );
            continue;
        }
        for id in &ids {
            match resolve(dataset, id, attribute, strategy) {
                Resolution::Applied => stats.resolved += 1,
                Resolution::Skipped(_) => stats.skipped += 1,
                Resolution::Absent => {}
            }
        }
        debug!(attribute = %attribute, strategy = strategy.name(), "Strategy applied");
    }

    info!(
        resolved = stats.resolved,
        skipped = stats.skipped,
        duration_ms = start.elapsed().as_millis(),
        "Resolution complete"
    );
    stats
}

/// Contributions grouped by value, in value order. Each group keeps its provenance keys in
/// contribution order.
pub(crate) fn group_by_value<'p, I>(pairs: I) -> BTreeMap<&'p str, Vec<&'p str>>
where
    I: IntoIterator<Item = &'p ValuePair>,
{
    let mut groups: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for pair in pairs {
        groups
            .entry(pair.value.as_str())
            .or_default()
            .push(pair.provenance.as_str());
    }
    groups
}

/// Turn winning groups into pairs with comma-joined provenance. With `select_first` only the
/// lexicographically smallest value is kept.
pub(crate) fn emit_winners<'p>(
    winners: impl IntoIterator<Item = (&'p str, Vec<&'p str>)>,
    select_first: bool,
) -> Vec<ValuePair> {
    let mut out: Vec<ValuePair> = winners
        .into_iter()
        .map(|(value, provenance)| ValuePair::new(value, provenance.join(",")))
        .collect();
    out.sort();
    if select_first {
        out.truncate(1);
    }
    out
}

/// Keep the pairs whose score equals the maximum score, then group and emit them.
///
/// Scores are compared with `PartialOrd`; callers must not pass NaN.
pub(crate) fn keep_highest<S: PartialOrd + Copy>(
    scored: &[(S, &ValuePair)],
    select_first: bool,
) -> Vec<ValuePair> {
    let Some(best) = scored
        .iter()
        .map(|(score, _)| *score)
        .reduce(|a, b| if b > a { b } else { a })
    else {
        return Vec::new();
    };
    let kept = scored
        .iter()
        .filter(|(score, _)| *score == best)
        .map(|(_, pair)| *pair);
    emit_winners(group_by_value(kept), select_first)
}
