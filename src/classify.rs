//! Attribute classification
//!
//! Decides per attribute path whether it is scalar or list-valued by observing repeated sibling
//! tags across the sampled records. A tag seen at most once under every parent is never a list.

use crate::dataset::Dataset;
use crate::tree::path;
use crate::tree::Element;
use crate::types::AttributePath;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

/// Kind of an attribute path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    Scalar,
    List,
}

/// Attribute paths observed across datasets, split into scalar and list paths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeSchema {
    /// Every leaf path carrying a non-empty value in some record.
    pub all: BTreeSet<AttributePath>,
    /// Paths used for density, consistency and resolution.
    pub scalar: BTreeSet<AttributePath>,
    /// Repeated complex elements, merged structurally and never resolved.
    pub list: BTreeSet<AttributePath>,
    /// Name of the ID attribute, excluded from averaged measures.
    pub id_attribute: AttributePath,
}

impl AttributeSchema {
    pub fn kind(&self, attribute: &str) -> Option<AttributeKind> {
        if self.scalar.contains(attribute) {
            Some(AttributeKind::Scalar)
        } else if self.list.contains(attribute)
            || self.list.iter().any(|l| path::is_strict_descendant(attribute, l))
            || self.all.contains(attribute)
        {
            Some(AttributeKind::List)
        } else {
            None
        }
    }

    pub fn is_scalar(&self, attribute: &str) -> bool {
        self.scalar.contains(attribute)
    }

    /// Scalar attributes other than the ID attribute.
    pub fn measured(&self) -> impl Iterator<Item = &AttributePath> {
        self.scalar.iter().filter(move |a| **a != self.id_attribute)
    }

    /// Number of scalar attributes that count towards averaged measures.
    pub fn measured_count(&self) -> usize {
        self.scalar.len().saturating_sub(1)
    }
}

/// Collects attribute observations from sample records and produces an `AttributeSchema`.
#[derive(Debug, Default)]
pub struct AttributeClassifier {
    leaves: BTreeSet<AttributePath>,
    repeated: BTreeSet<AttributePath>,
    id_attribute: Option<AttributePath>,
}

impl AttributeClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Observe every record of a dataset.
    pub fn observe_dataset(&mut self, dataset: &Dataset) {
        if self.id_attribute.is_none() {
            self.id_attribute = Some(dataset.id_attribute().to_string());
        }
        for record in dataset.records().values() {
            self.observe_record(record);
        }
        debug!(
            dataset = dataset.name(),
            leaves = self.leaves.len(),
            repeated = self.repeated.len(),
            "Observed dataset attributes"
        );
    }

    /// Observe one record element.
    pub fn observe_record(&mut self, record: &Element) {
        self.leaves.extend(record.leaf_paths());
        collect_repeated(record, "", &mut self.repeated);
    }

    /// Split observed paths into scalar and list sets.
    ///
    /// A repeated tag whose path is itself a leaf attribute is a multi-valued scalar; every path
    /// strictly below a repeated tag is excluded from the scalar set.
    pub fn classify(self) -> AttributeSchema {
        let scalar: BTreeSet<AttributePath> = self
            .leaves
            .iter()
            .filter(|attr| {
                !self
                    .repeated
                    .iter()
                    .any(|list| path::is_strict_descendant(attr, list))
            })
            .cloned()
            .collect();
        let list: BTreeSet<AttributePath> = self
            .repeated
            .iter()
            .filter(|candidate| !self.leaves.contains(*candidate))
            .cloned()
            .collect();

        info!(
            attributes = self.leaves.len(),
            scalar = scalar.len(),
            list = list.len(),
            "Attributes classified"
        );
        AttributeSchema {
            all: self.leaves,
            scalar,
            list,
            id_attribute: self.id_attribute.unwrap_or_default(),
        }
    }
}

/// Classify the attributes of a set of datasets.
pub fn classify_datasets<'a, I>(datasets: I) -> AttributeSchema
where
    I: IntoIterator<Item = &'a Dataset>,
{
    let mut classifier = AttributeClassifier::new();
    for dataset in datasets {
        classifier.observe_dataset(dataset);
    }
    classifier.classify()
}

fn collect_repeated(node: &Element, prefix: &str, out: &mut BTreeSet<AttributePath>) {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for child in &node.children {
        *counts.entry(child.name.as_str()).or_default() += 1;
    }
    for (name, count) in counts {
        if count > 1 {
            out.insert(path::join(prefix, name));
        }
    }
    for child in node.children.iter().filter(|c| c.has_children()) {
        collect_repeated(child, &path::join(prefix, &child.name), out);
    }
}
