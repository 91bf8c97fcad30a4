//! Record merging
//!
//! Builds one merged record per cluster. Every scalar attribute becomes a list of `value`
//! elements tagged with the provenance key of the contributing source; list attributes are
//! copied structurally under a grouping element one level above the repeated tag.

use crate::classify::AttributeSchema;
use crate::cluster::Clusters;
use crate::dataset::{join_ids, Dataset, DocumentLayout};
use crate::error::{DataIntegrityError, FusionError};
use crate::tree::path::{self, IdPath};
use crate::tree::Element;
use crate::types::{ProvenanceKey, RecordId, PROVENANCE, VALUE};
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{debug, error, info, instrument, trace};

/// Name used for merged datasets built in memory.
pub const MERGED_DATASET_NAME: &str = "merged";

/// Merges clustered records from several source datasets.
#[derive(Debug, Clone)]
pub struct RecordMerger {
    root_element: String,
}

impl RecordMerger {
    /// `root_element` names the root of the merged document (e.g. `data`).
    pub fn new(root_element: impl Into<String>) -> Self {
        Self {
            root_element: root_element.into(),
        }
    }

    /// Merge every cluster into one record.
    ///
    /// Fails without producing a dataset when a clustered ID is missing from every dataset or is
    /// present in more than one.
    #[instrument(skip_all, fields(clusters = clusters.len(), datasets = datasets.len()))]
    pub fn merge(
        &self,
        clusters: &Clusters,
        datasets: &[Dataset],
        schema: &AttributeSchema,
    ) -> Result<Dataset, FusionError> {
        let start = Instant::now();
        let Some(first) = datasets.first() else {
            return Err(FusionError::Config("no input datasets to merge".to_string()));
        };

        let owners = locate_members(clusters, datasets)?;
        let provenance = collect_provenance(datasets)?;

        let element_name = first.record_element_name().to_string();
        let mut records: BTreeMap<RecordId, Element> = BTreeMap::new();
        for members in clusters.clusters().values() {
            let mut merged = Element::new(element_name.clone());
            let contributors: Vec<(&Element, &str)> = members
                .iter()
                .filter_map(|id| {
                    let dataset = &datasets[owners[id]];
                    Some((dataset.record(id)?, dataset.provenance_key()?))
                })
                .collect();

            for attribute in &schema.scalar {
                merge_scalar(&mut merged, attribute, &contributors);
            }
            for list in &schema.list {
                merge_list(&mut merged, list, &contributors);
            }

            let id = join_ids(members.iter().map(String::as_str));
            trace!(id = %id, members = members.len(), "Merged cluster");
            records.insert(id, merged);
        }

        let layout = DocumentLayout {
            data: IdPath {
                root: self.root_element.clone(),
                record: first.layout().data.record.clone(),
                id_attribute: first.id_attribute().to_string(),
            },
            provenance: IdPath {
                root: self.root_element.clone(),
                record: first.layout().provenance.record.clone(),
                id_attribute: first.layout().provenance.id_attribute.clone(),
            },
        };

        info!(
            records = records.len(),
            provenance = provenance.len(),
            duration_ms = start.elapsed().as_millis(),
            "Merged dataset created"
        );
        Ok(Dataset::from_parts(
            MERGED_DATASET_NAME,
            layout,
            records,
            provenance,
        ))
    }
}

/// Union of every dataset's provenance entries. Each key must belong to one dataset only.
fn collect_provenance(
    datasets: &[Dataset],
) -> Result<BTreeMap<ProvenanceKey, Element>, DataIntegrityError> {
    let mut provenance = BTreeMap::new();
    let mut owners: BTreeMap<&str, &str> = BTreeMap::new();
    for dataset in datasets {
        for (key, entry) in dataset.provenance() {
            if let Some(previous) = owners.insert(key.as_str(), dataset.name()) {
                error!(key = %key, first = previous, second = dataset.name(), "Provenance key reused");
                return Err(DataIntegrityError::SharedProvenance {
                    key: key.clone(),
                    datasets: vec![previous.to_string(), dataset.name().to_string()],
                });
            }
            provenance.insert(key.clone(), entry.clone());
        }
    }
    Ok(provenance)
}

/// Map every clustered ID to the index of the one dataset holding it.
fn locate_members(
    clusters: &Clusters,
    datasets: &[Dataset],
) -> Result<BTreeMap<RecordId, usize>, DataIntegrityError> {
    let mut owners = BTreeMap::new();
    let mut first_error = None;
    for id in clusters.ids() {
        let holders: Vec<usize> = datasets
            .iter()
            .enumerate()
            .filter(|(_, ds)| ds.contains(id))
            .map(|(idx, _)| idx)
            .collect();
        let problem = match holders.as_slice() {
            [single] => {
                owners.insert(id.clone(), *single);
                continue;
            }
            [] => DataIntegrityError::MissingRecord { id: id.clone() },
            _ => DataIntegrityError::AmbiguousRecord {
                id: id.clone(),
                sources: holders
                    .iter()
                    .map(|idx| {
                        let ds = &datasets[*idx];
                        ds.provenance_key().unwrap_or(ds.name()).to_string()
                    })
                    .collect(),
            },
        };
        error!("{}", problem);
        first_error.get_or_insert(problem);
    }
    match first_error {
        Some(err) => Err(err),
        None => {
            debug!(ids = owners.len(), "All clustered IDs located");
            Ok(owners)
        }
    }
}

fn merge_scalar(merged: &mut Element, attribute: &str, contributors: &[(&Element, &str)]) {
    let property = merged.ensure_path(attribute);
    for (record, provenance) in contributors {
        for value in record.values(attribute) {
            if value.is_empty() {
                continue;
            }
            property.push(Element::with_text(VALUE, value).with_attribute(PROVENANCE, *provenance));
        }
    }
}

fn merge_list(merged: &mut Element, list: &str, contributors: &[(&Element, &str)]) {
    let container = merged.ensure_path(&path::one_level_up(list));
    for (record, provenance) in contributors {
        for item in record.select(list) {
            let mut item = item.clone();
            item.set_attribute(PROVENANCE, *provenance);
            container.push(item);
        }
    }
}
