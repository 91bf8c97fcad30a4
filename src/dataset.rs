//! Datasets: records keyed by ID plus their provenance entries.
//!
//! An input dataset carries exactly one provenance entry shared by all its records. A merged
//! dataset carries one provenance entry per contributing source and keys each record by the
//! sorted IDs of the cluster it was built from.

use crate::error::LoadError;
use crate::tree::path::{self, IdPath};
use crate::tree::{Element, TreeStore};
use crate::types::{ProvenanceKey, RecordId, ID_SEPARATOR, VALUE};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::{debug, instrument, warn};

/// How record IDs and provenance entries are read from a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMode {
    /// Source dataset: the ID element holds plain text and exactly one provenance entry exists.
    Source,
    /// Merged, fused or gold document: the ID element holds `value` children.
    Merged,
}

/// Where records and provenance entries live inside a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentLayout {
    pub data: IdPath,
    pub provenance: IdPath,
}

impl DocumentLayout {
    pub fn parse(id_path: &str, provenance_id_path: &str) -> Result<Self, LoadError> {
        Ok(Self {
            data: IdPath::parse(id_path)?,
            provenance: IdPath::parse(provenance_id_path)?,
        })
    }
}

/// A named collection of records with their provenance.
#[derive(Debug, Clone)]
pub struct Dataset {
    name: String,
    layout: DocumentLayout,
    records: BTreeMap<RecordId, Element>,
    provenance: BTreeMap<ProvenanceKey, Element>,
}

impl Dataset {
    /// Build a dataset from records and provenance entries assembled in memory.
    pub fn from_parts(
        name: impl Into<String>,
        layout: DocumentLayout,
        records: BTreeMap<RecordId, Element>,
        provenance: BTreeMap<ProvenanceKey, Element>,
    ) -> Self {
        Self {
            name: name.into(),
            layout,
            records,
            provenance,
        }
    }

    /// Load a dataset document through `store`.
    #[instrument(skip(store, file, layout), fields(file = %file.display()))]
    pub fn load(
        store: &dyn TreeStore,
        file: &Path,
        layout: &DocumentLayout,
        mode: LoadMode,
    ) -> Result<Self, LoadError> {
        let root = store.load(file)?;
        let name = file
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| file.display().to_string());
        Self::from_document(&name, root, layout, mode)
    }

    /// Extract records and provenance entries from a loaded document.
    pub fn from_document(
        name: &str,
        root: Element,
        layout: &DocumentLayout,
        mode: LoadMode,
    ) -> Result<Self, LoadError> {
        let records = collect_records(&root, &layout.data, mode, name);
        if records.is_empty() {
            return Err(LoadError::MissingIdPath {
                file: name.into(),
                path: format!(
                    "/{}/{}/{}",
                    layout.data.root, layout.data.record, layout.data.id_attribute
                ),
            });
        }

        let provenance = collect_records(&root, &layout.provenance, LoadMode::Source, name);
        if mode == LoadMode::Source && provenance.len() != 1 {
            return Err(LoadError::ProvenanceCount {
                file: name.into(),
                found: provenance.len(),
            });
        }

        debug!(
            dataset = name,
            records = records.len(),
            provenance = provenance.len(),
            "Dataset loaded"
        );
        Ok(Self {
            name: name.to_string(),
            layout: layout.clone(),
            records,
            provenance,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn layout(&self) -> &DocumentLayout {
        &self.layout
    }

    /// Name of the ID element inside each record.
    pub fn id_attribute(&self) -> &str {
        &self.layout.data.id_attribute
    }

    /// Tag name of record elements (e.g. `movie`).
    pub fn record_element_name(&self) -> &str {
        path::last_step(&self.layout.data.record).unwrap_or(&self.layout.data.record)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &BTreeMap<RecordId, Element> {
        &self.records
    }

    pub fn records_mut(&mut self) -> &mut BTreeMap<RecordId, Element> {
        &mut self.records
    }

    pub fn record(&self, id: &str) -> Option<&Element> {
        self.records.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.records.contains_key(id)
    }

    pub fn provenance(&self) -> &BTreeMap<ProvenanceKey, Element> {
        &self.provenance
    }

    /// The single provenance key of an input dataset.
    pub fn provenance_key(&self) -> Option<&str> {
        self.provenance.keys().next().map(String::as_str)
    }

    /// First value of `field` in the provenance entry `key`.
    pub fn provenance_field(&self, key: &str, field: &str) -> Option<String> {
        self.provenance
            .get(key)
            .and_then(|entry| entry.values(field).into_iter().next())
    }

    /// Rebuild the document: provenance entries first, then records, both in key order.
    pub fn to_document(&self) -> Element {
        let mut root = Element::new(self.layout.data.root.clone());
        for entry in self.provenance.values() {
            parent_of(&mut root, &self.layout.provenance.record).push(entry.clone());
        }
        for record in self.records.values() {
            parent_of(&mut root, &self.layout.data.record).push(record.clone());
        }
        root
    }
}

fn parent_of<'a>(root: &'a mut Element, record_path: &str) -> &'a mut Element {
    let parent = path::one_level_up(record_path);
    if parent == record_path {
        root
    } else {
        root.ensure_path(&parent)
    }
}

fn collect_records(
    root: &Element,
    id_path: &IdPath,
    mode: LoadMode,
    name: &str,
) -> BTreeMap<RecordId, Element> {
    let mut out = BTreeMap::new();
    if root.name != id_path.root {
        warn!(
            dataset = name,
            expected = %id_path.root,
            found = %root.name,
            "Document root does not match the configured path"
        );
        return out;
    }
    for element in root.select(&id_path.record) {
        let Some(id_element) = element.child(&id_path.id_attribute) else {
            continue;
        };
        let id = match mode {
            LoadMode::Source => id_element.text_content(),
            LoadMode::Merged => merged_id(id_element),
        };
        if id.is_empty() {
            warn!(dataset = name, "Skipping element with an empty ID");
            continue;
        }
        if out.insert(id.clone(), element.clone()).is_some() {
            warn!(dataset = name, id = %id, "Duplicate ID in dataset, keeping the last element");
        }
    }
    out
}

/// ID of a merged record: distinct member IDs, sorted, joined with the separator.
/// Falls back to the element text when no `value` children exist.
pub fn merged_id(id_element: &Element) -> RecordId {
    let ids: BTreeSet<String> = id_element
        .children
        .iter()
        .filter(|c| c.name == VALUE)
        .map(Element::text_content)
        .filter(|v| !v.is_empty())
        .collect();
    if ids.is_empty() {
        return id_element.text_content();
    }
    join_ids(ids.iter().map(String::as_str))
}

/// Join member IDs into a merged record ID.
pub fn join_ids<'a>(ids: impl IntoIterator<Item = &'a str>) -> RecordId {
    ids.into_iter().collect::<Vec<_>>().join(ID_SEPARATOR)
}
