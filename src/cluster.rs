//! Duplicate clustering
//!
//! Turns pairwise duplicate assertions into entity clusters (transitive closure). Clusters are
//! merged by rewriting every member of the absorbed cluster, which is linear in the number of
//! assigned IDs per merge.

use crate::error::{FormatError, FusionError, LoadError};
use crate::types::{ClusterId, RecordId};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::{debug, error, info, instrument};

/// One duplicate assertion.
pub type DuplicatePair = (RecordId, RecordId);

/// Partition of the IDs referenced by duplicate pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Clusters {
    id_to_cluster: BTreeMap<RecordId, ClusterId>,
    clusters: BTreeMap<ClusterId, BTreeSet<RecordId>>,
}

impl Clusters {
    /// Compute clusters from duplicate pairs.
    #[instrument(skip(pairs))]
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = DuplicatePair>,
    {
        let mut assignments: BTreeMap<RecordId, ClusterId> = BTreeMap::new();
        let mut next_cluster: ClusterId = 0;
        let mut pair_count = 0usize;

        for (a, b) in pairs {
            pair_count += 1;
            match (assignments.get(&a).copied(), assignments.get(&b).copied()) {
                (Some(cluster), None) => {
                    assignments.insert(b, cluster);
                }
                (None, Some(cluster)) => {
                    assignments.insert(a, cluster);
                }
                (None, None) => {
                    assignments.insert(a, next_cluster);
                    assignments.insert(b, next_cluster);
                    next_cluster += 1;
                }
                (Some(keep), Some(absorb)) if keep != absorb => {
                    for cluster in assignments.values_mut() {
                        if *cluster == absorb {
                            *cluster = keep;
                        }
                    }
                }
                (Some(_), Some(_)) => {}
            }
        }

        let mut clusters: BTreeMap<ClusterId, BTreeSet<RecordId>> = BTreeMap::new();
        for (id, cluster) in &assignments {
            clusters.entry(*cluster).or_default().insert(id.clone());
        }

        info!(
            pair_count,
            cluster_count = clusters.len(),
            id_count = assignments.len(),
            "Clusters built"
        );
        Self {
            id_to_cluster: assignments,
            clusters,
        }
    }

    /// Read duplicate-pair files and cluster them. A malformed line aborts the whole load.
    pub fn from_files<P: AsRef<Path>>(files: &[P]) -> Result<Self, FusionError> {
        let mut pairs = Vec::new();
        for file in files {
            pairs.extend(read_pair_file(file.as_ref())?);
        }
        Ok(Self::from_pairs(pairs))
    }

    pub fn id_to_cluster(&self) -> &BTreeMap<RecordId, ClusterId> {
        &self.id_to_cluster
    }

    pub fn clusters(&self) -> &BTreeMap<ClusterId, BTreeSet<RecordId>> {
        &self.clusters
    }

    pub fn cluster_of(&self, id: &str) -> Option<ClusterId> {
        self.id_to_cluster.get(id).copied()
    }

    pub fn members(&self, cluster: ClusterId) -> Option<&BTreeSet<RecordId>> {
        self.clusters.get(&cluster)
    }

    /// Number of clusters.
    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    /// All clustered IDs, sorted.
    pub fn ids(&self) -> impl Iterator<Item = &RecordId> {
        self.id_to_cluster.keys()
    }

    /// Mean number of members per cluster; 0.0 without clusters.
    pub fn average_cluster_size(&self) -> f64 {
        if self.clusters.is_empty() {
            return 0.0;
        }
        self.id_to_cluster.len() as f64 / self.clusters.len() as f64
    }

    /// Canonical view of the partition, independent of cluster numbering.
    pub fn partition(&self) -> BTreeSet<BTreeSet<RecordId>> {
        self.clusters.values().cloned().collect()
    }
}

/// Parse one duplicate-pair file: one `idA,idB` pair per line, no header, blank lines ignored.
pub fn read_pair_file(file: &Path) -> Result<Vec<DuplicatePair>, FusionError> {
    let content = std::fs::read_to_string(file).map_err(|e| {
        error!(file = %file.display(), "Duplicate pair file not readable: {}", e);
        LoadError::Unreadable(file.to_path_buf(), e)
    })?;
    let pairs = parse_pairs(&content, file)?;
    debug!(file = %file.display(), pairs = pairs.len(), "Read duplicate pairs");
    Ok(pairs)
}

/// Parse pair lines from `content`; `file` is only used for error context.
pub fn parse_pairs(content: &str, file: &Path) -> Result<Vec<DuplicatePair>, FormatError> {
    let mut pairs = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let ids: Vec<&str> = trimmed.split(',').map(str::trim).collect();
        match ids.as_slice() {
            [a, b] if !a.is_empty() && !b.is_empty() => {
                pairs.push((a.to_string(), b.to_string()));
            }
            _ => {
                error!(file = %file.display(), line = idx + 1, "Wrong format of duplicate pair line");
                return Err(FormatError {
                    file: file.to_path_buf(),
                    line_number: idx + 1,
                    line: line.to_string(),
                });
            }
        }
    }
    Ok(pairs)
}
