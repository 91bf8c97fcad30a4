//! Pipeline orchestration
//!
//! The union stage clusters duplicates, merges the source datasets and writes the merged
//! document with the first part of the report. The fusion stage resolves the merged dataset,
//! writes the fused document and appends the accuracy part of the report.

use crate::classify::{classify_datasets, AttributeSchema};
use crate::cluster::Clusters;
use crate::config::FusionConfig;
use crate::dataset::{Dataset, DocumentLayout, LoadMode};
use crate::error::FusionError;
use crate::evaluate::{EvaluationReport, Evaluator};
use crate::merge::RecordMerger;
use crate::report::{format_fusion_text, format_union_text, UnionReport};
use crate::tree::TreeStore;
use std::io::Write;
use std::path::Path;
use std::time::Instant;
use tracing::{error, info, instrument};

/// Everything the union stage produced.
#[derive(Debug, Clone)]
pub struct UnionOutcome {
    pub clusters: Clusters,
    pub schema: AttributeSchema,
    pub merged: Dataset,
    pub report: UnionReport,
}

/// Everything the fusion stage produced.
#[derive(Debug, Clone)]
pub struct FusionOutcome {
    pub fused: Dataset,
    pub evaluation: EvaluationReport,
}

/// Runs pipeline stages for one configuration.
pub struct Pipeline<'a> {
    config: &'a FusionConfig,
    store: &'a dyn TreeStore,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a FusionConfig, store: &'a dyn TreeStore) -> Self {
        Self { config, store }
    }

    pub fn layout(&self) -> Result<DocumentLayout, FusionError> {
        Ok(DocumentLayout::parse(
            &self.config.input.id_path,
            &self.config.input.provenance_id_path,
        )?)
    }

    /// Read and cluster every duplicate-pair file.
    #[instrument(skip(self))]
    pub fn clusters(&self) -> Result<Clusters, FusionError> {
        Clusters::from_files(&self.config.input.duplicates)
    }

    /// Load every source dataset. Any load failure aborts the run.
    #[instrument(skip(self))]
    pub fn load_sources(&self) -> Result<Vec<Dataset>, FusionError> {
        let layout = self.layout()?;
        let mut datasets = Vec::with_capacity(self.config.input.datasets.len());
        for file in &self.config.input.datasets {
            let dataset = Dataset::load(self.store, file, &layout, LoadMode::Source).map_err(|e| {
                error!(file = %file.display(), "Source dataset could not be loaded: {}", e);
                e
            })?;
            datasets.push(dataset);
        }
        info!(datasets = datasets.len(), "Source datasets loaded");
        Ok(datasets)
    }

    /// Cluster, merge, write the merged document and the first part of the report.
    #[instrument(skip(self))]
    pub fn union(&self) -> Result<UnionOutcome, FusionError> {
        let start = Instant::now();
        let clusters = self.clusters()?;
        let sources = self.load_sources()?;
        let schema = classify_datasets(&sources);

        let merged = RecordMerger::new(self.config.input.root_element.clone())
            .merge(&clusters, &sources, &schema)?;
        self.store
            .save(&merged.to_document(), &self.config.output.merged)?;

        let report = UnionReport::build(&clusters, &sources, &merged, &schema);
        self.write_report_part(&format_union_text(&report, false), false)?;

        info!(
            cluster_count = clusters.len(),
            record_count = merged.len(),
            merged = %self.config.output.merged.display(),
            duration_ms = start.elapsed().as_millis(),
            "Union stage complete"
        );
        Ok(UnionOutcome {
            clusters,
            schema,
            merged,
            report,
        })
    }

    /// Resolve, write the fused document and append the accuracy part of the report.
    ///
    /// Without a union outcome the merged document is reloaded from disk and the attribute
    /// schema is recomputed from the source datasets.
    #[instrument(skip_all)]
    pub fn fuse(&self, union: Option<UnionOutcome>) -> Result<FusionOutcome, FusionError> {
        let start = Instant::now();
        let gold_path = self.config.input.gold.as_deref().ok_or_else(|| {
            FusionError::Config("input.gold must be set for the fusion stage".to_string())
        })?;
        let layout = self.layout()?;

        let (mut merged, schema) = match union {
            Some(outcome) => (outcome.merged, outcome.schema),
            None => {
                let schema = classify_datasets(&self.load_sources()?);
                let merged =
                    Dataset::load(self.store, &self.config.output.merged, &layout, LoadMode::Merged)?;
                (merged, schema)
            }
        };
        let gold = Dataset::load(self.store, gold_path, &layout, LoadMode::Merged)?;

        let evaluation = Evaluator::new(&self.config.strategies).evaluate(&mut merged, &gold, &schema);
        self.store.save(&merged.to_document(), &self.config.output.fused)?;
        self.write_report_part(&format_fusion_text(&evaluation, false), true)?;

        info!(
            accuracy = evaluation.accuracy,
            evaluated_records = evaluation.evaluated_records,
            fused = %self.config.output.fused.display(),
            duration_ms = start.elapsed().as_millis(),
            "Fusion stage complete"
        );
        Ok(FusionOutcome {
            fused: merged,
            evaluation,
        })
    }

    /// Union followed by fusion, without reloading the merged document.
    pub fn run(&self) -> Result<(UnionReport, FusionOutcome), FusionError> {
        let union = self.union()?;
        let report = union.report.clone();
        let fusion = self.fuse(Some(union))?;
        Ok((report, fusion))
    }

    /// Write report text to the configured report file, if any.
    fn write_report_part(&self, text: &str, append: bool) -> Result<(), FusionError> {
        match &self.config.output.report {
            Some(path) => write_report(path, text, append),
            None => Ok(()),
        }
    }
}

fn write_report(path: &Path, text: &str, append: bool) -> Result<(), FusionError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| FusionError::Write(parent.to_path_buf(), e))?;
    }
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .append(append)
        .truncate(!append)
        .open(path)
        .map_err(|e| FusionError::Write(path.to_path_buf(), e))?;
    file.write_all(text.as_bytes())
        .map_err(|e| FusionError::Write(path.to_path_buf(), e))
}
