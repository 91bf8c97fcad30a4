//! CLI route: owns the loaded configuration and dispatches commands to the pipeline.

use crate::cli::parse::{Commands, ConfigCommands, OutputFormat};
use crate::cli::presentation::{
    format_clusters_text, format_config_toml, format_evaluation_json, format_validation_text,
    format_written,
};
use crate::cluster::Clusters;
use crate::config::{ConfigLoader, FusionConfig};
use crate::error::FusionError;
use crate::pipeline::Pipeline;
use crate::report::{format_fusion_text, format_union_text};
use crate::tree::JsonTreeStore;
use std::io::IsTerminal;
use std::path::Path;
use tracing::{debug, info};

/// Effective configuration and document store for one CLI invocation.
pub struct RunContext {
    config: FusionConfig,
    store: JsonTreeStore,
    styled: bool,
}

impl RunContext {
    /// Load configuration from `config_path` when given, otherwise from `<project>/fusion.toml`
    /// layered over the global file and environment.
    pub fn new(project: &Path, config_path: Option<&Path>) -> Result<Self, FusionError> {
        let config = match config_path {
            Some(path) => ConfigLoader::load_from_file(path)?,
            None => ConfigLoader::load(project)?,
        };
        Ok(Self::from_config(config))
    }

    pub fn from_config(config: FusionConfig) -> Self {
        let store = JsonTreeStore::new(config.output.pretty);
        Self {
            config,
            store,
            styled: std::io::stdout().is_terminal(),
        }
    }

    pub fn config(&self) -> &FusionConfig {
        &self.config
    }

    /// Execute a command, returning the text to print on stdout.
    pub fn execute(&self, command: &Commands) -> Result<String, FusionError> {
        match command {
            Commands::Union => self.handle_union(),
            Commands::Fuse { format } => self.handle_fuse(*format),
            Commands::Run { format } => self.handle_run(*format),
            Commands::Clusters { members } => self.handle_clusters(*members),
            Commands::Config { command } => self.handle_config(command),
        }
    }

    fn pipeline(&self) -> Result<Pipeline<'_>, FusionError> {
        self.config.validate().map_err(|errors| {
            FusionError::Config(
                errors
                    .iter()
                    .map(|e| e.to_string())
                    .collect::<Vec<_>>()
                    .join("; "),
            )
        })?;
        Ok(Pipeline::new(&self.config, &self.store))
    }

    fn handle_union(&self) -> Result<String, FusionError> {
        let outcome = self.pipeline()?.union()?;
        match &self.config.output.report {
            Some(report) => Ok(format_written("Union", &self.config.output.merged, report)),
            None => Ok(format_union_text(&outcome.report, self.styled)),
        }
    }

    fn handle_fuse(&self, format: OutputFormat) -> Result<String, FusionError> {
        let outcome = self.pipeline()?.fuse(None)?;
        match (format, &self.config.output.report) {
            (OutputFormat::Json, _) => format_evaluation_json(None, Some(&outcome.evaluation)),
            (OutputFormat::Text, Some(report)) => {
                Ok(format_written("Fusion", &self.config.output.fused, report))
            }
            (OutputFormat::Text, None) => Ok(format_fusion_text(&outcome.evaluation, self.styled)),
        }
    }

    fn handle_run(&self, format: OutputFormat) -> Result<String, FusionError> {
        let (union, fusion) = self.pipeline()?.run()?;
        info!(accuracy = fusion.evaluation.accuracy, "Run complete");
        match (format, &self.config.output.report) {
            (OutputFormat::Json, _) => format_evaluation_json(Some(&union), Some(&fusion.evaluation)),
            (OutputFormat::Text, Some(report)) => {
                Ok(format_written("Run", &self.config.output.fused, report))
            }
            (OutputFormat::Text, None) => Ok(format!(
                "{}{}",
                format_union_text(&union, self.styled),
                format_fusion_text(&fusion.evaluation, self.styled)
            )),
        }
    }

    fn handle_clusters(&self, members: bool) -> Result<String, FusionError> {
        if self.config.input.duplicates.is_empty() {
            return Err(FusionError::Config(
                "no duplicate-pair files configured".to_string(),
            ));
        }
        let clusters = Clusters::from_files(&self.config.input.duplicates)?;
        debug!(cluster_count = clusters.len(), "Clusters listed");
        Ok(format_clusters_text(&clusters, members, self.styled))
    }

    fn handle_config(&self, command: &ConfigCommands) -> Result<String, FusionError> {
        match command {
            ConfigCommands::Show => format_config_toml(&self.config),
            ConfigCommands::Validate => {
                let result = self.config.validate();
                let text = format_validation_text(&result, self.styled);
                match result {
                    Ok(()) => Ok(text),
                    Err(_) => Err(FusionError::Config(text)),
                }
            }
        }
    }
}
