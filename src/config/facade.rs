//! ConfigLoader: assembles configuration sources in precedence order.

use super::merge::merge_policy;
use super::sources::{environment, global_file, project_file, strategy_table};
use super::FusionConfig;
use crate::error::FusionError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Loads `FusionConfig` from layered sources.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for a project directory.
    ///
    /// Precedence (lowest to highest): defaults, global file, `<project_root>/fusion.toml`,
    /// environment. Relative paths resolve against `project_root`.
    pub fn load(project_root: &Path) -> Result<FusionConfig, FusionError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = project_file::add_to_builder(builder, project_root)?;
        let builder = environment::add_to_builder(builder);

        let mut config: FusionConfig = builder.build()?.try_deserialize()?;
        let files = Self::with_global(project_root.join(project_file::PROJECT_FILE));
        Self::restore_strategy_keys(&mut config, &files)?;
        config.resolve_paths(project_root);
        debug!(project_root = %project_root.display(), "Configuration loaded");
        Ok(config)
    }

    /// Load configuration from an explicit file. Relative paths resolve against the file's
    /// directory.
    pub fn load_from_file(path: &Path) -> Result<FusionConfig, FusionError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = project_file::add_explicit(builder, path)?;
        let builder = environment::add_to_builder(builder);

        let mut config: FusionConfig = builder.build()?.try_deserialize()?;
        Self::restore_strategy_keys(&mut config, &Self::with_global(path.to_path_buf()))?;
        let base = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        config.resolve_paths(base);
        debug!(config_path = %path.display(), "Configuration loaded");
        Ok(config)
    }

    fn with_global(file: PathBuf) -> Vec<PathBuf> {
        global_file::global_config_path()
            .into_iter()
            .chain(std::iter::once(file))
            .collect()
    }

    // The builder lowercases map keys; attribute paths and source names are case-sensitive.
    fn restore_strategy_keys(config: &mut FusionConfig, files: &[PathBuf]) -> Result<(), FusionError> {
        if let Some(strategies) = strategy_table::collect(files)? {
            config.strategies = strategies;
        }
        Ok(())
    }

    /// Location of the user-level configuration file, when a home directory is known.
    pub fn global_config_path() -> Option<PathBuf> {
        global_file::global_config_path()
    }
}
