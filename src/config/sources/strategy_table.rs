//! `[strategies]` tables read with `toml` directly.
//!
//! The layered builder folds keys to lowercase. Attribute paths and trust-table source names
//! are element names and source identifiers, so they keep their case here.

use crate::error::FusionError;
use crate::resolution::Strategy;
use crate::types::AttributePath;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

const STRATEGIES: &str = "strategies";

/// The `[strategies]` table of one file, if it has one.
pub fn read(path: &Path) -> Result<Option<BTreeMap<AttributePath, Strategy>>, FusionError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| FusionError::Config(format!("{}: {}", path.display(), e)))?;
    parse(&content).map_err(|e| FusionError::Config(format!("{}: {}", path.display(), e)))
}

fn parse(content: &str) -> Result<Option<BTreeMap<AttributePath, Strategy>>, toml::de::Error> {
    let mut table: toml::Table = content.parse()?;
    match table.remove(STRATEGIES) {
        Some(value) => Ok(Some(value.try_into()?)),
        None => Ok(None),
    }
}

/// Strategy tables of `files` in increasing precedence; a later file overrides an earlier one
/// per attribute path. `None` when no file has a `[strategies]` table.
pub fn collect(files: &[PathBuf]) -> Result<Option<BTreeMap<AttributePath, Strategy>>, FusionError> {
    let mut merged: Option<BTreeMap<AttributePath, Strategy>> = None;
    for file in files.iter().filter(|f| f.exists()) {
        if let Some(strategies) = read(file)? {
            debug!(file = %file.display(), strategies = strategies.len(), "Read strategy table");
            merged.get_or_insert_with(BTreeMap::new).extend(strategies);
        }
    }
    Ok(merged)
}
