//! Document persistence for element trees.

use crate::error::{FusionError, LoadError};
use crate::tree::element::Element;
use std::path::Path;
use tracing::{debug, error};

/// Loads and saves whole documents. The pipeline loads everything up front and writes
/// merged/fused documents once per stage.
pub trait TreeStore {
    fn load(&self, path: &Path) -> Result<Element, LoadError>;
    fn save(&self, root: &Element, path: &Path) -> Result<(), FusionError>;
}

/// Element trees stored as JSON documents.
#[derive(Debug, Clone, Default)]
pub struct JsonTreeStore {
    pub pretty: bool,
}

impl JsonTreeStore {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    pub fn to_string(&self, root: &Element) -> Result<String, serde_json::Error> {
        if self.pretty {
            serde_json::to_string_pretty(root)
        } else {
            serde_json::to_string(root)
        }
    }
}

impl TreeStore for JsonTreeStore {
    fn load(&self, path: &Path) -> Result<Element, LoadError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            error!(file = %path.display(), "Input file not readable: {}", e);
            LoadError::Unreadable(path.to_path_buf(), e)
        })?;
        let root: Element = serde_json::from_str(&content).map_err(|e| {
            error!(file = %path.display(), "Input file is not well-formed: {}", e);
            LoadError::Malformed {
                file: path.to_path_buf(),
                reason: e.to_string(),
            }
        })?;
        debug!(file = %path.display(), root = %root.name, "Loaded document");
        Ok(root)
    }

    fn save(&self, root: &Element, path: &Path) -> Result<(), FusionError> {
        let content = self.to_string(root).map_err(|e| {
            FusionError::Write(
                path.to_path_buf(),
                std::io::Error::new(std::io::ErrorKind::InvalidData, e),
            )
        })?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| FusionError::Write(parent.to_path_buf(), e))?;
            }
        }
        std::fs::write(path, content).map_err(|e| FusionError::Write(path.to_path_buf(), e))?;
        debug!(file = %path.display(), "Wrote document");
        Ok(())
    }
}
