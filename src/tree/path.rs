//! Attribute path utilities
//!
//! Paths are slash-separated element names. Relative paths (`director/name`) address attributes
//! inside a record; absolute paths (`/data/movie/id`) start at the document root.

use crate::error::LoadError;

/// Non-empty steps of a path.
pub fn steps(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// Append `name` to `prefix`.
pub fn join(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", prefix, name)
    }
}

/// The path one level up. A single-step path is its own grouping parent.
pub fn one_level_up(path: &str) -> String {
    let parts: Vec<&str> = steps(path).collect();
    if parts.len() <= 1 {
        return path.to_string();
    }
    parts[..parts.len() - 1].join("/")
}

/// Final step of a path.
pub fn last_step(path: &str) -> Option<&str> {
    steps(path).last()
}

/// True when `path` lies strictly below `ancestor` (`a/b/c` under `a/b`, but not `a/bc`).
pub fn is_strict_descendant(path: &str, ancestor: &str) -> bool {
    path.len() > ancestor.len() + 1
        && path.starts_with(ancestor)
        && path.as_bytes()[ancestor.len()] == b'/'
}

/// Parsed absolute path to an ID element, e.g. `/data/videogame/id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdPath {
    /// Name of the document root element (`data`).
    pub root: String,
    /// Record element path relative to the root (`videogame`).
    pub record: String,
    /// Name of the ID element inside each record (`id`).
    pub id_attribute: String,
}

impl IdPath {
    pub fn parse(path: &str) -> Result<Self, LoadError> {
        let parts: Vec<&str> = steps(path).collect();
        if parts.len() < 3 {
            return Err(LoadError::InvalidPath(format!(
                "{} (expected /<root>/<record>/<id>)",
                path
            )));
        }
        Ok(Self {
            root: parts[0].to_string(),
            record: parts[1..parts.len() - 1].join("/"),
            id_attribute: parts[parts.len() - 1].to_string(),
        })
    }
}
