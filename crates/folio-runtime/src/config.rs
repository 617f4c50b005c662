#![forbid(unsafe_code)]

//! Variable defaults loaded from document configuration.
//!
//! A document ships its initial variables as data, applied once at session
//! start through [`VariableStore::initialize`]:
//!
//! ```toml
//! [variables]
//! hexagon_sides = 6
//! fibonacci_seed = 1
//! amplitude = 2.5
//! show_hints = true
//! ```
//!
//! The same shape is accepted as JSON. Files are dispatched on extension
//! (`.toml`, `.json`).

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::reactive::{Value, VariableStore};

/// Errors from loading document configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported configuration format: {}", .0.display())]
    UnknownFormat(PathBuf),
}

/// Initial key/value pairs for a document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VariableDefaults {
    #[serde(default)]
    pub variables: BTreeMap<String, Value>,
}

impl VariableDefaults {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(input)?)
    }

    pub fn from_json_str(input: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(input)?)
    }

    /// Load from a `.toml` or `.json` file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        let parse: fn(&str) -> Result<Self, ConfigError> = match ext.as_deref() {
            Some("toml") => Self::from_toml_str,
            Some("json") => Self::from_json_str,
            _ => return Err(ConfigError::UnknownFormat(path.to_path_buf())),
        };
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let defaults = parse(&text)?;
        debug!(path = %path.display(), variables = defaults.variables.len(), "loaded variable defaults");
        Ok(defaults)
    }

    /// Seed `store` with these defaults. Returns the number of keys seeded.
    pub fn apply(&self, store: &VariableStore) -> usize {
        store.initialize(
            self.variables
                .iter()
                .map(|(key, value)| (key.clone(), value.clone())),
        )
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}
