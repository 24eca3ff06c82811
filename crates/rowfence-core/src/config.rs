//! Runtime configuration loaded from TOML.
//!
//! ```toml
//! [sql]
//! quote_identifiers = true
//!
//! [executor]
//! debug = false
//! ```
//!
//! Every section and key is optional; unknown keys are rejected.

use serde::{Deserialize, Serialize};
use std::{fs, path::Path};
use thiserror::Error as ThisError;

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

///
/// RowfenceConfig
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct RowfenceConfig {
    pub sql: SqlConfig,
    pub executor: ExecutorConfig,
}

impl RowfenceConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(input)?)
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        Self::from_toml_str(&content)
    }
}

///
/// SqlConfig
/// Controls how statements render in diagnostics.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SqlConfig {
    /// Wrap identifiers in double quotes.
    pub quote_identifiers: bool,
}

impl Default for SqlConfig {
    fn default() -> Self {
        Self {
            quote_identifiers: true,
        }
    }
}

///
/// ExecutorConfig
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExecutorConfig {
    /// Emit per-mutation debug logs (statement text and affected rows).
    pub debug: bool,
}

///
/// TESTS
///
