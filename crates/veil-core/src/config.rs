//! Analyzer configuration.
//!
//! Loaded from YAML, e.g.
//!
//! ```yaml
//! schema_file: schema.sql
//! passes:
//!   equality_constraints: false
//! allow_unsupported_joins: true
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::relation::Schema;

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Top-level analyzer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Schema file with `CREATE TABLE` statements.
    /// Relative paths are resolved against the config file's directory.
    #[serde(default)]
    pub schema_file: Option<PathBuf>,

    /// Which optional analysis passes run.
    #[serde(default)]
    pub passes: PassToggles,

    /// Treat NATURAL and USING joins as inner joins without a condition
    /// instead of rejecting them.
    #[serde(default)]
    pub allow_unsupported_joins: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            schema_file: None,
            passes: PassToggles::default(),
            allow_unsupported_joins: false,
        }
    }
}

/// Per-pass switches. Column resolution always runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassToggles {
    #[serde(default = "default_enabled")]
    pub correlated_columns: bool,

    #[serde(default = "default_enabled")]
    pub aggregate_check: bool,

    #[serde(default = "default_enabled")]
    pub type_check: bool,

    #[serde(default = "default_enabled")]
    pub equality_constraints: bool,
}

impl Default for PassToggles {
    fn default() -> Self {
        Self {
            correlated_columns: default_enabled(),
            aggregate_check: default_enabled(),
            type_check: default_enabled(),
            equality_constraints: default_enabled(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

impl AnalyzerConfig {
    /// Load configuration from a YAML file, resolving `schema_file`
    /// relative to the file's directory.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let mut config = Self::from_yaml(&content)?;

        if let Some(schema_file) = &config.schema_file {
            if schema_file.is_relative() {
                let base_dir = path
                    .parent()
                    .map(|p| p.to_path_buf())
                    .unwrap_or_else(|| PathBuf::from("."));
                config.schema_file = Some(base_dir.join(schema_file));
            }
        }

        Ok(config)
    }

    /// Parse configuration from YAML content.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content).map_err(ConfigError::from)
    }

    /// Load the configured schema file.
    pub fn load_schema(&self) -> Result<Schema, ConfigError> {
        let Some(path) = &self.schema_file else {
            return Err(ConfigError::Config("no schema_file configured".to_string()));
        };
        let text = fs::read_to_string(path)?;
        Schema::parse(&text).map_err(|e| ConfigError::Config(format!("{}: {}", path.display(), e)))
    }
}
