//! Engine configuration

use onering_core::{Error, Result};
use onering_query::ExecutorOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Dataset bulk-loaded when the engine starts
    pub dataset: Option<PathBuf>,

    /// LINK traverses edges in both directions
    pub ignore_direction: bool,

    /// Log level used when `RUST_LOG` is not set
    pub log_level: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            dataset: None,
            ignore_direction: false,
            log_level: "info".to_string(),
        }
    }
}

impl EngineConfig {
    /// Create a new configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create configuration for development
    pub fn for_development() -> Self {
        Self {
            log_level: "debug".to_string(),
            ..Default::default()
        }
    }

    /// Create configuration for tests: no dataset, quiet logging
    pub fn for_testing() -> Self {
        Self {
            log_level: "warn".to_string(),
            ..Default::default()
        }
    }

    /// Read a configuration from a JSON file. Missing fields take their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        serde_json::from_str(&raw)
            .map_err(|e| Error::Configuration(format!("{}: {}", path.display(), e)))
    }

    /// Builder: set dataset
    pub fn dataset<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.dataset = Some(path.into());
        self
    }

    /// Builder: ignore edge direction in LINK
    pub fn ignore_direction(mut self, ignore: bool) -> Self {
        self.ignore_direction = ignore;
        self
    }

    /// Builder: set log level
    pub fn log_level(mut self, level: &str) -> Self {
        self.log_level = level.to_string();
        self
    }

    /// Executor settings derived from this configuration
    pub fn executor_options(&self) -> ExecutorOptions {
        ExecutorOptions::default().ignoring_direction(self.ignore_direction)
    }
}
