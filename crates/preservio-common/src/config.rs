//! Configuration types for Preservio
//!
//! This module defines configuration structures used across components.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration for Preservio
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Graph store layout configuration
    pub store: StoreConfig,
    /// Durable staging area configuration
    pub staging: StagingConfig,
    /// Ingest scheduler configuration
    pub scheduler: SchedulerConfig,
}

impl Config {
    /// Load configuration from an optional TOML file with `PRESERVIO_*`
    /// environment overrides layered on top of the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder()
            .add_source(config::Config::try_from(&Self::default()).map_err(config_err)?);
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }
        builder
            .add_source(config::Environment::with_prefix("PRESERVIO").separator("__"))
            .build()
            .map_err(config_err)?
            .try_deserialize()
            .map_err(config_err)
    }
}

fn config_err(e: config::ConfigError) -> Error {
    Error::Configuration(e.to_string())
}

/// Well-known node paths in the graph store
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Path under which entity nodes are created
    pub entity_root: String,
    /// Path of the node carrying the ingest queue membership
    pub queue_node: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            entity_root: "objects/scape/entities".to_string(),
            queue_node: "/objects/scape/queue".to_string(),
        }
    }
}

/// Durable staging area configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StagingConfig {
    /// Directory holding staged entity files awaiting deferred ingest
    pub dir: PathBuf,
}

impl Default for StagingConfig {
    fn default() -> Self {
        Self {
            dir: std::env::temp_dir().join("preservio-queue"),
        }
    }
}

/// Ingest scheduler configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Delay before the first tick (milliseconds)
    pub initial_delay_ms: u64,
    /// Period between ticks (milliseconds)
    pub period_ms: u64,
    /// Ingest attempts before a queued item is quarantined
    pub max_attempts: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: 5000,
            period_ms: 1000,
            max_attempts: 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.store.entity_root, "objects/scape/entities");
        assert_eq!(config.store.queue_node, "/objects/scape/queue");
        assert_eq!(config.scheduler.period_ms, 1000);
        assert_eq!(config.scheduler.initial_delay_ms, 5000);
        assert_eq!(config.scheduler.max_attempts, 5);
    }

    #[test]
    fn test_load_without_file_uses_defaults() {
        let config = Config::load(None).expect("defaults should load");
        assert_eq!(config.scheduler.period_ms, 1000);
    }

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("tempfile");
        writeln!(file, "[scheduler]\nperiod_ms = 250").expect("write config");
        let config = Config::load(Some(file.path())).expect("config should load");
        assert_eq!(config.scheduler.period_ms, 250);
        // untouched sections keep their defaults
        assert_eq!(config.store.queue_node, "/objects/scape/queue");
    }
}
