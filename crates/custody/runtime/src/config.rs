//! Configuration for custody pools

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustodyConfig {
    /// Pool behaviour
    #[serde(default)]
    pub pool: PoolSettings,

    /// Snapshot storage
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Limits applied by every pool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolSettings {
    /// Largest batch an action may carry
    #[serde(default = "default_max_steps")]
    pub max_steps_per_action: usize,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_steps_per_action: default_max_steps(),
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StorageConfig {
    /// In-memory storage (for development/testing)
    #[default]
    Memory,

    /// One snapshot document per pool under `path`
    File {
        /// Directory holding the snapshot documents
        path: PathBuf,
    },
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level, used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,

    /// JSON format
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_max_steps() -> usize {
    64
}

fn default_log_level() -> String {
    "info".to_string()
}

impl CustodyConfig {
    /// Load configuration: defaults, then the optional file, then
    /// `CUSTODY_`-prefixed environment variables (`__` separates sections)
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        builder = builder.add_source(config::Config::try_from(&CustodyConfig::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("CUSTODY")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }
}
