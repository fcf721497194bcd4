//! Build and engine configuration
//!
//! Both configs deserialize from a JSON file where every field is optional
//! and falls back to its default. CLI flags are applied on top of the file.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration failures
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config JSON in {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Build-time configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildConfig {
    /// Top-level field holding each record's primary key (default: "id")
    #[serde(default = "default_primary_key")]
    pub primary_key: String,

    /// Records per shard; 0 or 1 writes one file per record (default: 1)
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Field paths to index; `None` indexes every discovered path
    #[serde(default)]
    pub index_fields: Option<Vec<String>>,

    /// Skip indexing a path with more distinct values than this (default: 1000)
    #[serde(default = "default_max_index_values")]
    pub max_index_values: usize,

    /// Group shards into numbered subdirectories (default: true)
    #[serde(default = "default_true")]
    pub use_subdirectories: bool,

    /// Record a CRC32 per shard in the manifest (default: true)
    #[serde(default = "default_true")]
    pub checksums: bool,
}

fn default_primary_key() -> String {
    "id".to_string()
}

fn default_batch_size() -> usize {
    1
}

fn default_max_index_values() -> usize {
    1000
}

fn default_true() -> bool {
    true
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            primary_key: default_primary_key(),
            batch_size: default_batch_size(),
            index_fields: None,
            max_index_values: default_max_index_values(),
            use_subdirectories: true,
            checksums: true,
        }
    }
}

impl BuildConfig {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let config: BuildConfig = read_json(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Sets the primary key field
    pub fn with_primary_key(mut self, field: impl Into<String>) -> Self {
        self.primary_key = field.into();
        self
    }

    /// Sets the batch size
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Restricts indexing to the given field paths
    pub fn with_index_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.index_fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the cardinality cap
    pub fn with_max_index_values(mut self, max: usize) -> Self {
        self.max_index_values = max;
        self
    }

    /// Enables or disables shard subdirectories
    pub fn with_subdirectories(mut self, enabled: bool) -> Self {
        self.use_subdirectories = enabled;
        self
    }

    /// Returns true when shards hold more than one record
    pub fn is_batched(&self) -> bool {
        self.batch_size > 1
    }

    /// Validate configuration values
    pub fn validate(&self) -> ConfigResult<()> {
        if self.primary_key.trim().is_empty() {
            return Err(ConfigError::Invalid("primaryKey must not be empty".into()));
        }

        if self.max_index_values == 0 {
            return Err(ConfigError::Invalid("maxIndexValues must be > 0".into()));
        }

        if let Some(fields) = &self.index_fields {
            if fields.iter().any(|f| f.trim().is_empty()) {
                return Err(ConfigError::Invalid(
                    "indexFields must not contain empty paths".into(),
                ));
            }
        }

        Ok(())
    }
}

/// Query engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    /// Records loaded concurrently during scans and candidate loading (default: 16)
    #[serde(default = "default_scan_concurrency")]
    pub scan_concurrency: usize,

    /// Upper bound on cached records; `None` caches every record (default: None)
    #[serde(default)]
    pub record_cache_capacity: Option<usize>,
}

fn default_scan_concurrency() -> usize {
    16
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            scan_concurrency: default_scan_concurrency(),
            record_cache_capacity: None,
        }
    }
}

impl EngineConfig {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let config: EngineConfig = read_json(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Bounds the record cache
    pub fn with_record_cache_capacity(mut self, capacity: usize) -> Self {
        self.record_cache_capacity = Some(capacity);
        self
    }

    /// Sets the number of concurrent record loads
    pub fn with_scan_concurrency(mut self, concurrency: usize) -> Self {
        self.scan_concurrency = concurrency;
        self
    }

    /// Validate configuration values
    pub fn validate(&self) -> ConfigResult<()> {
        if self.scan_concurrency == 0 {
            return Err(ConfigError::Invalid("scanConcurrency must be > 0".into()));
        }
        Ok(())
    }
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> ConfigResult<T> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;

    serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })
}
