//! Query engine error types
//!
//! Only initialization can fail. Per-field index problems and per-record
//! shard problems are recovered inside a query (full-scan fallback,
//! record skipped) and surface as WARN logs, never as an `EngineError`.

use thiserror::Error;

use crate::loader::LoaderError;

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Fatal engine failures: the database cannot serve any query
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("database metadata unavailable at {location}: {source}")]
    MetadataUnavailable {
        location: String,
        #[source]
        source: LoaderError,
    },

    #[error("shard manifest unavailable at {location}: {source}")]
    ManifestUnavailable {
        location: String,
        #[source]
        source: LoaderError,
    },

    #[error("primary index unavailable at {location}: {source}")]
    PrimaryIndexUnavailable {
        location: String,
        #[source]
        source: LoaderError,
    },

    #[error("invalid engine configuration: {0}")]
    InvalidConfig(String),
}
