//! Loader error types
//!
//! "Absent" is not an error: loaders return `Ok(None)` for a file that
//! does not exist. Errors are reserved for files that exist but cannot be
//! read or parsed, and for transport failures.

use std::io;

use thiserror::Error;

/// Result type for loader operations
pub type LoaderResult<T> = Result<T, LoaderError>;

/// Storage backend failures
#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("network error fetching {url}: {message}")]
    Network { url: String, message: String },

    #[error("HTTP error {status} fetching {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("required file {0} is missing")]
    Missing(String),

    #[error("invalid base URL: {0}")]
    InvalidUrl(String),
}
