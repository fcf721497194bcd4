//! Build error types
//!
//! Every build error is fatal: the build stops and leaves no usable
//! database behind. The message names the violated invariant and, for
//! duplicates, the offending key.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for build operations
pub type BuildResult<T> = Result<T, BuildError>;

/// Build-time failures
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("input contains no records")]
    EmptyInput,

    #[error("input must be an array of records or an object with an array property, got {0}")]
    InvalidInputShape(&'static str),

    #[error("record {index} is not a JSON object")]
    NotAnObject { index: usize },

    #[error("record {index} is missing primary key field '{field}'")]
    MissingPrimaryKey { index: usize, field: String },

    #[error("record {index} has a non-scalar primary key in field '{field}'")]
    InvalidPrimaryKey { index: usize, field: String },

    #[error("duplicate primary key value: \"{value}\"")]
    DuplicatePrimaryKey { value: String },

    #[error("invalid build configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize {what}: {source}")]
    Serialize {
        what: String,
        #[source]
        source: serde_json::Error,
    },
}

impl BuildError {
    /// Wraps an I/O error with the path it happened at
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        BuildError::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns true for errors caused by the input records rather than the environment
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            BuildError::EmptyInput
                | BuildError::InvalidInputShape(_)
                | BuildError::NotAnObject { .. }
                | BuildError::MissingPrimaryKey { .. }
                | BuildError::InvalidPrimaryKey { .. }
                | BuildError::DuplicatePrimaryKey { .. }
        )
    }
}
