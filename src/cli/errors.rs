//! CLI-specific error types
//!
//! Every CLI error exits the process non-zero. Codes are stable strings so
//! scripts can match on them.

use std::fmt;
use std::io;

/// CLI error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file missing or invalid
    ConfigError,
    /// stdin/stdout failure
    IoError,
    /// Query request is not valid JSON or has the wrong shape
    InvalidRequest,
    /// Build aborted
    BuildFailed,
    /// Database failed validation
    ValidationFailed,
    /// Database cannot be opened
    EngineUnavailable,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "SHARDB_CLI_CONFIG_ERROR",
            Self::IoError => "SHARDB_CLI_IO_ERROR",
            Self::InvalidRequest => "SHARDB_CLI_INVALID_REQUEST",
            Self::BuildFailed => "SHARDB_CLI_BUILD_FAILED",
            Self::ValidationFailed => "SHARDB_CLI_VALIDATION_FAILED",
            Self::EngineUnavailable => "SHARDB_CLI_ENGINE_UNAVAILABLE",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    /// Create a new CLI error
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::InvalidRequest, msg)
    }

    pub fn build_failed(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::BuildFailed, msg)
    }

    pub fn validation_failed(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ValidationFailed, msg)
    }

    pub fn engine_unavailable(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::EngineUnavailable, msg)
    }

    /// Get the error code
    pub fn code(&self) -> CliErrorCode {
        self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_code() {
        let err = CliError::build_failed("duplicate primary key value: \"a\"");
        assert_eq!(err.code(), CliErrorCode::BuildFailed);
        assert_eq!(
            err.to_string(),
            "SHARDB_CLI_BUILD_FAILED: duplicate primary key value: \"a\""
        );
    }
}
