//! CLI command implementations
//!
//! Each command writes exactly one JSON object to stdout on success.
//! Errors are returned to `main`, which prints them to stderr and exits
//! non-zero. `validate` prints its report before failing so the problems
//! are visible on stdout.

use std::path::Path;

use crate::build::{database_info, validate_database, DatabaseBuilder};
use crate::config::{BuildConfig, EngineConfig};
use crate::executor::QueryEngine;
use crate::loader::open_loader;
use crate::observability::{Logger, Severity};
use crate::planner::{ExplainPlan, QueryRequest};

use super::args::{Cli, Command};
use super::errors::{CliError, CliResult};
use super::io::{read_request, write_response};

/// Parse arguments and run the selected command
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    if cli.verbose {
        Logger::set_min_severity(Severity::Trace);
    }
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Build {
            input,
            output,
            config,
            primary_key,
            batch_size,
            index_fields,
            max_index_values,
            no_subdirectories,
        } => {
            let mut build_config = match config {
                Some(path) => BuildConfig::load(&path).map_err(|e| CliError::config_error(e.to_string()))?,
                None => BuildConfig::default(),
            };
            if let Some(field) = primary_key {
                build_config = build_config.with_primary_key(field);
            }
            if let Some(size) = batch_size {
                build_config = build_config.with_batch_size(size);
            }
            if let Some(fields) = index_fields {
                build_config = build_config.with_index_fields(fields);
            }
            if let Some(max) = max_index_values {
                build_config = build_config.with_max_index_values(max);
            }
            if no_subdirectories {
                build_config = build_config.with_subdirectories(false);
            }
            build(&input, &output, build_config)
        }
        Command::Validate { db_dir } => validate(&db_dir),
        Command::Info { db_dir } => info(&db_dir),
        Command::Query {
            source,
            config,
            explain,
        } => query(&source, config.as_deref(), explain),
    }
}

/// Build a database from `input` into `output`
pub fn build(input: &Path, output: &Path, config: BuildConfig) -> CliResult<()> {
    let builder =
        DatabaseBuilder::new(config).map_err(|e| CliError::config_error(e.to_string()))?;
    let summary = builder
        .build_from_file(input, output)
        .map_err(|e| CliError::build_failed(e.to_string()))?;
    write_response(&summary)
}

/// Validate a built database; fails when any error was found
pub fn validate(db_dir: &Path) -> CliResult<()> {
    let report = validate_database(db_dir);
    write_response(&report)?;

    if report.is_valid() {
        Ok(())
    } else {
        Err(CliError::validation_failed(format!(
            "{} problem(s) found, first: {}",
            report.errors.len(),
            report.errors.first().map(String::as_str).unwrap_or_default()
        )))
    }
}

/// Print a summary of a built database
pub fn info(db_dir: &Path) -> CliResult<()> {
    let info = database_info(db_dir).map_err(|e| CliError::engine_unavailable(e.to_string()))?;
    write_response(&info)
}

/// Run one query read from stdin against a directory or URL
pub fn query(source: &str, config: Option<&Path>, explain: bool) -> CliResult<()> {
    let engine_config = match config {
        Some(path) => EngineConfig::load(path).map_err(|e| CliError::config_error(e.to_string()))?,
        None => EngineConfig::default(),
    };

    let request: QueryRequest = serde_json::from_value(read_request()?)
        .map_err(|e| CliError::invalid_request(e.to_string()))?;
    let loader = open_loader(source).map_err(|e| CliError::engine_unavailable(e.to_string()))?;

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::io_error(format!("failed to create tokio runtime: {}", e)))?;

    rt.block_on(async {
        let engine = QueryEngine::open(loader, engine_config)
            .await
            .map_err(|e| CliError::engine_unavailable(e.to_string()))?;

        if explain {
            return write_response(&ExplainPlan::from_plan(&engine.plan(&request.filters)));
        }

        let result = engine
            .execute_query(&request.filters, &request.options)
            .await
            .map_err(|e| CliError::engine_unavailable(e.to_string()))?;
        write_response(&result)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::errors::CliErrorCode;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_build_then_validate_and_info() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("users.json");
        fs::write(
            &input,
            r#"[{"id": "u1", "status": "active"}, {"id": "u2", "status": "inactive"}]"#,
        )
        .unwrap();
        let output = temp.path().join("db");

        build(&input, &output, BuildConfig::default()).unwrap();
        validate(&output).unwrap();
        info(&output).unwrap();
    }

    #[test]
    fn test_build_failure_is_coded() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("dupes.json");
        fs::write(&input, r#"[{"id": "a"}, {"id": "a"}]"#).unwrap();

        let err = build(&input, &temp.path().join("db"), BuildConfig::default()).unwrap_err();
        assert_eq!(err.code(), CliErrorCode::BuildFailed);
        assert!(err.message().contains("\"a\""));
    }

    #[test]
    fn test_validate_missing_db_fails() {
        let temp = TempDir::new().unwrap();
        let err = validate(temp.path()).unwrap_err();
        assert_eq!(err.code(), CliErrorCode::ValidationFailed);
    }

    #[test]
    fn test_bad_config_file_is_config_error() {
        let temp = TempDir::new().unwrap();
        let config = temp.path().join("build.json");
        fs::write(&config, r#"{"maxIndexValues": 0}"#).unwrap();

        let err = run_command(Command::Build {
            input: temp.path().join("unused.json"),
            output: temp.path().join("db"),
            config: Some(config),
            primary_key: None,
            batch_size: None,
            index_fields: None,
            max_index_values: None,
            no_subdirectories: false,
        })
        .unwrap_err();
        assert_eq!(err.code(), CliErrorCode::ConfigError);
    }
}
