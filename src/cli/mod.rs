//! CLI module for shardb
//!
//! Provides the command-line interface for:
//! - build: turn a JSON file into a database directory
//! - validate: check a built directory against its manifest
//! - info: summarize a built directory
//! - query: run one query from stdin against a directory or URL

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{build, info, query, run, run_command, validate};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_request, write_response};
