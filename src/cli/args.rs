//! CLI argument definitions using clap
//!
//! Commands:
//! - shardb build <input> [--output <dir>] [build flags]
//! - shardb validate <db-dir>
//! - shardb info <db-dir>
//! - shardb query <db-dir-or-url> [--explain]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// shardb - static, sharded JSON databases with per-field indexes
#[derive(Parser, Debug)]
#[command(name = "shardb")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Log at TRACE instead of INFO (logs go to stderr)
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build a database directory from a JSON file
    Build {
        /// JSON array of records, or an object wrapping one
        input: PathBuf,

        /// Output directory
        #[arg(long, short, default_value = "./db")]
        output: PathBuf,

        /// Build configuration file; flags override it
        #[arg(long)]
        config: Option<PathBuf>,

        /// Primary key field
        #[arg(long)]
        primary_key: Option<String>,

        /// Records per shard file
        #[arg(long)]
        batch_size: Option<usize>,

        /// Comma-separated field paths to index
        #[arg(long, value_delimiter = ',')]
        index_fields: Option<Vec<String>>,

        /// Skip indexing fields with more distinct values than this
        #[arg(long)]
        max_index_values: Option<usize>,

        /// Write every shard directly under data/
        #[arg(long)]
        no_subdirectories: bool,
    },

    /// Check a built database for missing or inconsistent files
    Validate {
        /// Database directory
        db_dir: PathBuf,
    },

    /// Print a summary of a built database
    Info {
        /// Database directory
        db_dir: PathBuf,
    },

    /// Run one query read from stdin as {"filters": [...], "options": {...}}
    Query {
        /// Database directory or http(s):// base URL
        source: String,

        /// Engine configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Print the resolution plan instead of running the query
        #[arg(long)]
        explain: bool,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
