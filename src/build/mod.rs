//! Build subsystem for shardb
//!
//! Turns a JSON record collection into a database directory:
//!
//! ```text
//! <root>/
//!   metadata.json
//!   split-metadata.json
//!   data/[0000/]record-000000.json | batch-000000.json
//!   indexes/_primary.json
//!   indexes/<field>.json
//! ```
//!
//! Also hosts the offline checks run against a built directory
//! (`validate`, `info`).

mod builder;
mod errors;
pub(crate) mod files;
mod info;
mod input;
mod validate;

pub use builder::{BuildSummary, DatabaseBuilder};
pub use errors::{BuildError, BuildResult};
pub use info::{database_info, DatabaseInfo};
pub use input::{extract_records, read_input};
pub use validate::{validate_database, ValidationReport};
