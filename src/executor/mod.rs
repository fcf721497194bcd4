//! Query executor subsystem for shardb
//!
//! Carries out query plans against a built database:
//!
//! - `filters`: predicate evaluation shared by index lookups and record checks
//! - `sorter`: stable multi-key sort on nested values
//! - `cache`: engine-lifetime index and record caches
//! - `engine`: [`QueryEngine`], the entry point
//!
//! Results are deterministic: the same database and query always yield the
//! same records in the same order.

mod cache;
mod engine;
mod errors;
mod filters;
mod result;
mod sorter;

pub use cache::{IndexCache, RecordCache};
pub use engine::QueryEngine;
pub use errors::{EngineError, EngineResult};
pub use filters::{compare_numbers, values_equal, PredicateFilter};
pub use result::QueryResult;
pub use sorter::ResultSorter;
