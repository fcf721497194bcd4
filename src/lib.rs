//! shardb - a read-only, sharded JSON database served as static files
//!
//! A build step splits a JSON array of records into shard files, writes
//! one inverted index per field plus a primary index, and records the
//! layout in a manifest. At runtime the query engine reads that layout
//! through a [`loader::DataLoader`] (local directory or HTTP base URL),
//! resolves filters through indexes where it can, falls back to scanning
//! records where it cannot, and re-validates every candidate before
//! sorting and paginating.

pub mod build;
pub mod cli;
pub mod config;
pub mod executor;
pub mod index;
pub mod layout;
pub mod loader;
pub mod observability;
pub mod planner;
pub mod record;
pub mod shard;

pub use build::{BuildSummary, DatabaseBuilder};
pub use config::{BuildConfig, EngineConfig};
pub use executor::{QueryEngine, QueryResult};
pub use loader::{open_loader, DataLoader, FsLoader, HttpLoader};
pub use planner::{Filter, FilterOperator, QueryOptions, SortKey};
