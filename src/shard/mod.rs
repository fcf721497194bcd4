//! Shard subsystem
//!
//! Splits the record collection into static files:
//!
//! - individual mode (`batch_size <= 1`): one JSON object per file
//! - batch mode: consecutive records as a JSON array, up to `batch_size`
//!   per file
//!
//! Subdirectories (every 1000 individual or 100 batch shards) only bound
//! directory fan-out; they carry no meaning.

mod builder;
mod manifest;

pub use builder::ShardBuilder;
pub use manifest::{ShardFile, SplitMetadata};
