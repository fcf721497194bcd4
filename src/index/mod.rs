//! Index subsystem for shardb
//!
//! Build-time construction of per-field inverted indexes (value -> record
//! ids), the primary index (record id -> shard location) and the database
//! metadata that describes them. Everything here is written once and read
//! many times by the query engine.

mod builder;
mod types;
mod walker;

pub use builder::{BuiltIndexes, IndexBuilder};
pub use types::{
    DatabaseMetadata, FieldIndex, FieldIndexStats, FieldType, IndexDescriptor, IndexEntry,
    PrimaryEntry, PrimaryIndex, SkippedField,
};
pub use walker::{FieldWalker, PathStats};
