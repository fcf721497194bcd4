//! Persisted index and metadata types
//!
//! Serialized with camelCase keys; see `crate::layout` for where each
//! file lives.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How a field path was reached during the walk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Only scalars, never through an array or as a container
    Primitive,
    /// Reached through at least one array
    Array,
    /// Used as a container for deeper paths
    Nested,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Primitive => "primitive",
            FieldType::Array => "array",
            FieldType::Nested => "nested",
        }
    }
}

/// One distinct value of a field and the records holding it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexEntry {
    pub value: Value,
    pub record_ids: Vec<String>,
}

/// Per-index statistics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldIndexStats {
    pub unique_values: usize,
    pub total_records: usize,
    /// Fraction of records with at least one observation at the path
    pub coverage: f64,
}

/// Inverted index for one field path (`indexes/<field>.json`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldIndex {
    pub field: String,
    /// Most common values first
    pub entries: Vec<IndexEntry>,
    pub metadata: FieldIndexStats,
}

impl FieldIndex {
    /// Number of distinct values
    pub fn unique_values(&self) -> usize {
        self.entries.len()
    }
}

/// Location of one record (`indexes/_primary.json` entry)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimaryEntry {
    /// Record id
    pub id: String,
    /// Position of the record in the build input
    pub index: usize,
    /// Shard file holding the record
    pub file: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subdirectory: Option<String>,
}

/// Record id -> shard location for every record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimaryIndex {
    /// Primary key field name
    pub field: String,
    /// One entry per record, in build input order
    pub entries: Vec<PrimaryEntry>,
}

impl PrimaryIndex {
    /// Record ids in build input order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.id.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Builds an id -> entry position map for constant-time lookups
    pub fn positions(&self) -> HashMap<String, usize> {
        self.entries
            .iter()
            .enumerate()
            .map(|(pos, e)| (e.id.clone(), pos))
            .collect()
    }
}

/// Description of one retained field index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexDescriptor {
    pub field: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub unique_values: usize,
    pub coverage: f64,
}

/// A discovered field that was not indexed because of its cardinality
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedField {
    pub field: String,
    pub unique_values: usize,
    pub max_index_values: usize,
}

/// Database metadata (`metadata.json`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseMetadata {
    pub total_records: usize,
    pub primary_key_field: String,
    /// Every discovered field path, sorted
    pub fields: Vec<String>,
    /// Retained field indexes, sorted by field
    pub indexes: Vec<IndexDescriptor>,
    #[serde(default)]
    pub skipped_fields: Vec<SkippedField>,
    /// RFC3339 build time
    #[serde(default)]
    pub generated_at: String,
    /// Fresh per build so clients can tell rebuilds apart
    #[serde(default)]
    pub build_id: String,
    /// Version of the generator that wrote the database
    #[serde(default)]
    pub version: String,
}

impl DatabaseMetadata {
    /// Descriptor of the index for `field`, if one was built
    pub fn descriptor(&self, field: &str) -> Option<&IndexDescriptor> {
        self.indexes.iter().find(|d| d.field == field)
    }

    /// Returns true when an index was built for `field`
    pub fn is_indexed(&self, field: &str) -> bool {
        self.descriptor(field).is_some()
    }

    /// Returns true when the walk discovered `field`
    pub fn has_field(&self, field: &str) -> bool {
        self.fields.binary_search_by(|f| f.as_str().cmp(field)).is_ok()
    }
}
