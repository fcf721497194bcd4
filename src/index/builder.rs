//! Index builder
//!
//! Runs the field walk over every record, applies the field-selection
//! policy, and emits one inverted index per retained path, the primary
//! index, and the database metadata.
//!
//! Policy, applied after the walk:
//! 1. paths that never held a scalar (pure containers, empty arrays) get no index
//! 2. paths outside the allow-list, when one is configured, are dropped
//! 3. paths with more distinct values than `max_index_values` are dropped
//!    and listed in `metadata.skippedFields`
//!
//! The primary index is exempt from the policy.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde_json::Value;
use uuid::Uuid;

use crate::build::{files, BuildError, BuildResult};
use crate::config::BuildConfig;
use crate::layout;
use crate::observability::{log_event_with_fields, trace_event, Event};
use crate::shard::SplitMetadata;

use super::types::{
    DatabaseMetadata, FieldIndex, IndexDescriptor, PrimaryEntry, PrimaryIndex, SkippedField,
};
use super::walker::FieldWalker;

/// Everything the index builder produces, before it is written
#[derive(Debug, Clone)]
pub struct BuiltIndexes {
    pub primary: PrimaryIndex,
    pub field_indexes: Vec<FieldIndex>,
    pub metadata: DatabaseMetadata,
}

impl BuiltIndexes {
    /// Looks up a built field index by path
    pub fn field_index(&self, field: &str) -> Option<&FieldIndex> {
        self.field_indexes.iter().find(|i| i.field == field)
    }

    /// Writes `indexes/_primary.json`, `indexes/<field>.json` and `metadata.json`
    pub fn write_to_dir(&self, root: &Path) -> BuildResult<()> {
        let index_dir = root.join(layout::INDEX_DIR);
        fs::create_dir_all(&index_dir).map_err(|e| BuildError::io(&index_dir, e))?;

        files::write_json(&root.join(layout::primary_index_path()), &self.primary, false)?;

        for index in &self.field_indexes {
            let size = files::write_json(&root.join(layout::index_path(&index.field)), index, false)?;
            trace_event(
                Event::IndexWritten,
                &[("field", &index.field), ("bytes", &size.to_string())],
            );
        }

        files::write_json(&root.join(layout::METADATA_FILE), &self.metadata, true)?;
        Ok(())
    }
}

/// Builds field indexes, the primary index and database metadata
#[derive(Debug, Clone)]
pub struct IndexBuilder {
    primary_key: String,
    index_fields: Option<HashSet<String>>,
    max_index_values: usize,
}

impl IndexBuilder {
    /// Creates a builder from build configuration
    pub fn new(config: &BuildConfig) -> Self {
        Self {
            primary_key: config.primary_key.clone(),
            index_fields: config
                .index_fields
                .as_ref()
                .map(|fields| fields.iter().cloned().collect()),
            max_index_values: config.max_index_values,
        }
    }

    /// Builds all indexes for `records`.
    ///
    /// `ids` are the validated record ids in input order and `manifest` the
    /// shard layout those records were written to.
    pub fn build(&self, records: &[Value], ids: &[String], manifest: &SplitMetadata) -> BuiltIndexes {
        let mut walker = FieldWalker::new();
        for (position, (record, id)) in records.iter().zip(ids).enumerate() {
            walker.observe_record(position, id, record);
        }

        let total_records = walker.total_records();
        let fields = walker.fields();

        let mut field_indexes = Vec::new();
        let mut descriptors = Vec::new();
        let mut skipped_fields = Vec::new();

        for (field, stats) in walker.into_paths() {
            if !stats.has_values() {
                continue;
            }

            if let Some(allowed) = &self.index_fields {
                if !allowed.contains(&field) {
                    trace_event(
                        Event::IndexSkipped,
                        &[("field", &field), ("reason", "not_selected")],
                    );
                    continue;
                }
            }

            let unique_values = stats.unique_values();
            if unique_values > self.max_index_values {
                log_event_with_fields(
                    Event::IndexSkipped,
                    &[
                        ("field", &field),
                        ("reason", "too_many_values"),
                        ("unique_values", &unique_values.to_string()),
                    ],
                );
                skipped_fields.push(SkippedField {
                    field,
                    unique_values,
                    max_index_values: self.max_index_values,
                });
                continue;
            }

            descriptors.push(IndexDescriptor {
                field: field.clone(),
                field_type: stats.field_type(),
                unique_values,
                coverage: stats.coverage(total_records),
            });
            field_indexes.push(stats.into_field_index(field, total_records));
        }

        let metadata = DatabaseMetadata {
            total_records,
            primary_key_field: self.primary_key.clone(),
            fields,
            indexes: descriptors,
            skipped_fields,
            generated_at: chrono::Utc::now().to_rfc3339(),
            build_id: Uuid::new_v4().to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        };

        BuiltIndexes {
            primary: self.primary_index(manifest),
            field_indexes,
            metadata,
        }
    }

    fn primary_index(&self, manifest: &SplitMetadata) -> PrimaryIndex {
        let mut entries = Vec::with_capacity(manifest.total_records);
        for file in &manifest.files {
            for id in &file.record_ids {
                entries.push(PrimaryEntry {
                    id: id.clone(),
                    index: entries.len(),
                    file: file.filename.clone(),
                    subdirectory: file.subdirectory.clone(),
                });
            }
        }

        PrimaryIndex {
            field: self.primary_key.clone(),
            entries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::FieldType;
    use crate::shard::ShardFile;
    use serde_json::json;
    use tempfile::TempDir;

    fn users() -> Vec<Value> {
        vec![
            json!({"id": "u1", "age": 30, "status": "active", "tags": ["x", "y"]}),
            json!({"id": "u2", "age": 25, "status": "active", "tags": ["y"]}),
            json!({"id": "u3", "age": 40, "status": "inactive", "address": {"city": "Oslo"}}),
        ]
    }

    fn ids() -> Vec<String> {
        vec!["u1".into(), "u2".into(), "u3".into()]
    }

    fn manifest() -> SplitMetadata {
        let files = ids()
            .into_iter()
            .enumerate()
            .map(|(i, id)| ShardFile {
                filename: layout::record_file_name(i, 6),
                record_count: 1,
                size: 10,
                record_ids: vec![id],
                subdirectory: Some("0000".to_string()),
                checksum: None,
            })
            .collect();
        SplitMetadata::from_files(files, "id", None, true)
    }

    #[test]
    fn test_status_index_groups_ids() {
        let built = IndexBuilder::new(&BuildConfig::default()).build(&users(), &ids(), &manifest());

        let status = built.field_index("status").unwrap();
        assert_eq!(status.entries.len(), 2);
        assert_eq!(status.entries[0].value, json!("active"));
        assert_eq!(status.entries[0].record_ids, vec!["u1", "u2"]);
        assert_eq!(status.entries[1].record_ids, vec!["u3"]);
        assert_eq!(built.metadata.total_records, 3);
    }

    #[test]
    fn test_descriptors_and_fields() {
        let built = IndexBuilder::new(&BuildConfig::default()).build(&users(), &ids(), &manifest());
        let metadata = &built.metadata;

        assert_eq!(metadata.descriptor("tags").unwrap().field_type, FieldType::Array);
        assert_eq!(metadata.descriptor("age").unwrap().field_type, FieldType::Primitive);
        let city = metadata.descriptor("address.city").unwrap();
        assert!((city.coverage - 1.0 / 3.0).abs() < 1e-9);

        assert!(metadata.has_field("address"));
        assert!(!metadata.is_indexed("address"));
        assert!(!metadata.build_id.is_empty());
    }

    #[test]
    fn test_cardinality_cap_skips_and_records() {
        let config = BuildConfig::default().with_max_index_values(2);
        let built = IndexBuilder::new(&config).build(&users(), &ids(), &manifest());

        assert!(built.field_index("age").is_none());
        assert!(built.field_index("id").is_none());
        assert!(built.field_index("status").is_some());

        let skipped: Vec<&str> = built
            .metadata
            .skipped_fields
            .iter()
            .map(|s| s.field.as_str())
            .collect();
        assert!(skipped.contains(&"age"));
        assert!(skipped.contains(&"id"));
        assert_eq!(built.metadata.skipped_fields[0].max_index_values, 2);
    }

    #[test]
    fn test_allow_list_restricts_indexes_but_not_primary() {
        let config = BuildConfig::default().with_index_fields(["status"]);
        let built = IndexBuilder::new(&config).build(&users(), &ids(), &manifest());

        assert_eq!(built.field_indexes.len(), 1);
        assert_eq!(built.field_indexes[0].field, "status");
        assert_eq!(built.primary.len(), 3);
        assert!(built.metadata.skipped_fields.is_empty());
    }

    #[test]
    fn test_primary_index_locates_every_record() {
        let built = IndexBuilder::new(&BuildConfig::default()).build(&users(), &ids(), &manifest());

        assert_eq!(built.primary.field, "id");
        let entry = &built.primary.entries[2];
        assert_eq!(entry.id, "u3");
        assert_eq!(entry.index, 2);
        assert_eq!(entry.file, "record-000002.json");
        assert_eq!(entry.subdirectory.as_deref(), Some("0000"));
    }

    #[test]
    fn test_write_to_dir_layout() {
        let temp = TempDir::new().unwrap();
        let built = IndexBuilder::new(&BuildConfig::default()).build(&users(), &ids(), &manifest());

        built.write_to_dir(temp.path()).unwrap();

        assert!(temp.path().join("metadata.json").exists());
        assert!(temp.path().join("indexes/_primary.json").exists());
        assert!(temp.path().join("indexes/status.json").exists());
        assert!(temp.path().join("indexes/address.city.json").exists());

        let status: FieldIndex = files::read_json(&temp.path().join("indexes/status.json")).unwrap();
        assert_eq!(&status, built.field_index("status").unwrap());
    }
}
