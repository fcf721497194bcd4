//! Database build orchestration
//!
//! One pass, in order:
//! 1. validate primary keys (nothing is written if this fails)
//! 2. clear `data/` and `indexes/` left by a previous build
//! 3. write shards and `split-metadata.json`
//! 4. walk records, write `indexes/` and `metadata.json`
//!
//! A failure at any step aborts the build. There is no partial-build
//! recovery; rerun the build from scratch.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;

use crate::config::BuildConfig;
use crate::index::IndexBuilder;
use crate::layout;
use crate::observability::{log_event_with_fields, Event, ObservationScope};
use crate::shard::ShardBuilder;

use super::errors::{BuildError, BuildResult};
use super::input;

/// Outcome of a successful build
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildSummary {
    pub output: PathBuf,
    pub total_records: usize,
    pub total_files: usize,
    pub indexed_fields: Vec<String>,
    pub skipped_fields: Vec<String>,
    pub build_id: String,
}

/// Builds a database directory from a record collection
#[derive(Debug, Clone)]
pub struct DatabaseBuilder {
    config: BuildConfig,
}

impl DatabaseBuilder {
    /// Creates a builder, rejecting invalid configuration up front
    pub fn new(config: BuildConfig) -> BuildResult<Self> {
        config
            .validate()
            .map_err(|e| BuildError::InvalidConfig(e.to_string()))?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Reads `input` (array or wrapping object) and builds into `output`
    pub fn build_from_file(&self, input: &Path, output: &Path) -> BuildResult<BuildSummary> {
        let records = input::read_input(input)?;
        self.build(&records, output)
    }

    /// Builds `records` into `output`, replacing any previous build there
    pub fn build(&self, records: &[Value], output: &Path) -> BuildResult<BuildSummary> {
        let output_display = output.display().to_string();
        let record_count = records.len().to_string();
        let scope = ObservationScope::with_fields(
            "BUILD",
            &[("output", &output_display), ("records", &record_count)],
        );

        match self.run(records, output) {
            Ok(summary) => {
                scope.complete_with_fields(&[
                    ("files", &summary.total_files.to_string()),
                    ("indexes", &summary.indexed_fields.len().to_string()),
                ]);
                Ok(summary)
            }
            Err(e) => {
                scope.fail(&e.to_string());
                Err(e)
            }
        }
    }

    fn run(&self, records: &[Value], output: &Path) -> BuildResult<BuildSummary> {
        let shard_builder = ShardBuilder::new(&self.config);
        let ids = shard_builder.validate_primary_keys(records)?;

        fs::create_dir_all(output).map_err(|e| BuildError::io(output, e))?;
        clear_previous_build(output)?;

        let manifest = shard_builder.write_shards(records, &ids, output)?;
        log_event_with_fields(
            Event::ShardsWritten,
            &[
                ("files", &manifest.total_files.to_string()),
                ("avg_file_size", &manifest.avg_file_size.to_string()),
            ],
        );

        let built = IndexBuilder::new(&self.config).build(records, &ids, &manifest);
        built.write_to_dir(output)?;

        Ok(BuildSummary {
            output: output.to_path_buf(),
            total_records: manifest.total_records,
            total_files: manifest.total_files,
            indexed_fields: built.field_indexes.iter().map(|i| i.field.clone()).collect(),
            skipped_fields: built
                .metadata
                .skipped_fields
                .iter()
                .map(|s| s.field.clone())
                .collect(),
            build_id: built.metadata.build_id,
        })
    }
}

/// Removes shard and index directories from an earlier build so stale
/// files cannot leak into the new one
fn clear_previous_build(output: &Path) -> BuildResult<()> {
    for dir in [layout::DATA_DIR, layout::INDEX_DIR] {
        let path = output.join(dir);
        match fs::remove_dir_all(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(BuildError::io(path, e)),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn users() -> Vec<Value> {
        vec![
            json!({"id": "u1", "age": 30, "status": "active"}),
            json!({"id": "u2", "age": 25, "status": "active"}),
            json!({"id": "u3", "age": 40, "status": "inactive"}),
        ]
    }

    #[test]
    fn test_build_writes_full_layout() {
        let temp = TempDir::new().unwrap();
        let builder = DatabaseBuilder::new(BuildConfig::default()).unwrap();

        let summary = builder.build(&users(), temp.path()).unwrap();

        assert_eq!(summary.total_records, 3);
        assert_eq!(summary.total_files, 3);
        assert!(summary.indexed_fields.contains(&"status".to_string()));
        assert!(temp.path().join("metadata.json").exists());
        assert!(temp.path().join("split-metadata.json").exists());
        assert!(temp.path().join("data/0000/record-000000.json").exists());
        assert!(temp.path().join("indexes/_primary.json").exists());
    }

    #[test]
    fn test_duplicate_key_writes_nothing() {
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("db");
        let builder = DatabaseBuilder::new(BuildConfig::default()).unwrap();
        let records = vec![json!({"id": "a"}), json!({"id": "b"}), json!({"id": "a"})];

        let err = builder.build(&records, &output).unwrap_err();

        assert!(err.to_string().contains("\"a\""));
        assert!(!output.exists());
    }

    #[test]
    fn test_rebuild_removes_stale_shards() {
        let temp = TempDir::new().unwrap();
        let builder = DatabaseBuilder::new(BuildConfig::default()).unwrap();
        builder.build(&users(), temp.path()).unwrap();

        builder.build(&users()[..1], temp.path()).unwrap();

        assert!(temp.path().join("data/0000/record-000000.json").exists());
        assert!(!temp.path().join("data/0000/record-000002.json").exists());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = BuildConfig::default().with_max_index_values(0);
        assert!(matches!(
            DatabaseBuilder::new(config),
            Err(BuildError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_build_from_wrapped_file() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("input.json");
        fs::write(&input, json!({"users": users(), "count": 3}).to_string()).unwrap();
        let output = temp.path().join("db");

        let summary = DatabaseBuilder::new(BuildConfig::default())
            .unwrap()
            .build_from_file(&input, &output)
            .unwrap();

        assert_eq!(summary.total_records, 3);
    }
}
