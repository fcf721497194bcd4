//! Database validation
//!
//! Checks a built database directory against its own manifest:
//! - `metadata.json` and `split-metadata.json` parse and agree on the record count
//! - every shard exists, matches its checksum (when recorded) and holds
//!   exactly the record ids the manifest lists for it
//! - the primary index covers exactly the manifest's ids, in order
//! - every index listed in metadata parses
//!
//! Problems are collected into a report instead of stopping at the first one.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::Serialize;
use serde_json::Value;

use crate::index::{DatabaseMetadata, FieldIndex, PrimaryIndex};
use crate::layout::{self, checksum};
use crate::observability::{log_event_with_fields, Event};
use crate::record;
use crate::shard::{ShardFile, SplitMetadata};

use super::files;

/// Outcome of [`validate_database`]
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub files_checked: usize,
    pub records_checked: usize,
    pub indexes_checked: usize,
}

impl ValidationReport {
    /// True when no errors were found; warnings do not count
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }
}

/// Validates the database rooted at `root`
pub fn validate_database(root: &Path) -> ValidationReport {
    let mut report = ValidationReport::default();
    check_database(root, &mut report);

    log_event_with_fields(
        Event::ValidateComplete,
        &[
            ("root", &root.display().to_string()),
            ("errors", &report.errors.len().to_string()),
            ("warnings", &report.warnings.len().to_string()),
        ],
    );
    report
}

fn check_database(root: &Path, report: &mut ValidationReport) {
    let metadata: DatabaseMetadata = match files::read_json(&root.join(layout::METADATA_FILE)) {
        Ok(metadata) => metadata,
        Err(e) => {
            report.error(format!("metadata unreadable: {}", e));
            return;
        }
    };

    let manifest = match SplitMetadata::read_from_dir(root) {
        Ok(manifest) => manifest,
        Err(e) => {
            report.error(format!("shard manifest unreadable: {}", e));
            return;
        }
    };

    if metadata.total_records != manifest.total_records {
        report.error(format!(
            "metadata lists {} records but the manifest lists {}",
            metadata.total_records, manifest.total_records
        ));
    }
    if manifest.total_files != manifest.files.len() {
        report.error(format!(
            "manifest totalFiles is {} but {} files are listed",
            manifest.total_files,
            manifest.files.len()
        ));
    }

    for file in &manifest.files {
        check_shard(root, &manifest, file, report);
    }

    check_primary_index(root, &manifest, report);

    for descriptor in &metadata.indexes {
        let path = root.join(layout::index_path(&descriptor.field));
        match files::read_json::<FieldIndex>(&path) {
            Ok(index) => {
                report.indexes_checked += 1;
                if index.unique_values() != descriptor.unique_values {
                    report.warn(format!(
                        "index '{}' has {} entries, metadata says {}",
                        descriptor.field,
                        index.unique_values(),
                        descriptor.unique_values
                    ));
                }
            }
            Err(e) => report.error(format!("index '{}' unreadable: {}", descriptor.field, e)),
        }
    }

    for skipped in &metadata.skipped_fields {
        report.warn(format!(
            "field '{}' not indexed: {} unique values exceeds {}",
            skipped.field, skipped.unique_values, skipped.max_index_values
        ));
    }
}

fn check_shard(root: &Path, manifest: &SplitMetadata, file: &ShardFile, report: &mut ValidationReport) {
    let relative = file.path();
    let bytes = match fs::read(root.join(&relative)) {
        Ok(bytes) => bytes,
        Err(e) => {
            report.error(format!("shard {} unreadable: {}", relative, e));
            return;
        }
    };
    report.files_checked += 1;

    if let Some(expected) = &file.checksum {
        if !checksum::verify_checksum(&bytes, expected) {
            report.error(format!("shard {} checksum mismatch", relative));
        }
    }
    if bytes.len() as u64 != file.size {
        report.warn(format!(
            "shard {} is {} bytes, manifest says {}",
            relative,
            bytes.len(),
            file.size
        ));
    }

    let content: Value = match serde_json::from_slice(&bytes) {
        Ok(content) => content,
        Err(e) => {
            report.error(format!("shard {} is not valid JSON: {}", relative, e));
            return;
        }
    };

    let records = match (&content, manifest.batch_size.is_some()) {
        (Value::Array(records), true) => records.iter().collect::<Vec<_>>(),
        (Value::Object(_), false) => vec![&content],
        _ => {
            report.error(format!("shard {} has the wrong shape for this build mode", relative));
            return;
        }
    };

    let ids: Vec<Option<String>> = records
        .iter()
        .map(|r| record::record_id_of(r, &manifest.primary_key_field))
        .collect();
    report.records_checked += ids.len();

    if records.len() != file.record_count {
        report.error(format!(
            "shard {} holds {} records, manifest says {}",
            relative,
            records.len(),
            file.record_count
        ));
    }
    let expected: Vec<Option<String>> = file.record_ids.iter().cloned().map(Some).collect();
    if ids != expected {
        report.error(format!("shard {} record ids differ from the manifest", relative));
    }
}

fn check_primary_index(root: &Path, manifest: &SplitMetadata, report: &mut ValidationReport) {
    let primary: PrimaryIndex = match files::read_json(&root.join(layout::primary_index_path())) {
        Ok(primary) => primary,
        Err(e) => {
            report.error(format!("primary index unreadable: {}", e));
            return;
        }
    };

    if primary.field != manifest.primary_key_field {
        report.error(format!(
            "primary index is keyed by '{}' but the manifest uses '{}'",
            primary.field, manifest.primary_key_field
        ));
    }

    let manifest_ids: Vec<&str> = manifest.record_ids().collect();
    let primary_ids: Vec<&str> = primary.ids().collect();
    if manifest_ids != primary_ids {
        let known: HashSet<&str> = manifest_ids.iter().copied().collect();
        let unknown = primary_ids.iter().filter(|id| !known.contains(*id)).count();
        report.error(format!(
            "primary index lists {} ids ({} unknown to the manifest), manifest lists {}",
            primary_ids.len(),
            unknown,
            manifest_ids.len()
        ));
        return;
    }

    for entry in &primary.entries {
        let located = manifest
            .find_file(&entry.file)
            .is_some_and(|f| f.subdirectory == entry.subdirectory && f.record_ids.contains(&entry.id));
        if !located {
            report.error(format!("primary index points '{}' at the wrong shard", entry.id));
        }
    }
}
