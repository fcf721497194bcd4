//! Database summary for `shardb info`

use std::path::Path;

use serde::Serialize;

use crate::index::{DatabaseMetadata, IndexDescriptor, SkippedField};
use crate::layout;
use crate::shard::SplitMetadata;

use super::errors::BuildResult;
use super::files;

/// What a built database contains
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseInfo {
    pub total_records: usize,
    pub total_files: usize,
    pub avg_file_size: u64,
    pub primary_key_field: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<usize>,
    pub use_subdirectories: bool,
    pub field_count: usize,
    pub indexes: Vec<IndexDescriptor>,
    pub skipped_fields: Vec<SkippedField>,
    pub generated_at: String,
    pub build_id: String,
    pub version: String,
}

/// Reads metadata and manifest of the database at `root`
pub fn database_info(root: &Path) -> BuildResult<DatabaseInfo> {
    let metadata: DatabaseMetadata = files::read_json(&root.join(layout::METADATA_FILE))?;
    let manifest = SplitMetadata::read_from_dir(root)?;

    Ok(DatabaseInfo {
        total_records: metadata.total_records,
        total_files: manifest.total_files,
        avg_file_size: manifest.avg_file_size,
        primary_key_field: manifest.primary_key_field,
        batch_size: manifest.batch_size,
        use_subdirectories: manifest.use_subdirectories,
        field_count: metadata.fields.len(),
        indexes: metadata.indexes,
        skipped_fields: metadata.skipped_fields,
        generated_at: metadata.generated_at,
        build_id: metadata.build_id,
        version: metadata.version,
    })
}
