//! Shard manifest (`split-metadata.json`)
//!
//! The manifest is the authoritative list of shard files. Format:
//!
//! ```json
//! {
//!   "totalRecords": 3,
//!   "totalFiles": 3,
//!   "avgFileSize": 41,
//!   "primaryKeyField": "id",
//!   "useSubdirectories": true,
//!   "files": [
//!     {"filename": "record-000000.json", "recordCount": 1, "size": 41,
//!      "recordIds": ["u1"], "subdirectory": "0000", "checksum": "crc32:1c291ca3"}
//!   ]
//! }
//! ```
//!
//! `batchSize` is present only for batch builds.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::build::{BuildError, BuildResult};
use crate::layout;

/// One shard file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShardFile {
    /// File name inside `data/` (or its subdirectory)
    pub filename: String,
    /// Records stored in the file
    pub record_count: usize,
    /// File size in bytes
    pub size: u64,
    /// Ids of the stored records, in file order
    pub record_ids: Vec<String>,
    /// Subdirectory under `data/`, when subdirectories are enabled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subdirectory: Option<String>,
    /// `crc32:xxxxxxxx` over the file bytes, when checksums are enabled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
}

impl ShardFile {
    /// Path of this shard relative to the database root
    pub fn path(&self) -> String {
        layout::shard_path(&self.filename, self.subdirectory.as_deref())
    }
}

/// Shard manifest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitMetadata {
    pub total_records: usize,
    pub total_files: usize,
    /// Mean shard size in bytes, rounded down
    pub avg_file_size: u64,
    pub primary_key_field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<usize>,
    pub use_subdirectories: bool,
    pub files: Vec<ShardFile>,
}

impl SplitMetadata {
    /// Assembles a manifest from written shards, computing the aggregates
    pub fn from_files(
        files: Vec<ShardFile>,
        primary_key_field: impl Into<String>,
        batch_size: Option<usize>,
        use_subdirectories: bool,
    ) -> Self {
        let total_records = files.iter().map(|f| f.record_count).sum();
        let total_size: u64 = files.iter().map(|f| f.size).sum();
        let avg_file_size = if files.is_empty() {
            0
        } else {
            total_size / files.len() as u64
        };

        Self {
            total_records,
            total_files: files.len(),
            avg_file_size,
            primary_key_field: primary_key_field.into(),
            batch_size,
            use_subdirectories,
            files,
        }
    }

    /// Finds a shard by file name
    pub fn find_file(&self, filename: &str) -> Option<&ShardFile> {
        self.files.iter().find(|f| f.filename == filename)
    }

    /// Every record id in manifest order
    pub fn record_ids(&self) -> impl Iterator<Item = &str> {
        self.files
            .iter()
            .flat_map(|f| f.record_ids.iter().map(String::as_str))
    }

    /// Serializes the manifest to pretty-printed JSON
    pub fn to_json(&self) -> BuildResult<String> {
        serde_json::to_string_pretty(self).map_err(|source| BuildError::Serialize {
            what: layout::SPLIT_METADATA_FILE.to_string(),
            source,
        })
    }

    /// Deserializes a manifest from JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Writes the manifest to `<root>/split-metadata.json`
    pub fn write_to_dir(&self, root: &Path) -> BuildResult<()> {
        let path = root.join(layout::SPLIT_METADATA_FILE);
        fs::write(&path, self.to_json()?).map_err(|e| BuildError::io(&path, e))
    }

    /// Reads the manifest from `<root>/split-metadata.json`
    pub fn read_from_dir(root: &Path) -> BuildResult<Self> {
        let path = root.join(layout::SPLIT_METADATA_FILE);
        let content = fs::read_to_string(&path).map_err(|e| BuildError::io(&path, e))?;
        Self::from_json(&content).map_err(|source| BuildError::Parse { path, source })
    }
}
