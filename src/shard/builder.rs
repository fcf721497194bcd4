//! Shard builder
//!
//! Validates primary keys and partitions records into shard files under
//! `data/`. File names and subdirectories depend only on record position,
//! so the same input always yields the same layout.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;

use crate::build::{BuildError, BuildResult};
use crate::config::BuildConfig;
use crate::layout::{self, checksum};
use crate::record;

use super::manifest::{ShardFile, SplitMetadata};

/// Writes records into shard files and produces the manifest
#[derive(Debug, Clone)]
pub struct ShardBuilder {
    primary_key: String,
    batch_size: usize,
    use_subdirectories: bool,
    checksums: bool,
}

impl ShardBuilder {
    /// Creates a builder from build configuration
    pub fn new(config: &BuildConfig) -> Self {
        Self {
            primary_key: config.primary_key.clone(),
            batch_size: config.batch_size,
            use_subdirectories: config.use_subdirectories,
            checksums: config.checksums,
        }
    }

    /// Checks the primary-key invariants and returns each record's id, in order.
    ///
    /// - the collection is non-empty
    /// - every record is an object carrying the key as its own field
    /// - the key is a scalar
    /// - no two records share an id; `null` counts, so only one record may
    ///   have a null key
    pub fn validate_primary_keys(&self, records: &[Value]) -> BuildResult<Vec<String>> {
        if records.is_empty() {
            return Err(BuildError::EmptyInput);
        }

        let mut seen = HashSet::with_capacity(records.len());
        let mut ids = Vec::with_capacity(records.len());

        for (index, rec) in records.iter().enumerate() {
            let object = rec.as_object().ok_or(BuildError::NotAnObject { index })?;

            let key = object
                .get(&self.primary_key)
                .ok_or_else(|| BuildError::MissingPrimaryKey {
                    index,
                    field: self.primary_key.clone(),
                })?;

            let id = record::record_id(key).ok_or_else(|| BuildError::InvalidPrimaryKey {
                index,
                field: self.primary_key.clone(),
            })?;

            if !seen.insert(id.clone()) {
                return Err(BuildError::DuplicatePrimaryKey { value: id });
            }
            ids.push(id);
        }

        Ok(ids)
    }

    /// Writes every shard under `<root>/data` and the manifest to
    /// `<root>/split-metadata.json`.
    ///
    /// `ids` must be the output of [`validate_primary_keys`](Self::validate_primary_keys)
    /// for the same records. Any write failure aborts the build.
    pub fn write_shards(
        &self,
        records: &[Value],
        ids: &[String],
        root: &Path,
    ) -> BuildResult<SplitMetadata> {
        let mut writer = ShardWriter::new(root.join(layout::DATA_DIR), self.checksums)?;

        let files = if self.batch_size <= 1 {
            let width = layout::pad_width(records.len());
            let mut files = Vec::with_capacity(records.len());
            for (index, (rec, id)) in records.iter().zip(ids).enumerate() {
                let subdirectory = self
                    .use_subdirectories
                    .then(|| layout::subdirectory_name(index / layout::RECORDS_PER_SUBDIRECTORY));
                files.push(writer.write(
                    layout::record_file_name(index, width),
                    subdirectory,
                    rec,
                    std::slice::from_ref(id),
                )?);
            }
            files
        } else {
            let batch_count = records.len().div_ceil(self.batch_size);
            let width = layout::pad_width(batch_count);
            let mut files = Vec::with_capacity(batch_count);
            for (batch_index, (batch, batch_ids)) in records
                .chunks(self.batch_size)
                .zip(ids.chunks(self.batch_size))
                .enumerate()
            {
                let subdirectory = self.use_subdirectories.then(|| {
                    layout::subdirectory_name(batch_index / layout::BATCHES_PER_SUBDIRECTORY)
                });
                files.push(writer.write(
                    layout::batch_file_name(batch_index, width),
                    subdirectory,
                    batch,
                    batch_ids,
                )?);
            }
            files
        };

        let manifest = SplitMetadata::from_files(
            files,
            self.primary_key.clone(),
            (self.batch_size > 1).then_some(self.batch_size),
            self.use_subdirectories,
        );
        manifest.write_to_dir(root)?;

        Ok(manifest)
    }
}

/// Writes shard files, creating subdirectories on first use
struct ShardWriter {
    data_dir: PathBuf,
    checksums: bool,
    created_dirs: HashSet<String>,
}

impl ShardWriter {
    fn new(data_dir: PathBuf, checksums: bool) -> BuildResult<Self> {
        fs::create_dir_all(&data_dir).map_err(|e| BuildError::io(&data_dir, e))?;
        Ok(Self {
            data_dir,
            checksums,
            created_dirs: HashSet::new(),
        })
    }

    fn write<T: Serialize + ?Sized>(
        &mut self,
        filename: String,
        subdirectory: Option<String>,
        content: &T,
        ids: &[String],
    ) -> BuildResult<ShardFile> {
        let dir = match &subdirectory {
            Some(sub) => {
                let dir = self.data_dir.join(sub);
                if self.created_dirs.insert(sub.clone()) {
                    fs::create_dir_all(&dir).map_err(|e| BuildError::io(&dir, e))?;
                }
                dir
            }
            None => self.data_dir.clone(),
        };

        let bytes = serde_json::to_vec(content).map_err(|source| BuildError::Serialize {
            what: filename.clone(),
            source,
        })?;

        let path = dir.join(&filename);
        fs::write(&path, &bytes).map_err(|e| BuildError::io(&path, e))?;

        Ok(ShardFile {
            record_count: ids.len(),
            size: bytes.len() as u64,
            record_ids: ids.to_vec(),
            checksum: self
                .checksums
                .then(|| checksum::format_checksum(checksum::compute_checksum(&bytes))),
            filename,
            subdirectory,
        })
    }
}
