//! Storage loader subsystem for shardb
//!
//! The query engine reads a built database only through [`DataLoader`].
//! A backend implements one primitive, [`DataLoader::fetch`], which maps a
//! root-relative path such as `indexes/status.json` to its bytes. Every
//! typed load (metadata, manifest, indexes, records) is derived from it,
//! so the filesystem and HTTP backends behave identically.

mod errors;
mod fs;
mod http;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::index::{DatabaseMetadata, FieldIndex, PrimaryEntry, PrimaryIndex};
use crate::layout;
use crate::record;
use crate::shard::SplitMetadata;

pub use errors::{LoaderError, LoaderResult};
pub use fs::FsLoader;
pub use http::HttpLoader;

/// Read access to a built database
#[async_trait]
pub trait DataLoader: Send + Sync + fmt::Debug {
    /// Fetches the raw bytes at a root-relative path.
    ///
    /// Returns `Ok(None)` when the file does not exist.
    async fn fetch(&self, path: &str) -> LoaderResult<Option<Vec<u8>>>;

    /// Human-readable location of the database, for logs
    fn describe(&self) -> String;

    /// Loads `metadata.json`
    async fn load_metadata(&self) -> LoaderResult<DatabaseMetadata> {
        load_required(self, layout::METADATA_FILE).await
    }

    /// Loads `split-metadata.json`
    async fn load_split_metadata(&self) -> LoaderResult<SplitMetadata> {
        load_required(self, layout::SPLIT_METADATA_FILE).await
    }

    /// Loads `schema.json` when the database ships one
    async fn load_schema(&self) -> LoaderResult<Option<Value>> {
        load_json(self, layout::SCHEMA_FILE).await
    }

    /// Loads the index for `field`; `None` means the field is not indexed
    async fn load_index(&self, field: &str) -> LoaderResult<Option<FieldIndex>> {
        load_json(self, &layout::index_path(field)).await
    }

    /// Loads `indexes/_primary.json`
    async fn load_primary_index(&self) -> LoaderResult<PrimaryIndex> {
        load_required(self, &layout::primary_index_path()).await
    }

    /// Loads the record `id` from the shard `entry` points at.
    ///
    /// Returns `None` when the shard is absent or does not hold the record.
    async fn load_record(
        &self,
        id: &str,
        entry: &PrimaryEntry,
        split: &SplitMetadata,
    ) -> LoaderResult<Option<Value>> {
        let path = match split.find_file(&entry.file) {
            Some(file) => file.path(),
            None => layout::shard_path(&entry.file, entry.subdirectory.as_deref()),
        };

        let content: Option<Value> = load_json(self, &path).await?;
        Ok(content.and_then(|c| find_record(c, id, &split.primary_key_field)))
    }

    /// Best-effort check that a database is reachable
    async fn is_available(&self) -> bool {
        matches!(self.fetch(layout::METADATA_FILE).await, Ok(Some(_)))
    }
}

/// Fetches and parses a JSON file, `None` when absent
pub async fn load_json<L, T>(loader: &L, path: &str) -> LoaderResult<Option<T>>
where
    L: DataLoader + ?Sized,
    T: DeserializeOwned,
{
    let Some(bytes) = loader.fetch(path).await? else {
        return Ok(None);
    };

    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|source| LoaderError::Parse {
            path: path.to_string(),
            source,
        })
}

/// Fetches and parses a JSON file that must exist
pub async fn load_required<L, T>(loader: &L, path: &str) -> LoaderResult<T>
where
    L: DataLoader + ?Sized,
    T: DeserializeOwned,
{
    load_json(loader, path)
        .await?
        .ok_or_else(|| LoaderError::Missing(path.to_string()))
}

/// Picks the record with `id` out of a shard's content.
///
/// Individual shards hold one object, batch shards an array of them.
fn find_record(content: Value, id: &str, primary_key: &str) -> Option<Value> {
    match content {
        Value::Array(records) => records
            .into_iter()
            .find(|r| record::record_id_of(r, primary_key).as_deref() == Some(id)),
        object @ Value::Object(_) => {
            (record::record_id_of(&object, primary_key).as_deref() == Some(id)).then_some(object)
        }
        _ => None,
    }
}

/// Opens a loader for `source`: `http://` and `https://` URLs get the HTTP
/// backend, anything else is treated as a directory
pub fn open_loader(source: &str) -> LoaderResult<Arc<dyn DataLoader>> {
    if source.starts_with("http://") || source.starts_with("https://") {
        Ok(Arc::new(HttpLoader::new(source)?))
    } else {
        Ok(Arc::new(FsLoader::new(source)))
    }
}
