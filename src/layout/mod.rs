//! Persisted database layout
//!
//! Every path is relative to the database root and `/`-separated so the
//! same string works as a filesystem path component and as a URL suffix.
//!
//! ```text
//! <root>/
//!   metadata.json            database metadata
//!   split-metadata.json      shard manifest
//!   schema.json              optional, produced by an external generator
//!   data/[<subdir>/]<shard>  one record (object) or a batch (array) per file
//!   indexes/_primary.json    record id -> shard location
//!   indexes/<field>.json     value -> record ids, one file per field path
//! ```

pub mod checksum;

/// Database metadata file
pub const METADATA_FILE: &str = "metadata.json";

/// Shard manifest file
pub const SPLIT_METADATA_FILE: &str = "split-metadata.json";

/// Optional validation schema
pub const SCHEMA_FILE: &str = "schema.json";

/// Directory holding shard files
pub const DATA_DIR: &str = "data";

/// Directory holding index files
pub const INDEX_DIR: &str = "indexes";

/// Name of the primary index inside [`INDEX_DIR`]
pub const PRIMARY_INDEX_NAME: &str = "_primary";

/// Individual shards per subdirectory
pub const RECORDS_PER_SUBDIRECTORY: usize = 1000;

/// Batch shards per subdirectory
pub const BATCHES_PER_SUBDIRECTORY: usize = 100;

const MIN_PAD_WIDTH: usize = 6;

const INDEX_ESCAPE: char = '~';

/// Zero-pad width for shard numbers when `count` shards are written.
pub fn pad_width(count: usize) -> usize {
    count.to_string().len().max(MIN_PAD_WIDTH)
}

/// File name of the individual shard holding record `index`.
pub fn record_file_name(index: usize, width: usize) -> String {
    format!("record-{:0width$}.json", index, width = width)
}

/// File name of batch shard `batch_index`.
pub fn batch_file_name(batch_index: usize, width: usize) -> String {
    format!("batch-{:0width$}.json", batch_index, width = width)
}

/// Subdirectory name for bucket `bucket`.
pub fn subdirectory_name(bucket: usize) -> String {
    format!("{:04}", bucket)
}

/// Path of a shard file relative to the root.
pub fn shard_path(filename: &str, subdirectory: Option<&str>) -> String {
    match subdirectory {
        Some(sub) => format!("{}/{}/{}", DATA_DIR, sub, filename),
        None => format!("{}/{}", DATA_DIR, filename),
    }
}

/// File name used for a field index.
///
/// Bytes outside `[A-Za-z0-9._-]` are written as `~XX` (uppercase hex) and
/// a leading `_` is always escaped, so the encoding is injective and no
/// field can land on a reserved name such as [`PRIMARY_INDEX_NAME`]. `~` is
/// an unreserved URL character, so the name is also a valid URL segment.
pub fn index_file_name(field: &str) -> String {
    let mut encoded = String::with_capacity(field.len() + 5);
    for (i, byte) in field.bytes().enumerate() {
        let literal = byte.is_ascii_alphanumeric()
            || matches!(byte, b'.' | b'-')
            || (byte == b'_' && i > 0);
        if literal {
            encoded.push(byte as char);
        } else {
            encoded.push_str(&format!("{}{:02X}", INDEX_ESCAPE, byte));
        }
    }
    encoded.push_str(".json");
    encoded
}

/// Path of a field index relative to the root.
pub fn index_path(field: &str) -> String {
    format!("{}/{}", INDEX_DIR, index_file_name(field))
}

/// Path of the primary index relative to the root.
pub fn primary_index_path() -> String {
    format!("{}/{}.json", INDEX_DIR, PRIMARY_INDEX_NAME)
}
