//! CRC32 checksums for shard files
//!
//! Format: `crc32:xxxxxxxx` (lowercase hex, zero-padded). Checksums are
//! computed over the exact bytes written, so `validate` can re-read a shard
//! and compare.

use crc32fast::Hasher;

const PREFIX: &str = "crc32:";

/// Computes a CRC32 checksum over the provided data.
pub fn compute_checksum(data: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

/// Formats a CRC32 checksum as `crc32:xxxxxxxx`.
pub fn format_checksum(checksum: u32) -> String {
    format!("{}{:08x}", PREFIX, checksum)
}

/// Parses a formatted checksum back to `u32`.
pub fn parse_checksum(formatted: &str) -> Option<u32> {
    let hex = formatted.strip_prefix(PREFIX)?;
    if hex.len() != 8 {
        return None;
    }
    u32::from_str_radix(hex, 16).ok()
}

/// Returns true when `data` hashes to the formatted checksum.
pub fn verify_checksum(data: &[u8], formatted: &str) -> bool {
    parse_checksum(formatted) == Some(compute_checksum(data))
}
