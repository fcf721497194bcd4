//! JSON file helpers shared by the build, validate and info paths

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::errors::{BuildError, BuildResult};

/// Serializes `value` to `path`, returning the number of bytes written
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T, pretty: bool) -> BuildResult<u64> {
    let serialized = if pretty {
        serde_json::to_vec_pretty(value)
    } else {
        serde_json::to_vec(value)
    };
    let bytes = serialized.map_err(|source| BuildError::Serialize {
        what: path.display().to_string(),
        source,
    })?;

    fs::write(path, &bytes).map_err(|e| BuildError::io(path, e))?;
    Ok(bytes.len() as u64)
}

/// Reads and parses a JSON file
pub fn read_json<T: DeserializeOwned>(path: &Path) -> BuildResult<T> {
    let bytes = fs::read(path).map_err(|e| BuildError::io(path, e))?;
    serde_json::from_slice(&bytes).map_err(|source| BuildError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
