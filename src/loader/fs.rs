//! Filesystem backend

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::errors::{LoaderError, LoaderResult};
use super::DataLoader;

/// Reads a database directory from local disk
#[derive(Debug, Clone)]
pub struct FsLoader {
    root: PathBuf,
}

impl FsLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl DataLoader for FsLoader {
    async fn fetch(&self, path: &str) -> LoaderResult<Option<Vec<u8>>> {
        let full_path = self.root.join(path);
        match tokio::fs::read(&full_path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(LoaderError::Io {
                path: full_path.display().to_string(),
                source,
            }),
        }
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }
}
