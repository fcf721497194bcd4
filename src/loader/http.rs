//! HTTP backend
//!
//! Fetches database files with plain GETs against a base URL, so a build
//! output directory can be served from any static host.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use super::errors::{LoaderError, LoaderResult};
use super::DataLoader;

/// Reads a database from a static HTTP origin
#[derive(Debug, Clone)]
pub struct HttpLoader {
    base_url: String,
    client: Client,
}

impl HttpLoader {
    /// Creates a loader for `base_url` (e.g. `https://cdn.example.com/db`)
    pub fn new(base_url: &str) -> LoaderResult<Self> {
        Self::with_client(base_url, Client::new())
    }

    /// Creates a loader that reuses an existing client
    pub fn with_client(base_url: &str, client: Client) -> LoaderResult<Self> {
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(LoaderError::InvalidUrl(base_url.to_string()));
        }

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl DataLoader for HttpLoader {
    async fn fetch(&self, path: &str) -> LoaderResult<Option<Vec<u8>>> {
        let url = self.url_for(path);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| LoaderError::Network {
                url: url.clone(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(LoaderError::HttpStatus {
                url,
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await.map_err(|e| LoaderError::Network {
            url: url.clone(),
            message: format!("failed to read response body: {}", e),
        })?;
        Ok(Some(bytes.to_vec()))
    }

    fn describe(&self) -> String {
        self.base_url.clone()
    }
}
