use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::LoadError;

/// Default bound on a single geometry fetch.
///
/// Unbounded waits would leave an entry stuck in `Loading` forever on a
/// stalled connection. There is no automatic retry; re-opening the share is
/// the retry.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Source of raw geometry bytes, keyed by URL.
#[async_trait]
pub trait GeometrySource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, LoadError>;
}

/// Fetches geometry over HTTP, e.g. from a resolved share link.
pub struct HttpGeometrySource {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpGeometrySource {
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_FETCH_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout,
        }
    }
}

impl Default for HttpGeometrySource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GeometrySource for HttpGeometrySource {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, LoadError> {
        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LoadError::Timeout {
                        url: url.to_string(),
                        seconds: self.timeout.as_secs(),
                    }
                } else {
                    LoadError::Fetch {
                        url: url.to_string(),
                        source: Box::new(e),
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                LoadError::Timeout {
                    url: url.to_string(),
                    seconds: self.timeout.as_secs(),
                }
            } else {
                LoadError::Fetch {
                    url: url.to_string(),
                    source: Box::new(e),
                }
            }
        })?;

        Ok(bytes.to_vec())
    }
}

/// Reads geometry from local paths or `file://` URLs (the local file picker
/// case).
pub struct FileGeometrySource;

#[async_trait]
impl GeometrySource for FileGeometrySource {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, LoadError> {
        let path = url.strip_prefix("file://").unwrap_or(url);

        tokio::fs::read(Path::new(path))
            .await
            .map_err(|e| LoadError::Fetch {
                url: url.to_string(),
                source: Box::new(e),
            })
    }
}
