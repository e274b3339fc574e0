//! Row image downloads with a disk cache.

use api_client::ImageRecord;
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio::fs;
use tokio::sync::Semaphore;
use uuid::Uuid;

const MAX_CONCURRENT_DOWNLOADS: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageLoaderError {
    #[error("network error: {0}")]
    Network(String),
    #[error("image not found")]
    NotFound,
    #[error("request timed out")]
    Timeout,
    #[error("unexpected status {0}")]
    Status(u16),
    #[error("io error: {0}")]
    Io(String),
    #[error("semaphore closed")]
    SemaphoreClosed,
}

impl From<reqwest::Error> for ImageLoaderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ImageLoaderError::Timeout
        } else {
            ImageLoaderError::Network(e.to_string())
        }
    }
}

#[derive(Debug, Clone)]
pub struct ImageLoader {
    cache_dir: PathBuf,
    client: reqwest::Client,
    semaphore: Arc<Semaphore>,
}

impl ImageLoader {
    pub fn new(cache_dir: PathBuf) -> Self {
        Self::with_client(cache_dir, reqwest::Client::new())
    }

    pub fn with_client(cache_dir: PathBuf, client: reqwest::Client) -> Self {
        Self {
            cache_dir,
            client,
            semaphore: Arc::new(Semaphore::new(MAX_CONCURRENT_DOWNLOADS)),
        }
    }

    /// Cache file for `url`. Stable across runs.
    pub fn cache_path(&self, url: &str) -> PathBuf {
        let key = Uuid::new_v5(&Uuid::NAMESPACE_URL, url.as_bytes());
        self.cache_dir.join("images").join(key.to_string())
    }

    /// Raw bytes of the image at `url`, from disk if already downloaded.
    ///
    /// A cached file that no longer decodes is discarded and fetched again.
    #[cfg_attr(feature = "trace-spans", tracing::instrument(skip(self)))]
    pub async fn load(&self, url: &str) -> Result<Vec<u8>, ImageLoaderError> {
        let cache_path = self.cache_path(url);
        if let Some(bytes) = self.read_cached(&cache_path).await {
            return Ok(bytes);
        }

        let start = Instant::now();
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| ImageLoaderError::SemaphoreClosed)?;

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ImageLoaderError::NotFound);
        }
        if !status.is_success() {
            return Err(ImageLoaderError::Status(status.as_u16()));
        }
        let bytes = response.bytes().await?;
        write_atomically(&cache_path, &bytes).await?;

        tracing::info!("image_time_ms" = %start.elapsed().as_millis(), "url" = url);
        Ok(bytes.to_vec())
    }

    async fn read_cached(&self, path: &Path) -> Option<Vec<u8>> {
        let bytes = fs::read(path).await.ok()?;
        if image::load_from_memory(&bytes).is_ok() {
            return Some(bytes);
        }
        tracing::warn!(path = %path.display(), "discarding unreadable cache entry");
        if let Err(e) = fs::remove_file(path).await {
            tracing::debug!("Failed to remove {}: {}", path.display(), e);
        }
        None
    }

    /// Warm the cache for the first `count` rows.
    pub async fn preload(&self, records: &[ImageRecord], count: usize) {
        let start = Instant::now();
        futures::stream::iter(records.iter().take(count))
            .for_each_concurrent(None, |record| async move {
                if let Err(e) = self.load(&record.image_url).await {
                    tracing::error!("Failed to preload {}: {}", record.image_url, e);
                }
            })
            .await;
        tracing::info!("preload_time_ms" = %start.elapsed().as_millis(), "count" = count);
    }
}

/// Readers of `path` see either no file or the complete one.
async fn write_atomically(path: &Path, bytes: &[u8]) -> Result<(), ImageLoaderError> {
    let io = |e: std::io::Error| ImageLoaderError::Io(e.to_string());
    let dir = path
        .parent()
        .ok_or_else(|| ImageLoaderError::Io(format!("no parent for {}", path.display())))?;
    fs::create_dir_all(dir).await.map_err(io)?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp = dir.join(format!("{}.tmp-{}", file_name, Uuid::new_v4()));
    fs::write(&tmp, bytes).await.map_err(io)?;
    if let Err(e) = fs::rename(&tmp, path).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(io(e));
    }
    Ok(())
}
