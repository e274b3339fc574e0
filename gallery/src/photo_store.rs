//! Local copies of saved images.

use crate::encode::encode_png;
use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;
use tokio::fs;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("image could not be decoded: {0}")]
    Decode(String),
    #[error("io error: {0}")]
    Io(String),
    #[error("source image unavailable: {0}")]
    SourceUnavailable(String),
    #[error("save interrupted: {0}")]
    Interrupted(String),
}

#[async_trait]
pub trait PhotoStore: Send + Sync {
    /// Persist `image` and return where it ended up.
    async fn persist(&self, image: &[u8]) -> Result<PathBuf, StoreError>;
}

/// Writes PNG copies to `<root>/images/<uuid>.png`.
#[derive(Debug, Clone)]
pub struct DirPhotoStore {
    root: PathBuf,
}

impl DirPhotoStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn images_dir(&self) -> PathBuf {
        self.root.join("images")
    }
}

#[async_trait]
impl PhotoStore for DirPhotoStore {
    async fn persist(&self, image: &[u8]) -> Result<PathBuf, StoreError> {
        let png = encode_png(image).map_err(|e| StoreError::Decode(e.to_string()))?;
        let dir = self.images_dir();
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| StoreError::Io(e.to_string()))?;
        let path = dir.join(format!("{}.png", Uuid::new_v4()));
        fs::write(&path, png)
            .await
            .map_err(|e| StoreError::Io(e.to_string()))?;
        tracing::info!(path = %path.display(), "image saved locally");
        Ok(path)
    }
}
