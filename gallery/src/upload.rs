//! Two-phase upload: obtain a target URL, then POST the multipart body to it.

use crate::encode::{encode_jpeg, UPLOAD_JPEG_QUALITY};
use crate::photo_store::{PhotoStore, StoreError};
use api_client::{ApiClientError, ImageRecord, NetworkClient, Url};
use std::path::PathBuf;
use std::sync::Arc;

/// Everything phase 2 needs. Built per attempt and dropped afterwards.
#[derive(Debug, Clone)]
pub struct UploadSession {
    pub target_url: Url,
    pub app_id: String,
    pub original_url: String,
    pub payload: Vec<u8>,
}

/// Outcome of one save action. The two halves never affect each other.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveReport {
    pub original_url: String,
    pub local: Result<PathBuf, StoreError>,
    pub remote: Result<(), ApiClientError>,
}

impl SaveReport {
    pub fn is_success(&self) -> bool {
        self.local.is_ok() && self.remote.is_ok()
    }
}

#[derive(Clone)]
pub struct UploadPipeline {
    client: Arc<dyn NetworkClient>,
    store: Arc<dyn PhotoStore>,
    app_id: String,
}

impl UploadPipeline {
    pub fn new(
        client: Arc<dyn NetworkClient>,
        store: Arc<dyn PhotoStore>,
        app_id: impl Into<String>,
    ) -> Self {
        Self {
            client,
            store,
            app_id: app_id.into(),
        }
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    /// Phase 1. Every failure is reported as `TargetUnavailable`.
    pub async fn request_target(&self) -> Result<Url, ApiClientError> {
        self.client
            .request_upload_target()
            .await
            .map_err(|e| match e {
                ApiClientError::TargetUnavailable(_) => e,
                other => ApiClientError::TargetUnavailable(other.to_string()),
            })
    }

    /// Phase 2: re-encode `image` as JPEG and post it to `target`.
    pub async fn submit(
        &self,
        image: &[u8],
        target: Url,
        original_url: &str,
    ) -> Result<(), ApiClientError> {
        let session = UploadSession {
            target_url: target,
            app_id: self.app_id.clone(),
            original_url: original_url.to_string(),
            payload: encode_jpeg(image, UPLOAD_JPEG_QUALITY)?,
        };
        self.client
            .upload_image(
                &session.payload,
                &session.target_url,
                &session.app_id,
                &session.original_url,
            )
            .await
    }

    /// Both phases in order. Phase 2 never runs if phase 1 failed.
    #[cfg_attr(feature = "trace-spans", tracing::instrument(skip(self, image)))]
    pub async fn upload(&self, image: &[u8], original_url: &str) -> Result<(), ApiClientError> {
        let target = self.request_target().await?;
        self.submit(image, target, original_url).await
    }

    /// Local copy and upload, attempted concurrently and independently.
    pub async fn save(&self, record: &ImageRecord, image: &[u8]) -> SaveReport {
        let (local, remote) = tokio::join!(
            self.store.persist(image),
            self.upload(image, &record.image_url)
        );
        if let Err(e) = &local {
            tracing::warn!("Failed to save image locally: {}", e);
        }
        match &remote {
            Ok(()) => tracing::info!(original = %record.image_url, "upload finished"),
            Err(e) => tracing::warn!(original = %record.image_url, "Failed to upload image: {}", e),
        }
        SaveReport {
            original_url: record.image_url.clone(),
            local,
            remote,
        }
    }
}
