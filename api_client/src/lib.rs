//! API client for the pet image catalog and its upload endpoint.

mod multipart;

pub use multipart::MultipartForm;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
pub use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://eulerity-hackathon.appspot.com";

/// One catalog entry as served by `GET /pets`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ImageRecord {
    pub title: String,
    pub description: String,
    #[serde(rename = "url")]
    pub image_url: String,
    pub created: String,
}

#[derive(Debug, Deserialize)]
struct UploadTargetResponse {
    url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiClientError {
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),
    #[error("transport failure: {0}")]
    TransportFailure(String),
    #[error("decode failure: {0}")]
    DecodeFailure(String),
    #[error("upload target unavailable: {0}")]
    TargetUnavailable(String),
    #[error("upload rejected with status {status}")]
    UploadRejected { status: u16 },
}

/// The three HTTP operations the gallery depends on.
#[async_trait]
pub trait NetworkClient: Send + Sync {
    async fn fetch_images(&self) -> Result<Vec<ImageRecord>, ApiClientError>;

    async fn request_upload_target(&self) -> Result<Url, ApiClientError>;

    async fn upload_image(
        &self,
        jpeg: &[u8],
        target: &Url,
        app_id: &str,
        original_url: &str,
    ) -> Result<(), ApiClientError>;
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ApiClient {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL.to_string())
    }

    /// Create a new client with a custom API base URL. Mainly used for testing.
    pub fn with_base_url(base_url: String) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    pub fn with_client(base_url: String, client: reqwest::Client) -> Self {
        ApiClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiClientError> {
        let raw = format!("{}/{}", self.base_url, path);
        Url::parse(&raw).map_err(|e| ApiClientError::InvalidEndpoint(format!("{}: {}", raw, e)))
    }

    async fn fetch_upload_target(&self) -> Result<Url, String> {
        let url = self.endpoint("upload").map_err(|e| e.to_string())?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if !response.status().is_success() {
            return Err(format!("status {}", response.status().as_u16()));
        }

        let body = response.bytes().await.map_err(|e| e.to_string())?;
        let parsed: UploadTargetResponse =
            serde_json::from_slice(&body).map_err(|e| format!("malformed response: {}", e))?;
        Url::parse(&parsed.url).map_err(|e| format!("malformed url {:?}: {}", parsed.url, e))
    }
}

#[async_trait]
impl NetworkClient for ApiClient {
    #[cfg_attr(feature = "trace-spans", tracing::instrument(skip(self)))]
    async fn fetch_images(&self) -> Result<Vec<ImageRecord>, ApiClientError> {
        let url = self.endpoint("pets")?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ApiClientError::TransportFailure(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ApiClientError::TransportFailure(format!(
                "GET /pets returned status {}",
                response.status().as_u16()
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ApiClientError::TransportFailure(e.to_string()))?;
        let records: Vec<ImageRecord> = serde_json::from_slice(&body)
            .map_err(|e| ApiClientError::DecodeFailure(e.to_string()))?;

        tracing::info!(count = records.len(), "fetched catalog");
        Ok(records)
    }

    #[cfg_attr(feature = "trace-spans", tracing::instrument(skip(self)))]
    async fn request_upload_target(&self) -> Result<Url, ApiClientError> {
        match self.fetch_upload_target().await {
            Ok(url) => {
                tracing::debug!(target_url = %url, "obtained upload target");
                Ok(url)
            }
            Err(reason) => {
                tracing::warn!("upload target unavailable: {}", reason);
                Err(ApiClientError::TargetUnavailable(reason))
            }
        }
    }

    #[cfg_attr(feature = "trace-spans", tracing::instrument(skip(self, jpeg)))]
    async fn upload_image(
        &self,
        jpeg: &[u8],
        target: &Url,
        app_id: &str,
        original_url: &str,
    ) -> Result<(), ApiClientError> {
        let form = MultipartForm::with_random_boundary()
            .text("appid", app_id)
            .text("original", original_url)
            .file("file", "image.jpg", "image/jpeg", jpeg);
        let content_type = form.content_type();

        let response = self
            .client
            .post(target.clone())
            .header(CONTENT_TYPE, content_type)
            .body(form.finish())
            .send()
            .await
            .map_err(|e| ApiClientError::TransportFailure(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            tracing::warn!(status = status.as_u16(), "upload rejected");
            return Err(ApiClientError::UploadRejected {
                status: status.as_u16(),
            });
        }

        tracing::info!(original = original_url, "image uploaded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pets_response() {
        let json = r#"[
            {
                "title": "Cat",
                "description": "A sleepy cat",
                "url": "https://example.com/cat.png",
                "created": "Tue Feb 20 2024",
                "extra": 1
            }
        ]"#;

        let parsed: Vec<ImageRecord> = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].title, "Cat");
        assert_eq!(parsed[0].image_url, "https://example.com/cat.png");
        assert_eq!(parsed[0].created, "Tue Feb 20 2024");
    }

    #[test]
    fn test_missing_field_is_rejected() {
        let json = r#"[{"title": "Cat", "description": "d", "created": "c"}]"#;
        assert!(serde_json::from_str::<Vec<ImageRecord>>(json).is_err());
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client = ApiClient::with_base_url("http://localhost:1234/".into());
        assert_eq!(client.base_url(), "http://localhost:1234");
        assert_eq!(
            client.endpoint("pets").unwrap().as_str(),
            "http://localhost:1234/pets"
        );
    }

    #[tokio::test]
    async fn test_invalid_endpoint() {
        let client = ApiClient::with_base_url("not a url".into());
        let err = client.fetch_images().await.unwrap_err();
        assert!(matches!(err, ApiClientError::InvalidEndpoint(_)));
    }
}
