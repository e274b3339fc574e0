use api_client::{ApiClientError, ImageRecord, NetworkClient, Url};
use async_trait::async_trait;
use gallery::{
    encode_jpeg, PhotoStore, StoreError, UploadPipeline, UPLOAD_JPEG_QUALITY,
};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Target,
    Upload {
        target: String,
        app_id: String,
        original: String,
        jpeg: Vec<u8>,
    },
}

struct FakeClient {
    target: Result<Url, ApiClientError>,
    upload: Result<(), ApiClientError>,
    calls: Mutex<Vec<Call>>,
}

impl FakeClient {
    fn new(target: Result<Url, ApiClientError>, upload: Result<(), ApiClientError>) -> Self {
        Self {
            target,
            upload,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl NetworkClient for FakeClient {
    async fn fetch_images(&self) -> Result<Vec<ImageRecord>, ApiClientError> {
        Ok(Vec::new())
    }

    async fn request_upload_target(&self) -> Result<Url, ApiClientError> {
        self.calls.lock().unwrap().push(Call::Target);
        self.target.clone()
    }

    async fn upload_image(
        &self,
        jpeg: &[u8],
        target: &Url,
        app_id: &str,
        original_url: &str,
    ) -> Result<(), ApiClientError> {
        self.calls.lock().unwrap().push(Call::Upload {
            target: target.to_string(),
            app_id: app_id.to_string(),
            original: original_url.to_string(),
            jpeg: jpeg.to_vec(),
        });
        self.upload.clone()
    }
}

struct FakeStore {
    result: Result<PathBuf, StoreError>,
    persisted: Mutex<usize>,
}

impl FakeStore {
    fn new(result: Result<PathBuf, StoreError>) -> Self {
        Self {
            result,
            persisted: Mutex::new(0),
        }
    }
}

#[async_trait]
impl PhotoStore for FakeStore {
    async fn persist(&self, _image: &[u8]) -> Result<PathBuf, StoreError> {
        *self.persisted.lock().unwrap() += 1;
        self.result.clone()
    }
}

fn png_bytes() -> Vec<u8> {
    let img = RgbImage::from_pixel(8, 8, Rgb([10, 120, 240]));
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut out, ImageFormat::Png)
        .unwrap();
    out.into_inner()
}

fn record() -> ImageRecord {
    ImageRecord {
        title: "Whiskers".into(),
        description: "Sleepy cat".into(),
        image_url: "http://x/1.png".into(),
        created: "today".into(),
    }
}

fn target() -> Url {
    Url::parse("http://upload.example/abc").unwrap()
}

#[tokio::test]
async fn test_save_runs_both_phases_in_order() {
    let client = Arc::new(FakeClient::new(Ok(target()), Ok(())));
    let store = Arc::new(FakeStore::new(Ok(PathBuf::from("/tmp/x.png"))));
    let pipeline = UploadPipeline::new(client.clone(), store.clone(), "a@b.com");

    let image = png_bytes();
    let report = pipeline.save(&record(), &image).await;
    assert!(report.is_success());
    assert_eq!(report.original_url, "http://x/1.png");

    let calls = client.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0], Call::Target);
    assert_eq!(
        calls[1],
        Call::Upload {
            target: "http://upload.example/abc".into(),
            app_id: "a@b.com".into(),
            original: "http://x/1.png".into(),
            jpeg: encode_jpeg(&image, UPLOAD_JPEG_QUALITY).unwrap(),
        }
    );
    assert_eq!(*store.persisted.lock().unwrap(), 1);
}

#[tokio::test]
async fn test_target_failure_short_circuits_submit() {
    let client = Arc::new(FakeClient::new(
        Err(ApiClientError::TargetUnavailable("status 500".into())),
        Ok(()),
    ));
    let store = Arc::new(FakeStore::new(Ok(PathBuf::from("/tmp/x.png"))));
    let pipeline = UploadPipeline::new(client.clone(), store.clone(), "a@b.com");

    let report = pipeline.save(&record(), &png_bytes()).await;
    assert!(matches!(report.remote, Err(ApiClientError::TargetUnavailable(_))));
    assert_eq!(client.calls(), vec![Call::Target]);
    // the local copy does not depend on the upload
    assert!(report.local.is_ok());
}

#[tokio::test]
async fn test_request_target_wraps_other_errors() {
    let client = Arc::new(FakeClient::new(
        Err(ApiClientError::TransportFailure("connection refused".into())),
        Ok(()),
    ));
    let store = Arc::new(FakeStore::new(Ok(PathBuf::new())));
    let pipeline = UploadPipeline::new(client, store, "a@b.com");
    let err = pipeline.request_target().await.unwrap_err();
    assert!(matches!(err, ApiClientError::TargetUnavailable(_)));
}

#[tokio::test]
async fn test_rejected_upload_keeps_local_copy() {
    let client = Arc::new(FakeClient::new(
        Ok(target()),
        Err(ApiClientError::UploadRejected { status: 500 }),
    ));
    let store = Arc::new(FakeStore::new(Ok(PathBuf::from("/tmp/x.png"))));
    let pipeline = UploadPipeline::new(client, store, "a@b.com");

    let report = pipeline.save(&record(), &png_bytes()).await;
    assert_eq!(report.local, Ok(PathBuf::from("/tmp/x.png")));
    assert_eq!(report.remote, Err(ApiClientError::UploadRejected { status: 500 }));
}

#[tokio::test]
async fn test_local_failure_does_not_block_upload() {
    let client = Arc::new(FakeClient::new(Ok(target()), Ok(())));
    let store = Arc::new(FakeStore::new(Err(StoreError::Io("read-only".into()))));
    let pipeline = UploadPipeline::new(client.clone(), store, "a@b.com");

    let report = pipeline.save(&record(), &png_bytes()).await;
    assert!(report.local.is_err());
    assert!(report.remote.is_ok());
    assert_eq!(client.calls().len(), 2);
}

#[tokio::test]
async fn test_undecodable_image_never_posts() {
    let client = Arc::new(FakeClient::new(Ok(target()), Ok(())));
    let store = Arc::new(FakeStore::new(Ok(PathBuf::new())));
    let pipeline = UploadPipeline::new(client.clone(), store, "a@b.com");

    let err = pipeline
        .submit(b"not an image", target(), "http://x/1.png")
        .await
        .unwrap_err();
    assert!(matches!(err, ApiClientError::DecodeFailure(_)));
    assert!(client.calls().is_empty());
}
