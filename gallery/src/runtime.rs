//! Executes effects off the owning task and marshals completions back.

use crate::image_loader::ImageLoader;
use crate::photo_store::StoreError;
use crate::state::{Effect, Gallery, Message};
use crate::upload::{SaveReport, UploadPipeline};
use api_client::{ApiClientError, NetworkClient};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Spawns network work. Completions are sent as [`Message`]s; nothing here
/// touches gallery state directly.
#[derive(Clone)]
pub struct Runtime {
    client: Arc<dyn NetworkClient>,
    loader: ImageLoader,
    pipeline: UploadPipeline,
    tx: mpsc::UnboundedSender<Message>,
}

impl Runtime {
    pub fn new(
        client: Arc<dyn NetworkClient>,
        loader: ImageLoader,
        pipeline: UploadPipeline,
        tx: mpsc::UnboundedSender<Message>,
    ) -> Self {
        Self {
            client,
            loader,
            pipeline,
            tx,
        }
    }

    /// Start `effect`. Exactly one completion message is sent per effect,
    /// including when the work itself panics.
    pub fn dispatch(&self, effect: Effect) -> JoinHandle<()> {
        let tx = self.tx.clone();
        match effect {
            Effect::Fetch { generation } => {
                let client = Arc::clone(&self.client);
                let work = tokio::spawn(async move { client.fetch_images().await });
                tokio::spawn(async move {
                    let result = work.await.unwrap_or_else(|e| {
                        tracing::error!(generation, "fetch task failed: {}", e);
                        Err(ApiClientError::TransportFailure(format!(
                            "fetch task failed: {}",
                            e
                        )))
                    });
                    if tx.send(Message::CatalogFetched { generation, result }).is_err() {
                        tracing::debug!(generation, "gallery gone, dropping fetch result");
                    }
                })
            }
            Effect::Save { record } => {
                let loader = self.loader.clone();
                let pipeline = self.pipeline.clone();
                let original_url = record.image_url.clone();
                let work = tokio::spawn(async move {
                    match loader.load(&record.image_url).await {
                        Ok(bytes) => pipeline.save(&record, &bytes).await,
                        Err(e) => {
                            tracing::warn!("Failed to load {}: {}", record.image_url, e);
                            SaveReport {
                                original_url: record.image_url.clone(),
                                local: Err(StoreError::SourceUnavailable(e.to_string())),
                                remote: Err(ApiClientError::TransportFailure(e.to_string())),
                            }
                        }
                    }
                });
                tokio::spawn(async move {
                    let report = work.await.unwrap_or_else(|e| {
                        tracing::error!("save task for {} failed: {}", original_url, e);
                        SaveReport {
                            original_url,
                            local: Err(StoreError::Interrupted(e.to_string())),
                            remote: Err(ApiClientError::TransportFailure(format!(
                                "save task failed: {}",
                                e
                            ))),
                        }
                    });
                    if tx.send(Message::SaveFinished(report)).is_err() {
                        tracing::debug!("gallery gone, dropping save report");
                    }
                })
            }
        }
    }
}

/// A [`Gallery`] together with the runtime feeding it.
pub struct Session {
    gallery: Gallery,
    runtime: Runtime,
    rx: mpsc::UnboundedReceiver<Message>,
    in_flight: usize,
}

impl Session {
    pub fn new(
        gallery: Gallery,
        client: Arc<dyn NetworkClient>,
        loader: ImageLoader,
        pipeline: UploadPipeline,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            gallery,
            runtime: Runtime::new(client, loader, pipeline, tx),
            rx,
            in_flight: 0,
        }
    }

    pub fn gallery(&self) -> &Gallery {
        &self.gallery
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Apply `message` and start whatever work it asks for.
    pub fn send(&mut self, message: Message) {
        if let Some(effect) = self.gallery.update(message) {
            self.in_flight += 1;
            self.runtime.dispatch(effect);
        }
    }

    /// Wait for one completion and apply it. `false` once nothing is pending.
    pub async fn next(&mut self) -> bool {
        if self.in_flight == 0 {
            return false;
        }
        match self.rx.recv().await {
            Some(message) => {
                self.in_flight -= 1;
                self.send(message);
                true
            }
            None => false,
        }
    }

    /// Apply completions until no work is in flight.
    pub async fn settle(&mut self) {
        while self.next().await {}
    }
}
