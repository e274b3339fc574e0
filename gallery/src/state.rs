//! The single owner of catalog and layout state.
//!
//! All mutation goes through [`Gallery::update`]. Network work is described by
//! the returned [`Effect`] and its completion comes back as another
//! [`Message`], so state is only ever touched by whoever drives `update`.

use crate::catalog::Catalog;
use crate::layout::{ExpansionState, GalleryLayout, Geometry, LayoutError, Transition};
use crate::upload::SaveReport;
use api_client::{ApiClientError, ImageRecord};
use thiserror::Error;

#[derive(Debug, Clone)]
pub enum Message {
    FetchRequested,
    CatalogFetched {
        generation: u64,
        result: Result<Vec<ImageRecord>, ApiClientError>,
    },
    QueryChanged(String),
    QueryCleared,
    RowTapped(usize),
    SaveRequested(usize),
    SaveFinished(SaveReport),
    DismissError(usize),
    ClearErrors,
}

/// Work for the runtime to carry out off the owning task.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Fetch { generation: u64 },
    Save { record: ImageRecord },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GalleryError {
    #[error("Failed to fetch images: {0}")]
    Fetch(ApiClientError),
    #[error("{0}")]
    Layout(#[from] LayoutError),
    #[error("No row {0} in the current view")]
    NoSuchRow(usize),
    #[error("Failed to save image locally: {0}")]
    LocalSave(String),
    #[error("Failed to upload image: {0}")]
    Upload(ApiClientError),
}

#[derive(Debug, Default)]
pub struct Gallery {
    catalog: Catalog,
    layout: GalleryLayout,
    fetch_generation: u64,
    loading: bool,
    saves_in_flight: usize,
    last_save: Option<SaveReport>,
    errors: Vec<GalleryError>,
}

impl Gallery {
    pub fn new(layout: GalleryLayout) -> Self {
        Self {
            layout,
            ..Self::default()
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn layout(&self) -> &GalleryLayout {
        &self.layout
    }

    pub fn view(&self) -> &[ImageRecord] {
        self.catalog.view()
    }

    pub fn expansion(&self) -> ExpansionState {
        self.layout.state()
    }

    pub fn geometry(&self) -> Geometry {
        self.layout.geometry(self.catalog.len())
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn fetch_generation(&self) -> u64 {
        self.fetch_generation
    }

    pub fn saves_in_flight(&self) -> usize {
        self.saves_in_flight
    }

    pub fn last_save(&self) -> Option<&SaveReport> {
        self.last_save.as_ref()
    }

    pub fn errors(&self) -> &[GalleryError] {
        &self.errors
    }

    /// Expose current state for testing purposes
    pub fn state_debug(&self) -> String {
        format!("{:?}", self.layout.state())
    }

    pub fn update(&mut self, message: Message) -> Option<Effect> {
        match message {
            Message::FetchRequested => {
                self.fetch_generation += 1;
                self.loading = true;
                return Some(Effect::Fetch {
                    generation: self.fetch_generation,
                });
            }
            Message::CatalogFetched { generation, result } => {
                if generation != self.fetch_generation {
                    tracing::debug!(
                        generation,
                        current = self.fetch_generation,
                        "dropping stale catalog fetch"
                    );
                    return None;
                }
                self.loading = false;
                match result {
                    Ok(records) => {
                        self.catalog.load(records);
                        self.layout.collapse();
                    }
                    Err(e) => {
                        tracing::error!("Failed to fetch images: {}", e);
                        self.errors.push(GalleryError::Fetch(e));
                    }
                }
            }
            Message::QueryChanged(query) => {
                self.catalog.set_query(&query);
                self.layout.collapse();
            }
            Message::QueryCleared => {
                self.catalog.clear_query();
                self.layout.collapse();
            }
            Message::RowTapped(index) => {
                match self.layout.tap(index, self.catalog.len()) {
                    Ok(Transition::Expanded(i)) | Ok(Transition::Moved { to: i, .. }) => {
                        if let Some(record) = self.catalog.get(i) {
                            tracing::debug!(title = %record.title, "showing detail");
                        }
                    }
                    Ok(Transition::Collapsed(_)) => {}
                    Err(e) => {
                        tracing::warn!("{}", e);
                        self.errors.push(e.into());
                    }
                }
            }
            Message::SaveRequested(index) => match self.catalog.get(index) {
                Some(record) => {
                    self.saves_in_flight += 1;
                    return Some(Effect::Save {
                        record: record.clone(),
                    });
                }
                None => self.errors.push(GalleryError::NoSuchRow(index)),
            },
            Message::SaveFinished(report) => {
                self.saves_in_flight = self.saves_in_flight.saturating_sub(1);
                if let Err(e) = &report.local {
                    self.errors.push(GalleryError::LocalSave(e.to_string()));
                }
                if let Err(e) = &report.remote {
                    self.errors.push(GalleryError::Upload(e.clone()));
                }
                self.last_save = Some(report);
            }
            Message::DismissError(index) => {
                if index < self.errors.len() {
                    self.errors.remove(index);
                }
            }
            Message::ClearErrors => self.errors.clear(),
        }
        None
    }
}
