//! The authoritative record list and the filtered view derived from it.

use crate::search::SearchFilter;
use api_client::ImageRecord;
use std::sync::Arc;

/// `full` and `filtered` are immutable snapshots. Every mutation swaps in a
/// new `full` or a new query and re-derives `filtered` from scratch.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    full: Arc<[ImageRecord]>,
    filtered: Arc<[ImageRecord]>,
    query: String,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every record, keeping the active query.
    pub fn load(&mut self, records: Vec<ImageRecord>) {
        self.full = records.into();
        self.rederive();
        tracing::debug!(full = self.full.len(), filtered = self.filtered.len(), "catalog loaded");
    }

    pub fn set_query(&mut self, text: &str) {
        self.query = text.to_string();
        self.rederive();
        tracing::debug!(query = %self.query, filtered = self.filtered.len(), "query changed");
    }

    pub fn clear_query(&mut self) {
        self.set_query("");
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn view(&self) -> &[ImageRecord] {
        &self.filtered
    }

    /// Shared handle to the current view, for handing to background work.
    pub fn snapshot(&self) -> Arc<[ImageRecord]> {
        Arc::clone(&self.filtered)
    }

    pub fn full(&self) -> &[ImageRecord] {
        &self.full
    }

    pub fn len(&self) -> usize {
        self.filtered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filtered.is_empty()
    }

    /// Record at `index` in the filtered view.
    pub fn get(&self, index: usize) -> Option<&ImageRecord> {
        self.filtered.get(index)
    }

    fn rederive(&mut self) {
        self.filtered = SearchFilter::new(&self.query).apply(&self.full).into();
    }
}
