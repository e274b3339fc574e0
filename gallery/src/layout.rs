//! Single-expansion state machine and the row geometry derived from it.
//!
//! Geometry is never accumulated. Every offset and the content extent are a
//! pure function of `(row_count, state, metrics)`, so any sequence of taps
//! ends in exactly the same numbers as a fresh layout with the same state.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fixed row metrics, in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutMetrics {
    pub row_height: f64,
    pub row_margin: f64,
    pub detail_height: f64,
}

impl Default for LayoutMetrics {
    fn default() -> Self {
        Self {
            row_height: 200.0,
            row_margin: 10.0,
            detail_height: 120.0,
        }
    }
}

impl LayoutMetrics {
    fn stride(&self) -> f64 {
        self.row_height + self.row_margin
    }
}

/// How the detail for the selected row is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetailMode {
    /// Detail block inserted under the row, pushing later rows down.
    #[default]
    Inline,
    /// Full-screen overlay. Rows never move.
    Overlay,
}

impl std::str::FromStr for DetailMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "inline" => Ok(DetailMode::Inline),
            "overlay" => Ok(DetailMode::Overlay),
            other => Err(format!("unknown detail mode: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExpansionState {
    #[default]
    Collapsed,
    Expanded(usize),
}

impl ExpansionState {
    pub fn expanded(&self) -> Option<usize> {
        match self {
            ExpansionState::Collapsed => None,
            ExpansionState::Expanded(i) => Some(*i),
        }
    }
}

/// What a tap did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Expanded(usize),
    Collapsed(usize),
    /// Collapse of `from` followed by expansion of `to`.
    Moved { from: usize, to: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("row {index} out of range ({row_count} rows)")]
    RowOutOfRange { index: usize, row_count: usize },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowFrame {
    pub index: usize,
    pub y: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetailFrame {
    pub row: usize,
    pub y: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    pub rows: Vec<RowFrame>,
    /// Inline detail block, if a row is expanded in [`DetailMode::Inline`].
    pub detail: Option<DetailFrame>,
    /// Row shown in the overlay, if a row is selected in [`DetailMode::Overlay`].
    pub overlay: Option<usize>,
    pub content_extent: f64,
}

#[derive(Debug, Clone)]
pub struct GalleryLayout {
    metrics: LayoutMetrics,
    mode: DetailMode,
    state: ExpansionState,
}

impl Default for GalleryLayout {
    fn default() -> Self {
        Self::new(LayoutMetrics::default())
    }
}

impl GalleryLayout {
    pub fn new(metrics: LayoutMetrics) -> Self {
        Self {
            metrics,
            mode: DetailMode::Inline,
            state: ExpansionState::Collapsed,
        }
    }

    pub fn with_mode(mut self, mode: DetailMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn metrics(&self) -> LayoutMetrics {
        self.metrics
    }

    pub fn mode(&self) -> DetailMode {
        self.mode
    }

    pub fn state(&self) -> ExpansionState {
        self.state
    }

    pub fn tap(&mut self, index: usize, row_count: usize) -> Result<Transition, LayoutError> {
        if index >= row_count {
            return Err(LayoutError::RowOutOfRange { index, row_count });
        }
        let transition = match self.state {
            ExpansionState::Collapsed => {
                self.state = ExpansionState::Expanded(index);
                Transition::Expanded(index)
            }
            ExpansionState::Expanded(current) if current == index => {
                self.state = ExpansionState::Collapsed;
                Transition::Collapsed(index)
            }
            ExpansionState::Expanded(current) => {
                // Offsets are derived from the final state only, so this is
                // the collapse of `current` followed by the expansion of `index`.
                self.state = ExpansionState::Expanded(index);
                Transition::Moved {
                    from: current,
                    to: index,
                }
            }
        };
        tracing::debug!(?transition, "layout transition");
        Ok(transition)
    }

    pub fn collapse(&mut self) {
        if self.state != ExpansionState::Collapsed {
            tracing::debug!(state = ?self.state, "expansion cleared");
        }
        self.state = ExpansionState::Collapsed;
    }

    /// Drop an expansion that no longer points inside `row_count` rows.
    pub fn revalidate(&mut self, row_count: usize) {
        if let ExpansionState::Expanded(i) = self.state {
            if i >= row_count {
                self.collapse();
            }
        }
    }

    /// Height contributed by the detail block, zero unless expanded inline.
    fn inline_detail(&self, row_count: usize) -> Option<usize> {
        match (self.mode, self.state) {
            (DetailMode::Inline, ExpansionState::Expanded(i)) if i < row_count => Some(i),
            _ => None,
        }
    }

    pub fn row_offset(&self, index: usize, row_count: usize) -> f64 {
        let base = index as f64 * self.metrics.stride();
        match self.inline_detail(row_count) {
            Some(expanded) if index > expanded => base + self.metrics.detail_height,
            _ => base,
        }
    }

    pub fn content_extent(&self, row_count: usize) -> f64 {
        let rows = row_count as f64 * self.metrics.stride();
        match self.inline_detail(row_count) {
            Some(_) => rows + self.metrics.detail_height,
            None => rows,
        }
    }

    pub fn geometry(&self, row_count: usize) -> Geometry {
        let rows = (0..row_count)
            .map(|index| RowFrame {
                index,
                y: self.row_offset(index, row_count),
                height: self.metrics.row_height,
            })
            .collect();
        let detail = self.inline_detail(row_count).map(|row| DetailFrame {
            row,
            y: self.row_offset(row, row_count) + self.metrics.row_height,
            height: self.metrics.detail_height,
        });
        let overlay = match (self.mode, self.state) {
            (DetailMode::Overlay, ExpansionState::Expanded(i)) if i < row_count => Some(i),
            _ => None,
        };
        Geometry {
            rows,
            detail,
            overlay,
            content_extent: self.content_extent(row_count),
        }
    }
}
