//! Gallery state for the pet image client: the catalog and its filtered
//! view, the single-expansion row layout, and the save/upload pipeline.

pub mod catalog;
pub mod encode;
mod image_loader;
pub mod layout;
pub mod photo_store;
pub mod runtime;
pub mod search;
pub mod state;
pub mod upload;

pub use catalog::Catalog;
pub use encode::{encode_jpeg, encode_png, UPLOAD_JPEG_QUALITY};
pub use image_loader::{ImageLoader, ImageLoaderError};
pub use layout::{
    DetailFrame, DetailMode, ExpansionState, GalleryLayout, Geometry, LayoutError, LayoutMetrics,
    RowFrame, Transition,
};
pub use photo_store::{DirPhotoStore, PhotoStore, StoreError};
pub use runtime::{Runtime, Session};
pub use search::SearchFilter;
pub use state::{Effect, Gallery, GalleryError, Message};
pub use upload::{SaveReport, UploadPipeline, UploadSession};
