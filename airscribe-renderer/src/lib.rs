//! # AirScribe Renderer
//!
//! Software rasterization of AirScribe ink on top of tiny-skia.
//!
//! ## Pipeline
//!
//! ```text
//! ┌──────────────┐  InkPath   ┌───────────────┐  Pixmap  ┌──────────────────┐
//! │ StrokeEngine │ ─────────► │ RasterSurface │ ───────► │ SnapshotExporter │
//! └──────────────┘            └───────┬───────┘          └──────────────────┘
//!                                     │ data: URI / path      PNG / JPEG
//!                             ┌───────┴─────────┐
//!                             │ BackgroundCache │
//!                             └─────────────────┘
//! ```
//!
//! [`RasterSurface`] implements [`airscribe_core::InkSurface`], so a
//! [`airscribe_core::Session`] draws straight into its pixmap.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod export;
pub mod image;
pub mod raster;

pub use crate::image::{
    load_pixmap, load_pixmap_from_bytes, BackgroundCache, BackgroundCacheConfig,
    BackgroundCacheStats,
};
pub use error::{RenderError, RenderResult};
pub use export::{ExportConfig, ExportFormat, SnapshotExporter};
pub use raster::RasterSurface;
