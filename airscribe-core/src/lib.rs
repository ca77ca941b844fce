//! # AirScribe Core
//!
//! Gesture-driven ink capture for an air-drawing whiteboard.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │               airscribe-core                │
//! ├─────────────────────────────────────────────┤
//! │  Input             │  Ink                   │
//! │  - Landmark feed   │  - Stroke engine       │
//! │  - Gesture         │  - Smoothing           │
//! │  - Mode debouncer  │  - Proximity erase     │
//! │  - Cursor mapper   │  - Page store          │
//! ├─────────────────────────────────────────────┤
//! │  Session + tick loop  │  Gallery store      │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! Every tick flows `LandmarkSource -> GestureClassifier -> ModeDebouncer ->
//! {CursorMapper, StrokeEngine}`. Pixels are produced through the
//! [`InkSurface`] trait; `airscribe-renderer` provides the raster backend.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod cursor;
pub mod engine;
pub mod error;
pub mod feed;
pub mod gallery;
pub mod geometry;
pub mod gesture;
pub mod landmark;
pub mod mode;
pub mod page;
pub mod record;
pub mod session;
pub mod stroke;
pub mod surface;

pub use config::{
    CanvasConfig, CursorConfig, CursorSpace, GestureConfig, GestureStrategy, InkConfig,
    ModeConfig, ScribeConfig, SmoothingWindow,
};
pub use cursor::{ControlActivator, ControlId, ControlRect, CursorMapper, CursorState, Layout};
pub use engine::{StrokeEngine, TickEffect};
pub use error::{ScribeError, ScribeResult};
pub use feed::{FeedAction, FeedEvent, LandmarkSource, ReplaySource, ScriptedSource, SourcePoll};
pub use gallery::{current_timestamp_ms, DocumentRecord, GalleryStore, PageRecord, StoreError};
pub use geometry::{Point, Rect};
pub use gesture::{Gesture, GestureClassifier};
pub use landmark::{HandFrame, Landmark};
pub use mode::{Mode, ModeDebouncer};
pub use page::{BackgroundRef, Page, PageId, PageStore};
pub use record::{
    parse_record_response, RecordRequest, RecordResponse, RecordSection, RecordService,
};
pub use session::{Session, TickHandle, TickLoop, TickOutcome, TickReport, TickScheduler};
pub use stroke::{InkPath, PathSegment, Stroke, StrokeId};
pub use surface::{InkStyle, InkSurface, RasterImage, RecordingSurface, SurfaceOp};

/// AirScribe core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
