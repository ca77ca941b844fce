//! Renderer error types.

use airscribe_core::ScribeError;
use thiserror::Error;

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur while rasterizing ink.
#[derive(Debug, Error)]
pub enum RenderError {
    /// A pixmap of this size cannot be allocated.
    #[error("Invalid surface size: {width}x{height}")]
    InvalidSize {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },

    /// Resource loading failed.
    #[error("Failed to load resource: {0}")]
    Resource(String),

    /// Encoding a snapshot failed.
    #[error("Export failed: {0}")]
    Export(String),
}

impl From<RenderError> for ScribeError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::Export(msg) => Self::Raster(msg),
            other => Self::Render(other.to_string()),
        }
    }
}
