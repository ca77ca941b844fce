//! Error types for AirScribe operations.

use thiserror::Error;

/// Result type for AirScribe operations.
pub type ScribeResult<T> = Result<T, ScribeError>;

/// Errors that can occur in AirScribe operations.
///
/// None of these are raised from the per-tick path; they surface from page
/// management, configuration, persistence and rendering calls.
#[derive(Debug, Error)]
pub enum ScribeError {
    /// Page index does not exist in the document.
    #[error("Page not found: index {index} (document has {count} pages)")]
    PageNotFound {
        /// Requested page index.
        index: usize,
        /// Number of pages in the document.
        count: usize,
    },

    /// Attempted to delete the only remaining page.
    #[error("Cannot delete the last remaining page")]
    LastPage,

    /// Configuration failed validation.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// JSON serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Filesystem error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed landmark recording line.
    #[error("Invalid feed line {line}: {reason}")]
    InvalidFeed {
        /// One-based line number in the recording.
        line: usize,
        /// Parser message.
        reason: String,
    },

    /// Raster encoding or decoding failed.
    #[error("Raster error: {0}")]
    Raster(String),

    /// Rendering error reported by a surface.
    #[error("Rendering error: {0}")]
    Render(String),

    /// Record-generation service returned something unusable.
    #[error("Record response error: {0}")]
    Record(String),
}
