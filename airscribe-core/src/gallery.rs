//! Saved-document gallery.
//!
//! Provides a thread-safe [`GalleryStore`] holding an ordered list of saved
//! documents. Each page is stored as a raster snapshot plus, optionally, its
//! vector strokes and background so the document can be reopened for editing.

use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::page::{BackgroundRef, Page, PageStore};
use crate::stroke::Stroke;
use crate::surface::RasterImage;

/// File name of the persisted gallery inside the data directory.
pub const GALLERY_FILE: &str = "gallery.json";

/// Errors that can occur during gallery operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested document does not exist.
    #[error("Document not found: index {index} (gallery has {count} documents)")]
    DocumentNotFound {
        /// Requested index.
        index: usize,
        /// Number of stored documents.
        count: usize,
    },
    /// A document without pages was offered.
    #[error("Document has no pages")]
    EmptyDocument,
    /// Persistence was requested but no data directory is configured.
    #[error("No data directory configured")]
    NoDataDir,
    /// An I/O error occurred during persistence.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// A serialization or deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// One saved page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRecord {
    /// Rendered page as a `data:` URI.
    pub raster: RasterImage,
    /// Vector strokes, when saved for re-editing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strokes: Option<Vec<Stroke>>,
    /// Page background.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<BackgroundRef>,
}

/// One saved document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Display name.
    pub name: String,
    /// Save time in milliseconds since the Unix epoch.
    pub timestamp_ms: u64,
    /// Pages in order.
    pub pages: Vec<PageRecord>,
}

impl DocumentRecord {
    /// Reopen for editing.
    ///
    /// Pages saved without strokes come back empty apart from their
    /// background. Returns `None` if the record has no pages.
    #[must_use]
    pub fn to_page_store(&self) -> Option<PageStore> {
        let pages = self
            .pages
            .iter()
            .map(|record| {
                Page::from_parts(
                    record.strokes.clone().unwrap_or_default(),
                    record.background.clone(),
                )
            })
            .collect();
        PageStore::from_pages(self.name.clone(), self.timestamp_ms, pages)
    }
}

/// Thread-safe gallery storage with optional JSON persistence.
///
/// # Example
///
/// ```
/// use airscribe_core::{DocumentRecord, GalleryStore, PageRecord, RasterImage};
///
/// let store = GalleryStore::new();
/// let index = store
///     .add(DocumentRecord {
///         name: "Notes".to_string(),
///         timestamp_ms: 0,
///         pages: vec![PageRecord {
///             raster: RasterImage::png(vec![1, 2, 3]),
///             strokes: None,
///             background: None,
///         }],
///     })
///     .unwrap();
/// assert_eq!(store.get(index).map(|d| d.name), Some("Notes".to_string()));
/// ```
#[derive(Debug, Clone, Default)]
pub struct GalleryStore {
    documents: Arc<RwLock<Vec<DocumentRecord>>>,
    /// Optional data directory for filesystem persistence.
    data_dir: Option<PathBuf>,
}

impl GalleryStore {
    /// Create an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store persisted to `data_dir`, loading any saved gallery.
    ///
    /// The directory is created if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or an existing
    /// gallery file cannot be parsed.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let data_dir = data_dir.into();
        std::fs::create_dir_all(&data_dir)?;
        let store = Self {
            documents: Arc::new(RwLock::new(Vec::new())),
            data_dir: Some(data_dir),
        };
        store.load_from_disk()?;
        Ok(store)
    }

    /// Number of stored documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }

    /// Whether the gallery is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All documents in order.
    #[must_use]
    pub fn list(&self) -> Vec<DocumentRecord> {
        self.documents
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    /// Get a document by index.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<DocumentRecord> {
        self.documents
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(index)
            .cloned()
    }

    /// Append a document. Returns its index.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::EmptyDocument`] if the document has no pages, or
    /// the persistence error if the gallery file cannot be written. The
    /// document is not kept in that case.
    pub fn add(&self, document: DocumentRecord) -> Result<usize, StoreError> {
        if document.pages.is_empty() {
            return Err(StoreError::EmptyDocument);
        }
        let name = document.name.clone();
        let pages = document.pages.len();
        let mut documents = self.write_documents();
        documents.push(document);
        let index = documents.len() - 1;
        if let Err(e) = self.persist(&documents) {
            documents.truncate(index);
            return Err(e);
        }
        tracing::info!(%name, pages, "Document saved");
        Ok(index)
    }

    /// Replace the document at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DocumentNotFound`] if `index` is out of range,
    /// [`StoreError::EmptyDocument`] if the document has no pages, or the
    /// persistence error; the previous document is restored in that case.
    pub fn replace(&self, index: usize, document: DocumentRecord) -> Result<(), StoreError> {
        if document.pages.is_empty() {
            return Err(StoreError::EmptyDocument);
        }
        let mut documents = self.write_documents();
        let count = documents.len();
        let slot = documents
            .get_mut(index)
            .ok_or(StoreError::DocumentNotFound { index, count })?;
        let previous = std::mem::replace(slot, document);
        if let Err(e) = self.persist(&documents) {
            documents[index] = previous;
            return Err(e);
        }
        Ok(())
    }

    /// Remove and return the document at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DocumentNotFound`] if `index` is out of range, or
    /// the persistence error; the document stays in the gallery in that case.
    pub fn delete(&self, index: usize) -> Result<DocumentRecord, StoreError> {
        let mut documents = self.write_documents();
        if index >= documents.len() {
            return Err(StoreError::DocumentNotFound {
                index,
                count: documents.len(),
            });
        }
        let removed = documents.remove(index);
        if let Err(e) = self.persist(&documents) {
            documents.insert(index, removed);
            return Err(e);
        }
        tracing::info!(name = %removed.name, "Document deleted");
        Ok(removed)
    }

    fn write_documents(&self) -> std::sync::RwLockWriteGuard<'_, Vec<DocumentRecord>> {
        self.documents
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    /// Write `documents` to disk as JSON.
    ///
    /// Called with the write lock held, so a failed write can be undone
    /// before anyone observes it. No-op without a data directory.
    fn persist(&self, documents: &[DocumentRecord]) -> Result<(), StoreError> {
        let Some(ref data_dir) = self.data_dir else {
            return Ok(());
        };
        let json = serde_json::to_string_pretty(documents)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        let path = data_dir.join(GALLERY_FILE);
        std::fs::write(&path, json).map_err(|e| {
            tracing::warn!("Failed to persist gallery to {}: {e}", path.display());
            StoreError::Io(e)
        })
    }

    /// Reload the gallery from the data directory.
    ///
    /// A missing gallery file leaves the store empty.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NoDataDir`] without a data directory, or an I/O
    /// or parse error for an unreadable file.
    pub fn load_from_disk(&self) -> Result<usize, StoreError> {
        let data_dir = self.data_dir.as_ref().ok_or(StoreError::NoDataDir)?;
        let path = data_dir.join(GALLERY_FILE);
        if !path.exists() {
            return Ok(0);
        }
        let contents = std::fs::read_to_string(&path)?;
        let loaded: Vec<DocumentRecord> = serde_json::from_str(&contents)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        let count = loaded.len();
        *self
            .documents
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = loaded;
        tracing::debug!(count, path = %path.display(), "Gallery loaded");
        Ok(count)
    }
}

/// Get the current Unix timestamp in milliseconds.
#[must_use]
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |d| {
        // Timestamp will not exceed u64 max for millennia
        #[allow(clippy::cast_possible_truncation)]
        {
            d.as_millis() as u64
        }
    })
}
