//! Pages and the multi-page document store.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geometry::Point;
use crate::stroke::{Stroke, StrokeId};
use crate::surface::RasterImage;
use crate::{ScribeError, ScribeResult};

/// Unique identifier for a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageId(Uuid);

impl PageId {
    /// Create a new unique page ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PageId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reference to a page background image.
///
/// The URI may be a `data:` URI, a file path, or anything else the surface
/// knows how to load.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BackgroundRef {
    /// Image source.
    pub uri: String,
}

impl BackgroundRef {
    /// Create a background reference.
    #[must_use]
    pub fn new(uri: impl Into<String>) -> Self {
        Self { uri: uri.into() }
    }
}

/// One document page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    /// Unique identifier.
    pub id: PageId,
    /// Committed strokes, oldest first.
    strokes: Vec<Stroke>,
    background: Option<BackgroundRef>,
    #[serde(skip)]
    snapshot: Option<RasterImage>,
}

impl Page {
    /// Create an empty page.
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: PageId::new(),
            strokes: Vec::new(),
            background: None,
            snapshot: None,
        }
    }

    /// Rebuild a page from persisted strokes and background.
    #[must_use]
    pub fn from_parts(strokes: Vec<Stroke>, background: Option<BackgroundRef>) -> Self {
        Self {
            id: PageId::new(),
            strokes,
            background,
            snapshot: None,
        }
    }

    /// Committed strokes in z-order.
    #[must_use]
    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    /// Number of committed strokes.
    #[must_use]
    pub fn stroke_count(&self) -> usize {
        self.strokes.len()
    }

    /// Commit a stroke on top of the existing ones.
    pub fn push_stroke(&mut self, stroke: Stroke) {
        self.strokes.push(stroke);
        self.snapshot = None;
    }

    /// Remove every stroke passing strictly within `radius` of `point`.
    ///
    /// Returns the IDs of removed strokes, oldest first.
    pub fn erase_near(&mut self, point: Point, radius: f32) -> Vec<StrokeId> {
        let mut removed = Vec::new();
        self.strokes.retain(|stroke| {
            let hit = stroke.is_near(point, radius);
            if hit {
                removed.push(stroke.id);
            }
            !hit
        });
        if !removed.is_empty() {
            self.snapshot = None;
        }
        removed
    }

    /// Remove all strokes. The background is kept.
    pub fn clear_strokes(&mut self) {
        if !self.strokes.is_empty() {
            self.strokes.clear();
            self.snapshot = None;
        }
    }

    /// Background image, if any.
    #[must_use]
    pub fn background(&self) -> Option<&BackgroundRef> {
        self.background.as_ref()
    }

    /// Replace or remove the background.
    pub fn set_background(&mut self, background: Option<BackgroundRef>) {
        self.background = background;
        self.snapshot = None;
    }

    /// Cached raster snapshot, if still valid.
    #[must_use]
    pub fn snapshot(&self) -> Option<&RasterImage> {
        self.snapshot.as_ref()
    }

    /// Store a freshly rendered snapshot.
    pub fn set_snapshot(&mut self, image: RasterImage) {
        self.snapshot = Some(image);
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new()
    }
}

/// Ordered pages of one document plus the current page.
///
/// Always holds at least one page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageStore {
    /// Document name.
    pub name: String,
    /// Creation time in milliseconds since the Unix epoch.
    pub created_ms: u64,
    pages: Vec<Page>,
    current: usize,
}

impl PageStore {
    /// Create a document with one empty page.
    #[must_use]
    pub fn new(name: impl Into<String>, created_ms: u64) -> Self {
        Self {
            name: name.into(),
            created_ms,
            pages: vec![Page::new()],
            current: 0,
        }
    }

    /// Create a document from existing pages, starting on the first.
    ///
    /// Returns `None` if `pages` is empty.
    #[must_use]
    pub fn from_pages(
        name: impl Into<String>,
        created_ms: u64,
        pages: Vec<Page>,
    ) -> Option<Self> {
        if pages.is_empty() {
            return None;
        }
        Some(Self {
            name: name.into(),
            created_ms,
            pages,
            current: 0,
        })
    }

    /// All pages in order.
    #[must_use]
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Mutable access to all pages, e.g. to refresh snapshots.
    pub fn pages_mut(&mut self) -> &mut [Page] {
        &mut self.pages
    }

    /// Number of pages.
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Index of the current page.
    #[must_use]
    pub const fn current_index(&self) -> usize {
        self.current
    }

    /// The current page.
    #[must_use]
    pub fn current(&self) -> &Page {
        &self.pages[self.current]
    }

    /// Mutable access to the current page.
    pub fn current_mut(&mut self) -> &mut Page {
        &mut self.pages[self.current]
    }

    /// Get a page by index.
    #[must_use]
    pub fn page(&self, index: usize) -> Option<&Page> {
        self.pages.get(index)
    }

    /// Append an empty page and make it current. Returns its index.
    pub fn add_page(&mut self) -> usize {
        self.pages.push(Page::new());
        self.current = self.pages.len() - 1;
        tracing::info!(index = self.current, count = self.pages.len(), "Page added");
        self.current
    }

    /// Make `index` the current page.
    ///
    /// # Errors
    ///
    /// Returns [`ScribeError::PageNotFound`] and leaves the store unchanged
    /// if `index` is out of range.
    pub fn switch_to(&mut self, index: usize) -> ScribeResult<()> {
        self.check_index(index)?;
        if index != self.current {
            self.current = index;
            tracing::info!(index, "Switched page");
        }
        Ok(())
    }

    /// Move to the following page.
    ///
    /// # Errors
    ///
    /// Returns [`ScribeError::PageNotFound`] on the last page.
    pub fn next_page(&mut self) -> ScribeResult<()> {
        self.switch_to(self.current + 1)
    }

    /// Move to the preceding page.
    ///
    /// # Errors
    ///
    /// Returns [`ScribeError::PageNotFound`] on the first page.
    pub fn previous_page(&mut self) -> ScribeResult<()> {
        let index = self.current.checked_sub(1).ok_or_else(|| {
            tracing::warn!("Already on the first page");
            ScribeError::PageNotFound {
                index: 0,
                count: self.pages.len(),
            }
        })?;
        self.switch_to(index)
    }

    /// Delete the page at `index`, releasing its strokes and background.
    ///
    /// The current page stays the same page where possible; deleting the
    /// current page selects the one that took its place, or the new last page.
    ///
    /// # Errors
    ///
    /// Returns [`ScribeError::LastPage`] if this is the only page, or
    /// [`ScribeError::PageNotFound`] if `index` is out of range. The store is
    /// unchanged in both cases.
    pub fn delete_page(&mut self, index: usize) -> ScribeResult<Page> {
        self.check_index(index)?;
        if self.pages.len() == 1 {
            tracing::warn!("Refusing to delete the only page");
            return Err(ScribeError::LastPage);
        }
        let removed = self.pages.remove(index);
        if index < self.current || self.current >= self.pages.len() {
            self.current -= 1;
        }
        tracing::info!(
            index,
            current = self.current,
            count = self.pages.len(),
            "Page deleted"
        );
        Ok(removed)
    }

    /// Delete the current page.
    ///
    /// # Errors
    ///
    /// See [`Self::delete_page`].
    pub fn delete_current(&mut self) -> ScribeResult<Page> {
        self.delete_page(self.current)
    }

    /// Set the background of the page at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`ScribeError::PageNotFound`] if `index` is out of range.
    pub fn set_background(
        &mut self,
        index: usize,
        background: Option<BackgroundRef>,
    ) -> ScribeResult<()> {
        self.check_index(index)?;
        self.pages[index].set_background(background);
        Ok(())
    }

    fn check_index(&self, index: usize) -> ScribeResult<()> {
        if index < self.pages.len() {
            Ok(())
        } else {
            tracing::warn!(index, count = self.pages.len(), "Page index out of range");
            Err(ScribeError::PageNotFound {
                index,
                count: self.pages.len(),
            })
        }
    }
}

impl Default for PageStore {
    fn default() -> Self {
        Self::new("Untitled", 0)
    }
}
