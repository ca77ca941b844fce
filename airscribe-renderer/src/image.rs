//! Background image loading.
//!
//! Backgrounds arrive as base64 `data:` URIs or file paths and are decoded
//! into premultiplied tiny-skia pixmaps. Decoded images are cached by URI so
//! a page redraw does not decode its background again; the cache is bounded
//! and evicts the least recently used background.

use std::collections::HashMap;
use std::path::Path;

use base64::Engine;
use tiny_skia::{ColorU8, Pixmap};

use crate::error::{RenderError, RenderResult};

/// Decode an encoded image (PNG, JPEG, ...) into a pixmap.
///
/// # Errors
///
/// Returns an error if the image cannot be decoded or is empty.
pub fn load_pixmap_from_bytes(data: &[u8]) -> RenderResult<Pixmap> {
    let rgba = image::load_from_memory(data)
        .map_err(|e| RenderError::Resource(format!("Failed to decode image: {e}")))?
        .to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut pixmap = Pixmap::new(width, height).ok_or(RenderError::InvalidSize { width, height })?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(rgba.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Ok(pixmap)
}

/// Decode a base64 data URI such as `data:image/png;base64,iVBORw0KGgo...`.
///
/// # Errors
///
/// Returns an error if the URI is malformed or the image cannot be decoded.
pub fn load_pixmap_from_data_uri(uri: &str) -> RenderResult<Pixmap> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| RenderError::Resource("Not a data URI".to_string()))?;
    let (metadata, payload) = rest
        .split_once(',')
        .ok_or_else(|| RenderError::Resource("Invalid data URI: missing comma".to_string()))?;
    if !metadata.contains(";base64") {
        return Err(RenderError::Resource(
            "Only base64 data URIs are supported".to_string(),
        ));
    }

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| RenderError::Resource(format!("Failed to decode base64: {e}")))?;
    load_pixmap_from_bytes(&bytes)
}

/// Read and decode an image file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or decoded.
pub fn load_pixmap_from_path(path: impl AsRef<Path>) -> RenderResult<Pixmap> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)
        .map_err(|e| RenderError::Resource(format!("{}: {e}", path.display())))?;
    load_pixmap_from_bytes(&bytes)
}

/// Decode a background source: a `data:` URI or a file path.
///
/// # Errors
///
/// Returns an error if the source cannot be loaded.
pub fn load_pixmap(uri: &str) -> RenderResult<Pixmap> {
    if uri.starts_with("data:") {
        load_pixmap_from_data_uri(uri)
    } else {
        load_pixmap_from_path(uri)
    }
}

/// Limits of a [`BackgroundCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackgroundCacheConfig {
    /// Maximum number of decoded backgrounds kept.
    pub max_entries: usize,
    /// Maximum total pixel bytes kept.
    pub max_size_bytes: usize,
}

impl Default for BackgroundCacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 16,
            max_size_bytes: 64 * 1024 * 1024, // 64 MB
        }
    }
}

/// Cache statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackgroundCacheStats {
    /// Lookups served from the cache.
    pub hits: u64,
    /// Lookups that had to decode.
    pub misses: u64,
    /// Backgrounds dropped to stay within limits.
    pub evictions: u64,
    /// Total pixel bytes decoded.
    pub bytes_loaded: u64,
}

#[derive(Debug)]
struct CacheEntry {
    pixmap: Pixmap,
    /// Access tick of the last lookup.
    last_used: u64,
    size_bytes: usize,
}

/// Decoded backgrounds keyed by source URI.
///
/// Least recently used backgrounds are evicted once either limit in
/// [`BackgroundCacheConfig`] is exceeded. The background being loaded is
/// always kept, even if it alone exceeds the size limit. Failed loads are not
/// cached, so a file that appears later is picked up on the next redraw.
#[derive(Debug, Default)]
pub struct BackgroundCache {
    entries: HashMap<String, CacheEntry>,
    config: BackgroundCacheConfig,
    current_size: usize,
    clock: u64,
    stats: BackgroundCacheStats,
}

impl BackgroundCache {
    /// Create an empty cache with default limits.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty cache with custom limits.
    #[must_use]
    pub fn with_config(config: BackgroundCacheConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Get a decoded background, loading it on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be loaded.
    pub fn get_or_load(&mut self, uri: &str) -> RenderResult<&Pixmap> {
        self.clock += 1;
        // Taken out while evicting so the requested entry is never the victim
        let mut entry = match self.entries.remove(uri) {
            Some(entry) => {
                self.stats.hits += 1;
                entry
            }
            None => {
                self.stats.misses += 1;
                let pixmap = load_pixmap(uri)?;
                let size_bytes = pixmap.data().len();
                tracing::debug!(
                    width = pixmap.width(),
                    height = pixmap.height(),
                    size_bytes,
                    "Decoded background"
                );
                self.evict_if_needed(size_bytes);
                self.current_size += size_bytes;
                self.stats.bytes_loaded += size_bytes as u64;
                CacheEntry {
                    pixmap,
                    last_used: 0,
                    size_bytes,
                }
            }
        };
        entry.last_used = self.clock;
        let entry = self.entries.entry(uri.to_string()).or_insert(entry);
        Ok(&entry.pixmap)
    }

    /// Whether `uri` is cached.
    #[must_use]
    pub fn contains(&self, uri: &str) -> bool {
        self.entries.contains_key(uri)
    }

    /// Number of cached backgrounds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pixel bytes currently cached.
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        self.current_size
    }

    /// Cache statistics.
    #[must_use]
    pub fn stats(&self) -> BackgroundCacheStats {
        self.stats
    }

    /// Limits in effect.
    #[must_use]
    pub fn config(&self) -> BackgroundCacheConfig {
        self.config
    }

    /// Drop every cached background.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.current_size = 0;
    }

    /// Make room for an entry of `needed_bytes` that is not yet in the map.
    fn evict_if_needed(&mut self, needed_bytes: usize) {
        while self.current_size + needed_bytes > self.config.max_size_bytes
            && !self.entries.is_empty()
        {
            self.evict_lru();
        }
        while self.entries.len() >= self.config.max_entries && !self.entries.is_empty() {
            self.evict_lru();
        }
    }

    fn evict_lru(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.last_used)
            .map(|(uri, _)| uri.clone());
        if let Some(entry) = oldest.and_then(|uri| self.entries.remove(&uri)) {
            self.current_size -= entry.size_bytes;
            self.stats.evictions += 1;
        }
    }
}
