//! Drawing surface abstraction.
//!
//! The stroke engine never touches pixels directly; it issues clear,
//! background and path commands against an [`InkSurface`]. The raster
//! implementation lives in `airscribe-renderer`; [`RecordingSurface`] keeps a
//! display list and is used wherever pixels are not needed.

use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::page::BackgroundRef;
use crate::stroke::InkPath;
use crate::{ScribeError, ScribeResult};

/// Stroke appearance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InkStyle {
    /// RGBA colour.
    pub color: [u8; 4],
    /// Line width in pixels.
    pub width: f32,
}

impl Default for InkStyle {
    fn default() -> Self {
        Self {
            color: [0, 0, 0, 255],
            width: 8.0,
        }
    }
}

/// Trait for drawing targets.
pub trait InkSurface {
    /// Surface size in pixels.
    fn size(&self) -> (u32, u32);

    /// Fill the whole surface with a colour.
    fn clear(&mut self, color: [u8; 4]);

    /// Draw a background image scaled to fit and centered.
    ///
    /// # Errors
    ///
    /// Returns an error if the image cannot be loaded; the surface is left
    /// without a background in that case.
    fn draw_background(&mut self, background: &BackgroundRef) -> ScribeResult<()>;

    /// Stroke a path.
    fn stroke_path(&mut self, path: &InkPath, style: &InkStyle);

    /// Called before a full redraw; commands until [`Self::end_redraw`]
    /// must not become visible piecemeal.
    fn begin_redraw(&mut self) {}

    /// Publish a redraw started with [`Self::begin_redraw`].
    fn end_redraw(&mut self) {}

    /// Encode the current contents.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    fn snapshot(&self) -> ScribeResult<RasterImage>;
}

/// Encoded still image, serialized as a `data:` URI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct RasterImage {
    /// MIME type, e.g. `image/png`.
    pub mime: String,
    /// Encoded bytes.
    pub bytes: Vec<u8>,
}

impl RasterImage {
    /// Wrap encoded PNG bytes.
    #[must_use]
    pub fn png(bytes: Vec<u8>) -> Self {
        Self {
            mime: "image/png".to_string(),
            bytes,
        }
    }

    /// Encode as a base64 `data:` URI.
    #[must_use]
    pub fn to_data_uri(&self) -> String {
        let encoded = base64::engine::general_purpose::STANDARD.encode(&self.bytes);
        format!("data:{};base64,{encoded}", self.mime)
    }

    /// Decode a base64 `data:` URI.
    ///
    /// # Errors
    ///
    /// Returns [`ScribeError::Raster`] if the URI is not base64 data.
    pub fn from_data_uri(uri: &str) -> ScribeResult<Self> {
        let rest = uri
            .strip_prefix("data:")
            .ok_or_else(|| ScribeError::Raster("Not a data URI".to_string()))?;
        let (metadata, payload) = rest
            .split_once(',')
            .ok_or_else(|| ScribeError::Raster("Invalid data URI: missing comma".to_string()))?;
        let mime = metadata
            .strip_suffix(";base64")
            .ok_or_else(|| ScribeError::Raster("Data URI is not base64 encoded".to_string()))?;
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(payload)
            .map_err(|e| ScribeError::Raster(format!("Failed to decode base64: {e}")))?;
        Ok(Self {
            mime: mime.to_string(),
            bytes,
        })
    }
}

impl From<RasterImage> for String {
    fn from(image: RasterImage) -> Self {
        image.to_data_uri()
    }
}

impl TryFrom<String> for RasterImage {
    type Error = ScribeError;

    fn try_from(uri: String) -> Result<Self, Self::Error> {
        Self::from_data_uri(&uri)
    }
}

/// One recorded drawing command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum SurfaceOp {
    /// Surface filled with a colour.
    Clear {
        /// Fill colour.
        color: [u8; 4],
    },
    /// Background drawn.
    Background {
        /// Background source.
        uri: String,
    },
    /// Path stroked.
    Stroke {
        /// Path drawn.
        path: InkPath,
        /// Style used.
        style: InkStyle,
    },
}

/// Display-list surface: `clear` resets the list, everything else appends.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    width: u32,
    height: u32,
    ops: Vec<SurfaceOp>,
    redraws: u64,
}

impl RecordingSurface {
    /// Create an empty surface.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ops: Vec::new(),
            redraws: 0,
        }
    }

    /// Commands currently making up the image.
    #[must_use]
    pub fn ops(&self) -> &[SurfaceOp] {
        &self.ops
    }

    /// Number of paths currently on the surface.
    #[must_use]
    pub fn stroke_count(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, SurfaceOp::Stroke { .. }))
            .count()
    }

    /// Number of completed full redraws.
    #[must_use]
    pub fn redraw_count(&self) -> u64 {
        self.redraws
    }
}

impl InkSurface for RecordingSurface {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn clear(&mut self, color: [u8; 4]) {
        self.ops.clear();
        self.ops.push(SurfaceOp::Clear { color });
    }

    fn draw_background(&mut self, background: &BackgroundRef) -> ScribeResult<()> {
        self.ops.push(SurfaceOp::Background {
            uri: background.uri.clone(),
        });
        Ok(())
    }

    fn stroke_path(&mut self, path: &InkPath, style: &InkStyle) {
        if path.is_empty() {
            return;
        }
        self.ops.push(SurfaceOp::Stroke {
            path: path.clone(),
            style: *style,
        });
    }

    fn end_redraw(&mut self) {
        self.redraws += 1;
    }

    fn snapshot(&self) -> ScribeResult<RasterImage> {
        Ok(RasterImage {
            mime: "application/json".to_string(),
            bytes: serde_json::to_vec(&self.ops)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_uri_round_trip() {
        let image = RasterImage::png(vec![137, 80, 78, 71, 1, 2, 3]);
        let uri = image.to_data_uri();
        assert!(uri.starts_with("data:image/png;base64,"));
        assert_eq!(RasterImage::from_data_uri(&uri).expect("decode"), image);
    }

    #[test]
    fn test_data_uri_rejects_plain_text() {
        assert!(RasterImage::from_data_uri("image.png").is_err());
        assert!(RasterImage::from_data_uri("data:text/plain,hello").is_err());
        assert!(RasterImage::from_data_uri("data:image/png;base64").is_err());
    }

    #[test]
    fn test_raster_image_serializes_as_uri() {
        let image = RasterImage::png(vec![1, 2, 3]);
        let json = serde_json::to_string(&image).expect("serialize");
        assert!(json.starts_with("\"data:image/png;base64,"));
        let back: RasterImage = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, image);
    }

    #[test]
    fn test_recording_surface_clear_resets() {
        let mut surface = RecordingSurface::new(100, 100);
        surface.clear([255, 255, 255, 255]);
        let path = InkPath {
            segments: vec![
                crate::PathSegment::MoveTo {
                    to: crate::Point::new(0.0, 0.0),
                },
                crate::PathSegment::LineTo {
                    to: crate::Point::new(5.0, 5.0),
                },
            ],
        };
        surface.stroke_path(&path, &InkStyle::default());
        assert_eq!(surface.stroke_count(), 1);
        surface.clear([255, 255, 255, 255]);
        assert_eq!(surface.stroke_count(), 0);
        assert_eq!(surface.ops().len(), 1);
    }

    #[test]
    fn test_recording_surface_skips_empty_paths() {
        let mut surface = RecordingSurface::new(10, 10);
        surface.stroke_path(&InkPath::default(), &InkStyle::default());
        assert_eq!(surface.stroke_count(), 0);
    }
}
