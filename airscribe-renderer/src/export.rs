//! Page snapshot export.
//!
//! Encodes rendered pixels to PNG or JPEG. JPEG has no alpha, so pixels are
//! composited over the configured background colour first.

use airscribe_core::RasterImage;
use image::ImageEncoder;
use tiny_skia::Pixmap;

use crate::error::{RenderError, RenderResult};
use crate::raster::RasterSurface;

/// Export output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// PNG image.
    Png,
    /// JPEG image.
    Jpeg,
}

impl ExportFormat {
    /// MIME type of the encoded output.
    #[must_use]
    pub const fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }

    /// Conventional file extension.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
        }
    }
}

/// Configuration for snapshot export.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Background color as RGBA bytes.
    pub background: [u8; 4],
    /// JPEG quality 1-100 (default: 85).
    pub jpeg_quality: u8,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            background: [255, 255, 255, 255],
            jpeg_quality: 85,
        }
    }
}

/// Encodes raster pixels to still-image formats.
#[derive(Debug, Clone, Default)]
pub struct SnapshotExporter {
    config: ExportConfig,
}

impl SnapshotExporter {
    /// Create a new exporter with the given configuration.
    #[must_use]
    pub fn new(config: ExportConfig) -> Self {
        Self { config }
    }

    /// Create an exporter with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::default()
    }

    /// Exporter configuration.
    #[must_use]
    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Encode pixels in the given format.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    pub fn export(&self, pixmap: &Pixmap, format: ExportFormat) -> RenderResult<Vec<u8>> {
        match format {
            ExportFormat::Png => Self::encode_png(pixmap),
            ExportFormat::Jpeg => self.encode_jpeg(pixmap),
        }
    }

    /// Encode a surface's visible pixels as a [`RasterImage`].
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    pub fn export_surface(
        &self,
        surface: &RasterSurface,
        format: ExportFormat,
    ) -> RenderResult<RasterImage> {
        Ok(RasterImage {
            mime: format.mime().to_string(),
            bytes: self.export(surface.pixmap(), format)?,
        })
    }

    /// Encode pixels as PNG.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    pub fn encode_png(pixmap: &Pixmap) -> RenderResult<Vec<u8>> {
        pixmap
            .encode_png()
            .map_err(|e| RenderError::Export(format!("PNG encoding failed: {e}")))
    }

    /// Encode pixels as JPEG over the background colour.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn encode_jpeg(&self, pixmap: &Pixmap) -> RenderResult<Vec<u8>> {
        let (width, height) = (pixmap.width(), pixmap.height());
        let bg = &self.config.background;
        let mut rgb_data = Vec::with_capacity((width * height * 3) as usize);
        // Pixmap data is premultiplied: out = src + bg * (1 - alpha)
        for pixel in pixmap.data().chunks_exact(4) {
            let inv = 1.0 - f32::from(pixel[3]) / 255.0;
            for (&src, &back) in pixel[..3].iter().zip(bg.iter()) {
                let value = f32::from(back).mul_add(inv, f32::from(src));
                rgb_data.push(value.round().min(255.0) as u8);
            }
        }

        let mut buf = std::io::Cursor::new(Vec::new());
        let encoder =
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, self.config.jpeg_quality);
        encoder
            .write_image(&rgb_data, width, height, image::ColorType::Rgb8.into())
            .map_err(|e| RenderError::Export(format!("JPEG encoding failed: {e}")))?;

        Ok(buf.into_inner())
    }
}
