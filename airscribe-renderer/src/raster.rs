//! tiny-skia implementation of [`InkSurface`].

use airscribe_core::{
    BackgroundRef, InkPath, InkStyle, InkSurface, PathSegment, RasterImage, Rect, ScribeResult,
};
use tiny_skia::{
    Color, FilterQuality, LineCap, LineJoin, Paint, PathBuilder, Pixmap, PixmapPaint, Stroke,
    Transform,
};

use crate::error::{RenderError, RenderResult};
use crate::image::{BackgroundCache, BackgroundCacheConfig};

/// Software raster canvas.
///
/// Incremental strokes land directly on the visible pixmap. A full redraw
/// renders into a scratch pixmap that replaces the visible one on
/// [`InkSurface::end_redraw`], so a snapshot never observes a half-drawn page.
#[derive(Debug)]
pub struct RasterSurface {
    pixmap: Pixmap,
    scratch: Option<Pixmap>,
    backgrounds: BackgroundCache,
}

impl RasterSurface {
    /// Create a transparent surface.
    ///
    /// # Errors
    ///
    /// Returns an error if either dimension is zero or too large.
    pub fn new(width: u32, height: u32) -> RenderResult<Self> {
        Self::with_cache_config(width, height, BackgroundCacheConfig::default())
    }

    /// Create a transparent surface with custom background cache limits.
    ///
    /// # Errors
    ///
    /// Returns an error if either dimension is zero or too large.
    pub fn with_cache_config(
        width: u32,
        height: u32,
        cache: BackgroundCacheConfig,
    ) -> RenderResult<Self> {
        let pixmap = Pixmap::new(width, height).ok_or(RenderError::InvalidSize { width, height })?;
        Ok(Self {
            pixmap,
            scratch: None,
            backgrounds: BackgroundCache::with_config(cache),
        })
    }

    /// The visible pixels.
    #[must_use]
    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Decoded background cache.
    #[must_use]
    pub fn backgrounds(&self) -> &BackgroundCache {
        &self.backgrounds
    }

    /// Whether a redraw is in progress.
    #[must_use]
    pub fn is_redrawing(&self) -> bool {
        self.scratch.is_some()
    }

    /// Encode the visible pixels as PNG.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    pub fn encode_png(&self) -> RenderResult<Vec<u8>> {
        self.pixmap
            .encode_png()
            .map_err(|e| RenderError::Export(format!("PNG encoding failed: {e}")))
    }
}

/// The pixmap commands should land on.
fn target<'a>(pixmap: &'a mut Pixmap, scratch: &'a mut Option<Pixmap>) -> &'a mut Pixmap {
    match scratch {
        Some(scratch) => scratch,
        None => pixmap,
    }
}

fn to_color(rgba: [u8; 4]) -> Color {
    Color::from_rgba8(rgba[0], rgba[1], rgba[2], rgba[3])
}

/// Convert an ink path to a tiny-skia path. `None` if nothing would draw.
fn build_path(path: &InkPath) -> Option<tiny_skia::Path> {
    let mut pb = PathBuilder::new();
    for segment in &path.segments {
        match *segment {
            PathSegment::MoveTo { to } => pb.move_to(to.x, to.y),
            PathSegment::LineTo { to } => pb.line_to(to.x, to.y),
            PathSegment::QuadTo { ctrl, to } => pb.quad_to(ctrl.x, ctrl.y, to.x, to.y),
        }
    }
    pb.finish()
}

/// Scale and offset that fit an image inside the surface, centered.
#[allow(clippy::cast_precision_loss)]
fn contain_transform(surface: (u32, u32), image: (u32, u32)) -> Option<Transform> {
    let (iw, ih) = (image.0 as f32, image.1 as f32);
    let fit = Rect::from_size(surface.0 as f32, surface.1 as f32).fit_contain(iw, ih)?;
    let scale = fit.width / iw;
    Some(Transform::from_row(scale, 0.0, 0.0, scale, fit.x, fit.y))
}

impl InkSurface for RasterSurface {
    fn size(&self) -> (u32, u32) {
        (self.pixmap.width(), self.pixmap.height())
    }

    fn clear(&mut self, color: [u8; 4]) {
        target(&mut self.pixmap, &mut self.scratch).fill(to_color(color));
    }

    fn draw_background(&mut self, background: &BackgroundRef) -> ScribeResult<()> {
        let image = self.backgrounds.get_or_load(&background.uri)?;
        let canvas = target(&mut self.pixmap, &mut self.scratch);
        let Some(transform) = contain_transform(
            (canvas.width(), canvas.height()),
            (image.width(), image.height()),
        ) else {
            return Ok(());
        };
        let paint = PixmapPaint {
            quality: FilterQuality::Bilinear,
            ..PixmapPaint::default()
        };
        canvas.draw_pixmap(0, 0, image.as_ref(), &paint, transform, None);
        Ok(())
    }

    fn stroke_path(&mut self, path: &InkPath, style: &InkStyle) {
        let Some(path) = build_path(path) else {
            return;
        };
        let mut paint = Paint::default();
        paint.set_color(to_color(style.color));
        paint.anti_alias = true;
        let stroke = Stroke {
            width: style.width,
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..Stroke::default()
        };
        target(&mut self.pixmap, &mut self.scratch).stroke_path(
            &path,
            &paint,
            &stroke,
            Transform::identity(),
            None,
        );
    }

    fn begin_redraw(&mut self) {
        // Same size as the visible pixmap, which already allocated successfully
        self.scratch = Pixmap::new(self.pixmap.width(), self.pixmap.height());
    }

    fn end_redraw(&mut self) {
        if let Some(scratch) = self.scratch.take() {
            self.pixmap = scratch;
        }
    }

    fn snapshot(&self) -> ScribeResult<RasterImage> {
        Ok(RasterImage::png(self.encode_png()?))
    }
}
