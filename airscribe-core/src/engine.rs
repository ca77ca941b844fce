//! Stroke capture, proximity erase and page redraw.

use crate::config::{InkConfig, SmoothingWindow};
use crate::geometry::Point;
use crate::mode::Mode;
use crate::page::Page;
use crate::stroke::{Stroke, StrokeId};
use crate::surface::{InkSurface, RasterImage};
use crate::ScribeResult;

/// What a single engine tick did.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TickEffect {
    /// Nothing changed.
    #[default]
    Idle,
    /// A point was appended to the open stroke.
    Appended {
        /// Points in the open stroke afterwards.
        points: usize,
    },
    /// Committed strokes were removed and the page redrawn.
    Erased {
        /// Removed strokes, oldest first.
        removed: Vec<StrokeId>,
    },
    /// The open stroke was committed to the page.
    Sealed(StrokeId),
    /// The open stroke was too short and was dropped.
    Discarded,
}

/// Owns the in-progress stroke and renders ink for the current page.
#[derive(Debug, Clone, Default)]
pub struct StrokeEngine {
    open: Option<Stroke>,
    config: InkConfig,
}

impl StrokeEngine {
    /// Create an engine with the given ink settings.
    #[must_use]
    pub const fn new(config: InkConfig) -> Self {
        Self { open: None, config }
    }

    /// Ink settings.
    #[must_use]
    pub const fn config(&self) -> &InkConfig {
        &self.config
    }

    /// The stroke currently being captured, if any.
    #[must_use]
    pub fn open_stroke(&self) -> Option<&Stroke> {
        self.open.as_ref()
    }

    /// Advance one tick.
    ///
    /// `point` is `None` when the pointer is outside the canvas; the stroke
    /// stays open but nothing is appended or tested.
    pub fn on_mode_tick(
        &mut self,
        mode: Mode,
        point: Option<Point>,
        page: &mut Page,
        surface: &mut dyn InkSurface,
    ) -> TickEffect {
        if mode == Mode::None {
            return self.finish(page, surface);
        }

        let stroke = self.open.get_or_insert_with(Stroke::new);
        let Some(point) = point else {
            return TickEffect::Idle;
        };

        if mode == Mode::Draw {
            stroke.push(point);
            if let Some(piece) = stroke.latest_segment(self.config.smoothing_weight) {
                surface.stroke_path(&piece, &self.config.style());
            }
            tracing::trace!(points = stroke.len(), "Ink appended");
            return TickEffect::Appended {
                points: stroke.len(),
            };
        }

        let removed = page.erase_near(point, self.config.erase_radius);
        if removed.is_empty() {
            return TickEffect::Idle;
        }
        tracing::debug!(count = removed.len(), "Strokes erased");
        self.redraw(page, surface);
        TickEffect::Erased { removed }
    }

    /// Close the open stroke, committing it if it has at least two points.
    pub fn finish(&mut self, page: &mut Page, surface: &mut dyn InkSurface) -> TickEffect {
        let Some(stroke) = self.open.take() else {
            return TickEffect::Idle;
        };

        if !stroke.is_sealable() {
            if !stroke.is_empty() {
                tracing::debug!(points = stroke.len(), "Stroke too short, discarded");
            }
            return TickEffect::Discarded;
        }

        let id = stroke.id;
        let tail = stroke.tail_segment(self.config.smoothing_weight);
        tracing::debug!(%id, points = stroke.len(), "Stroke sealed");
        page.push_stroke(stroke);

        match self.config.smoothing_window {
            SmoothingWindow::Local => {
                if let Some(tail) = tail {
                    surface.stroke_path(&tail, &self.config.style());
                }
            }
            SmoothingWindow::WholeStroke => self.redraw(page, surface),
        }
        TickEffect::Sealed(id)
    }

    /// Drop the open stroke without committing it.
    pub fn abandon(&mut self) {
        if self.open.take().is_some() {
            tracing::debug!("Open stroke abandoned");
        }
    }

    /// Repaint `page` from scratch: background colour, background image,
    /// then every committed stroke oldest first.
    pub fn redraw(&self, page: &Page, surface: &mut dyn InkSurface) {
        surface.begin_redraw();
        surface.clear(self.config.background);
        if let Some(background) = page.background() {
            if let Err(e) = surface.draw_background(background) {
                tracing::warn!(uri = %background.uri, error = %e, "Background not drawn");
            }
        }
        let style = self.config.style();
        for stroke in page.strokes() {
            surface.stroke_path(&stroke.smoothed_path(self.config.smoothing_weight), &style);
        }
        surface.end_redraw();
    }

    /// Raster snapshot of `page`, rendered through `surface` unless cached.
    ///
    /// A fresh render leaves `page` on the surface.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface cannot encode its contents.
    pub fn snapshot(
        &self,
        page: &mut Page,
        surface: &mut dyn InkSurface,
    ) -> ScribeResult<RasterImage> {
        if let Some(cached) = page.snapshot() {
            return Ok(cached.clone());
        }
        self.redraw(page, surface);
        let image = surface.snapshot()?;
        page.set_snapshot(image.clone());
        Ok(image)
    }
}
