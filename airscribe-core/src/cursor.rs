//! Fingertip to pixel mapping and on-screen control hit-testing.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::{CursorConfig, CursorSpace};
use crate::geometry::{Point, Rect};
use crate::landmark::HandFrame;
use crate::mode::Mode;

/// Identifier of an on-screen control.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ControlId(pub String);

impl ControlId {
    /// Create a control ID.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for ControlId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A control's bounding box in viewport pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlRect {
    /// Control identifier.
    pub id: ControlId,
    /// Bounds in viewport pixels.
    pub rect: Rect,
}

impl ControlRect {
    /// Create a control rectangle.
    #[must_use]
    pub fn new(id: impl Into<String>, rect: Rect) -> Self {
        Self {
            id: ControlId::new(id),
            rect,
        }
    }
}

/// Screen geometry the cursor is mapped into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    /// Full viewport.
    pub viewport: Rect,
    /// Drawing canvas inside the viewport.
    pub canvas: Rect,
    /// Registered controls.
    #[serde(default)]
    pub controls: Vec<ControlRect>,
}

impl Layout {
    /// Layout where the canvas fills the whole viewport and there are no controls.
    #[must_use]
    pub fn canvas_only(width: f32, height: f32) -> Self {
        let rect = Rect::from_size(width, height);
        Self {
            viewport: rect,
            canvas: rect,
            controls: Vec::new(),
        }
    }

    /// Register a control.
    #[must_use]
    pub fn with_control(mut self, control: ControlRect) -> Self {
        self.controls.push(control);
        self
    }
}

/// Receives synthetic control activations.
pub trait ControlActivator {
    /// Activate a control. Returns whether anything handled it.
    fn activate(&mut self, id: &ControlId) -> bool;
}

impl<F> ControlActivator for F
where
    F: FnMut(&ControlId) -> bool,
{
    fn activate(&mut self, id: &ControlId) -> bool {
        self(id)
    }
}

/// Per-tick cursor result. Never persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CursorState {
    /// Mode to feed the stroke engine this tick.
    pub mode: Mode,
    /// Pointer position in viewport pixels.
    pub position: Option<Point>,
    /// Pointer in canvas-local pixels, when inside the canvas.
    pub canvas_point: Option<Point>,
    /// Control under the pointer that is not cooling down.
    pub hovered: Option<ControlId>,
    /// Control activated this tick.
    pub activated: Option<ControlId>,
}

impl CursorState {
    /// Whether the pointer is inside the canvas.
    #[must_use]
    pub const fn in_canvas(&self) -> bool {
        self.canvas_point.is_some()
    }
}

/// Maps the index fingertip to pixels and triggers controls.
#[derive(Debug, Clone, Default)]
pub struct CursorMapper {
    config: CursorConfig,
    /// Last activation time per control.
    cooldowns: HashMap<ControlId, u64>,
    smoothed: Option<Point>,
}

impl CursorMapper {
    /// Create a mapper.
    #[must_use]
    pub fn new(config: CursorConfig) -> Self {
        Self {
            config,
            cooldowns: HashMap::new(),
            smoothed: None,
        }
    }

    /// Mapper settings.
    #[must_use]
    pub const fn config(&self) -> &CursorConfig {
        &self.config
    }

    /// Whether `id` was activated less than the click cooldown ago.
    #[must_use]
    pub fn is_cooling_down(&self, id: &ControlId, now_ms: u64) -> bool {
        self.cooldowns
            .get(id)
            .is_some_and(|&at| now_ms.saturating_sub(at) < self.config.click_cooldown_ms)
    }

    /// Forget the smoothed pointer, e.g. after the hand left the frame.
    pub fn reset_smoothing(&mut self) {
        self.smoothed = None;
    }

    /// Map one frame.
    ///
    /// Drawing over a control outside the canvas activates it, starts its
    /// cooldown and reports [`Mode::None`] for this tick.
    pub fn map(
        &mut self,
        frame: &HandFrame,
        layout: &Layout,
        mode: Mode,
        now_ms: u64,
        activator: &mut dyn ControlActivator,
    ) -> CursorState {
        let Some(tip) = frame.index_tip() else {
            return CursorState {
                mode,
                ..CursorState::default()
            };
        };

        let space = match self.config.space {
            CursorSpace::Canvas => layout.canvas,
            CursorSpace::Viewport => layout.viewport,
        };
        let raw = Point::new(
            (1.0 - tip.x).mul_add(space.width, space.x),
            tip.y.mul_add(space.height, space.y),
        );
        let position = self.smooth(raw);

        let canvas_point = layout
            .canvas
            .contains(position)
            .then(|| layout.canvas.to_local(position));
        let hovered = layout
            .controls
            .iter()
            .find(|c| c.rect.contains(position) && !self.is_cooling_down(&c.id, now_ms))
            .map(|c| c.id.clone());

        let mut state = CursorState {
            mode,
            position: Some(position),
            canvas_point,
            hovered,
            activated: None,
        };

        if mode == Mode::Draw && canvas_point.is_none() {
            if let Some(id) = state.hovered.clone() {
                let handled = activator.activate(&id);
                tracing::info!(control = %id, handled, "Control activated by pointer");
                self.cooldowns.insert(id.clone(), now_ms);
                state.mode = Mode::None;
                state.activated = Some(id);
            }
        }

        state
    }

    fn smooth(&mut self, raw: Point) -> Point {
        let alpha = self.config.pointer_smoothing;
        let next = match self.smoothed {
            Some(previous) if alpha > 0.0 => previous.lerp(raw, 1.0 - alpha),
            _ => raw,
        };
        self.smoothed = Some(next);
        next
    }
}
