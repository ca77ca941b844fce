//! Runtime configuration.
//!
//! Every section deserializes with defaults, so a config file only needs to
//! name the values it overrides:
//!
//! ```
//! use airscribe_core::{CursorSpace, ScribeConfig};
//!
//! let config = ScribeConfig::from_json_str(r#"{ "cursor": { "space": "canvas" } }"#).unwrap();
//! assert_eq!(config.cursor.space, CursorSpace::Canvas);
//! assert_eq!(config.mode.neutral_timeout_ms, 100);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::surface::InkStyle;
use crate::{ScribeError, ScribeResult};

/// How a hand pose is turned into a gesture.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureStrategy {
    /// Finger extension poses: pointing draws, fist erases.
    #[default]
    FingerPose,
    /// Thumb/index pinch draws; there is no erase pose.
    Pinch,
}

/// Coordinate space the fingertip is projected into.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CursorSpace {
    /// Project onto the drawing canvas only.
    Canvas,
    /// Project onto the full viewport so controls outside the canvas can be hovered.
    #[default]
    Viewport,
}

/// How much of a stroke the visible smoothing covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SmoothingWindow {
    /// Live ink stays as drawn segment-by-segment until the next full redraw.
    Local,
    /// Sealing a stroke redraws the page so the whole stroke is smoothed.
    #[default]
    WholeStroke,
}

/// Gesture classifier settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Classification strategy.
    pub strategy: GestureStrategy,
    /// Normalized tip/base offset for a finger to count as extended or down.
    pub extension_threshold: f32,
    /// Normalized thumb-to-index distance below which the hand is pinched.
    pub pinch_threshold: f32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            strategy: GestureStrategy::FingerPose,
            extension_threshold: 0.05,
            pinch_threshold: 0.08,
        }
    }
}

/// Mode debouncer settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModeConfig {
    /// Minimum dwell in `None` before an active mode is accepted.
    pub neutral_timeout_ms: u64,
}

impl Default for ModeConfig {
    fn default() -> Self {
        Self {
            neutral_timeout_ms: 100,
        }
    }
}

/// Cursor mapper settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CursorConfig {
    /// Projection space for the fingertip.
    pub space: CursorSpace,
    /// Per-control cooldown after a gesture activation.
    pub click_cooldown_ms: u64,
    /// Weight of the previous pointer position in `[0, 1)`; `0` disables smoothing.
    pub pointer_smoothing: f32,
}

impl Default for CursorConfig {
    fn default() -> Self {
        Self {
            space: CursorSpace::Viewport,
            click_cooldown_ms: 500,
            pointer_smoothing: 0.0,
        }
    }
}

/// Ink rendering and erasing settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InkConfig {
    /// Erase hit radius in pixels.
    pub erase_radius: f32,
    /// Blend weight towards the neighbor midpoint when smoothing.
    pub smoothing_weight: f32,
    /// Visible smoothing window.
    pub smoothing_window: SmoothingWindow,
    /// Stroke width in pixels.
    pub line_width: f32,
    /// Ink colour as RGBA.
    pub color: [u8; 4],
    /// Page background colour as RGBA.
    pub background: [u8; 4],
}

impl Default for InkConfig {
    fn default() -> Self {
        Self {
            erase_radius: 20.0,
            smoothing_weight: 0.2,
            smoothing_window: SmoothingWindow::WholeStroke,
            line_width: 8.0,
            color: [0, 0, 0, 255],
            background: [255, 255, 255, 255],
        }
    }
}

impl InkConfig {
    /// Stroke style derived from these settings.
    #[must_use]
    pub const fn style(&self) -> InkStyle {
        InkStyle {
            color: self.color,
            width: self.line_width,
        }
    }
}

/// Drawing canvas dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
        }
    }
}

/// Complete AirScribe configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScribeConfig {
    /// Gesture classifier.
    pub gesture: GestureConfig,
    /// Mode debouncer.
    pub mode: ModeConfig,
    /// Cursor mapper.
    pub cursor: CursorConfig,
    /// Ink and erase.
    pub ink: InkConfig,
    /// Canvas size.
    pub canvas: CanvasConfig,
}

impl ScribeConfig {
    /// Parse and validate a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or fails [`Self::validate`].
    pub fn from_json_str(json: &str) -> ScribeResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or is invalid.
    pub fn from_json_file(path: impl AsRef<Path>) -> ScribeResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ScribeError::InvalidConfig`] naming the first offending field.
    pub fn validate(&self) -> ScribeResult<()> {
        let invalid = |msg: &str| Err(ScribeError::InvalidConfig(msg.to_string()));

        if !(self.gesture.extension_threshold >= 0.0 && self.gesture.extension_threshold < 1.0) {
            return invalid("gesture.extension_threshold must be in [0, 1)");
        }
        if !(self.gesture.pinch_threshold > 0.0) {
            return invalid("gesture.pinch_threshold must be positive");
        }
        if !(self.cursor.pointer_smoothing >= 0.0 && self.cursor.pointer_smoothing < 1.0) {
            return invalid("cursor.pointer_smoothing must be in [0, 1)");
        }
        if !(self.ink.erase_radius > 0.0) {
            return invalid("ink.erase_radius must be positive");
        }
        if !(self.ink.smoothing_weight >= 0.0 && self.ink.smoothing_weight <= 1.0) {
            return invalid("ink.smoothing_weight must be in [0, 1]");
        }
        if !(self.ink.line_width > 0.0) {
            return invalid("ink.line_width must be positive");
        }
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return invalid("canvas dimensions must be non-zero");
        }
        Ok(())
    }
}
