//! Debounced drawing mode state machine.
//!
//! Raw per-frame gestures flicker at pose boundaries. The debouncer turns
//! them into a stable [`Mode`]:
//!
//! ```text
//!          pointing (after dwell)            fist (after dwell)
//!   None ───────────────────────▶ Draw   None ──────────────────▶ Erase
//!    ▲                              │     ▲                         │
//!    └──── neutral / fist ──────────┘     └──── neutral / pointing ─┘
//! ```
//!
//! A direct `Draw`/`Erase` swap is never taken; the machine drops to `None`
//! and must dwell there for the neutral timeout first.

use serde::{Deserialize, Serialize};

use crate::config::ModeConfig;
use crate::gesture::Gesture;

/// Stable drawing mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Pointer hovers, nothing is drawn or erased.
    #[default]
    None,
    /// Ink is laid down.
    Draw,
    /// Strokes near the pointer are removed.
    Erase,
}

impl Mode {
    /// Whether this mode draws or erases.
    #[must_use]
    pub const fn is_active(self) -> bool {
        !matches!(self, Self::None)
    }
}

impl From<Gesture> for Mode {
    fn from(gesture: Gesture) -> Self {
        match gesture {
            Gesture::Pointing => Self::Draw,
            Gesture::Fist => Self::Erase,
            Gesture::Neutral => Self::None,
        }
    }
}

/// Hysteresis over the desired-mode stream.
#[derive(Debug, Clone)]
pub struct ModeDebouncer {
    mode: Mode,
    /// When `None` was last entered; `None` until the first deactivation.
    last_neutral_entry_ms: Option<u64>,
    config: ModeConfig,
}

impl ModeDebouncer {
    /// Create a debouncer starting in [`Mode::None`].
    #[must_use]
    pub const fn new(config: ModeConfig) -> Self {
        Self {
            mode: Mode::None,
            last_neutral_entry_ms: None,
            config,
        }
    }

    /// Current mode.
    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    /// Timestamp of the last entry into [`Mode::None`].
    #[must_use]
    pub const fn last_neutral_entry_ms(&self) -> Option<u64> {
        self.last_neutral_entry_ms
    }

    /// Advance one tick with the classified gesture.
    pub fn update(&mut self, gesture: Gesture, now_ms: u64) -> Mode {
        self.advance(Mode::from(gesture), now_ms)
    }

    /// Advance one tick with a desired mode.
    pub fn advance(&mut self, desired: Mode, now_ms: u64) -> Mode {
        let current = self.mode;
        if desired == current {
            return current;
        }

        if current.is_active() {
            // Covers both a plain release and a forbidden draw/erase swap.
            self.enter_neutral(now_ms);
            tracing::debug!(from = ?current, ?desired, "Mode released to none");
        } else if self.dwell_satisfied(now_ms) {
            self.mode = desired;
            tracing::debug!(mode = ?desired, "Mode engaged");
        } else {
            tracing::trace!(?desired, "Mode change held back by neutral dwell");
        }

        self.mode
    }

    fn enter_neutral(&mut self, now_ms: u64) {
        self.mode = Mode::None;
        self.last_neutral_entry_ms = Some(now_ms);
    }

    fn dwell_satisfied(&self, now_ms: u64) -> bool {
        self.last_neutral_entry_ms
            .map_or(true, |entered| {
                now_ms.saturating_sub(entered) >= self.config.neutral_timeout_ms
            })
    }
}

impl Default for ModeDebouncer {
    fn default() -> Self {
        Self::new(ModeConfig::default())
    }
}
