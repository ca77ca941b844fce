//! Hand landmark frames produced by the external hand tracker.
//!
//! Indices follow the 21-point hand model used by common landmark detectors.

use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// Wrist landmark index.
pub const WRIST: usize = 0;
/// Thumb tip landmark index.
pub const THUMB_TIP: usize = 4;
/// Index finger base (MCP) landmark index.
pub const INDEX_MCP: usize = 5;
/// Index finger tip landmark index.
pub const INDEX_TIP: usize = 8;
/// Middle finger base (MCP) landmark index.
pub const MIDDLE_MCP: usize = 9;
/// Middle finger tip landmark index.
pub const MIDDLE_TIP: usize = 12;
/// Ring finger base (MCP) landmark index.
pub const RING_MCP: usize = 13;
/// Ring finger tip landmark index.
pub const RING_TIP: usize = 16;
/// Pinky base (MCP) landmark index.
pub const PINKY_MCP: usize = 17;
/// Pinky tip landmark index.
pub const PINKY_TIP: usize = 20;

/// Number of landmarks in a complete hand.
pub const LANDMARK_COUNT: usize = 21;

/// The four non-thumb fingers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Finger {
    /// Index finger.
    Index,
    /// Middle finger.
    Middle,
    /// Ring finger.
    Ring,
    /// Pinky finger.
    Pinky,
}

impl Finger {
    /// All non-thumb fingers, index first.
    pub const ALL: [Self; 4] = [Self::Index, Self::Middle, Self::Ring, Self::Pinky];

    /// `(tip, base)` landmark indices.
    #[must_use]
    pub const fn landmarks(self) -> (usize, usize) {
        match self {
            Self::Index => (INDEX_TIP, INDEX_MCP),
            Self::Middle => (MIDDLE_TIP, MIDDLE_MCP),
            Self::Ring => (RING_TIP, RING_MCP),
            Self::Pinky => (PINKY_TIP, PINKY_MCP),
        }
    }
}

/// A single normalized landmark.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    /// X in `[0, 1]`, growing rightward in camera space (before mirroring).
    pub x: f32,
    /// Y in `[0, 1]`, growing downward.
    pub y: f32,
    /// Depth relative to the wrist.
    #[serde(default)]
    pub z: f32,
}

impl Landmark {
    /// Create a new landmark.
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Whether all coordinates are finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Planar `(x, y)` distance to `other`.
    #[must_use]
    pub fn planar_distance(&self, other: &Self) -> f32 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// One detector result for one video tick.
///
/// A frame with fewer than [`LANDMARK_COUNT`] landmarks is missing its trailing
/// points; lookups for those, and for non-finite landmarks, return `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandFrame {
    /// Landmarks in detector index order.
    pub landmarks: Vec<Landmark>,
    /// Capture timestamp in milliseconds.
    pub timestamp_ms: u64,
}

impl HandFrame {
    /// Create a frame from landmarks and a timestamp.
    #[must_use]
    pub fn new(landmarks: Vec<Landmark>, timestamp_ms: u64) -> Self {
        Self {
            landmarks,
            timestamp_ms,
        }
    }

    /// Get a usable landmark by index.
    #[must_use]
    pub fn landmark(&self, index: usize) -> Option<Landmark> {
        self.landmarks
            .get(index)
            .copied()
            .filter(Landmark::is_finite)
    }

    /// `(tip, base)` for a finger if both are usable.
    #[must_use]
    pub fn finger(&self, finger: Finger) -> Option<(Landmark, Landmark)> {
        let (tip, base) = finger.landmarks();
        Some((self.landmark(tip)?, self.landmark(base)?))
    }

    /// Index fingertip as a normalized point.
    #[must_use]
    pub fn index_tip(&self) -> Option<Point> {
        self.landmark(INDEX_TIP).map(|l| Point::new(l.x, l.y))
    }

    /// Whether every landmark is present and finite.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.landmarks.len() >= LANDMARK_COUNT
            && self.landmarks.iter().take(LANDMARK_COUNT).all(Landmark::is_finite)
    }
}
