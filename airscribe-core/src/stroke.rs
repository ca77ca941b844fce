//! Vector strokes and render-time smoothing.
//!
//! Strokes keep the raw sampled points. Smoothing happens only when a stroke
//! is turned into an [`InkPath`]: each interior point is pulled towards the
//! midpoint of its neighbours, then the path runs through successive
//! midpoints with the smoothed samples as quadratic control points.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geometry::{distance_to_segment, Point};

/// Unique identifier for a stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StrokeId(Uuid);

impl StrokeId {
    /// Create a new unique stroke ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for StrokeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for StrokeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An ordered, append-only sequence of canvas points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    /// Unique identifier.
    pub id: StrokeId,
    points: Vec<Point>,
}

impl Stroke {
    /// Create an empty stroke.
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: StrokeId::new(),
            points: Vec::new(),
        }
    }

    /// Create a stroke from existing points.
    #[must_use]
    pub fn from_points(points: Vec<Point>) -> Self {
        Self {
            id: StrokeId::new(),
            points,
        }
    }

    /// Append a point.
    pub fn push(&mut self, point: Point) {
        self.points.push(point);
    }

    /// Raw points in drawing order.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the stroke has no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Whether the stroke may be committed to a page.
    #[must_use]
    pub fn is_sealable(&self) -> bool {
        self.points.len() >= 2
    }

    /// Whether any segment passes strictly within `radius` of `point`.
    ///
    /// A single-point stroke is tested as a degenerate segment.
    #[must_use]
    pub fn is_near(&self, point: Point, radius: f32) -> bool {
        match self.points.as_slice() {
            [] => false,
            [only] => only.distance(point) < radius,
            points => points
                .windows(2)
                .any(|w| distance_to_segment(point, w[0], w[1]) < radius),
        }
    }

    /// Full smoothed path for rendering.
    #[must_use]
    pub fn smoothed_path(&self, weight: f32) -> InkPath {
        smoothed_path(&self.points, weight)
    }

    /// The piece of [`Self::smoothed_path`] finalized by the newest point.
    #[must_use]
    pub fn latest_segment(&self, weight: f32) -> Option<InkPath> {
        latest_segment(&self.points, weight)
    }

    /// The part of [`Self::smoothed_path`] never covered by [`Self::latest_segment`].
    #[must_use]
    pub fn tail_segment(&self, weight: f32) -> Option<InkPath> {
        tail_segment(&self.points, weight)
    }
}

impl Default for Stroke {
    fn default() -> Self {
        Self::new()
    }
}

/// One drawing command of an [`InkPath`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum PathSegment {
    /// Start a new sub-path.
    MoveTo {
        /// Target point.
        to: Point,
    },
    /// Straight line.
    LineTo {
        /// Target point.
        to: Point,
    },
    /// Quadratic Bézier curve.
    QuadTo {
        /// Control point.
        ctrl: Point,
        /// Target point.
        to: Point,
    },
}

/// A renderable path built from stroke points.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InkPath {
    /// Drawing commands in order.
    pub segments: Vec<PathSegment>,
}

impl InkPath {
    /// Whether the path draws nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.len() < 2
    }
}

/// Smoothed sample `index` of `points`.
///
/// Endpoints are returned unchanged; interior points are blended towards the
/// midpoint of their neighbours by `weight`.
#[must_use]
pub fn smoothed_point(points: &[Point], index: usize, weight: f32) -> Point {
    if index == 0 || index + 1 >= points.len() {
        return points[index];
    }
    let neighbours = points[index - 1].midpoint(points[index + 1]);
    points[index].lerp(neighbours, weight)
}

/// Build the complete smoothed path through `points`.
///
/// The path leaves the first point through the midpoint of the first two raw
/// points, which is all that is known when the second point arrives, then
/// follows quadratic curves through the midpoints of the smoothed samples.
#[must_use]
pub fn smoothed_path(points: &[Point], weight: f32) -> InkPath {
    let mut segments = Vec::with_capacity(points.len() + 2);
    let Some(first) = points.first() else {
        return InkPath { segments };
    };
    segments.push(PathSegment::MoveTo { to: *first });

    let smoothed: Vec<Point> = (0..points.len())
        .map(|i| smoothed_point(points, i, weight))
        .collect();

    if smoothed.len() == 1 {
        segments.push(PathSegment::LineTo { to: smoothed[0] });
        return InkPath { segments };
    }

    segments.push(PathSegment::LineTo {
        to: points[0].midpoint(points[1]),
    });
    if smoothed.len() > 2 {
        segments.push(PathSegment::LineTo {
            to: smoothed[0].midpoint(smoothed[1]),
        });
    }
    for i in 1..smoothed.len() - 1 {
        segments.push(PathSegment::QuadTo {
            ctrl: smoothed[i],
            to: smoothed[i].midpoint(smoothed[i + 1]),
        });
    }
    if let Some(last) = smoothed.last() {
        segments.push(PathSegment::LineTo { to: *last });
    }

    InkPath { segments }
}

/// Path piece finalized by the newest point of `points`.
///
/// A smoothed sample only settles once its right-hand neighbour exists, so the
/// piece ending at the midpoint after sample `i` is final once sample `i + 2`
/// arrives. The second point already yields the opening line to the first raw
/// midpoint. Rendering every finalized piece as points stream in, then
/// [`tail_segment`] when the stroke ends, draws exactly [`smoothed_path`].
#[must_use]
pub fn latest_segment(points: &[Point], weight: f32) -> Option<InkPath> {
    let n = points.len();
    match n {
        0 | 1 => None,
        2 => Some(InkPath {
            segments: vec![
                PathSegment::MoveTo { to: points[0] },
                PathSegment::LineTo {
                    to: points[0].midpoint(points[1]),
                },
            ],
        }),
        3 => {
            let start = points[0];
            let next = smoothed_point(points, 1, weight);
            Some(InkPath {
                segments: vec![
                    PathSegment::MoveTo {
                        to: start.midpoint(points[1]),
                    },
                    PathSegment::LineTo {
                        to: start.midpoint(next),
                    },
                ],
            })
        }
        _ => {
            let before = smoothed_point(points, n - 4, weight);
            let ctrl = smoothed_point(points, n - 3, weight);
            let after = smoothed_point(points, n - 2, weight);
            Some(InkPath {
                segments: vec![
                    PathSegment::MoveTo {
                        to: before.midpoint(ctrl),
                    },
                    PathSegment::QuadTo {
                        ctrl,
                        to: ctrl.midpoint(after),
                    },
                ],
            })
        }
    }
}

/// Remainder of [`smoothed_path`] after every [`latest_segment`] piece.
#[must_use]
pub fn tail_segment(points: &[Point], weight: f32) -> Option<InkPath> {
    let n = points.len();
    if n < 2 {
        return None;
    }
    let last = points[n - 1];
    if n == 2 {
        return Some(InkPath {
            segments: vec![
                PathSegment::MoveTo {
                    to: points[0].midpoint(last),
                },
                PathSegment::LineTo { to: last },
            ],
        });
    }
    let before = smoothed_point(points, n - 3, weight);
    let ctrl = smoothed_point(points, n - 2, weight);
    Some(InkPath {
        segments: vec![
            PathSegment::MoveTo {
                to: before.midpoint(ctrl),
            },
            PathSegment::QuadTo {
                ctrl,
                to: ctrl.midpoint(last),
            },
            PathSegment::LineTo { to: last },
        ],
    })
}
