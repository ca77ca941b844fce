//! Pixel-space geometry shared by the cursor mapper, stroke engine and renderer.

use serde::{Deserialize, Serialize};

/// A point in canvas pixel space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// X position (pixels from left).
    pub x: f32,
    /// Y position (pixels from top).
    pub y: f32,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Midpoint between `self` and `other`.
    #[must_use]
    pub fn midpoint(self, other: Self) -> Self {
        Self::new((self.x + other.x) * 0.5, (self.y + other.y) * 0.5)
    }

    /// Linear interpolation towards `other` by `t`.
    #[must_use]
    pub fn lerp(self, other: Self, t: f32) -> Self {
        Self::new(
            (other.x - self.x).mul_add(t, self.x),
            (other.y - self.y).mul_add(t, self.y),
        )
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance(self, other: Self) -> f32 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Whether both coordinates are finite.
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// An axis-aligned rectangle in pixel space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
}

impl Rect {
    /// Create a new rectangle.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle anchored at the origin.
    #[must_use]
    pub const fn from_size(width: f32, height: f32) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    /// Check if a point lies within this rectangle (edges inclusive).
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }

    /// Top-left corner.
    #[must_use]
    pub const fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Translate a viewport point into this rectangle's local space.
    #[must_use]
    pub fn to_local(&self, point: Point) -> Point {
        Point::new(point.x - self.x, point.y - self.y)
    }

    /// Largest rectangle with the given aspect that fits inside `self`, centered.
    ///
    /// Returns `None` for degenerate source dimensions.
    #[must_use]
    pub fn fit_contain(&self, source_width: f32, source_height: f32) -> Option<Self> {
        if !(source_width > 0.0 && source_height > 0.0) {
            return None;
        }
        let scale = (self.width / source_width).min(self.height / source_height);
        let width = source_width * scale;
        let height = source_height * scale;
        Some(Self::new(
            self.x + (self.width - width) * 0.5,
            self.y + (self.height - height) * 0.5,
            width,
            height,
        ))
    }
}

/// Distance from `point` to the segment `a`-`b`.
///
/// Projects onto the segment with the parameter clamped to `[0, 1]`; a
/// zero-length segment degrades to point distance.
#[must_use]
pub fn distance_to_segment(point: Point, a: Point, b: Point) -> f32 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let length_sq = dx.mul_add(dx, dy * dy);
    if length_sq <= f32::EPSILON {
        return point.distance(a);
    }
    let t = ((point.x - a.x).mul_add(dx, (point.y - a.y) * dy) / length_sq).clamp(0.0, 1.0);
    point.distance(Point::new(t.mul_add(dx, a.x), t.mul_add(dy, a.y)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_midpoint_and_lerp() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 20.0);
        assert_eq!(a.midpoint(b), Point::new(5.0, 10.0));
        assert_eq!(a.lerp(b, 0.25), Point::new(2.5, 5.0));
    }

    #[test]
    fn test_rect_contains_edges() {
        let rect = Rect::new(10.0, 10.0, 100.0, 50.0);
        assert!(rect.contains(Point::new(10.0, 10.0)));
        assert!(rect.contains(Point::new(110.0, 60.0)));
        assert!(!rect.contains(Point::new(9.9, 30.0)));
        assert!(!rect.contains(Point::new(50.0, 60.1)));
    }

    #[test]
    fn test_distance_to_segment_projection() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(20.0, 0.0);
        assert!((distance_to_segment(Point::new(10.0, 1.0), a, b) - 1.0).abs() < 1e-5);
        // Clamped to the endpoints
        assert!((distance_to_segment(Point::new(-3.0, 4.0), a, b) - 5.0).abs() < 1e-5);
        assert!((distance_to_segment(Point::new(23.0, 4.0), a, b) - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_distance_to_degenerate_segment() {
        let a = Point::new(5.0, 5.0);
        assert!((distance_to_segment(Point::new(8.0, 9.0), a, a) - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_fit_contain_wide_image() {
        let canvas = Rect::from_size(800.0, 600.0);
        let fit = canvas.fit_contain(1600.0, 400.0).expect("fit");
        assert!((fit.width - 800.0).abs() < 1e-3);
        assert!((fit.height - 200.0).abs() < 1e-3);
        assert!((fit.y - 200.0).abs() < 1e-3);
        assert!(fit.x.abs() < 1e-3);
    }

    #[test]
    fn test_fit_contain_tall_image() {
        let canvas = Rect::from_size(800.0, 600.0);
        let fit = canvas.fit_contain(300.0, 600.0).expect("fit");
        assert!((fit.width - 300.0).abs() < 1e-3);
        assert!((fit.x - 250.0).abs() < 1e-3);
    }

    #[test]
    fn test_fit_contain_degenerate() {
        assert!(Rect::from_size(10.0, 10.0).fit_contain(0.0, 5.0).is_none());
    }
}
