//! Ink strokes: pressure-tagged point sequences.

use crate::color::SerializableColor;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a stroke.
pub type StrokeId = Uuid;

/// Default pressure for samples without hardware pressure data.
pub const DEFAULT_PRESSURE: f64 = 0.5;

/// One sample inside a stroke. Exists only as part of a stroke's point list.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InkPoint {
    pub x: f64,
    pub y: f64,
    pub pressure: f64,
}

impl InkPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            pressure: DEFAULT_PRESSURE,
        }
    }

    /// Create a sample with an explicit pressure, clamped to `[0, 1]`.
    pub fn with_pressure(x: f64, y: f64, pressure: f64) -> Self {
        Self {
            x,
            y,
            pressure: pressure.clamp(0.0, 1.0),
        }
    }

    pub fn pos(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn distance(&self, other: &InkPoint) -> f64 {
        self.pos().distance(other.pos())
    }
}

impl From<Point> for InkPoint {
    fn from(p: Point) -> Self {
        Self::new(p.x, p.y)
    }
}

/// Style resolved for a stroke at commit time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokeStyle {
    pub color: SerializableColor,
    pub size: f64,
    pub is_eraser: bool,
    pub is_highlighter: bool,
    pub is_shape: bool,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            color: SerializableColor::BLACK,
            size: 3.0,
            is_eraser: false,
            is_highlighter: false,
            is_shape: false,
        }
    }
}

/// A committed pen gesture.
///
/// Points are in drawing order and immutable after commit, except for the
/// wholesale rewrites the selection engine performs (translate/scale).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub id: StrokeId,
    pub points: Vec<InkPoint>,
    pub color: SerializableColor,
    pub size: f64,
    #[serde(default)]
    pub is_eraser: bool,
    #[serde(default)]
    pub is_highlighter: bool,
    #[serde(default)]
    pub is_shape: bool,
}

impl Stroke {
    pub fn new(points: Vec<InkPoint>, style: StrokeStyle) -> Self {
        Self {
            id: Uuid::new_v4(),
            points,
            color: style.color,
            size: style.size,
            is_eraser: style.is_eraser,
            is_highlighter: style.is_highlighter,
            is_shape: style.is_shape,
        }
    }

    pub fn style(&self) -> StrokeStyle {
        StrokeStyle {
            color: self.color,
            size: self.size,
            is_eraser: self.is_eraser,
            is_highlighter: self.is_highlighter,
            is_shape: self.is_shape,
        }
    }

    /// Axis-aligned bounds of the centerline points.
    pub fn bounds(&self) -> Rect {
        if self.points.is_empty() {
            return Rect::ZERO;
        }

        let mut min_x = f64::MAX;
        let mut min_y = f64::MAX;
        let mut max_x = f64::MIN;
        let mut max_y = f64::MIN;

        for p in &self.points {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }

        Rect::new(min_x, min_y, max_x, max_y)
    }

    /// Vertical extent `(min_y, max_y)` for page attribution.
    pub fn vertical_span(&self) -> (f64, f64) {
        let b = self.bounds();
        (b.y0, b.y1)
    }

    /// Smallest distance from `point` to any sample of this stroke.
    ///
    /// Sample distance, not segment distance. This backs the eraser's
    /// proximity flood, which keys off recorded samples.
    pub fn min_sample_distance(&self, point: Point) -> f64 {
        self.points
            .iter()
            .map(|p| p.pos().distance(point))
            .fold(f64::INFINITY, f64::min)
    }

    /// Segment-accurate hit test used by tap selection.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        crate::geometry::point_to_polyline_dist(point, &self.points)
            <= tolerance + self.size / 2.0
    }

    /// Translate every point by `(dx, dy)`.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        for p in &mut self.points {
            p.x += dx;
            p.y += dy;
        }
    }

    /// Rewrite every point as `anchor + (point - anchor) * scale`.
    ///
    /// Pressure and stroke width are untouched; only geometry scales.
    pub fn scale_about(&mut self, anchor: Point, scale: f64) {
        for p in &mut self.points {
            p.x = anchor.x + (p.x - anchor.x) * scale;
            p.y = anchor.y + (p.y - anchor.y) * scale;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stroke(points: &[(f64, f64)]) -> Stroke {
        let pts = points.iter().map(|&(x, y)| InkPoint::new(x, y)).collect();
        Stroke::new(pts, StrokeStyle::default())
    }

    #[test]
    fn test_pressure_clamped() {
        let p = InkPoint::with_pressure(0.0, 0.0, 1.7);
        assert!((p.pressure - 1.0).abs() < f64::EPSILON);
        let p = InkPoint::with_pressure(0.0, 0.0, -0.3);
        assert!(p.pressure.abs() < f64::EPSILON);
    }

    #[test]
    fn test_bounds() {
        let s = stroke(&[(10.0, 20.0), (50.0, 5.0), (30.0, 80.0)]);
        let b = s.bounds();
        assert!((b.x0 - 10.0).abs() < f64::EPSILON);
        assert!((b.y0 - 5.0).abs() < f64::EPSILON);
        assert!((b.x1 - 50.0).abs() < f64::EPSILON);
        assert!((b.y1 - 80.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_bounds() {
        let s = Stroke::new(Vec::new(), StrokeStyle::default());
        assert_eq!(s.bounds(), Rect::ZERO);
    }

    #[test]
    fn test_translate() {
        let mut s = stroke(&[(0.0, 0.0), (10.0, 10.0)]);
        s.translate(5.0, -2.0);
        assert!((s.points[0].x - 5.0).abs() < f64::EPSILON);
        assert!((s.points[0].y + 2.0).abs() < f64::EPSILON);
        assert!((s.points[1].x - 15.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_scale_about_keeps_anchor() {
        let mut s = stroke(&[(10.0, 10.0), (20.0, 20.0)]);
        s.scale_about(Point::new(10.0, 10.0), 2.0);
        assert!((s.points[0].x - 10.0).abs() < f64::EPSILON);
        assert!((s.points[0].y - 10.0).abs() < f64::EPSILON);
        assert!((s.points[1].x - 30.0).abs() < f64::EPSILON);
        assert!((s.points[1].y - 30.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_min_sample_distance() {
        let s = stroke(&[(0.0, 0.0), (100.0, 0.0)]);
        // Closest sample is (0,0); midpoint of the segment doesn't count.
        let d = s.min_sample_distance(Point::new(50.0, 0.0));
        assert!((d - 50.0).abs() < f64::EPSILON);
        let d = s.min_sample_distance(Point::new(3.0, 4.0));
        assert!((d - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_hit_test_uses_segments() {
        let s = stroke(&[(0.0, 0.0), (100.0, 0.0)]);
        assert!(s.hit_test(Point::new(50.0, 1.0), 2.0));
        assert!(!s.hit_test(Point::new(50.0, 30.0), 2.0));
    }
}
