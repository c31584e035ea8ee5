//! Geometry kernel: pure functions over stroke and object geometry.
//!
//! Everything here is deterministic for identical input, which export and
//! the tests rely on.

use crate::object::SceneObject;
use crate::stroke::{InkPoint, Stroke};
use kurbo::{BezPath, Point, Rect, Vec2};

/// Endpoint taper length as a multiple of the stroke size.
pub const ENDPOINT_TAPER: f64 = 1.5;

/// Fraction of the full width retained at zero pressure.
const PRESSURE_FLOOR: f64 = 0.25;

/// Maximum arrowhead length in scene units.
pub const ARROWHEAD_MAX_LEN: f64 = 20.0;

/// Arrowhead length as a fraction of the arrow shaft.
pub const ARROWHEAD_LEN_RATIO: f64 = 0.25;

/// Half-angle of the arrowhead, off the reversed shaft direction.
const ARROWHEAD_ANGLE: f64 = std::f64::consts::FRAC_PI_6;

/// Segment count for circle/ellipse outlines.
const CIRCLE_SEGMENTS: usize = 48;

/// Estimated character advance as a fraction of the font size.
pub const CHAR_WIDTH_FACTOR: f64 = 0.6;

/// Estimated line height as a multiple of the font size.
pub const LINE_HEIGHT_FACTOR: f64 = 1.2;

/// The primitives a drag can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ShapeKind {
    Rectangle,
    Circle,
    Triangle,
    Line,
    Arrow,
}

/// Neighbor-averaged pressures, one per input sample.
///
/// A three-sample window is enough to kill per-sample jitter without
/// flattening deliberate pressure changes.
pub fn smooth_pressures(points: &[InkPoint]) -> Vec<f64> {
    let n = points.len();
    (0..n)
        .map(|i| {
            let lo = i.saturating_sub(1);
            let hi = (i + 1).min(n.saturating_sub(1));
            let window = &points[lo..=hi];
            window.iter().map(|p| p.pressure).sum::<f64>() / window.len() as f64
        })
        .collect()
}

/// Closed variable-width polygon approximating a pressure-tapered ink stroke.
///
/// Width at each sample scales with `size` and the smoothed pressure;
/// endpoints taper to a point over `taper_factor × size` of arc length.
/// A two-point stroke is bridged with its segment midpoint so the taper
/// leaves it a body. Returns an empty polygon for fewer than 2 points.
pub fn outline_with_taper(points: &[InkPoint], size: f64, taper_factor: f64) -> Vec<Point> {
    if points.len() < 2 {
        return Vec::new();
    }

    // With no interior vertex both ends taper to zero width at once;
    // insert the midpoint so the segment keeps its full width there.
    let bridged;
    let points = if points.len() == 2 {
        let mid = points[0].pos().midpoint(points[1].pos());
        let pressure = (points[0].pressure + points[1].pressure) / 2.0;
        bridged = [points[0], InkPoint::with_pressure(mid.x, mid.y, pressure), points[1]];
        &bridged[..]
    } else {
        points
    };
    let n = points.len();

    let pressures = smooth_pressures(points);

    let mut arc = Vec::with_capacity(n);
    let mut total = 0.0;
    arc.push(0.0);
    for w in points.windows(2) {
        total += w[0].distance(&w[1]);
        arc.push(total);
    }
    let taper_len = (size * taper_factor).min(total / 2.0).max(f64::EPSILON);

    let mut left = Vec::with_capacity(n);
    let mut right = Vec::with_capacity(n);
    let mut last_normal = Vec2::new(0.0, 1.0);

    for i in 0..n {
        let prev = points[i.saturating_sub(1)].pos();
        let next = points[(i + 1).min(n - 1)].pos();
        let dir = next - prev;
        let len = dir.hypot();
        let normal = if len > f64::EPSILON {
            Vec2::new(-dir.y, dir.x) / len
        } else {
            last_normal
        };
        last_normal = normal;

        let taper = (arc[i].min(total - arc[i]) / taper_len).min(1.0);
        let width_scale = PRESSURE_FLOOR + (1.0 - PRESSURE_FLOOR) * pressures[i];
        let half = size * 0.5 * width_scale * taper;

        let pos = points[i].pos();
        left.push(pos + normal * half);
        right.push(pos - normal * half);
    }

    right.reverse();
    left.extend(right);
    left
}

/// Outline with the default endpoint taper.
pub fn outline_from_centerline(points: &[InkPoint], size: f64) -> Vec<Point> {
    outline_with_taper(points, size, ENDPOINT_TAPER)
}

/// Closed fillable path from a polygon using quadratic midpoint smoothing:
/// each segment's control point is the vertex itself and its endpoint is the
/// midpoint to the next vertex. Smooths away per-vertex corners.
pub fn polygon_to_path(polygon: &[Point]) -> BezPath {
    let mut path = BezPath::new();
    match polygon.len() {
        0 => return path,
        1 => {
            path.move_to(polygon[0]);
            return path;
        }
        2 => {
            path.move_to(polygon[0]);
            path.line_to(polygon[1]);
            return path;
        }
        _ => {}
    }

    fn mid(a: Point, b: Point) -> Point {
        Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
    }

    let n = polygon.len();
    path.move_to(mid(polygon[n - 1], polygon[0]));
    for i in 0..n {
        let next = polygon[(i + 1) % n];
        path.quad_to(polygon[i], mid(polygon[i], next));
    }
    path.close_path();
    path
}

/// Filled ink path: outline plus midpoint smoothing in one step.
pub fn stroke_path(points: &[InkPoint], size: f64) -> BezPath {
    polygon_to_path(&outline_from_centerline(points, size))
}

/// Open polyline path through the raw samples, for solid-width strokes.
pub fn centerline_path(points: &[InkPoint]) -> BezPath {
    let mut path = BezPath::new();
    if points.is_empty() {
        return path;
    }
    path.move_to(points[0].pos());
    for p in &points[1..] {
        path.line_to(p.pos());
    }
    path
}

/// Centerline points for a dragged shape primitive.
///
/// `constrain` forces squares/circles (smaller absolute dimension, sign
/// preserved) for box shapes and snaps lines/arrows to the nearest 45°.
/// Triangles always span the drag box as an isosceles triangle.
pub fn shape_from_drag(
    kind: ShapeKind,
    start: Point,
    end: Point,
    constrain: bool,
) -> Vec<InkPoint> {
    match kind {
        ShapeKind::Rectangle => {
            let end = if constrain { constrain_box(start, end) } else { end };
            corners_closed(&[
                start,
                Point::new(end.x, start.y),
                end,
                Point::new(start.x, end.y),
            ])
        }
        ShapeKind::Circle => {
            let end = if constrain { constrain_box(start, end) } else { end };
            let center = Point::new((start.x + end.x) / 2.0, (start.y + end.y) / 2.0);
            let rx = (end.x - start.x).abs() / 2.0;
            let ry = (end.y - start.y).abs() / 2.0;
            (0..=CIRCLE_SEGMENTS)
                .map(|i| {
                    let theta = std::f64::consts::TAU * i as f64 / CIRCLE_SEGMENTS as f64;
                    shape_point(Point::new(
                        center.x + rx * theta.cos(),
                        center.y + ry * theta.sin(),
                    ))
                })
                .collect()
        }
        ShapeKind::Triangle => corners_closed(&[
            Point::new((start.x + end.x) / 2.0, start.y),
            Point::new(end.x, end.y),
            Point::new(start.x, end.y),
        ]),
        ShapeKind::Line => {
            let end = if constrain { snap_angle_45(start, end) } else { end };
            vec![shape_point(start), shape_point(end)]
        }
        ShapeKind::Arrow => {
            let end = if constrain { snap_angle_45(start, end) } else { end };
            let shaft = end - start;
            let len = shaft.hypot();
            if len < f64::EPSILON {
                return vec![shape_point(start), shape_point(end)];
            }
            let head_len = ARROWHEAD_MAX_LEN.min(ARROWHEAD_LEN_RATIO * len);
            let back = (-shaft).atan2();
            let h1 = end + Vec2::from_angle(back + ARROWHEAD_ANGLE) * head_len;
            let h2 = end + Vec2::from_angle(back - ARROWHEAD_ANGLE) * head_len;
            // Flat polyline: shaft, then the two head segments hinged at the tip.
            vec![
                shape_point(start),
                shape_point(end),
                shape_point(h1),
                shape_point(end),
                shape_point(h2),
            ]
        }
    }
}

fn shape_point(p: Point) -> InkPoint {
    InkPoint::with_pressure(p.x, p.y, 1.0)
}

fn corners_closed(corners: &[Point]) -> Vec<InkPoint> {
    let mut pts: Vec<InkPoint> = corners.iter().copied().map(shape_point).collect();
    pts.push(shape_point(corners[0]));
    pts
}

/// Force the drag box square using the smaller absolute dimension, keeping
/// each axis's drag direction.
fn constrain_box(start: Point, end: Point) -> Point {
    let dx = end.x - start.x;
    let dy = end.y - start.y;
    let side = dx.abs().min(dy.abs());
    Point::new(start.x + side.copysign(dx), start.y + side.copysign(dy))
}

/// Snap the drag direction to the nearest multiple of 45°, preserving length.
fn snap_angle_45(start: Point, end: Point) -> Point {
    let delta = end - start;
    let len = delta.hypot();
    if len < f64::EPSILON {
        return end;
    }
    let step = std::f64::consts::FRAC_PI_4;
    let snapped = (delta.atan2() / step).round() * step;
    start + Vec2::from_angle(snapped) * len
}

/// Closed-interval rect overlap. Unlike area-based checks this counts
/// degenerate rects (a perfectly horizontal stroke's bounds) as overlapping.
pub fn rects_overlap(a: Rect, b: Rect) -> bool {
    a.x0 <= b.x1 && b.x0 <= a.x1 && a.y0 <= b.y1 && b.y0 <= a.y1
}

/// Union of stroke centerline bounds. Strokes without points are skipped.
pub fn bounding_box_of_strokes<'a, I>(strokes: I) -> Option<Rect>
where
    I: IntoIterator<Item = &'a Stroke>,
{
    strokes
        .into_iter()
        .filter(|s| !s.points.is_empty())
        .map(|s| s.bounds())
        .reduce(|a, b| a.union(b))
}

/// Union of object bounds (text bounds use estimated metrics).
pub fn bounding_box_of_objects<'a, I>(objects: I) -> Option<Rect>
where
    I: IntoIterator<Item = &'a SceneObject>,
{
    objects
        .into_iter()
        .map(|o| o.bounds())
        .reduce(|a, b| a.union(b))
}

/// Estimated text box size when no layout oracle is available:
/// width from the longest line's character count, height from line count.
pub fn estimated_text_size(content: &str, font_size: f64) -> (f64, f64) {
    let max_chars = content.lines().map(|l| l.chars().count()).max().unwrap_or(0);
    let mut line_count = content.lines().count().max(1);
    if content.ends_with('\n') {
        line_count += 1;
    }
    (
        max_chars as f64 * font_size * CHAR_WIDTH_FACTOR,
        line_count as f64 * font_size * LINE_HEIGHT_FACTOR,
    )
}

/// Ramer-Douglas-Peucker simplification. Endpoints always survive, so a
/// commit-eligible stroke stays commit-eligible.
pub fn simplify_polyline(points: &[InkPoint], epsilon: f64) -> Vec<InkPoint> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let end = points.len() - 1;
    let mut dmax = 0.0;
    let mut index = 0;
    for (i, p) in points.iter().enumerate().take(end).skip(1) {
        let d = perpendicular_distance(p.pos(), points[0].pos(), points[end].pos());
        if d > dmax {
            dmax = d;
            index = i;
        }
    }

    if dmax > epsilon {
        let mut left = simplify_polyline(&points[..=index], epsilon);
        let right = simplify_polyline(&points[index..], epsilon);
        left.pop();
        left.extend(right);
        left
    } else {
        vec![points[0], points[end]]
    }
}

fn perpendicular_distance(p: Point, a: Point, b: Point) -> f64 {
    let ab = b - a;
    let len = ab.hypot();
    if len < f64::EPSILON {
        return (p - a).hypot();
    }
    ((p.x - a.x) * ab.y - (p.y - a.y) * ab.x).abs() / len
}

/// Distance from a point to a segment.
pub fn point_to_segment_dist(p: Point, a: Point, b: Point) -> f64 {
    let ab = b - a;
    let ap = p - a;
    let len_sq = ab.hypot2();
    if len_sq < f64::EPSILON {
        return ap.hypot();
    }
    let t = (ap.dot(ab) / len_sq).clamp(0.0, 1.0);
    let projection = a + ab * t;
    (p - projection).hypot()
}

/// Distance from a point to a polyline of ink samples.
pub fn point_to_polyline_dist(p: Point, points: &[InkPoint]) -> f64 {
    match points.len() {
        0 => f64::INFINITY,
        1 => p.distance(points[0].pos()),
        _ => points
            .windows(2)
            .map(|w| point_to_segment_dist(p, w[0].pos(), w[1].pos()))
            .fold(f64::INFINITY, f64::min),
    }
}
