//! Pure geometry helpers shared by the element model and the transform engine.

use kurbo::Point;

/// Tolerance below which a vector is treated as zero-length.
const EPS: f64 = 1e-9;

/// Signed angle (radians) between the rays origin→a and origin→b.
///
/// The magnitude comes from the dot-product/arccos formula; the sign from
/// the cross product, so a counter-clockwise sweep from a to b is positive.
/// Degenerate input (coincident points, zero-length rays) yields `0.0`
/// rather than NaN, and downstream transform math treats that as identity.
pub fn angle_between(origin: Point, a: Point, b: Point) -> f64 {
    let va = a - origin;
    let vb = b - origin;
    let na = va.hypot();
    let nb = vb.hypot();
    if na < EPS || nb < EPS {
        return 0.0;
    }
    let cos = (va.dot(vb) / (na * nb)).clamp(-1.0, 1.0);
    let angle = cos.acos();
    if va.cross(vb) < 0.0 { -angle } else { angle }
}

/// Euclidean distance between two points.
pub fn distance(a: Point, b: Point) -> f64 {
    (b - a).hypot()
}

/// Midpoint of two points.
pub fn midpoint(a: Point, b: Point) -> Point {
    Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
}

/// Angle of the ray a→b against the positive x axis, 0.0 when degenerate.
pub fn direction_angle(a: Point, b: Point) -> f64 {
    let v = b - a;
    if v.hypot() < EPS {
        return 0.0;
    }
    v.y.atan2(v.x)
}

/// Scale ratio between two rays sharing an anchor.
///
/// Returns 1.0 when the reference ray is degenerate, so a collapsed gesture
/// acts as the identity scale.
pub fn scale_ratio(anchor: Point, reference: Point, cursor: Point) -> f64 {
    let base = distance(anchor, reference);
    if base < EPS {
        return 1.0;
    }
    distance(anchor, cursor) / base
}

/// Distance from a point to the segment a→b.
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let seg = b - a;
    let pv = point - a;
    let len_sq = seg.hypot2();
    if len_sq < EPS {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    let proj = Point::new(a.x + t * seg.x, a.y + t * seg.y);
    distance(point, proj)
}

/// Minimum distance from a point to a polyline.
pub fn point_to_polyline_dist(point: Point, points: &[Point]) -> f64 {
    if points.len() == 1 {
        return distance(point, points[0]);
    }
    points
        .windows(2)
        .map(|w| point_to_segment_dist(point, w[0], w[1]))
        .fold(f64::INFINITY, f64::min)
}
