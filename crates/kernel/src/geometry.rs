//! Segment tests and ray hits used by collision and sensing.

use glam::DVec2;
use jyrobot_common::{Color, Line};

/// Slack, in world units, allowed when checking that a line intersection
/// lies on both segments.
pub const SEGMENT_TOLERANCE: f64 = 0.1;

/// Where a ray met a wall or robot outline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    /// Relative height of the struck surface.
    pub height: f64,
    pub point: DVec2,
    pub distance: f64,
    pub color: Color,
    /// Ray origin.
    pub start: DVec2,
}

impl Hit {
    pub fn new(point: DVec2, start: DVec2, color: Color) -> Self {
        Self {
            height: 1.0,
            point,
            distance: point.distance(start),
            color,
            start,
        }
    }
}

/// True when `a`, `b`, `c` turn counter-clockwise.
pub fn ccw(a: DVec2, b: DVec2, c: DVec2) -> bool {
    (c.y - a.y) * (b.x - a.x) > (b.y - a.y) * (c.x - a.x)
}

/// Strict test for segments `ab` and `cd` crossing.
pub fn segments_intersect(a: DVec2, b: DVec2, c: DVec2, d: DVec2) -> bool {
    ccw(a, c, d) != ccw(b, c, d) && ccw(a, b, c) != ccw(a, b, d)
}

/// Coefficients `(a, b, c)` of the line `a·x + b·y = c` through two points.
fn coefficients(p1: DVec2, p2: DVec2) -> (f64, f64, f64) {
    let a = p1.y - p2.y;
    let b = p2.x - p1.x;
    let c = p2.x * p1.y - p1.x * p2.y;
    (a, b, c)
}

/// Intersection of the infinite lines through two segments, if not parallel.
fn line_intersection(l1: (f64, f64, f64), l2: (f64, f64, f64)) -> Option<DVec2> {
    let d = l1.0 * l2.1 - l1.1 * l2.0;
    if d == 0.0 {
        return None;
    }
    let dx = l1.2 * l2.1 - l1.1 * l2.2;
    let dy = l1.0 * l2.2 - l1.2 * l2.0;
    Some(DVec2::new(dx / d, dy / d))
}

fn within_bounds(p: DVec2, s1: DVec2, s2: DVec2) -> bool {
    let low = s1.min(s2) - DVec2::splat(SEGMENT_TOLERANCE);
    let high = s1.max(s2) + DVec2::splat(SEGMENT_TOLERANCE);
    low.x <= p.x && p.x <= high.x && low.y <= p.y && p.y <= high.y
}

/// Point where segment `p1p2` meets segment `p3p4`, allowing
/// [`SEGMENT_TOLERANCE`] of slack at the segment ends.
pub fn intersect_hit(p1: DVec2, p2: DVec2, p3: DVec2, p4: DVec2) -> Option<DVec2> {
    let xy = line_intersection(coefficients(p1, p2), coefficients(p3, p4))?;
    (within_bounds(xy, p1, p2) && within_bounds(xy, p3, p4)).then_some(xy)
}

/// Point at `length` from `origin` along `angle` (radians).
pub fn rotate_around(origin: DVec2, length: f64, angle: f64) -> DVec2 {
    origin + DVec2::new(angle.cos(), angle.sin()) * length
}

/// The four edges of a closed quadrilateral given by its corners.
pub fn outline(corners: &[DVec2; 4]) -> [Line; 4] {
    std::array::from_fn(|k| Line::new(corners[k], corners[(k + 1) % 4]))
}
