//! Narrow-phase collision between convex shapes.
//!
//! Every routine is a pure function over shapes already placed in the world. Polygons are placed
//! with an explicit [`Transform`]; circles, capsules and rays carry world coordinates directly.
//!
//! # Conventions
//!
//! - A [`Manifold`] normal points from the second shape (B) toward the first (A). Moving A by
//!   `normal * depth` separates the pair.
//! - Shapes that merely touch collide with depth `0`.
//! - Degenerate input (coincident centers, zero-length axes, a circle centered on an edge) picks a
//!   defined normal instead of producing NaN.
//! - Ray casts that start inside or on a shape hit at `t == 0`.
//!
//! | A \ B   | Circle | Capsule | Polygon | Ray cast |
//! |---------|--------|---------|---------|----------|
//! | Circle  | [`circle_to_circle`] | [`circle_to_capsule`] | [`circle_to_polygon`] | [`ray_to_circle`] |
//! | Capsule |        | [`capsule_to_capsule`] | [`capsule_to_polygon`] | [`ray_to_capsule`] |
//! | Polygon |        |         | [`polygon_to_polygon`] | [`ray_to_polygon`] |

mod polygon;
mod ray;
mod round;

use glam::Vec2;

use crate::geom::Transform;

pub use polygon::{intersect_polygons, polygon_to_polygon};
pub use ray::{ray_to_capsule, ray_to_circle, ray_to_polygon};
pub use round::{
    capsule_to_capsule, capsule_to_polygon, circle_to_capsule, circle_to_circle, circle_to_polygon,
};

/// Lengths below this are treated as zero.
pub(crate) const EPSILON: f32 = 1.0e-6;

/// Sine of the largest angle at which two directions still count as parallel.
pub(crate) const PARALLEL_TOLERANCE: f32 = 1.0e-3;

/// The outcome of one collision test.
///
/// Only the first `count` entries of `depths` and `contact_points` are meaningful, and nothing is
/// meaningful when `count == 0`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Manifold {
    pub count: usize,
    pub depths: [f32; 2],
    pub contact_points: [Vec2; 2],
    pub normal: Vec2,
}

impl Manifold {
    /// No contact.
    pub const NONE: Self = Self {
        count: 0,
        depths: [0.0; 2],
        contact_points: [Vec2::ZERO; 2],
        normal: Vec2::ZERO,
    };

    /// A manifold with one contact.
    #[inline]
    pub(crate) fn single(normal: Vec2, point: Vec2, depth: f32) -> Self {
        let mut manifold = Self::with_normal(normal);
        manifold.push(point, depth);
        manifold
    }

    #[inline]
    pub(crate) fn with_normal(normal: Vec2) -> Self {
        Self {
            normal,
            ..Self::NONE
        }
    }

    /// Add a contact. Extra contacts beyond two are ignored.
    #[inline]
    pub(crate) fn push(&mut self, point: Vec2, depth: f32) {
        if self.count < 2 {
            self.contact_points[self.count] = point;
            self.depths[self.count] = depth;
            self.count += 1;
        }
    }

    /// Whether the shapes touch or overlap.
    #[inline]
    pub fn is_colliding(&self) -> bool {
        self.count > 0
    }

    /// The deepest penetration, or `0` without contact.
    #[inline]
    pub fn max_depth(&self) -> f32 {
        self.depths[..self.count].iter().copied().fold(0.0, f32::max)
    }

    /// The `(point, depth)` pairs of every contact.
    pub fn contacts(&self) -> impl Iterator<Item = (Vec2, f32)> + '_ {
        self.contact_points[..self.count]
            .iter()
            .copied()
            .zip(self.depths[..self.count].iter().copied())
    }

    /// The same contact seen from the other shape: the normal is reversed.
    #[inline]
    pub fn flipped(mut self) -> Self {
        self.normal = -self.normal;
        self
    }

    /// Map a manifold computed in the local space of `transform` into world space.
    pub(crate) fn to_world(mut self, transform: &Transform) -> Self {
        self.normal = transform.r.apply(self.normal);
        for point in &mut self.contact_points[..self.count] {
            *point = transform.apply(*point);
        }
        self
    }
}

/// The point of segment `a`-`b` closest to `p`.
pub(crate) fn closest_point_on_segment(p: Vec2, a: Vec2, b: Vec2) -> Vec2 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= EPSILON * EPSILON {
        return a;
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    a + ab * t
}

/// The closest pair of points between segments `p1`-`q1` and `p2`-`q2`.
///
/// Crossing segments return the same point twice.
pub(crate) fn closest_points_between_segments(
    p1: Vec2,
    q1: Vec2,
    p2: Vec2,
    q2: Vec2,
) -> (Vec2, Vec2) {
    let d1 = q1 - p1;
    let d2 = q2 - p2;
    let r = p1 - p2;
    let a = d1.length_squared();
    let e = d2.length_squared();
    let f = d2.dot(r);
    let tiny = EPSILON * EPSILON;

    if a <= tiny && e <= tiny {
        return (p1, p2);
    }
    if a <= tiny {
        return (p1, p2 + d2 * (f / e).clamp(0.0, 1.0));
    }

    let c = d1.dot(r);
    if e <= tiny {
        return (p1 + d1 * (-c / a).clamp(0.0, 1.0), p2);
    }

    // Segments that cross share a point on both.
    let cross = d1.perp_dot(d2);
    if cross.abs() > tiny {
        let s = (p2 - p1).perp_dot(d2) / cross;
        let t = (p2 - p1).perp_dot(d1) / cross;
        if (0.0..=1.0).contains(&s) && (0.0..=1.0).contains(&t) {
            let point = p1 + d1 * s;
            return (point, point);
        }
    }

    let b = d1.dot(d2);
    let denom = a * e - b * b;
    let mut s = if denom > tiny * a * e {
        ((b * f - c * e) / denom).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let mut t = (b * s + f) / e;
    if t < 0.0 {
        t = 0.0;
        s = (-c / a).clamp(0.0, 1.0);
    } else if t > 1.0 {
        t = 1.0;
        s = ((b - c) / a).clamp(0.0, 1.0);
    }
    (p1 + d1 * s, p2 + d2 * t)
}

/// Clip `segment` to the half plane `normal . x <= offset`. Returns how many points survive; the
/// segment is only meaningful when that is 2.
pub(crate) fn clip(segment: &mut [Vec2; 2], normal: Vec2, offset: f32) -> usize {
    let d0 = normal.dot(segment[0]) - offset;
    let d1 = normal.dot(segment[1]) - offset;
    let mut out = [Vec2::ZERO; 2];
    let mut kept = 0;

    if d0 < 0.0 {
        out[kept] = segment[0];
        kept += 1;
    }
    if d1 < 0.0 {
        out[kept] = segment[1];
        kept += 1;
    }
    if d0 == 0.0 && d1 == 0.0 {
        out = *segment;
        kept = 2;
    } else if d0 * d1 <= 0.0 && kept < 2 {
        out[kept] = segment[0] + (segment[1] - segment[0]) * (d0 / (d0 - d1));
        kept += 1;
    }

    *segment = out;
    kept
}

/// Clip `segment` to the slab between the side planes of edge `v1`-`v2`.
pub(crate) fn clip_to_edge(segment: &mut [Vec2; 2], v1: Vec2, v2: Vec2) -> bool {
    let tangent = (v2 - v1).normalize_or_zero();
    clip(segment, -tangent, -tangent.dot(v1)) == 2 && clip(segment, tangent, tangent.dot(v2)) == 2
}
