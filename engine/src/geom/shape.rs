use std::{f32::consts::TAU, fmt};

use glam::Vec2;
use log::debug;

use crate::geom::Aabb;

/// A rotation stored as its cosine/sine pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rotation {
    pub c: f32,
    pub s: f32,
}

impl Rotation {
    pub const IDENTITY: Self = Self { c: 1.0, s: 0.0 };

    /// Counter-clockwise rotation by `angle` radians.
    #[inline]
    pub fn from_angle(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Self { c, s }
    }

    #[inline]
    pub fn angle(&self) -> f32 {
        self.s.atan2(self.c)
    }

    /// Rotate `v`.
    #[inline]
    pub fn apply(&self, v: Vec2) -> Vec2 {
        Vec2::new(self.c * v.x - self.s * v.y, self.s * v.x + self.c * v.y)
    }

    /// Rotate `v` by the inverse rotation.
    #[inline]
    pub fn apply_inverse(&self, v: Vec2) -> Vec2 {
        Vec2::new(self.c * v.x + self.s * v.y, -self.s * v.x + self.c * v.y)
    }
}

impl Default for Rotation {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// A local-to-world placement: rotate, then translate by `p`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Transform {
    pub p: Vec2,
    pub r: Rotation,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        p: Vec2::ZERO,
        r: Rotation::IDENTITY,
    };

    #[inline]
    pub fn new(p: Vec2, angle: f32) -> Self {
        Self {
            p,
            r: Rotation::from_angle(angle),
        }
    }

    /// A translation without rotation.
    #[inline]
    pub fn from_translation(p: Vec2) -> Self {
        Self {
            p,
            r: Rotation::IDENTITY,
        }
    }

    /// Map a local point to world space.
    #[inline]
    pub fn apply(&self, v: Vec2) -> Vec2 {
        self.r.apply(v) + self.p
    }

    /// Map a world point to local space.
    #[inline]
    pub fn apply_inverse(&self, v: Vec2) -> Vec2 {
        self.r.apply_inverse(v - self.p)
    }
}

/// A circle in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub p: Vec2,
    pub r: f32,
}

impl Circle {
    #[inline]
    pub fn new(p: Vec2, r: f32) -> Self {
        Self { p, r }
    }

    #[inline]
    pub fn bounds(&self) -> Aabb {
        Aabb::from_center(self.p, Vec2::splat(self.r))
    }
}

/// A capsule in world space: every point within `r` of the segment `a`-`b`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Capsule {
    pub a: Vec2,
    pub b: Vec2,
    pub r: f32,
}

impl Capsule {
    #[inline]
    pub fn new(a: Vec2, b: Vec2, r: f32) -> Self {
        Self { a, b, r }
    }

    #[inline]
    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.a, self.b).expanded(self.r)
    }
}

/// Why a polygon could not be built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeError {
    /// Fewer than three distinct, non-collinear points.
    TooFewVertices { count: usize },
    /// More points than [`Polygon::MAX_VERTICES`].
    TooManyVertices { count: usize },
    /// A coordinate was NaN or infinite.
    NonFinite,
}

impl fmt::Display for ShapeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ShapeError::TooFewVertices { count } => {
                write!(f, "polygon hull has {count} vertices, at least 3 are required")
            }
            ShapeError::TooManyVertices { count } => write!(
                f,
                "polygon has {count} vertices, at most {} are supported",
                Polygon::MAX_VERTICES
            ),
            ShapeError::NonFinite => write!(f, "polygon has a non-finite coordinate"),
        }
    }
}

impl std::error::Error for ShapeError {}

/// A convex polygon in local space, counter-clockwise, with one outward unit normal per edge.
///
/// Normal `i` belongs to the edge from vertex `i` to vertex `i + 1`. Vertices and normals are only
/// reachable through constructors and [`set_vertices`](Self::set_vertices), which always rebuild
/// both together.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Polygon {
    count: usize,
    verts: [Vec2; Polygon::MAX_VERTICES],
    norms: [Vec2; Polygon::MAX_VERTICES],
}

impl Polygon {
    pub const MAX_VERTICES: usize = 8;

    /// Build the convex hull of `points`.
    ///
    /// Duplicate points and points on the interior of a hull edge are dropped.
    pub fn new(points: &[Vec2]) -> Result<Self, ShapeError> {
        if points.len() > Self::MAX_VERTICES {
            return Err(ShapeError::TooManyVertices {
                count: points.len(),
            });
        }
        if !points.iter().all(|p| p.is_finite()) {
            return Err(ShapeError::NonFinite);
        }

        let hull = convex_hull(points);
        if hull.len() < 3 {
            return Err(ShapeError::TooFewVertices { count: hull.len() });
        }
        if hull.len() < points.len() {
            debug!(
                "Polygon hull dropped {} of {} points",
                points.len() - hull.len(),
                points.len()
            );
        }

        let mut polygon = Self {
            count: hull.len(),
            verts: [Vec2::ZERO; Self::MAX_VERTICES],
            norms: [Vec2::ZERO; Self::MAX_VERTICES],
        };
        polygon.verts[..hull.len()].copy_from_slice(&hull);
        polygon.compute_normals();
        Ok(polygon)
    }

    /// An axis-aligned box centered on the origin.
    pub fn rect(half_extents: Vec2) -> Result<Self, ShapeError> {
        let Vec2 { x, y } = half_extents.abs();
        Self::new(&[
            Vec2::new(-x, -y),
            Vec2::new(x, -y),
            Vec2::new(x, y),
            Vec2::new(-x, y),
        ])
    }

    /// A regular polygon with `count` vertices on a circle of `radius`, the first on the +X axis.
    pub fn regular(count: usize, radius: f32) -> Result<Self, ShapeError> {
        if count > Self::MAX_VERTICES {
            return Err(ShapeError::TooManyVertices { count });
        }
        let points: Vec<Vec2> = (0..count)
            .map(|i| Vec2::from_angle(TAU * i as f32 / count as f32) * radius)
            .collect();
        Self::new(&points)
    }

    /// Replace the vertices with the hull of `points`. On error the polygon is unchanged.
    pub fn set_vertices(&mut self, points: &[Vec2]) -> Result<(), ShapeError> {
        *self = Self::new(points)?;
        Ok(())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[inline]
    pub fn vertices(&self) -> &[Vec2] {
        &self.verts[..self.count]
    }

    #[inline]
    pub fn normals(&self) -> &[Vec2] {
        &self.norms[..self.count]
    }

    /// The polygon moved into world space by `transform`. Normals are rotated, not recomputed.
    pub fn transformed(&self, transform: &Transform) -> Polygon {
        let mut out = *self;
        for i in 0..self.count {
            out.verts[i] = transform.apply(self.verts[i]);
            out.norms[i] = transform.r.apply(self.norms[i]);
        }
        out
    }

    /// World-space bounds under `transform`.
    pub fn bounds(&self, transform: &Transform) -> Aabb {
        let first = transform.apply(self.verts[0]);
        self.verts[1..self.count]
            .iter()
            .fold(Aabb::new(first, first), |bounds, v| {
                let p = transform.apply(*v);
                Aabb {
                    min: bounds.min.min(p),
                    max: bounds.max.max(p),
                }
            })
    }

    /// Mean of the vertices.
    pub fn centroid(&self) -> Vec2 {
        self.vertices().iter().copied().sum::<Vec2>() / self.count as f32
    }

    fn compute_normals(&mut self) {
        for i in 0..self.count {
            let edge = self.verts[(i + 1) % self.count] - self.verts[i];
            self.norms[i] = Vec2::new(edge.y, -edge.x).normalize_or_zero();
        }
    }
}

/// Andrew's monotone chain. Returns the hull counter-clockwise without collinear points.
fn convex_hull(points: &[Vec2]) -> Vec<Vec2> {
    let mut sorted = points.to_vec();
    sorted.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    sorted.dedup();
    if sorted.len() < 3 {
        return sorted;
    }

    let turn = |o: Vec2, a: Vec2, b: Vec2| (a - o).perp_dot(b - o);
    let mut hull: Vec<Vec2> = Vec::with_capacity(sorted.len() + 1);

    for &p in &sorted {
        while hull.len() >= 2 && turn(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0 {
            hull.pop();
        }
        hull.push(p);
    }

    let lower = hull.len() + 1;
    for &p in sorted.iter().rev().skip(1) {
        while hull.len() >= lower && turn(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0 {
            hull.pop();
        }
        hull.push(p);
    }

    // The chain closes on its starting point.
    hull.pop();
    hull
}

/// A ray starting at `p` heading along unit `d`, up to distance `t`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub p: Vec2,
    pub d: Vec2,
    pub t: f32,
}

impl Ray {
    /// A ray along `direction`, which is normalised here.
    #[inline]
    pub fn new(p: Vec2, direction: Vec2, t: f32) -> Self {
        Self {
            p,
            d: direction.normalize_or_zero(),
            t,
        }
    }

    /// The ray from `from` to `to`.
    #[inline]
    pub fn between(from: Vec2, to: Vec2) -> Self {
        let delta = to - from;
        Self::new(from, delta, delta.length())
    }

    /// The point at distance `t` along the ray.
    #[inline]
    pub fn at(&self, t: f32) -> Vec2 {
        self.p + self.d * t
    }
}

/// Where a ray hit: distance along the ray and the surface normal there.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Raycast {
    pub t: f32,
    pub n: Vec2,
}
