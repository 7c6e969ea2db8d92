//! 2D geometry for the simulation: vectors, shapes, narrow-phase collision and spatial indexing.
//!
//! Vectors are [`glam::Vec2`]. The handful of operations glam does not ship (scalar offsets,
//! rotation by an angle, reflection) come from [`Vec2Ext`]. Zero-length input never produces NaN:
//! normalise with [`Vec2::normalize_or_zero`].
//!
//! Shapes are plain values. Polygons live in local space and are placed with a [`Transform`];
//! circles, capsules and rays are given directly in world space. Every collision routine is a pure
//! function returning a [`Manifold`] (or an `Option<Raycast>` for ray casts).

mod bounds;
pub mod collision;
mod shape;
pub mod spatial;
mod vec2;

pub use bounds::Aabb;
pub use collision::{
    Manifold, capsule_to_capsule, capsule_to_polygon, circle_to_capsule, circle_to_circle,
    circle_to_polygon, intersect_polygons, polygon_to_polygon, ray_to_capsule, ray_to_circle,
    ray_to_polygon,
};
pub use glam::Vec2;
pub use shape::{Capsule, Circle, Polygon, Ray, Raycast, Rotation, ShapeError, Transform};
pub use spatial::{GridIndex, LinearIndex, SpatialIndex};
pub use vec2::{Vec2Ext, sign};
