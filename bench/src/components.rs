//! Common component types used across benchmarks.
//!
//! These components are representative of a 2D platformer in terms of size and access patterns.

use orbit_engine::geom::{Polygon, Vec2};
use orbit_macros::Component;

// =============================================================================
// Motion Components
// =============================================================================

/// World-space position (8 bytes).
#[derive(Component, Clone, Copy, Debug, Default, PartialEq)]
pub struct Position(pub Vec2);

/// Velocity in units per second (8 bytes).
#[derive(Component, Clone, Copy, Debug, Default, PartialEq)]
pub struct Velocity(pub Vec2);

/// Orientation in radians.
#[derive(Component, Clone, Copy, Debug, Default, PartialEq)]
pub struct Angle(pub f32);

// =============================================================================
// Collision Components
// =============================================================================

/// Collision shape of a moving body, in its local space.
#[derive(Component, Clone, Copy, Debug)]
pub struct Body(pub Polygon);

/// Static terrain, already in world space.
#[derive(Component, Clone, Copy, Debug)]
pub struct Terrain(pub Polygon);

/// A gravity well. Terrain around it is spawned as separate [`Terrain`] entities.
#[derive(Component, Clone, Copy, Debug)]
pub struct Planet {
    pub center: Vec2,
    pub radius: f32,
}

/// Marks a body that touched terrain this frame. Cleared every frame.
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct Grounded;

// =============================================================================
// Game Entity Components
// =============================================================================

/// Health component for damageable entities.
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct Health {
    pub current: f32,
    pub max: f32,
}

/// Draw order, sorted every frame.
#[derive(Component, Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Layer(pub i32);

// =============================================================================
// Particle System Components
// =============================================================================

/// A Particle marker
#[derive(Component, Clone)]
pub struct Particle;

/// Particle lifetime tracking.
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct Lifetime {
    pub remaining: f32,
    pub total: f32,
}

/// RGBA color (16 bytes).
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

// =============================================================================
// Fragmentation Test Components (A-Z)
// =============================================================================

/// Shared data component for fragmentation tests.
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct Data {
    pub value: f64,
}

// Marker components spreading entities over many stores
macro_rules! define_marker_components {
    ($($name:ident),*) => {
        $(
            #[derive(Component, Clone, Copy, Debug, Default)]
            pub struct $name;
        )*
    };
}

define_marker_components!(
    MarkerA, MarkerB, MarkerC, MarkerD, MarkerE, MarkerF, MarkerG, MarkerH, MarkerI, MarkerJ,
    MarkerK, MarkerL, MarkerM, MarkerN, MarkerO, MarkerP, MarkerQ, MarkerR, MarkerS, MarkerT,
    MarkerU, MarkerV, MarkerW, MarkerX, MarkerY, MarkerZ
);

// =============================================================================
// Component Size Reference
// =============================================================================
