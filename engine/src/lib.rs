//! Orbit: a generational sparse-set ECS and a 2D narrow-phase collision toolkit for
//! frame-stepped planetary platformers.
//!
//! - [`ecs`]: entities, per-type component stores and statically typed queries
//! - [`geom`]: vectors, shapes, manifolds, ray casts and a spatial index contract
//! - [`logging`]: a `log` backend that forwards records over a channel

// Lets `#[derive(Component)]` name `::orbit_engine` from inside this crate too.
extern crate self as orbit_engine;

pub mod ecs;
pub mod geom;
pub mod logging;
