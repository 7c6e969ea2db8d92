//! Frame-stepped game scenario benchmarks.
//!
//! These scenarios simulate real-world usage with representative entity counts, component
//! combinations and per-frame workloads.
//!
//! # Scenarios
//!
//! - **Planet**: players falling onto ring-shaped planets, resolved against terrain through a
//!   grid broad phase and the polygon manifold
//! - **Particles**: high entity count, simple components, short lifetimes and respawns

pub mod particles;
pub mod planet;

pub use particles::{ParticleConfig, ParticleScenario};
pub use planet::{PlanetConfig, PlanetScenario};

/// Common trait for benchmark scenarios.
pub trait Scenario {
    /// Human-readable name of the scenario.
    fn name(&self) -> &'static str;

    /// Brief description of what this scenario tests.
    fn description(&self) -> &'static str;

    /// Number of entities in this scenario.
    fn entity_count(&self) -> usize;

    /// Set up the scenario (spawn entities, initialize state).
    fn setup(&mut self);

    /// Run one "frame" of the scenario.
    fn update(&mut self);

    /// Clean up the scenario.
    fn teardown(&mut self);
}
