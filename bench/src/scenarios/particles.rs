//! Particle system benchmark scenario.
//!
//! Simulates a high-volume particle system with:
//! - 100,000 particles
//! - Simple components: Position, Velocity, Lifetime, Color
//! - Systems: movement, lifetime decay, fade, respawn dead particles
//!
//! This scenario tests:
//! - High entity count iteration performance
//! - Simple component access patterns
//! - Destroy and spawn throughput from inside a running query

use orbit_engine::ecs::World;
use orbit_engine::geom::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::components::{Color, Lifetime, Particle, Position, Velocity};
use crate::scenarios::Scenario;

/// Configuration for the particle benchmark.
#[derive(Debug, Clone)]
pub struct ParticleConfig {
    /// Total number of particles to maintain.
    pub particle_count: usize,
    /// Simulated delta time per frame.
    pub delta_time: f32,
    /// Random seed for reproducibility.
    pub seed: u64,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            particle_count: 100_000,
            delta_time: 1.0 / 60.0,
            seed: 12345,
        }
    }
}

struct ParticleFactory(ChaCha8Rng);

impl ParticleFactory {
    fn create_particle(&mut self) -> (Particle, Position, Velocity, Lifetime, Color) {
        let rng = &mut self.0;
        let position = Position(Vec2::new(
            rng.gen_range(-100.0..100.0),
            rng.gen_range(-100.0..100.0),
        ));
        let velocity = Velocity(Vec2::new(
            rng.gen_range(-10.0..10.0),
            rng.gen_range(-10.0..10.0),
        ));
        let lifetime = Lifetime {
            remaining: rng.gen_range(1.0..5.0),
            total: 5.0,
        };
        let color = Color {
            r: rng.gen_range(0.0..1.0),
            g: rng.gen_range(0.0..1.0),
            b: rng.gen_range(0.0..1.0),
            a: 1.0,
        };

        (Particle, position, velocity, lifetime, color)
    }
}

/// System: Update particle positions based on velocity.
fn system_movement(world: &mut World, dt: f32) {
    world.each::<(Position, Velocity), _>(|_, _, (position, velocity)| {
        position.0 += velocity.0 * dt;
    });
}

/// System: Decay lifetimes and fade particles as they age.
fn system_lifetime(world: &mut World, dt: f32) {
    world.each::<(Lifetime, Color), _>(|_, _, (lifetime, color)| {
        lifetime.remaining -= dt;
        color.a = (lifetime.remaining / lifetime.total).max(0.0);
    });
}

/// System: Replace every dead particle (lifetime <= 0) with a fresh one.
fn system_respawn(world: &mut World, factory: &mut ParticleFactory) -> usize {
    let mut respawned = 0;
    world.each::<Lifetime, _>(|world, entity, lifetime| {
        if lifetime.remaining <= 0.0 {
            world.destroy(entity);
            world.spawn(factory.create_particle());
            respawned += 1;
        }
    });
    respawned
}

/// Particle system benchmark scenario.
pub struct ParticleScenario {
    config: ParticleConfig,
    world: World,
    factory: ParticleFactory,
    respawned: usize,
}

impl ParticleScenario {
    /// Create a new particle scenario with default config.
    pub fn new() -> Self {
        Self::with_config(ParticleConfig::default())
    }

    /// Create a new particle scenario with custom config.
    pub fn with_config(config: ParticleConfig) -> Self {
        Self {
            factory: ParticleFactory(ChaCha8Rng::seed_from_u64(config.seed)),
            world: World::new(),
            respawned: 0,
            config,
        }
    }

    /// Get current particle count.
    pub fn current_count(&self) -> usize {
        self.world.iter::<Particle>().count()
    }

    /// Particles replaced since setup.
    pub fn respawned(&self) -> usize {
        self.respawned
    }
}

impl Default for ParticleScenario {
    fn default() -> Self {
        Self::new()
    }
}

impl Scenario for ParticleScenario {
    fn name(&self) -> &'static str {
        "particles"
    }

    fn description(&self) -> &'static str {
        "High-volume particle system with movement, lifetime, and respawn"
    }

    fn entity_count(&self) -> usize {
        self.config.particle_count
    }

    fn setup(&mut self) {
        let factory = &mut self.factory;
        self.world
            .spawn_many((0..self.config.particle_count).map(|_| factory.create_particle()));
    }

    fn update(&mut self) {
        let dt = self.config.delta_time;
        system_movement(&mut self.world, dt);
        system_lifetime(&mut self.world, dt);
        self.respawned += system_respawn(&mut self.world, &mut self.factory);
    }

    fn teardown(&mut self) {
        let mut entities = Vec::new();
        self.world.each::<(), _>(|_, entity, _| entities.push(entity));
        for entity in entities {
            self.world.destroy(entity);
        }
        self.respawned = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn particle_scenario_setup() {
        let mut scenario = ParticleScenario::with_config(ParticleConfig {
            particle_count: 100,
            ..Default::default()
        });

        scenario.setup();
        assert_eq!(scenario.current_count(), 100);

        scenario.teardown();
        assert_eq!(scenario.current_count(), 0);
        assert_eq!(scenario.world.count(), 0);
    }

    #[test]
    fn particle_scenario_update() {
        let mut scenario = ParticleScenario::with_config(ParticleConfig {
            particle_count: 100,
            delta_time: 0.5,
            ..Default::default()
        });
        scenario.setup();

        // When - Five seconds, so every particle outlives its first lifetime
        for _ in 0..10 {
            scenario.update();
        }

        // Then - Dead particles were replaced one for one
        assert!(scenario.respawned() >= 100);
        assert_eq!(scenario.current_count(), 100);
        assert_eq!(scenario.world.count(), 100);

        scenario.teardown();
    }
}
