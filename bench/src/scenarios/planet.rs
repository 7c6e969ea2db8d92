//! Planet landing benchmark scenario.
//!
//! Simulates the core loop of a planetary platformer:
//! - A few ring-shaped planets built from trapezoid terrain segments
//! - ~1,000 box-shaped players dropped around them
//! - Gravity toward the nearest planet, found with a nested query
//! - Terrain candidates from a grid broad phase, resolved with the polygon manifold
//!
//! This scenario tests:
//! - Nested `each` calls (players over planets)
//! - Point lookups from inside a running query
//! - Narrow-phase throughput against rotated shapes
//! - A per-frame `clear` of a marker component

use std::f32::consts::{FRAC_PI_2, TAU};

use orbit_engine::ecs::{Entity, World};
use orbit_engine::geom::{GridIndex, Polygon, SpatialIndex, Transform, Vec2, polygon_to_polygon};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::components::{Angle, Body, Grounded, Planet, Position, Terrain, Velocity};
use crate::scenarios::Scenario;

/// Distance between neighbouring planet centers.
const PLANET_SPACING: f32 = 200.0;
/// Thickness of the terrain ring.
const CRUST: f32 = 8.0;

/// Configuration for the planet benchmark.
#[derive(Debug, Clone)]
pub struct PlanetConfig {
    /// Number of planets, laid out along the X axis.
    pub planet_count: usize,
    /// Number of players dropped around the planets.
    pub player_count: usize,
    /// Terrain segments per planet.
    pub segments: usize,
    /// Outer radius of every planet.
    pub radius: f32,
    /// Acceleration toward the nearest planet.
    pub gravity: f32,
    /// Fixed timestep per frame.
    pub delta_time: f32,
    /// Cell size of the terrain broad phase.
    pub cell_size: f32,
    /// Random seed for reproducibility.
    pub seed: u64,
}

impl Default for PlanetConfig {
    fn default() -> Self {
        Self {
            planet_count: 4,
            player_count: 1_000,
            segments: 32,
            radius: 64.0,
            gravity: 20.0,
            delta_time: 1.0 / 60.0,
            cell_size: 8.0,
            seed: 4242,
        }
    }
}

/// Planet landing benchmark scenario.
pub struct PlanetScenario {
    config: PlanetConfig,
    world: World,
    terrain: GridIndex,
    rng: ChaCha8Rng,
    players: Vec<Entity>,
}

/// Trapezoid segments of a ring around `center`, the first one centered on +Y.
pub fn ring(center: Vec2, segments: usize, outer: f32, inner: f32) -> Vec<Polygon> {
    let step = TAU / segments as f32;
    (0..segments)
        .filter_map(|i| {
            let a0 = FRAC_PI_2 - step / 2.0 + step * i as f32;
            let a1 = a0 + step;
            Polygon::new(&[
                center + Vec2::from_angle(a0) * outer,
                center + Vec2::from_angle(a1) * outer,
                center + Vec2::from_angle(a1) * inner,
                center + Vec2::from_angle(a0) * inner,
            ])
            .ok()
        })
        .collect()
}

/// System: Accelerate every body toward the nearest planet and integrate its position.
fn system_gravity(world: &mut World, gravity: f32, dt: f32) {
    world.each::<(Position, Velocity), _>(|world, _, (position, velocity)| {
        let mut nearest: Option<Vec2> = None;
        world.each::<Planet, _>(|_, _, planet| {
            let offset = planet.center - position.0;
            if nearest.is_none_or(|best| offset.length_squared() < best.length_squared()) {
                nearest = Some(offset);
            }
        });

        if let Some(offset) = nearest {
            velocity.0 += offset.normalize_or_zero() * gravity * dt;
        }
        position.0 += velocity.0 * dt;
    });
}

/// System: Push bodies out of the terrain they overlap and mark them grounded.
fn system_collide(world: &mut World, terrain: &GridIndex) {
    world.clear::<Grounded>();
    world.each::<(Position, Velocity, Angle, Body), _>(
        |world, player, (position, velocity, angle, body)| {
            let area = body.0.bounds(&Transform::new(position.0, angle.0));
            let mut touched = false;

            terrain.query(&area, &mut |segment| {
                let Some(Terrain(ground)) = world.get::<Terrain>(segment) else {
                    return;
                };
                let manifold = polygon_to_polygon(
                    &body.0,
                    &Transform::new(position.0, angle.0),
                    ground,
                    &Transform::IDENTITY,
                );
                if !manifold.is_colliding() {
                    return;
                }

                position.0 += manifold.normal * manifold.max_depth();
                let approach = velocity.0.dot(manifold.normal);
                if approach < 0.0 {
                    velocity.0 -= manifold.normal * approach;
                }
                touched = true;
            });

            if touched {
                world.add(player, Grounded);
            }
        },
    );
}

impl PlanetScenario {
    /// Create a new planet scenario with default config.
    pub fn new() -> Self {
        Self::with_config(PlanetConfig::default())
    }

    /// Create a new planet scenario with custom config.
    pub fn with_config(config: PlanetConfig) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            world: World::new(),
            terrain: GridIndex::new(config.cell_size),
            players: Vec::new(),
            config,
        }
    }

    fn spawn_planet(&mut self, center: Vec2) {
        let radius = self.config.radius;
        self.world.spawn(Planet { center, radius });
        for segment in ring(center, self.config.segments, radius, radius - CRUST) {
            let entity = self.world.spawn(Terrain(segment));
            self.terrain.insert(entity, segment.bounds(&Transform::IDENTITY));
        }
    }

    fn spawn_player(&mut self, body: Polygon) -> Entity {
        let planet = self.rng.gen_range(0..self.config.planet_count);
        let center = Vec2::new(planet as f32 * PLANET_SPACING, 0.0);
        let angle = self.rng.gen_range(0.0..TAU);
        let height = self.rng.gen_range(2.0..20.0);

        self.world.spawn((
            Position(center + Vec2::from_angle(angle) * (self.config.radius + height)),
            Velocity(Vec2::ZERO),
            Angle(angle - FRAC_PI_2),
            Body(body),
        ))
    }

    /// Players touching terrain during the last frame.
    pub fn grounded_count(&self) -> usize {
        self.world.iter::<Grounded>().count()
    }

    /// Current player count.
    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Live entities, terrain and planets included.
    pub fn entity_total(&self) -> usize {
        self.world.count()
    }

    /// The world being simulated.
    pub fn world(&self) -> &World {
        &self.world
    }
}

impl Default for PlanetScenario {
    fn default() -> Self {
        Self::new()
    }
}

impl Scenario for PlanetScenario {
    fn name(&self) -> &'static str {
        "planet"
    }

    fn description(&self) -> &'static str {
        "Players landing on ring planets with nested gravity queries and polygon manifolds"
    }

    fn entity_count(&self) -> usize {
        self.config.player_count + self.config.planet_count * (self.config.segments + 1)
    }

    fn setup(&mut self) {
        for planet in 0..self.config.planet_count {
            self.spawn_planet(Vec2::new(planet as f32 * PLANET_SPACING, 0.0));
        }

        if self.config.planet_count == 0 {
            return;
        }
        let Ok(body) = Polygon::rect(Vec2::splat(0.5)) else {
            return;
        };
        self.players = (0..self.config.player_count)
            .map(|_| self.spawn_player(body))
            .collect();
    }

    fn update(&mut self) {
        system_gravity(&mut self.world, self.config.gravity, self.config.delta_time);
        system_collide(&mut self.world, &self.terrain);
    }

    fn teardown(&mut self) {
        let mut everything = Vec::new();
        self.world.each::<(), _>(|_, entity, _| everything.push(entity));
        for entity in everything {
            self.terrain.remove(entity);
            self.world.destroy(entity);
        }
        self.players.clear();
    }
}
