use std::f32::consts::{FRAC_PI_2, TAU};

use log::{LevelFilter, debug, info};
use orbit_engine::{
    ecs::World,
    geom::{
        Aabb, GridIndex, Polygon, Ray, SpatialIndex, Transform, Vec2, polygon_to_polygon,
        ray_to_polygon,
    },
    logging::ChannelLogger,
};
use orbit_macros::Component;

const SEGMENTS: usize = 32;
const OUTER_RADIUS: f32 = 64.0;
const INNER_RADIUS: f32 = 56.0;
const GRAVITY: f32 = 20.0;
const DT: f32 = 1.0 / 60.0;
const FRAMES: usize = 240;

#[derive(Component)]
struct Position(Vec2);

#[derive(Component)]
struct Velocity(Vec2);

#[derive(Component)]
struct Body(Polygon);

#[derive(Component)]
struct Terrain(Polygon);

#[derive(Component)]
struct Grounded;

fn build_planet(world: &mut World, index: &mut GridIndex) {
    let step = TAU / SEGMENTS as f32;
    for i in 0..SEGMENTS {
        let a0 = FRAC_PI_2 - step / 2.0 + step * i as f32;
        let a1 = a0 + step;
        let Ok(segment) = Polygon::new(&[
            Vec2::from_angle(a0) * OUTER_RADIUS,
            Vec2::from_angle(a1) * OUTER_RADIUS,
            Vec2::from_angle(a1) * INNER_RADIUS,
            Vec2::from_angle(a0) * INNER_RADIUS,
        ]) else {
            continue;
        };
        let entity = world.spawn(Terrain(segment));
        index.insert(entity, segment.bounds(&Transform::IDENTITY));
    }
}

fn update(world: &mut World, index: &GridIndex) {
    world.clear::<Grounded>();
    world.each::<(Position, Velocity, Body), _>(|world, player, (position, velocity, body)| {
        let down = -position.0.normalize_or_zero();
        velocity.0 += down * GRAVITY * DT;
        position.0 += velocity.0 * DT;

        let area = body.0.bounds(&Transform::from_translation(position.0));
        for entity in index.collect(&area) {
            let Some(Terrain(ground)) = world.get::<Terrain>(entity) else {
                continue;
            };
            let manifold = polygon_to_polygon(
                &body.0,
                &Transform::from_translation(position.0),
                ground,
                &Transform::IDENTITY,
            );
            if !manifold.is_colliding() {
                continue;
            }
            position.0 += manifold.normal * manifold.max_depth();
            let approach = velocity.0.dot(manifold.normal);
            if approach < 0.0 {
                velocity.0 -= manifold.normal * approach;
            }
            world.add(player, Grounded);
        }
    });
}

fn altitude(world: &mut World, index: &GridIndex) -> Option<f32> {
    let mut nearest = None;
    world.each::<Position, _>(|world, _, position| {
        let ray = Ray::new(position.0, -position.0, OUTER_RADIUS);
        let reach = ray.at(ray.t);
        let area = Aabb::new(ray.p, reach);
        for entity in index.collect(&area) {
            let Some(Terrain(ground)) = world.get::<Terrain>(entity) else {
                continue;
            };
            if let Some(hit) = ray_to_polygon(&ray, ground, &Transform::IDENTITY) {
                nearest = Some(nearest.map_or(hit.t, |t: f32| t.min(hit.t)));
            }
        }
    });
    nearest
}

fn main() {
    println!("=============================================================");
    println!("Planet landing");
    println!("=============================================================");

    let logs = match ChannelLogger::install(LevelFilter::Debug) {
        Ok(receiver) => Some(receiver),
        Err(err) => {
            eprintln!("Logging disabled: {err}");
            None
        }
    };

    let mut world = World::new();
    let mut index = GridIndex::new(8.0);
    build_planet(&mut world, &mut index);

    let start = Vec2::new(0.0, OUTER_RADIUS + 10.0);
    let player = world.spawn((
        Position(start),
        Velocity(Vec2::ZERO),
        Body(Polygon::rect(Vec2::splat(0.5)).expect("a unit box is a valid polygon")),
    ));
    info!("Dropping player from {start}");

    for frame in 0..FRAMES {
        update(&mut world, &index);
        if frame % 30 == 0 {
            if let Some(height) = altitude(&mut world, &index) {
                debug!("Frame {frame}: {height:.3} above the surface");
            }
        }
    }

    if let Some(Position(rest)) = world.get::<Position>(player) {
        info!(
            "Player resting at {rest} (grounded: {})",
            world.has::<Grounded>(player)
        );
    }

    for record in logs.iter().flat_map(|receiver| receiver.try_iter()) {
        println!("{record}");
    }
}
