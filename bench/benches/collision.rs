//! Collision microbenchmarks using Criterion.
//!
//! These benchmarks measure single narrow-phase calls and broad-phase queries:
//! - Every shape pair, overlapping and separated
//! - Ray casts against each shape
//! - Grid versus linear scan for the same query load

use std::f32::consts::FRAC_PI_4;

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use orbit_engine::ecs::Entity;
use orbit_engine::geom::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

// =============================================================================
// Narrow Phase
// =============================================================================

fn bench_polygon(c: &mut Criterion) {
    let mut group = c.benchmark_group("polygon");

    let (Ok(square), Ok(hexagon), Ok(octagon)) = (
        Polygon::rect(Vec2::splat(0.5)),
        Polygon::regular(6, 0.75),
        Polygon::regular(8, 1.0),
    ) else {
        return;
    };

    for (name, a, b) in [
        ("box_hexagon", square, hexagon),
        ("octagon_octagon", octagon, octagon),
    ] {
        let touching = Transform::new(Vec2::new(0.3, 1.0), FRAC_PI_4);
        let apart = Transform::new(Vec2::new(5.0, 5.0), FRAC_PI_4);
        let origin = Transform::from_translation(Vec2::ZERO);

        group.bench_function(BenchmarkId::new("overlapping", name), |bench| {
            bench.iter(|| polygon_to_polygon(black_box(&a), &touching, black_box(&b), &origin));
        });
        group.bench_function(BenchmarkId::new("separated", name), |bench| {
            bench.iter(|| polygon_to_polygon(black_box(&a), &apart, black_box(&b), &origin));
        });
    }

    group.bench_function("intersect_by_position", |bench| {
        bench.iter(|| {
            intersect_polygons(
                black_box(&square),
                Vec2::new(0.5, 0.25),
                black_box(&hexagon),
                Vec2::ZERO,
            )
        });
    });

    group.finish();
}

fn bench_round(c: &mut Criterion) {
    let mut group = c.benchmark_group("round");

    let Ok(ground) = Polygon::rect(Vec2::new(4.0, 0.5)) else {
        return;
    };
    let ground_at = Transform::new(Vec2::new(0.0, -1.0), 0.1);
    let circle = Circle::new(Vec2::new(0.2, -0.2), 0.5);
    let other = Circle::new(Vec2::new(0.7, 0.1), 0.5);
    let capsule = Capsule::new(Vec2::new(-1.0, -0.1), Vec2::new(1.0, 0.0), 0.4);
    let crossing = Capsule::new(Vec2::new(0.0, -1.0), Vec2::new(0.2, 1.0), 0.3);

    group.bench_function("circle_circle", |b| {
        b.iter(|| circle_to_circle(black_box(&circle), black_box(&other)));
    });
    group.bench_function("circle_capsule", |b| {
        b.iter(|| circle_to_capsule(black_box(&circle), black_box(&capsule)));
    });
    group.bench_function("capsule_capsule", |b| {
        b.iter(|| capsule_to_capsule(black_box(&capsule), black_box(&crossing)));
    });
    group.bench_function("circle_polygon", |b| {
        b.iter(|| circle_to_polygon(black_box(&circle), black_box(&ground), &ground_at));
    });
    group.bench_function("capsule_polygon", |b| {
        b.iter(|| capsule_to_polygon(black_box(&capsule), black_box(&ground), &ground_at));
    });

    group.finish();
}

fn bench_ray(c: &mut Criterion) {
    let mut group = c.benchmark_group("ray");

    let Ok(hexagon) = Polygon::regular(6, 1.0) else {
        return;
    };
    let hexagon_at = Transform::new(Vec2::new(5.0, 0.0), 0.3);
    let circle = Circle::new(Vec2::new(5.0, 0.0), 1.0);
    let capsule = Capsule::new(Vec2::new(5.0, -1.0), Vec2::new(5.0, 1.0), 0.5);
    let hit = Ray::new(Vec2::ZERO, Vec2::X, 10.0);
    let miss = Ray::new(Vec2::ZERO, Vec2::Y, 10.0);

    for (name, ray) in [("hit", hit), ("miss", miss)] {
        group.bench_function(BenchmarkId::new("circle", name), |b| {
            b.iter(|| ray_to_circle(black_box(&ray), black_box(&circle)));
        });
        group.bench_function(BenchmarkId::new("capsule", name), |b| {
            b.iter(|| ray_to_capsule(black_box(&ray), black_box(&capsule)));
        });
        group.bench_function(BenchmarkId::new("polygon", name), |b| {
            b.iter(|| ray_to_polygon(black_box(&ray), black_box(&hexagon), &hexagon_at));
        });
    }

    group.finish();
}

// =============================================================================
// Broad Phase
// =============================================================================

fn scatter(rng: &mut ChaCha8Rng, extent: f32) -> Aabb {
    let center = Vec2::new(rng.gen_range(-extent..extent), rng.gen_range(-extent..extent));
    Aabb::from_center(center, Vec2::new(rng.gen_range(0.25..2.0), rng.gen_range(0.25..2.0)))
}

fn bench_spatial(c: &mut Criterion) {
    let mut group = c.benchmark_group("spatial");
    let queries = 256;

    for count in [100, 1_000, 10_000] {
        let extent = (count as f32).sqrt() * 4.0;
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let boxes: Vec<Aabb> = (0..count).map(|_| scatter(&mut rng, extent)).collect();
        let areas: Vec<Aabb> = (0..queries).map(|_| scatter(&mut rng, extent)).collect();

        let mut linear = LinearIndex::new();
        let mut grid = GridIndex::new(4.0);
        for (n, bounds) in boxes.iter().enumerate() {
            let entity = Entity::from_bits(n as u64);
            linear.insert(entity, *bounds);
            grid.insert(entity, *bounds);
        }

        group.throughput(Throughput::Elements(queries as u64));
        for (name, index) in [
            ("linear", &linear as &dyn SpatialIndex),
            ("grid", &grid as &dyn SpatialIndex),
        ] {
            group.bench_with_input(BenchmarkId::new(name, count), &areas, |b, areas| {
                b.iter(|| {
                    let mut found = 0usize;
                    for area in areas {
                        index.query(area, &mut |_| found += 1);
                    }
                    black_box(found)
                });
            });
        }

        group.bench_with_input(BenchmarkId::new("grid_reindex", count), &boxes, |b, boxes| {
            let mut grid = grid.clone();
            let mut step = 0.0f32;
            b.iter(|| {
                step += 0.1;
                let shift = Vec2::new(step.sin(), step.cos());
                for (n, bounds) in boxes.iter().enumerate() {
                    let moved = Aabb::new(bounds.min + shift, bounds.max + shift);
                    grid.reindex(Entity::from_bits(n as u64), moved);
                }
            });
        });
    }

    group.finish();
}

// =============================================================================
// Criterion Configuration
// =============================================================================

criterion_group!(benches, bench_polygon, bench_round, bench_ray, bench_spatial);

criterion_main!(benches);
