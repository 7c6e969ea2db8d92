//! Scenario benchmarks using Criterion.
//!
//! These benchmarks measure realistic frame workloads:
//! - Planet landing (nested queries, grid broad phase, polygon manifolds)
//! - Particle system (high entity count, simple components, respawns)

use std::time::{Duration, Instant};

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use orbit_bench::{
    frame_timer::measure_frames,
    memory::measure_setup,
    scenarios::{ParticleConfig, ParticleScenario, PlanetConfig, PlanetScenario, Scenario},
};

#[cfg(feature = "memory_profiling")]
#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

// =============================================================================
// Planet Benchmarks
// =============================================================================

fn bench_planet(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenario/planet");

    for players in [100, 1_000, 5_000] {
        let config = PlanetConfig {
            player_count: players,
            ..Default::default()
        };
        group.throughput(Throughput::Elements(players as u64));

        // Falling: first frames, before anyone reaches the ground
        group.bench_with_input(BenchmarkId::new("falling", players), &config, |b, config| {
            let mut scenario = PlanetScenario::with_config(config.clone());
            scenario.setup();

            b.iter(|| scenario.update());
        });

        // Resting: everyone grounded, every frame resolves contacts
        group.bench_with_input(BenchmarkId::new("resting", players), &config, |b, config| {
            let mut scenario = PlanetScenario::with_config(config.clone());
            scenario.setup();
            for _ in 0..240 {
                scenario.update();
            }

            b.iter(|| scenario.update());
        });
    }

    group.finish();
}

// =============================================================================
// Particle System Benchmarks
// =============================================================================

fn bench_particles(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenario/particles");

    for count in [10_000, 50_000, 100_000] {
        group.throughput(Throughput::Elements(count as u64));

        group.bench_with_input(BenchmarkId::new("frame", count), &count, |b, &n| {
            let mut scenario = ParticleScenario::with_config(ParticleConfig {
                particle_count: n,
                ..Default::default()
            });
            scenario.setup();

            b.iter(|| scenario.update());
        });
    }

    group.finish();
}

// =============================================================================
// Setup Benchmarks
// =============================================================================

fn bench_setup(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenario/setup");
    group.sample_size(20);

    let mut planet = PlanetScenario::new();
    let mut particles = ParticleScenario::new();
    let scenarios: [&mut dyn Scenario; 2] = [&mut planet, &mut particles];

    for scenario in scenarios {
        let memory = measure_setup(scenario);
        println!(
            "{}: {} ({:.1} bytes/entity)",
            scenario.name(),
            memory,
            memory.bytes_per_entity(scenario.entity_count())
        );
        scenario.teardown();

        group.throughput(Throughput::Elements(scenario.entity_count() as u64));
        group.bench_function(scenario.name(), |b| {
            b.iter_custom(|iters| {
                let mut total = Duration::ZERO;
                for _ in 0..iters {
                    let start = Instant::now();
                    scenario.setup();
                    total += start.elapsed();
                    scenario.teardown();
                }
                total
            });
        });
    }

    group.finish();
}

// =============================================================================
// Frame Time Benchmarks (longer running, statistical)
// =============================================================================

fn bench_frame_times(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame_times");
    group.sample_size(20); // Fewer samples since each runs many frames

    group.bench_function("planet_600_frames", |b| {
        b.iter_custom(|iters| {
            let mut total = Duration::ZERO;

            for _ in 0..iters {
                let mut scenario = PlanetScenario::new();
                scenario.setup();

                let stats = measure_frames(600, |_| {
                    scenario.update();
                });

                total += stats.total();
            }

            total
        });
    });

    group.bench_function("particles_1000_frames", |b| {
        b.iter_custom(|iters| {
            let mut total = Duration::ZERO;

            for _ in 0..iters {
                let mut scenario = ParticleScenario::with_config(ParticleConfig {
                    particle_count: 50_000,
                    ..Default::default()
                });
                scenario.setup();

                let stats = measure_frames(1000, |_| {
                    scenario.update();
                });

                total += stats.total();
            }

            total
        });
    });

    group.finish();
}

// =============================================================================
// Criterion Configuration
// =============================================================================

criterion_group!(
    benches,
    bench_planet,
    bench_particles,
    bench_setup,
    bench_frame_times,
);

criterion_main!(benches);
