//! Benchmark utilities for Orbit.
//!
//! This crate provides the benchmarking infrastructure for the ECS and the collision toolkit:
//!
//! - **Microbenchmarks**: individual ECS operations (spawn, destroy, add/remove, `each`, sort)
//!   and individual narrow-phase pairs
//! - **Scenario benchmarks**: frame-stepped workloads (players landing on planets, particles)
//! - **Memory tracking**: heap allocation profiling via dhat
//! - **Frame timing**: per-frame measurement of a game loop
//!
//! # Running Benchmarks
//!
//! ```bash
//! # Run all benchmarks
//! cargo bench -p orbit_bench
//!
//! # Run specific benchmark group
//! cargo bench -p orbit_bench -- polygon
//!
//! # Run with memory profiling (slower)
//! cargo bench -p orbit_bench --features memory_profiling
//! ```
//!
//! # Benchmark Results
//!
//! Results are written to `target/criterion/` with HTML reports for visualization.
//! Memory profiling results are written to `dhat-heap.json` for viewing with
//! DHAT's viewer.

pub mod components;
pub mod frame_timer;
pub mod memory;
pub mod scenarios;
