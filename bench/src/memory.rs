//! Heap accounting for scenario setup, backed by dhat.
//!
//! Profiling needs dhat's allocator installed globally, which slows every allocation, so it sits
//! behind a feature. Without it every measurement reports zero.
//!
//! ```bash
//! cargo bench -p orbit_bench --bench scenarios --features memory_profiling
//! ```
//!
//! The run leaves a `dhat-heap.json` behind for
//! <https://nnethercote.github.io/dh_view/dh_view.html>.

use std::fmt;

use crate::scenarios::Scenario;

/// Heap usage observed while a closure ran.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryStats {
    /// Bytes allocated, freed or not.
    pub bytes_allocated: u64,
    /// Number of allocations.
    pub allocation_count: u64,
    /// Largest heap size reached.
    pub peak_bytes: u64,
}

impl MemoryStats {
    /// Allocated bytes divided over `entities`. Zero for no entities.
    pub fn bytes_per_entity(&self, entities: usize) -> f64 {
        per(self.bytes_allocated, entities)
    }

    /// Allocations divided over `entities`. Zero for no entities.
    pub fn allocations_per_entity(&self, entities: usize) -> f64 {
        per(self.allocation_count, entities)
    }
}

fn per(amount: u64, entities: usize) -> f64 {
    match entities {
        0 => 0.0,
        n => amount as f64 / n as f64,
    }
}

impl fmt::Display for MemoryStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "allocated: {} bytes ({} allocs), peak: {} bytes",
            self.bytes_allocated, self.allocation_count, self.peak_bytes
        )
    }
}

#[cfg(feature = "memory_profiling")]
impl From<dhat::HeapStats> for MemoryStats {
    fn from(stats: dhat::HeapStats) -> Self {
        Self {
            bytes_allocated: stats.total_bytes,
            allocation_count: stats.total_blocks,
            peak_bytes: stats.max_bytes as u64,
        }
    }
}

/// Run `f` under a fresh heap profiler and report what it allocated.
///
/// Only one profiler may run at a time, so calls must not nest.
#[cfg(feature = "memory_profiling")]
pub fn measure_memory<R>(f: impl FnOnce() -> R) -> (R, MemoryStats) {
    let _profiler = dhat::Profiler::new_heap();
    let result = f();
    (result, MemoryStats::from(dhat::HeapStats::get()))
}

/// Run `f`. Reports zero usage without the `memory_profiling` feature.
#[cfg(not(feature = "memory_profiling"))]
pub fn measure_memory<R>(f: impl FnOnce() -> R) -> (R, MemoryStats) {
    (f(), MemoryStats::default())
}

/// Heap used by one `setup` of `scenario`. The scenario is left set up.
pub fn measure_setup(scenario: &mut dyn Scenario) -> MemoryStats {
    measure_memory(|| scenario.setup()).1
}
