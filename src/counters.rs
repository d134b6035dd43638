//! The two monotonic counters spec.md §6 exposes, aggregated across all
//! functions a host analyzes. Grounded on `examples/original_source/
//! DepAnalysis.cpp`'s `STATISTIC(instrCount, ...)` / `STATISTIC(iinstrCount,
//! ...)` pair; `AtomicU64` stands in for LLVM's `Statistic` so a host may
//! aggregate across functions analyzed concurrently on different threads
//! (spec.md §5).
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct Counters {
    total_load_store: AtomicU64,
    omittable_load_store: AtomicU64,
}

impl Counters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds in one function's totals after its analysis completes.
    pub fn record_function(&self, total: u64, omittable: u64) {
        self.total_load_store.fetch_add(total, Ordering::Relaxed);
        self.omittable_load_store
            .fetch_add(omittable, Ordering::Relaxed);
    }

    pub fn total_load_store(&self) -> u64 {
        self.total_load_store.load(Ordering::Relaxed)
    }

    pub fn omittable_load_store(&self) -> u64 {
        self.omittable_load_store.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulates_across_functions() {
        let counters = Counters::new();
        counters.record_function(10, 4);
        counters.record_function(5, 5);
        assert_eq!(counters.total_load_store(), 15);
        assert_eq!(counters.omittable_load_store(), 9);
    }
}
