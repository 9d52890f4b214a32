//! Search attempt counter used for throughput reporting.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counts predicate evaluations across all workers.
///
/// Increments are atomic so no update is lost; the value is read and zeroed
/// once per reporting interval, which makes it a per-interval rate.
#[derive(Debug, Default)]
pub struct SearchCounter {
    current: AtomicU64,
    total: AtomicU64,
}

impl SearchCounter {
    /// Creates a counter starting at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one search attempt.
    #[inline]
    pub fn increment(&self) {
        self.current.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns the attempts since the previous call and resets to zero.
    pub fn drain_and_reset(&self) -> u64 {
        let n = self.current.swap(0, Ordering::Relaxed);
        self.total.fetch_add(n, Ordering::Relaxed);
        n
    }

    /// Attempts since the counter was created.
    pub fn total(&self) -> u64 {
        self.total.load(Ordering::Relaxed) + self.current.load(Ordering::Relaxed)
    }
}
