//! Lock-free accumulators shared between traversal workers.

use core::sync::atomic::{AtomicU64, Ordering};

/// Running mean folded from `(sum, count)` contributions.
///
/// Each worker adds the partial sum and sample count of the chunk it just
/// visited; the mean is read once traversal is over.
#[derive(Debug, Default)]
pub struct MeanAccumulator {
    sum: AtomicU64,
    count: AtomicU64,
}

impl MeanAccumulator {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            sum: AtomicU64::new(0),
            count: AtomicU64::new(0),
        }
    }

    /// Fold in a partial sum over `count` samples.
    pub fn add(&self, sum: u64, count: u64) {
        self.sum.fetch_add(sum, Ordering::Relaxed);
        self.count.fetch_add(count, Ordering::Relaxed);
    }

    #[must_use]
    pub fn sum(&self) -> u64 {
        self.sum.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    /// `None` until at least one sample was added.
    #[must_use]
    pub fn mean(&self) -> Option<f64> {
        let count = self.count();
        (count != 0).then(|| self.sum() as f64 / count as f64)
    }
}
