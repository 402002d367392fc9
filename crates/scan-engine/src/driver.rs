//! Parallel traversal driver.
//!
//! Chunks are visited on the rayon pool. The plan is shared read-only between
//! workers; criteria synchronise their own outputs.

use core::borrow::Borrow;
use core::sync::atomic::{AtomicU64, Ordering};
use core::time::Duration;
use std::time::Instant;

use parking_lot::Mutex;
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use rustc_hash::FxHashSet;
use scan_world::Chunk;
use tracing::{debug, info};

use crate::SearchPlan;

/// Totals of one traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanStats {
    pub chunks: u64,
    /// Distinct regions (32×32 chunks) touched.
    pub regions: usize,
    pub elapsed: Duration,
}

/// Visit every chunk with every criterion of `plan`.
///
/// The plan should already be initialised and fused.
pub fn scan<I>(plan: &SearchPlan, chunks: I) -> ScanStats
where
    I: IntoParallelIterator,
    I::Item: Borrow<Chunk>,
{
    let start = Instant::now();
    let visited = AtomicU64::new(0);
    let regions = Mutex::new(FxHashSet::default());

    chunks.into_par_iter().for_each(|chunk| {
        let chunk = chunk.borrow();
        let region = chunk.pos().region();
        if regions.lock().insert(region) {
            debug!("Processing region ({}, {})", region.0, region.1);
        }

        plan.visit_chunk(chunk);
        visited.fetch_add(1, Ordering::Relaxed);
    });

    let stats = ScanStats {
        chunks: visited.into_inner(),
        regions: regions.into_inner().len(),
        elapsed: start.elapsed(),
    };
    info!(
        "Scanned {} chunks in {} regions in {:.2?}",
        stats.chunks, stats.regions, stats.elapsed
    );
    stats
}
