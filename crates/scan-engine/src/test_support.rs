//! Fixtures shared by unit tests.

use scan_output::{MemorySinkFactory, MemoryStore};
use scan_world::{BlockRegistry, World};

use crate::{Criterion, InitContext, ScanResult};

/// A legacy overworld plus an in-memory sink factory.
pub(crate) struct Harness {
    world: World,
    sinks: MemorySinkFactory,
}

impl Harness {
    pub(crate) fn new() -> Self {
        Self::with_dimension(0)
    }

    pub(crate) fn with_dimension(dimension: i32) -> Self {
        Self {
            world: World::new(dimension, BlockRegistry::legacy()),
            sinks: MemorySinkFactory::new(),
        }
    }

    pub(crate) fn init<C: Criterion + ?Sized>(&self, criterion: &mut C) -> ScanResult<()> {
        criterion.init(&InitContext::new(&self.world, &self.sinks))
    }

    pub(crate) fn store(&self) -> MemoryStore {
        self.sinks.store()
    }
}

/// Owned rows from string literals.
pub(crate) fn rows(rows: &[&[&str]]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|row| row.iter().map(|value| (*value).to_string()).collect())
        .collect()
}
