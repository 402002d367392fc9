//! The search plan: every criterion of a run, partitioned by domain.
//!
//! ```text
//! new ──► init ──► fuse ──► visit_chunk × N (concurrent) ──► close
//! ```
//!
//! `fuse` must run after `init`: fusion keys are only known once block
//! names have been resolved against the world.

use rustc_hash::FxHashSet;
use scan_output::SinkFactory;
use scan_world::{Chunk, World};
use tracing::{debug, error, info, warn};

use crate::fusion::fuse;
use crate::{
    AnyCriterion, ChunkCriterion, Criterion, Domain, EntityCriterion, InitContext, ScanResult,
    TileEntityCriterion, VoxelCriterion,
};

/// Criteria of one run, grouped by the data unit they visit.
#[derive(Default)]
pub struct SearchPlan {
    chunks: Vec<Box<dyn ChunkCriterion>>,
    voxels: Vec<Box<dyn VoxelCriterion>>,
    entities: Vec<Box<dyn EntityCriterion>>,
    tile_entities: Vec<Box<dyn TileEntityCriterion>>,
}

impl SearchPlan {
    /// Partition `criteria` by domain, dropping any criterion whose name was
    /// already seen.
    #[must_use]
    pub fn new(criteria: Vec<AnyCriterion>) -> Self {
        let mut plan = Self::default();
        let mut seen = FxHashSet::default();

        for criterion in criteria {
            let name = criterion.to_string();
            if !seen.insert(name.clone()) {
                warn!("Duplicate criterion \"{name}\", ignoring");
                continue;
            }
            match criterion {
                AnyCriterion::Chunk(c) => plan.chunks.push(c),
                AnyCriterion::Voxel(c) => plan.voxels.push(c),
                AnyCriterion::Entity(c) => plan.entities.push(c),
                AnyCriterion::TileEntity(c) => plan.tile_entities.push(c),
            }
        }
        plan
    }

    /// Number of criteria in one domain.
    #[must_use]
    pub fn count(&self, domain: Domain) -> usize {
        match domain {
            Domain::Chunk => self.chunks.len(),
            Domain::Voxel => self.voxels.len(),
            Domain::Entity => self.entities.len(),
            Domain::TileEntity => self.tile_entities.len(),
        }
    }

    /// Total number of criteria.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chunks.len() + self.voxels.len() + self.entities.len() + self.tile_entities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Display names of every criterion, domain by domain.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let chunks = self.chunks.iter().map(ToString::to_string);
        let voxels = self.voxels.iter().map(ToString::to_string);
        let entities = self.entities.iter().map(ToString::to_string);
        let tile_entities = self.tile_entities.iter().map(ToString::to_string);
        chunks
            .chain(voxels)
            .chain(entities)
            .chain(tile_entities)
            .collect()
    }

    /// Initialise every criterion, stopping at the first failure.
    ///
    /// Criteria initialised before the failure still hold open outputs;
    /// call [`SearchPlan::close`] to release them.
    pub fn init(&mut self, world: &World, sinks: &dyn SinkFactory) -> ScanResult<()> {
        let ctx = InitContext::new(world, sinks);
        init_all(&mut self.chunks, &ctx)?;
        init_all(&mut self.voxels, &ctx)?;
        init_all(&mut self.entities, &ctx)?;
        init_all(&mut self.tile_entities, &ctx)
    }

    /// Merge fusible criteria of every domain.
    pub fn fuse(&mut self) {
        let before = self.len();

        self.voxels = fuse(core::mem::take(&mut self.voxels));
        self.entities = fuse(core::mem::take(&mut self.entities));
        self.tile_entities = fuse(core::mem::take(&mut self.tile_entities));

        info!(
            "Fused {before} criteria into {} (chunk: {}, voxel: {}, entity: {}, tile entity: {})",
            self.len(),
            self.chunks.len(),
            self.voxels.len(),
            self.entities.len(),
            self.tile_entities.len()
        );
        for name in self.names() {
            debug!("  {name}");
        }
    }

    /// Run every criterion over one chunk.
    ///
    /// Chunk criteria first, then each voxel in chunk order, then entities
    /// and tile entities in the order the chunk stores them.
    pub fn visit_chunk(&self, chunk: &Chunk) {
        for criterion in &self.chunks {
            criterion.visit(chunk);
        }

        if !self.voxels.is_empty() {
            for voxel in chunk.voxels() {
                for criterion in &self.voxels {
                    criterion.visit(&voxel);
                }
            }
        }

        for entity in chunk.entities() {
            for criterion in &self.entities {
                criterion.visit(chunk, entity);
            }
        }

        for tile_entity in chunk.tile_entities() {
            for criterion in &self.tile_entities {
                criterion.visit(chunk, tile_entity);
            }
        }
    }

    /// Close every criterion exactly once. Failures are logged and the first
    /// one is returned after all criteria were given a chance to close.
    pub fn close(&mut self) -> ScanResult<()> {
        let mut first = None;
        close_all(&mut self.chunks, &mut first);
        close_all(&mut self.voxels, &mut first);
        close_all(&mut self.entities, &mut first);
        close_all(&mut self.tile_entities, &mut first);
        first.map_or(Ok(()), Err)
    }
}

fn init_all<C: Criterion + ?Sized>(
    criteria: &mut [Box<C>],
    ctx: &InitContext<'_>,
) -> ScanResult<()> {
    for criterion in criteria {
        criterion.init(ctx)?;
        debug!("Initialised {criterion}");
    }
    Ok(())
}

fn close_all<C: Criterion + ?Sized>(
    criteria: &mut Vec<Box<C>>,
    first: &mut Option<crate::ScanError>,
) {
    for mut criterion in criteria.drain(..) {
        if let Err(e) = criterion.close() {
            error!("Failed to close {criterion}: {e}");
            first.get_or_insert(e);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use scan_output::{
        MemorySink, MemorySinkFactory, MemoryStore, OutputError, OutputResult, OutputSink,
        Schema,
    };
    use scan_world::{BlockRegistry, Entity, ResourceLocation};

    use super::*;
    use crate::criteria::{BlockCriterion, EmptyChunksCriterion, EntitySearch};

    /// Memory sink whose `close` fails for the listed criterion names.
    struct FailingSink {
        inner: MemorySink,
        failing: &'static [&'static str],
        name: String,
    }

    impl OutputSink for FailingSink {
        fn init(&mut self, schema: &Schema) -> OutputResult<()> {
            self.name = schema.name().to_string();
            self.inner.init(schema)
        }

        fn accept(&self, row: &[String]) {
            self.inner.accept(row);
        }

        fn close(&mut self) -> OutputResult<()> {
            self.inner.close()?;
            if self.failing.contains(&self.name.as_str()) {
                return Err(OutputError::Io(io::Error::other(format!(
                    "{}: disk full",
                    self.name
                ))));
            }
            Ok(())
        }
    }

    struct FailingSinkFactory {
        store: MemoryStore,
        failing: &'static [&'static str],
    }

    impl SinkFactory for FailingSinkFactory {
        fn create(&self) -> Box<dyn OutputSink> {
            Box::new(FailingSink {
                inner: MemorySink::new(self.store.clone()),
                failing: self.failing,
                name: String::new(),
            })
        }
    }

    fn block(name: &str) -> AnyCriterion {
        AnyCriterion::Voxel(Box::new(BlockCriterion::new(
            ResourceLocation::minecraft(name),
            None,
        )))
    }

    #[test]
    fn test_duplicates_dropped() {
        let plan = SearchPlan::new(vec![
            block("stone"),
            block("dirt"),
            block("stone"),
            AnyCriterion::Chunk(Box::new(EmptyChunksCriterion::new())),
            AnyCriterion::Chunk(Box::new(EmptyChunksCriterion::new())),
        ]);

        assert_eq!(plan.len(), 3);
        assert_eq!(plan.count(Domain::Voxel), 2);
        assert_eq!(plan.count(Domain::Chunk), 1);
        assert_eq!(
            plan.names(),
            vec![
                "Empty Chunks".to_string(),
                "Block (id=minecraft:stone)".to_string(),
                "Block (id=minecraft:dirt)".to_string(),
            ]
        );
    }

    #[test]
    fn test_lifecycle() {
        let world = World::new(0, BlockRegistry::legacy());
        let sinks = MemorySinkFactory::new();
        let mut plan = SearchPlan::new(vec![
            block("stone"),
            block("dirt"),
            block("glass"),
            AnyCriterion::Entity(Box::new(EntitySearch::new(None))),
        ]);
        plan.init(&world, &sinks).unwrap();
        plan.fuse();
        assert_eq!(plan.count(Domain::Voxel), 1);
        assert_eq!(plan.names()[0], "Merged Blocks (3 criteria)");

        let mut chunk = scan_world::Chunk::new(0, 0);
        chunk.set_block(1, 2, 3, 1, 0);
        chunk.set_block(2, 2, 3, 20, 0);
        chunk.add_entity(Entity::new(ResourceLocation::minecraft("pig"), 0.5, 3.0, 0.5));
        plan.visit_chunk(&chunk);
        plan.close().unwrap();
        assert!(plan.is_empty());

        let store = sinks.store();
        assert_eq!(store.rows("Block (id=minecraft:stone)").len(), 1);
        assert_eq!(store.rows("Block (id=minecraft:glass)").len(), 1);
        assert!(store.rows("Block (id=minecraft:dirt)").is_empty());
        assert_eq!(store.rows("Entities").len(), 1);
        for name in store.names() {
            assert_eq!(store.table(&name).unwrap().closes, 1, "{name}");
        }
    }

    #[test]
    fn test_unknown_block_fails_init() {
        let world = World::new(0, BlockRegistry::legacy());
        let sinks = MemorySinkFactory::new();
        let mut plan = SearchPlan::new(vec![block("stone"), block("unobtainium")]);

        assert!(matches!(
            plan.init(&world, &sinks),
            Err(crate::ScanError::UnknownBlock(_))
        ));
        plan.close().unwrap();
        assert_eq!(sinks.store().table("Block (id=minecraft:stone)").unwrap().closes, 1);
    }

    #[test]
    fn test_close_failures_close_everything_and_return_first() {
        let world = World::new(0, BlockRegistry::legacy());
        let sinks = FailingSinkFactory {
            store: MemoryStore::new(),
            failing: &["Block (id=minecraft:stone)", "Empty Chunks"],
        };
        let mut plan = SearchPlan::new(vec![
            block("stone"),
            block("dirt"),
            AnyCriterion::Chunk(Box::new(EmptyChunksCriterion::new())),
            AnyCriterion::Entity(Box::new(EntitySearch::new(None))),
        ]);
        plan.init(&world, &sinks).unwrap();
        plan.visit_chunk(&scan_world::Chunk::new(0, 0));

        let err = plan.close().unwrap_err();
        assert!(matches!(err, crate::ScanError::Output(OutputError::Io(_))));
        assert!(err.to_string().contains("Empty Chunks"), "{err}");
        assert!(plan.is_empty());

        assert_eq!(sinks.store.len(), 4);
        for name in sinks.store.names() {
            assert_eq!(sinks.store.table(&name).unwrap().closes, 1, "{name}");
        }
        assert_eq!(sinks.store.rows("Empty Chunks").len(), 1);
    }
}
