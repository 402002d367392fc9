//! The criterion contract.
//!
//! A criterion is one search predicate plus the output it writes matches to.
//! Every criterion is initialised once against the world, visited many times
//! (concurrently, from the traversal workers) and closed exactly once.
//!
//! Criteria are split by the data unit they examine:
//!
//! | domain       | trait                   | visited with          | fusion key        |
//! |--------------|-------------------------|-----------------------|-------------------|
//! | chunk        | [`ChunkCriterion`]      | whole chunk           | never fused       |
//! | voxel        | [`VoxelCriterion`]      | one voxel             | [`BlockFilter`]   |
//! | entity       | [`EntityCriterion`]     | chunk + entity        | entity id         |
//! | tile entity  | [`TileEntityCriterion`] | chunk + tile entity   | id or kind        |
//!
//! A criterion advertises a fusion key only when every match it can produce
//! is implied by that key plus the checks done in `accept_match`.

use core::fmt;

use scan_output::{Output, Record, SinkFactory};
use scan_world::{
    Chunk, Entity, ResourceLocation, TileEntity, TileEntityKind, Voxel, World,
};

use crate::{ScanError, ScanResult};

/// What a criterion can reach while initialising.
pub struct InitContext<'a> {
    world: &'a World,
    sinks: &'a dyn SinkFactory,
}

impl<'a> InitContext<'a> {
    #[must_use]
    pub fn new(world: &'a World, sinks: &'a dyn SinkFactory) -> Self {
        Self { world, sinks }
    }

    #[must_use]
    pub const fn world(&self) -> &'a World {
        self.world
    }

    /// Resolve a block name, failing the run if the save does not know it.
    pub fn resolve_block(&self, name: &ResourceLocation) -> ScanResult<u16> {
        self.world
            .blocks()
            .lookup(name)
            .ok_or_else(|| ScanError::UnknownBlock(name.clone()))
    }

    /// Resolve a block name that is allowed to be missing.
    #[must_use]
    pub fn lookup_block(&self, name: &ResourceLocation) -> Option<u16> {
        self.world.blocks().lookup(name)
    }

    /// Create and initialise an output for records of type `R`.
    pub fn open<R: Record>(&self, name: &str) -> ScanResult<Output<R>> {
        Ok(Output::open(self.sinks.create(), name)?)
    }
}

/// Lifecycle shared by every criterion.
///
/// The `Display` string identifies the criterion: it names its output and two
/// criteria with the same string are duplicates.
pub trait Criterion: Send + Sync + fmt::Display {
    /// Resolve identifiers and open the output.
    fn init(&mut self, ctx: &InitContext<'_>) -> ScanResult<()>;

    /// Flush and release the output.
    fn close(&mut self) -> ScanResult<()>;
}

/// A predicate over a whole chunk.
pub trait ChunkCriterion: Criterion {
    fn visit(&self, chunk: &Chunk);
}

/// Resolved block id and optional variant a voxel criterion matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockFilter {
    pub id: u16,
    /// `None` matches all 16 variants.
    pub meta: Option<u8>,
}

impl BlockFilter {
    #[must_use]
    pub const fn matches(self, id: u16, meta: u8) -> bool {
        self.id == id
            && match self.meta {
                Some(m) => m == meta,
                None => true,
            }
    }
}

/// A predicate over single voxels.
pub trait VoxelCriterion: Criterion {
    fn visit(&self, voxel: &Voxel);

    /// Fusion key. `None` before `init` or when the criterion is not fusible.
    fn block_filter(&self) -> Option<BlockFilter> {
        None
    }

    /// Called by a fused index after `block_filter` matched the voxel.
    fn accept_match(&self, voxel: &Voxel) {
        self.visit(voxel);
    }
}

/// A predicate over entities.
pub trait EntityCriterion: Criterion {
    fn visit(&self, chunk: &Chunk, entity: &Entity);

    /// Fusion key. `None` for criteria that look at every entity.
    fn id_filter(&self) -> Option<&ResourceLocation> {
        None
    }

    /// Called by a fused index after `id_filter` matched the entity.
    fn accept_match(&self, chunk: &Chunk, entity: &Entity) {
        self.visit(chunk, entity);
    }
}

/// A predicate over tile entities.
///
/// When both keys are given, the declared id wins.
pub trait TileEntityCriterion: Criterion {
    fn visit(&self, chunk: &Chunk, tile_entity: &TileEntity);

    /// Declared-id fusion key.
    fn id_filter(&self) -> Option<&ResourceLocation> {
        None
    }

    /// Structural-kind fusion key.
    fn kind_filter(&self) -> Option<TileEntityKind> {
        None
    }

    /// Called by a fused index after a key matched the tile entity.
    fn accept_match(&self, chunk: &Chunk, tile_entity: &TileEntity) {
        self.visit(chunk, tile_entity);
    }
}

/// Domain of a criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    Chunk,
    Voxel,
    Entity,
    TileEntity,
}

/// A criterion tagged with its domain.
pub enum AnyCriterion {
    Chunk(Box<dyn ChunkCriterion>),
    Voxel(Box<dyn VoxelCriterion>),
    Entity(Box<dyn EntityCriterion>),
    TileEntity(Box<dyn TileEntityCriterion>),
}

impl AnyCriterion {
    #[must_use]
    pub const fn domain(&self) -> Domain {
        match self {
            Self::Chunk(_) => Domain::Chunk,
            Self::Voxel(_) => Domain::Voxel,
            Self::Entity(_) => Domain::Entity,
            Self::TileEntity(_) => Domain::TileEntity,
        }
    }
}

impl fmt::Display for AnyCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Chunk(c) => fmt::Display::fmt(c, f),
            Self::Voxel(c) => fmt::Display::fmt(c, f),
            Self::Entity(c) => fmt::Display::fmt(c, f),
            Self::TileEntity(c) => fmt::Display::fmt(c, f),
        }
    }
}

impl fmt::Debug for AnyCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AnyCriterion")
            .field(&self.domain())
            .field(&self.to_string())
            .finish()
    }
}
