//! World data model for save scanning.
//!
//! This crate describes the data a scanner sees once a save has been decoded:
//! chunks made of 16 cubic sections, the voxels inside them, and the entities
//! and tile entities stored alongside. Decoding region files is not done here;
//! a loader builds these types and hands them to the scan engine one chunk at
//! a time.
//!
//! # Layout
//!
//! ```text
//! World
//!   ├── BlockRegistry      ResourceLocation <-> numeric block id
//!   └── (chunks, streamed by the traversal driver)
//!         Chunk (x, z)
//!           ├── sections[0..16]   Option<Section>, 16x16x16 voxels each
//!           ├── entities          Vec<Entity>
//!           └── tile_entities     Vec<TileEntity>  (closed TileEntityData kinds)
//! ```

mod chunk;
mod entity;
mod error;
pub mod nbt;
mod registry;
mod resource;

pub use chunk::{CHUNK_HEIGHT, Chunk, ChunkPos, NibbleArray, SECTION_COUNT, Section, Voxel};
pub use entity::{Entity, SpawnEntry, TileEntity, TileEntityData, TileEntityKind};
pub use error::{WorldError, WorldResult};
pub use nbt::{NbtCompound, NbtList, NbtValue};
pub use registry::BlockRegistry;
pub use resource::ResourceLocation;

/// A single dimension of a save, as seen by the scanner.
#[derive(Debug, Clone)]
pub struct World {
    dimension: i32,
    blocks: BlockRegistry,
}

impl World {
    /// Create a world for the given dimension id.
    #[must_use]
    pub const fn new(dimension: i32, blocks: BlockRegistry) -> Self {
        Self { dimension, blocks }
    }

    /// Dimension id (0 = overworld, -1 = nether, 1 = end).
    #[must_use]
    pub const fn dimension(&self) -> i32 {
        self.dimension
    }

    /// The block id registry of the save.
    #[must_use]
    pub const fn blocks(&self) -> &BlockRegistry {
        &self.blocks
    }
}
