//! Chunks, sections and voxels.

use crate::{Entity, TileEntity};

/// Number of vertical sections in a chunk.
pub const SECTION_COUNT: usize = 16;

/// World height in blocks.
pub const CHUNK_HEIGHT: i32 = (SECTION_COUNT * 16) as i32;

const SECTION_VOLUME: usize = 16 * 16 * 16;

/// Index of a voxel inside a section, `(y << 8) | (z << 4) | x`.
#[inline]
const fn voxel_index(x: usize, y: usize, z: usize) -> usize {
    (y << 8) | (z << 4) | x
}

/// 4096 packed 4-bit values.
#[derive(Clone, PartialEq, Eq)]
pub struct NibbleArray(Box<[u8; SECTION_VOLUME / 2]>);

impl NibbleArray {
    /// All nibbles set to `value & 0xF`.
    #[must_use]
    pub fn filled(value: u8) -> Self {
        let nibble = value & 0xF;
        Self(Box::new([nibble | (nibble << 4); SECTION_VOLUME / 2]))
    }

    /// Read the nibble at a voxel index.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> u8 {
        let byte = self.0[index >> 1];
        if index & 1 == 0 { byte & 0xF } else { byte >> 4 }
    }

    /// Write the nibble at a voxel index.
    #[inline]
    pub fn set(&mut self, index: usize, value: u8) {
        let byte = &mut self.0[index >> 1];
        if index & 1 == 0 {
            *byte = (*byte & 0xF0) | (value & 0xF);
        } else {
            *byte = (*byte & 0x0F) | ((value & 0xF) << 4);
        }
    }
}

impl core::fmt::Debug for NibbleArray {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("NibbleArray").finish_non_exhaustive()
    }
}

/// A 16x16x16 cube of voxels.
#[derive(Clone)]
pub struct Section {
    /// Section index inside its chunk (0..16).
    y: u8,
    blocks: Box<[u16; SECTION_VOLUME]>,
    meta: NibbleArray,
    sky_light: NibbleArray,
}

impl Section {
    /// Create an air-filled section with full sky light.
    #[must_use]
    pub fn new(y: u8) -> Self {
        debug_assert!((y as usize) < SECTION_COUNT, "section index out of range");
        Self {
            y,
            blocks: Box::new([0; SECTION_VOLUME]),
            meta: NibbleArray::filled(0),
            sky_light: NibbleArray::filled(15),
        }
    }

    /// Section index inside its chunk.
    #[must_use]
    pub const fn y(&self) -> u8 {
        self.y
    }

    /// Block id at section-local coordinates.
    #[inline]
    #[must_use]
    pub fn block_id(&self, x: usize, y: usize, z: usize) -> u16 {
        self.blocks[voxel_index(x, y, z)]
    }

    /// Block metadata at section-local coordinates.
    #[inline]
    #[must_use]
    pub fn block_meta(&self, x: usize, y: usize, z: usize) -> u8 {
        self.meta.get(voxel_index(x, y, z))
    }

    /// Sky light at section-local coordinates.
    #[inline]
    #[must_use]
    pub fn sky_light(&self, x: usize, y: usize, z: usize) -> u8 {
        self.sky_light.get(voxel_index(x, y, z))
    }

    /// Set a block at section-local coordinates.
    pub fn set_block(&mut self, x: usize, y: usize, z: usize, id: u16, meta: u8) {
        let index = voxel_index(x, y, z);
        self.blocks[index] = id;
        self.meta.set(index, meta);
    }

    /// Set sky light at section-local coordinates.
    pub fn set_sky_light(&mut self, x: usize, y: usize, z: usize, light: u8) {
        self.sky_light.set(voxel_index(x, y, z), light);
    }

    /// Check if every voxel is air.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.iter().all(|&id| id == 0)
    }
}

impl core::fmt::Debug for Section {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Section")
            .field("y", &self.y)
            .finish_non_exhaustive()
    }
}

/// Chunk coordinates (in chunks, not blocks).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkPos {
    pub x: i32,
    pub z: i32,
}

impl ChunkPos {
    #[must_use]
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Coordinates of the 32x32 region file containing this chunk.
    #[must_use]
    pub const fn region(self) -> (i32, i32) {
        (self.x >> 5, self.z >> 5)
    }
}

/// One voxel as seen during traversal, in world coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Voxel {
    pub id: u16,
    /// Legacy 4-bit variant.
    pub meta: u8,
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

/// A 16x256x16 column of the world.
#[derive(Debug, Clone)]
pub struct Chunk {
    pos: ChunkPos,
    sections: [Option<Section>; SECTION_COUNT],
    entities: Vec<Entity>,
    tile_entities: Vec<TileEntity>,
}

impl Chunk {
    /// Create an empty chunk (no sections, no entities).
    #[must_use]
    pub fn new(x: i32, z: i32) -> Self {
        Self {
            pos: ChunkPos::new(x, z),
            sections: Default::default(),
            entities: Vec::new(),
            tile_entities: Vec::new(),
        }
    }

    #[must_use]
    pub const fn pos(&self) -> ChunkPos {
        self.pos
    }

    /// World x of the chunk's first column.
    #[must_use]
    pub const fn min_x(&self) -> i32 {
        self.pos.x << 4
    }

    /// World z of the chunk's first column.
    #[must_use]
    pub const fn min_z(&self) -> i32 {
        self.pos.z << 4
    }

    /// Section by index, `None` if it was never generated (all air).
    #[must_use]
    pub fn section(&self, y: usize) -> Option<&Section> {
        self.sections.get(y).and_then(Option::as_ref)
    }

    /// Present sections in ascending order.
    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter().flatten()
    }

    /// Section by index, creating it if missing.
    pub fn section_mut(&mut self, y: usize) -> &mut Section {
        self.sections[y].get_or_insert_with(|| Section::new(y as u8))
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn tile_entities(&self) -> &[TileEntity] {
        &self.tile_entities
    }

    pub fn add_entity(&mut self, entity: Entity) {
        self.entities.push(entity);
    }

    pub fn add_tile_entity(&mut self, tile_entity: TileEntity) {
        self.tile_entities.push(tile_entity);
    }

    /// Block id at chunk-local x/z and world y. Air outside the world.
    #[must_use]
    pub fn block_id(&self, x: usize, y: i32, z: usize) -> u16 {
        self.locate(y)
            .map_or(0, |(section, local_y)| section.block_id(x, local_y, z))
    }

    /// Block metadata at chunk-local x/z and world y.
    #[must_use]
    pub fn block_meta(&self, x: usize, y: i32, z: usize) -> u8 {
        self.locate(y)
            .map_or(0, |(section, local_y)| section.block_meta(x, local_y, z))
    }

    /// Sky light at chunk-local x/z and world y. Missing sections are fully lit.
    #[must_use]
    pub fn sky_light(&self, x: usize, y: i32, z: usize) -> u8 {
        self.locate(y)
            .map_or(15, |(section, local_y)| section.sky_light(x, local_y, z))
    }

    /// Set a block at chunk-local x/z and world y.
    pub fn set_block(&mut self, x: usize, y: i32, z: usize, id: u16, meta: u8) {
        debug_assert!((0..CHUNK_HEIGHT).contains(&y), "y out of range: {y}");
        self.section_mut((y >> 4) as usize)
            .set_block(x, (y & 15) as usize, z, id, meta);
    }

    /// Height of the column: one above the topmost non-air block, 0 if empty.
    #[must_use]
    pub fn highest_block(&self, x: usize, z: usize) -> i32 {
        for section in self.sections.iter().rev().flatten() {
            for y in (0..16).rev() {
                if section.block_id(x, y, z) != 0 {
                    return ((section.y as i32) << 4) + y as i32 + 1;
                }
            }
        }
        0
    }

    /// Every voxel of every present section.
    ///
    /// Order is fixed: sections ascending, then y, z and x within a section.
    pub fn voxels(&self) -> impl Iterator<Item = Voxel> + '_ {
        let min_x = self.min_x();
        let min_z = self.min_z();
        self.sections().flat_map(move |section| {
            let base_y = (section.y as i32) << 4;
            (0..SECTION_VOLUME).map(move |index| {
                let x = index & 15;
                let z = (index >> 4) & 15;
                let y = index >> 8;
                Voxel {
                    id: section.blocks[index],
                    meta: section.meta.get(index),
                    x: min_x + x as i32,
                    y: base_y + y as i32,
                    z: min_z + z as i32,
                }
            })
        })
    }

    fn locate(&self, y: i32) -> Option<(&Section, usize)> {
        if !(0..CHUNK_HEIGHT).contains(&y) {
            return None;
        }
        self.section((y >> 4) as usize)
            .map(|section| (section, (y & 15) as usize))
    }
}
