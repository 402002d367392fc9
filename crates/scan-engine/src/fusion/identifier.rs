//! Fusion of criteria keyed by a declared identifier.
//!
//! Entities and tile entities both carry a namespaced id. Criteria filtering
//! on exactly one id are grouped behind a [`KeyedIndex`] so each item costs
//! one hash lookup regardless of how many criteria are interested in it.
//! Criteria without an id filter stay outside the index and see every item.

use core::fmt;

use scan_world::{Chunk, Entity, ResourceLocation, TileEntity};

use super::{KEYED_FUSION_THRESHOLD, KeyedIndex, close_members, extract};
use crate::{
    Criterion, EntityCriterion, InitContext, ScanError, ScanResult, TileEntityCriterion,
};

fn id_index<'a>(
    keys: impl Iterator<Item = Option<&'a ResourceLocation>>,
) -> KeyedIndex<ResourceLocation> {
    KeyedIndex::build(keys.map(|key| {
        key.cloned()
            .unwrap_or_else(|| panic!("criterion without id filter cannot be fused by id"))
    }))
}

/// Entity criteria fused by entity id.
pub struct FusedEntityCriterion {
    members: Vec<Box<dyn EntityCriterion>>,
    index: KeyedIndex<ResourceLocation>,
}

impl FusedEntityCriterion {
    /// # Panics
    ///
    /// If a member has no id filter.
    #[must_use]
    pub fn new(members: Vec<Box<dyn EntityCriterion>>) -> Self {
        let index = id_index(members.iter().map(|m| m.id_filter()));
        Self { members, index }
    }

    #[must_use]
    pub fn members(&self) -> &[Box<dyn EntityCriterion>] {
        &self.members
    }
}

impl fmt::Display for FusedEntityCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Merged Entities ({} criteria)", self.members.len())
    }
}

impl Criterion for FusedEntityCriterion {
    fn init(&mut self, _ctx: &InitContext<'_>) -> ScanResult<()> {
        Err(ScanError::FusedInit(self.to_string()))
    }

    fn close(&mut self) -> ScanResult<()> {
        close_members(&mut self.members)
    }
}

impl EntityCriterion for FusedEntityCriterion {
    fn visit(&self, chunk: &Chunk, entity: &Entity) {
        for &member in self.index.lookup(&entity.id) {
            self.members[member as usize].accept_match(chunk, entity);
        }
    }
}

/// Tile-entity criteria fused by declared id.
pub struct FusedTileEntityByIdCriterion {
    members: Vec<Box<dyn TileEntityCriterion>>,
    index: KeyedIndex<ResourceLocation>,
}

impl FusedTileEntityByIdCriterion {
    /// # Panics
    ///
    /// If a member has no id filter.
    #[must_use]
    pub fn new(members: Vec<Box<dyn TileEntityCriterion>>) -> Self {
        let index = id_index(members.iter().map(|m| m.id_filter()));
        Self { members, index }
    }

    #[must_use]
    pub fn members(&self) -> &[Box<dyn TileEntityCriterion>] {
        &self.members
    }
}

impl fmt::Display for FusedTileEntityByIdCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Merged Tile Entities by id ({} criteria)", self.members.len())
    }
}

impl Criterion for FusedTileEntityByIdCriterion {
    fn init(&mut self, _ctx: &InitContext<'_>) -> ScanResult<()> {
        Err(ScanError::FusedInit(self.to_string()))
    }

    fn close(&mut self) -> ScanResult<()> {
        close_members(&mut self.members)
    }
}

impl TileEntityCriterion for FusedTileEntityByIdCriterion {
    fn visit(&self, chunk: &Chunk, tile_entity: &TileEntity) {
        for &member in self.index.lookup(&tile_entity.id) {
            self.members[member as usize].accept_match(chunk, tile_entity);
        }
    }
}

/// Merge hook for entity criteria with an id filter.
pub(crate) fn merge_entities(
    working: &mut Vec<Box<dyn EntityCriterion>>,
    emit: &mut dyn FnMut(Box<dyn EntityCriterion>),
) {
    let fusible = working.iter().filter(|c| c.id_filter().is_some()).count();
    if fusible < KEYED_FUSION_THRESHOLD {
        return;
    }

    let members = extract(working, |c| c.id_filter().is_some());
    emit(Box::new(FusedEntityCriterion::new(members)));
}

/// Merge hook for tile-entity criteria with an id filter.
pub(crate) fn merge_tile_entities(
    working: &mut Vec<Box<dyn TileEntityCriterion>>,
    emit: &mut dyn FnMut(Box<dyn TileEntityCriterion>),
) {
    let fusible = working.iter().filter(|c| c.id_filter().is_some()).count();
    if fusible < KEYED_FUSION_THRESHOLD {
        return;
    }

    let members = extract(working, |c| c.id_filter().is_some());
    emit(Box::new(FusedTileEntityByIdCriterion::new(members)));
}
