//! Fusion of tile-entity criteria keyed by structural kind.
//!
//! Signs, spawners and command blocks are matched by how they are
//! represented, not by their declared id. The key is the closed
//! [`TileEntityKind`] tag.

use core::fmt;

use scan_world::{Chunk, TileEntity, TileEntityKind};

use super::{KEYED_FUSION_THRESHOLD, KeyedIndex, close_members, extract};
use crate::{Criterion, InitContext, ScanError, ScanResult, TileEntityCriterion};

/// Only criteria whose id filter is unset take part; the id index wins otherwise.
fn by_kind(criterion: &dyn TileEntityCriterion) -> Option<TileEntityKind> {
    match criterion.id_filter() {
        Some(_) => None,
        None => criterion.kind_filter(),
    }
}

/// Tile-entity criteria fused by structural kind.
pub struct FusedTileEntityByKindCriterion {
    members: Vec<Box<dyn TileEntityCriterion>>,
    index: KeyedIndex<TileEntityKind>,
}

impl FusedTileEntityByKindCriterion {
    /// # Panics
    ///
    /// If a member has no kind filter.
    #[must_use]
    pub fn new(members: Vec<Box<dyn TileEntityCriterion>>) -> Self {
        let index = KeyedIndex::build(members.iter().map(|member| {
            member
                .kind_filter()
                .unwrap_or_else(|| panic!("{member} has no kind filter and cannot be fused"))
        }));
        Self { members, index }
    }

    #[must_use]
    pub fn members(&self) -> &[Box<dyn TileEntityCriterion>] {
        &self.members
    }
}

impl fmt::Display for FusedTileEntityByKindCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Merged Tile Entities by kind ({} criteria)", self.members.len())
    }
}

impl Criterion for FusedTileEntityByKindCriterion {
    fn init(&mut self, _ctx: &InitContext<'_>) -> ScanResult<()> {
        Err(ScanError::FusedInit(self.to_string()))
    }

    fn close(&mut self) -> ScanResult<()> {
        close_members(&mut self.members)
    }
}

impl TileEntityCriterion for FusedTileEntityByKindCriterion {
    fn visit(&self, chunk: &Chunk, tile_entity: &TileEntity) {
        for &member in self.index.lookup(&tile_entity.kind()) {
            self.members[member as usize].accept_match(chunk, tile_entity);
        }
    }
}

/// Merge hook for tile-entity criteria with a kind filter and no id filter.
pub(crate) fn merge_tile_entities(
    working: &mut Vec<Box<dyn TileEntityCriterion>>,
    emit: &mut dyn FnMut(Box<dyn TileEntityCriterion>),
) {
    let fusible = working.iter().filter_map(|c| by_kind(&**c)).count();
    if fusible < KEYED_FUSION_THRESHOLD {
        return;
    }

    let members = extract(working, |c| by_kind(&**c).is_some());
    emit(Box::new(FusedTileEntityByKindCriterion::new(members)));
}
