//! Block-identity fusion.

use core::fmt;

use scan_world::Voxel;

use super::{BLOCK_FUSION_THRESHOLD, BlockIndex, close_members, extract};
use crate::{Criterion, InitContext, ScanError, ScanResult, VoxelCriterion};

/// Replaces a group of block criteria with one indexed lookup per voxel.
pub struct FusedBlockCriterion {
    members: Vec<Box<dyn VoxelCriterion>>,
    index: BlockIndex,
}

impl FusedBlockCriterion {
    /// Fuse `members`. Every member must advertise a block filter.
    ///
    /// # Panics
    ///
    /// If a member has no block filter.
    #[must_use]
    pub fn new(members: Vec<Box<dyn VoxelCriterion>>) -> Self {
        let index = BlockIndex::build(members.iter().map(|member| {
            member
                .block_filter()
                .unwrap_or_else(|| panic!("{member} has no block filter and cannot be fused"))
        }));
        Self { members, index }
    }

    #[must_use]
    pub fn members(&self) -> &[Box<dyn VoxelCriterion>] {
        &self.members
    }

    #[must_use]
    pub const fn index(&self) -> &BlockIndex {
        &self.index
    }
}

impl fmt::Display for FusedBlockCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Merged Blocks ({} criteria)", self.members.len())
    }
}

impl Criterion for FusedBlockCriterion {
    fn init(&mut self, _ctx: &InitContext<'_>) -> ScanResult<()> {
        Err(ScanError::FusedInit(self.to_string()))
    }

    fn close(&mut self) -> ScanResult<()> {
        close_members(&mut self.members)
    }
}

impl VoxelCriterion for FusedBlockCriterion {
    #[inline]
    fn visit(&self, voxel: &Voxel) {
        for &member in self.index.lookup(voxel.id, voxel.meta) {
            self.members[member as usize].accept_match(voxel);
        }
    }
}

/// Merge hook for voxel criteria with a block filter.
pub(crate) fn merge_blocks(
    working: &mut Vec<Box<dyn VoxelCriterion>>,
    emit: &mut dyn FnMut(Box<dyn VoxelCriterion>),
) {
    let fusible = working
        .iter()
        .filter(|c| c.block_filter().is_some())
        .count();
    if fusible < BLOCK_FUSION_THRESHOLD {
        return;
    }

    let members = extract(working, |c| c.block_filter().is_some());
    emit(Box::new(FusedBlockCriterion::new(members)));
}
