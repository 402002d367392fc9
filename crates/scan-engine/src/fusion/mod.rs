//! Predicate fusion.
//!
//! [`fuse`] is a domain-agnostic fixed-point loop: every criterion in the
//! working list may offer a merge hook, the hook pulls the criteria it can
//! serve out of the list and emits replacements, and the scan restarts
//! whenever something was produced. It stops after a full pass produces
//! nothing.
//!
//! The hooks themselves live next to the fused criterion they build:
//!
//! - [`block`]: voxel criteria keyed by block id and variant
//! - [`identifier`]: entity and tile-entity criteria keyed by declared id
//! - [`kind`]: tile-entity criteria keyed by structural kind
//!
//! Fused criteria never advertise a fusion key themselves, so a second
//! `fuse` over the output finds nothing to merge.

pub mod block;
pub mod identifier;
pub mod index;
pub mod kind;

use tracing::error;

use crate::{Criterion, EntityCriterion, ScanResult, TileEntityCriterion, VoxelCriterion};

pub use block::FusedBlockCriterion;
pub use identifier::{FusedEntityCriterion, FusedTileEntityByIdCriterion};
pub use index::{BlockIndex, KeyedIndex, Slot};
pub use kind::FusedTileEntityByKindCriterion;

/// Minimum number of fusible voxel criteria before a block index pays off.
pub const BLOCK_FUSION_THRESHOLD: usize = 3;

/// Minimum number of fusible criteria for the id and kind indices.
pub const KEYED_FUSION_THRESHOLD: usize = 2;

/// A merge hook: removes the criteria it absorbs from the working list and
/// emits their replacements.
pub type MergeHook<C> = fn(&mut Vec<C>, &mut dyn FnMut(C));

/// A criterion that may offer a merge hook.
pub trait Fusible: Sized {
    fn merge_hook(&self) -> Option<MergeHook<Self>>;
}

/// Merge criteria of one domain until nothing more can be merged.
///
/// # Panics
///
/// If a hook removes criteria without producing a replacement, or produces
/// replacements without shrinking the working list.
pub fn fuse<C: Fusible>(criteria: Vec<C>) -> Vec<C> {
    let mut working = criteria;

    'restart: loop {
        for i in 0..working.len() {
            let Some(hook) = working[i].merge_hook() else {
                continue;
            };

            let before = working.len();
            let mut produced = Vec::new();
            hook(&mut working, &mut |criterion| produced.push(criterion));

            if produced.is_empty() {
                assert_eq!(
                    working.len(),
                    before,
                    "merge hook removed criteria without producing a replacement"
                );
                continue;
            }

            assert!(
                working.len() + produced.len() < before,
                "merge hook produced {} criteria but the working list only went from {} to {}",
                produced.len(),
                before,
                working.len()
            );

            working.extend(produced);
            continue 'restart;
        }

        return working;
    }
}

impl Fusible for Box<dyn VoxelCriterion> {
    fn merge_hook(&self) -> Option<MergeHook<Self>> {
        self.block_filter()
            .map(|_| block::merge_blocks as MergeHook<Self>)
    }
}

impl Fusible for Box<dyn EntityCriterion> {
    fn merge_hook(&self) -> Option<MergeHook<Self>> {
        self.id_filter()
            .map(|_| identifier::merge_entities as MergeHook<Self>)
    }
}

impl Fusible for Box<dyn TileEntityCriterion> {
    fn merge_hook(&self) -> Option<MergeHook<Self>> {
        if self.id_filter().is_some() {
            Some(identifier::merge_tile_entities as MergeHook<Self>)
        } else if self.kind_filter().is_some() {
            Some(kind::merge_tile_entities as MergeHook<Self>)
        } else {
            None
        }
    }
}

/// Pull the criteria selected by `keep` out of `working`, preserving the
/// relative order of both halves.
pub(crate) fn extract<C>(working: &mut Vec<C>, keep: impl Fn(&C) -> bool) -> Vec<C> {
    let (taken, rest): (Vec<C>, Vec<C>) = core::mem::take(working).into_iter().partition(keep);
    *working = rest;
    taken
}

/// Close every member once, continuing past failures. Returns the first error.
pub(crate) fn close_members<C: Criterion + ?Sized>(members: &mut Vec<Box<C>>) -> ScanResult<()> {
    let mut first = None;
    for mut member in members.drain(..) {
        if let Err(e) = member.close() {
            error!("Failed to close {member}: {e}");
            first.get_or_insert(e);
        }
    }
    first.map_or(Ok(()), Err)
}
