//! `--doublechest`: chests placed side by side.

use core::fmt;

use scan_output::Output;
use scan_world::{Chunk, ResourceLocation};

use super::{close_output, emit, no_args};
use crate::records::DoubleChestRecord;
use crate::{AnyCriterion, ChunkCriterion, Criterion, InitContext, ScanResult};

pub fn from_args(args: &[&str]) -> ScanResult<AnyCriterion> {
    no_args("--doublechest", args)?;
    Ok(AnyCriterion::Chunk(Box::new(DoubleChestCriterion::new())))
}

/// Reports one row per double chest, at the half with the lower x or z.
///
/// Both halves must be in the same chunk; pairs straddling a chunk border
/// are not reported.
#[derive(Default)]
pub struct DoubleChestCriterion {
    chest: Option<u16>,
    trapped_chest: Option<u16>,
    output: Option<Output<DoubleChestRecord>>,
}

impl DoubleChestCriterion {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            chest: None,
            trapped_chest: None,
            output: None,
        }
    }
}

impl fmt::Display for DoubleChestCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Double Chests")
    }
}

impl Criterion for DoubleChestCriterion {
    fn init(&mut self, ctx: &InitContext<'_>) -> ScanResult<()> {
        self.chest = ctx.lookup_block(&ResourceLocation::minecraft("chest"));
        self.trapped_chest = ctx.lookup_block(&ResourceLocation::minecraft("trapped_chest"));
        self.output = Some(ctx.open(&self.to_string())?);
        Ok(())
    }

    fn close(&mut self) -> ScanResult<()> {
        close_output(&mut self.output)
    }
}

impl ChunkCriterion for DoubleChestCriterion {
    fn visit(&self, chunk: &Chunk) {
        if self.chest.is_none() && self.trapped_chest.is_none() {
            return;
        }
        for voxel in chunk.voxels() {
            let trapped = if Some(voxel.id) == self.chest {
                false
            } else if Some(voxel.id) == self.trapped_chest {
                true
            } else {
                continue;
            };

            let x = (voxel.x & 15) as usize;
            let z = (voxel.z & 15) as usize;
            let paired = (x < 15 && chunk.block_id(x + 1, voxel.y, z) == voxel.id)
                || (z < 15 && chunk.block_id(x, voxel.y, z + 1) == voxel.id);
            if paired {
                emit(
                    self.output.as_ref(),
                    &DoubleChestRecord {
                        x: voxel.x,
                        y: voxel.y,
                        z: voxel.z,
                        trapped,
                    },
                );
            }
        }
    }
}
