//! `--brokenportals`: nether portal blocks whose frame is incomplete.

use core::fmt;

use scan_output::Output;
use scan_world::{Chunk, ResourceLocation};

use super::{close_output, emit, no_args};
use crate::records::Position;
use crate::{AnyCriterion, ChunkCriterion, Criterion, InitContext, ScanResult};

/// Portal axis variants.
const AXIS_X: u8 = 1;
const AXIS_Z: u8 = 2;

pub fn from_args(args: &[&str]) -> ScanResult<AnyCriterion> {
    no_args("--brokenportals", args)?;
    Ok(AnyCriterion::Chunk(Box::new(BrokenPortalCriterion::new())))
}

/// Block id at a horizontal offset, if the neighbour lies in the same chunk.
fn neighbour(chunk: &Chunk, x: usize, y: i32, z: usize, dx: isize, dz: isize) -> Option<u16> {
    let x = x.checked_add_signed(dx).filter(|x| *x < 16)?;
    let z = z.checked_add_signed(dz).filter(|z| *z < 16)?;
    Some(chunk.block_id(x, y, z))
}

/// Portal blocks with a neighbour along their axis that is neither portal
/// nor obsidian.
///
/// Neighbours in another chunk are treated as intact.
#[derive(Default)]
pub struct BrokenPortalCriterion {
    portal: Option<u16>,
    obsidian: Option<u16>,
    output: Option<Output<Position>>,
}

impl BrokenPortalCriterion {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            portal: None,
            obsidian: None,
            output: None,
        }
    }

    fn is_frame(&self, id: u16) -> bool {
        Some(id) == self.portal || Some(id) == self.obsidian
    }
}

impl fmt::Display for BrokenPortalCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Broken Portals")
    }
}

impl Criterion for BrokenPortalCriterion {
    fn init(&mut self, ctx: &InitContext<'_>) -> ScanResult<()> {
        self.portal = ctx.lookup_block(&ResourceLocation::minecraft("portal"));
        self.obsidian = ctx.lookup_block(&ResourceLocation::minecraft("obsidian"));
        self.output = Some(ctx.open(&self.to_string())?);
        Ok(())
    }

    fn close(&mut self) -> ScanResult<()> {
        close_output(&mut self.output)
    }
}

impl ChunkCriterion for BrokenPortalCriterion {
    fn visit(&self, chunk: &Chunk) {
        let Some(portal) = self.portal else {
            return;
        };
        for voxel in chunk.voxels().filter(|voxel| voxel.id == portal) {
            let (dx, dz) = match voxel.meta {
                AXIS_X => (1, 0),
                AXIS_Z => (0, 1),
                _ => continue,
            };
            let x = (voxel.x & 15) as usize;
            let z = (voxel.z & 15) as usize;
            let broken = [(dx, dz), (-dx, -dz)].into_iter().any(|(dx, dz)| {
                neighbour(chunk, x, voxel.y, z, dx, dz).is_some_and(|id| !self.is_frame(id))
            });
            if broken {
                emit(
                    self.output.as_ref(),
                    &Position {
                        x: voxel.x,
                        y: voxel.y,
                        z: voxel.z,
                    },
                );
            }
        }
    }
}
