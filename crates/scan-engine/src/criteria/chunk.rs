//! Whole-chunk predicates without arguments: `--emptychunks`,
//! `--netherchunks` and `--avgheight`.

use core::fmt;

use scan_output::{MeanAccumulator, Output};
use scan_world::{Chunk, ResourceLocation, SECTION_COUNT};

use super::{close_output, emit, no_args};
use crate::records::{ChunkPosition, HeightRecord};
use crate::{AnyCriterion, ChunkCriterion, Criterion, InitContext, ScanResult};

/// Section holding the nether roof's bottom layer.
const NETHER_ROOF_SECTION: usize = 7;

pub fn empty_chunks(args: &[&str]) -> ScanResult<AnyCriterion> {
    no_args("--emptychunks", args)?;
    Ok(AnyCriterion::Chunk(Box::new(EmptyChunksCriterion::new())))
}

pub fn nether_chunks(args: &[&str]) -> ScanResult<AnyCriterion> {
    no_args("--netherchunks", args)?;
    Ok(AnyCriterion::Chunk(Box::new(NetherChunksCriterion::new())))
}

pub fn average_height(args: &[&str]) -> ScanResult<AnyCriterion> {
    no_args("--avgheight", args)?;
    Ok(AnyCriterion::Chunk(Box::new(AverageHeightCriterion::new())))
}

/// Chunks made only of air.
#[derive(Default)]
pub struct EmptyChunksCriterion {
    output: Option<Output<ChunkPosition>>,
}

impl EmptyChunksCriterion {
    #[must_use]
    pub const fn new() -> Self {
        Self { output: None }
    }
}

impl fmt::Display for EmptyChunksCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Empty Chunks")
    }
}

impl Criterion for EmptyChunksCriterion {
    fn init(&mut self, ctx: &InitContext<'_>) -> ScanResult<()> {
        self.output = Some(ctx.open(&self.to_string())?);
        Ok(())
    }

    fn close(&mut self) -> ScanResult<()> {
        close_output(&mut self.output)
    }
}

impl ChunkCriterion for EmptyChunksCriterion {
    fn visit(&self, chunk: &Chunk) {
        let solid = (0..SECTION_COUNT)
            .filter_map(|y| chunk.section(y))
            .any(|section| !section.is_empty());
        if !solid {
            emit(self.output.as_ref(), &ChunkPosition::from(chunk.pos()));
        }
    }
}

/// Chunks generated as nether terrain: bedrock at the bottom of the roof (y = 127).
#[derive(Default)]
pub struct NetherChunksCriterion {
    bedrock: Option<u16>,
    output: Option<Output<ChunkPosition>>,
}

impl NetherChunksCriterion {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            bedrock: None,
            output: None,
        }
    }
}

impl fmt::Display for NetherChunksCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Nether Chunks")
    }
}

impl Criterion for NetherChunksCriterion {
    fn init(&mut self, ctx: &InitContext<'_>) -> ScanResult<()> {
        self.bedrock = ctx.lookup_block(&ResourceLocation::minecraft("bedrock"));
        self.output = Some(ctx.open(&self.to_string())?);
        Ok(())
    }

    fn close(&mut self) -> ScanResult<()> {
        close_output(&mut self.output)
    }
}

impl ChunkCriterion for NetherChunksCriterion {
    fn visit(&self, chunk: &Chunk) {
        let (Some(bedrock), Some(section)) = (self.bedrock, chunk.section(NETHER_ROOF_SECTION))
        else {
            return;
        };
        let roof = (0..16).any(|x| (0..16).any(|z| section.block_id(x, 15, z) == bedrock));
        if roof {
            emit(self.output.as_ref(), &ChunkPosition::from(chunk.pos()));
        }
    }
}

/// Mean column height over every visited chunk.
///
/// Workers fold per-chunk sums into a [`MeanAccumulator`]; the single row is
/// written when the criterion is closed, and only if a chunk was seen.
#[derive(Default)]
pub struct AverageHeightCriterion {
    heights: MeanAccumulator,
    output: Option<Output<HeightRecord>>,
}

impl AverageHeightCriterion {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            heights: MeanAccumulator::new(),
            output: None,
        }
    }

    /// Mean of the columns folded so far.
    #[must_use]
    pub fn mean(&self) -> Option<f64> {
        self.heights.mean()
    }
}

impl fmt::Display for AverageHeightCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Average Height")
    }
}

impl Criterion for AverageHeightCriterion {
    fn init(&mut self, ctx: &InitContext<'_>) -> ScanResult<()> {
        self.output = Some(ctx.open(&self.to_string())?);
        Ok(())
    }

    fn close(&mut self) -> ScanResult<()> {
        if let Some(height) = self.heights.mean() {
            emit(self.output.as_ref(), &HeightRecord { height });
        }
        close_output(&mut self.output)
    }
}

impl ChunkCriterion for AverageHeightCriterion {
    fn visit(&self, chunk: &Chunk) {
        let mut sum = 0u64;
        for x in 0..16 {
            for z in 0..16 {
                sum += u64::from(chunk.highest_block(x, z).unsigned_abs());
            }
        }
        self.heights.add(sum, 256);
    }
}
