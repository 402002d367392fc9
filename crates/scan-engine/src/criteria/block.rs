//! Block searches: exact, ranged and inverted.
//!
//! `--block,id=<id>(,meta=<0-15>)(,min=<y>)(,max=<y>)(,invert|chunkinvert)`
//!
//! | arguments            | criterion                 | domain |
//! |----------------------|---------------------------|--------|
//! | full height          | [`BlockCriterion`]        | voxel  |
//! | `min`/`max` given    | [`BlockRangeCriterion`]   | voxel  |
//! | `invert`/`chunkinvert` | [`AbsentBlockCriterion`] | chunk  |
//!
//! Only [`BlockCriterion`] is fusible.

use core::fmt;

use scan_output::Output;
use scan_world::{CHUNK_HEIGHT, Chunk, ResourceLocation, SECTION_COUNT, Voxel};

use super::{close_output, describe, emit, key_value, parse_id, parse_meta, parse_number};
use crate::records::{ChunkPosition, Position};
use crate::{
    AnyCriterion, BlockFilter, ChunkCriterion, Criterion, InitContext, ScanError, ScanResult,
    VoxelCriterion,
};

const FLAG: &str = "--block";
const MAX_Y: i32 = CHUNK_HEIGHT - 1;

/// A block name and optional variant, resolved to a numeric id at init.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct BlockQuery {
    name: ResourceLocation,
    meta: Option<u8>,
    id: Option<u16>,
}

impl BlockQuery {
    pub(crate) const fn new(name: ResourceLocation, meta: Option<u8>) -> Self {
        Self {
            name,
            meta,
            id: None,
        }
    }

    pub(crate) fn resolve(&mut self, ctx: &InitContext<'_>) -> ScanResult<()> {
        self.id = Some(ctx.resolve_block(&self.name)?);
        Ok(())
    }

    /// `None` until resolved.
    pub(crate) fn filter(&self) -> Option<BlockFilter> {
        self.id.map(|id| BlockFilter {
            id,
            meta: self.meta,
        })
    }

    /// Whether a missing section (all air, variant 0) satisfies the query.
    pub(crate) fn matches_missing_section(&self) -> bool {
        self.id == Some(0) && self.meta.is_none_or(|meta| meta == 0)
    }

    /// `id=...` and `meta=...` display parts.
    pub(crate) fn parts(&self) -> Vec<String> {
        let mut parts = vec![format!("id={}", self.name)];
        if let Some(meta) = self.meta {
            parts.push(format!("meta={meta}"));
        }
        parts
    }
}

/// Parsed `--block` arguments.
#[derive(Debug)]
struct BlockArgs {
    query: BlockQuery,
    min_y: i32,
    max_y: i32,
    invert: bool,
}

impl BlockArgs {
    fn parse(args: &[&str]) -> ScanResult<Self> {
        let mut name = None;
        let mut meta = None;
        let mut min_y = 0;
        let mut max_y = MAX_Y;
        let mut invert = false;
        let mut chunk_invert = false;

        for &arg in args {
            match arg {
                "invert" | "chunkinvert" => {
                    if invert || chunk_invert {
                        return Err(ScanError::invalid(
                            FLAG,
                            "invert and chunkinvert cannot be used together",
                        ));
                    }
                    if arg == "invert" {
                        invert = true;
                    } else {
                        chunk_invert = true;
                    }
                }
                _ => match key_value(FLAG, arg)? {
                    ("id", value) => name = Some(parse_id(value)?),
                    ("meta", value) => meta = Some(parse_meta(FLAG, value)?),
                    ("min" | "minY", value) => min_y = parse_number(FLAG, "min", value)?,
                    ("max" | "maxY", value) => max_y = parse_number(FLAG, "max", value)?,
                    _ => return Err(ScanError::invalid(FLAG, format!("invalid argument: {arg}"))),
                },
            }
        }

        let name = name.ok_or_else(|| ScanError::invalid(FLAG, "no id given"))?;
        if min_y > max_y {
            return Err(ScanError::invalid(
                FLAG,
                format!("min Y must be less than or equal to max Y (min={min_y}, max={max_y})"),
            ));
        }

        Ok(Self {
            query: BlockQuery::new(name, meta),
            min_y,
            max_y,
            invert: invert || chunk_invert,
        })
    }

    const fn full_height(&self) -> bool {
        self.min_y <= 0 && self.max_y >= MAX_Y
    }
}

/// Build the criterion described by `--block` arguments.
pub fn from_args(args: &[&str]) -> ScanResult<AnyCriterion> {
    let args = BlockArgs::parse(args)?;
    Ok(match (args.invert, args.full_height()) {
        (false, true) => AnyCriterion::Voxel(Box::new(BlockCriterion::from_query(args.query))),
        (false, false) => AnyCriterion::Voxel(Box::new(BlockRangeCriterion {
            query: args.query,
            min_y: args.min_y,
            max_y: args.max_y,
            output: None,
        })),
        (true, _) => AnyCriterion::Chunk(Box::new(AbsentBlockCriterion {
            query: args.query,
            min_y: args.min_y,
            max_y: args.max_y,
            output: None,
        })),
    })
}

/// Every voxel with a given block id (and variant), over the whole height.
pub struct BlockCriterion {
    query: BlockQuery,
    output: Option<Output<Position>>,
}

impl BlockCriterion {
    #[must_use]
    pub const fn new(name: ResourceLocation, meta: Option<u8>) -> Self {
        Self::from_query(BlockQuery::new(name, meta))
    }

    const fn from_query(query: BlockQuery) -> Self {
        Self {
            query,
            output: None,
        }
    }
}

impl fmt::Display for BlockCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Block{}", describe(&self.query.parts()))
    }
}

impl Criterion for BlockCriterion {
    fn init(&mut self, ctx: &InitContext<'_>) -> ScanResult<()> {
        self.query.resolve(ctx)?;
        self.output = Some(ctx.open(&self.to_string())?);
        Ok(())
    }

    fn close(&mut self) -> ScanResult<()> {
        close_output(&mut self.output)
    }
}

impl VoxelCriterion for BlockCriterion {
    #[inline]
    fn visit(&self, voxel: &Voxel) {
        if self
            .query
            .filter()
            .is_some_and(|filter| filter.matches(voxel.id, voxel.meta))
        {
            self.accept_match(voxel);
        }
    }

    fn block_filter(&self) -> Option<BlockFilter> {
        self.query.filter()
    }

    #[inline]
    fn accept_match(&self, voxel: &Voxel) {
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

/// Voxels with a given block id inside an inclusive y range.
pub struct BlockRangeCriterion {
    query: BlockQuery,
    min_y: i32,
    max_y: i32,
    output: Option<Output<Position>>,
}

impl fmt::Display for BlockRangeCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = self.query.parts();
        parts.push(format!("min={}", self.min_y));
        parts.push(format!("max={}", self.max_y));
        write!(f, "Block - Ranged{}", describe(&parts))
    }
}

impl Criterion for BlockRangeCriterion {
    fn init(&mut self, ctx: &InitContext<'_>) -> ScanResult<()> {
        self.query.resolve(ctx)?;
        self.output = Some(ctx.open(&self.to_string())?);
        Ok(())
    }

    fn close(&mut self) -> ScanResult<()> {
        close_output(&mut self.output)
    }
}

impl VoxelCriterion for BlockRangeCriterion {
    fn visit(&self, voxel: &Voxel) {
        if !(self.min_y..=self.max_y).contains(&voxel.y) {
            return;
        }
        if self
            .query
            .filter()
            .is_some_and(|filter| filter.matches(voxel.id, voxel.meta))
        {
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

/// Chunks where a block does not occur inside an inclusive y range.
pub struct AbsentBlockCriterion {
    query: BlockQuery,
    min_y: i32,
    max_y: i32,
    output: Option<Output<ChunkPosition>>,
}

impl AbsentBlockCriterion {
    fn contains_block(&self, chunk: &Chunk) -> bool {
        let Some(filter) = self.query.filter() else {
            return false;
        };

        for section_y in 0..SECTION_COUNT {
            let base = (section_y as i32) << 4;
            let low = self.min_y.max(base);
            let high = self.max_y.min(base + 15);
            if low > high {
                continue;
            }

            let Some(section) = chunk.section(section_y) else {
                if self.query.matches_missing_section() {
                    return true;
                }
                continue;
            };

            for y in low..=high {
                let local_y = (y - base) as usize;
                for z in 0..16 {
                    for x in 0..16 {
                        if filter.matches(
                            section.block_id(x, local_y, z),
                            section.block_meta(x, local_y, z),
                        ) {
                            return true;
                        }
                    }
                }
            }
        }
        false
    }
}

impl fmt::Display for AbsentBlockCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = self.query.parts();
        if self.min_y <= 0 && self.max_y >= MAX_Y {
            parts.insert(0, "chunk".to_string());
            write!(f, "Block - Inverted{}", describe(&parts))
        } else {
            parts.push(format!("min={}", self.min_y));
            parts.push(format!("max={}", self.max_y));
            write!(f, "Block - Inverted,Ranged{}", describe(&parts))
        }
    }
}

impl Criterion for AbsentBlockCriterion {
    fn init(&mut self, ctx: &InitContext<'_>) -> ScanResult<()> {
        self.query.resolve(ctx)?;
        self.output = Some(ctx.open(&self.to_string())?);
        Ok(())
    }

    fn close(&mut self) -> ScanResult<()> {
        close_output(&mut self.output)
    }
}

impl ChunkCriterion for AbsentBlockCriterion {
    fn visit(&self, chunk: &Chunk) {
        if !self.contains_block(chunk) {
            emit(self.output.as_ref(), &ChunkPosition::from(chunk.pos()));
        }
    }
}
