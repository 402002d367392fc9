//! Per-chunk counters.
//!
//! `--count,type=block,id=<id>(,meta=<0-15>)` and
//! `--count,type=tileentity(,id=<id>)`. Every visited chunk produces one row,
//! including chunks with a count of zero.

use core::fmt;

use scan_output::Output;
use scan_world::{Chunk, ResourceLocation, SECTION_COUNT};

use super::block::BlockQuery;
use super::{close_output, describe, emit, key_value, parse_id, parse_meta};
use crate::records::ChunkCount;
use crate::{AnyCriterion, ChunkCriterion, Criterion, InitContext, ScanError, ScanResult};

const FLAG: &str = "--count";
const SECTION_VOLUME: u64 = 16 * 16 * 16;

/// Build the counter described by `--count` arguments.
pub fn from_args(args: &[&str]) -> ScanResult<AnyCriterion> {
    let mut id = None;
    let mut meta = None;
    let mut kind = None;

    for &arg in args {
        match key_value(FLAG, arg)? {
            ("id", value) => id = Some(parse_id(value)?),
            ("meta", value) => meta = Some(parse_meta(FLAG, value)?),
            ("type", value) => kind = Some(value),
            _ => return Err(ScanError::invalid(FLAG, format!("invalid argument: {arg}"))),
        }
    }

    match kind {
        None => Err(ScanError::invalid(FLAG, "no type given")),
        Some("block") => {
            let id = id.ok_or_else(|| ScanError::invalid(FLAG, "no id given"))?;
            Ok(AnyCriterion::Chunk(Box::new(CountBlocksCriterion::new(id, meta))))
        }
        Some("tileentity") => {
            if meta.is_some() {
                return Err(ScanError::invalid(
                    FLAG,
                    "type=tileentity does not use a meta value",
                ));
            }
            Ok(AnyCriterion::Chunk(Box::new(CountTileEntitiesCriterion::new(id))))
        }
        Some(other) => Err(ScanError::invalid(FLAG, format!("unknown type: \"{other}\""))),
    }
}

/// Number of voxels of one block per chunk.
pub struct CountBlocksCriterion {
    query: BlockQuery,
    output: Option<Output<ChunkCount>>,
}

impl CountBlocksCriterion {
    #[must_use]
    pub const fn new(name: ResourceLocation, meta: Option<u8>) -> Self {
        Self {
            query: BlockQuery::new(name, meta),
            output: None,
        }
    }

    fn count(&self, chunk: &Chunk) -> u64 {
        let Some(filter) = self.query.filter() else {
            return 0;
        };

        let mut count = 0;
        for section_y in 0..SECTION_COUNT {
            let Some(section) = chunk.section(section_y) else {
                if self.query.matches_missing_section() {
                    count += SECTION_VOLUME;
                }
                continue;
            };
            for y in 0..16 {
                for z in 0..16 {
                    for x in 0..16 {
                        if filter.matches(section.block_id(x, y, z), section.block_meta(x, y, z)) {
                            count += 1;
                        }
                    }
                }
            }
        }
        count
    }
}

impl fmt::Display for CountBlocksCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Count - Block{}", describe(&self.query.parts()))
    }
}

impl Criterion for CountBlocksCriterion {
    fn init(&mut self, ctx: &InitContext<'_>) -> ScanResult<()> {
        self.query.resolve(ctx)?;
        self.output = Some(ctx.open(&self.to_string())?);
        Ok(())
    }

    fn close(&mut self) -> ScanResult<()> {
        close_output(&mut self.output)
    }
}

impl ChunkCriterion for CountBlocksCriterion {
    fn visit(&self, chunk: &Chunk) {
        let pos = chunk.pos();
        emit(
            self.output.as_ref(),
            &ChunkCount {
                x: pos.x,
                z: pos.z,
                count: self.count(chunk),
            },
        );
    }
}

/// Number of tile entities per chunk, optionally restricted to one id.
pub struct CountTileEntitiesCriterion {
    filter: Option<ResourceLocation>,
    output: Option<Output<ChunkCount>>,
}

impl CountTileEntitiesCriterion {
    #[must_use]
    pub const fn new(filter: Option<ResourceLocation>) -> Self {
        Self {
            filter,
            output: None,
        }
    }
}

impl fmt::Display for CountTileEntitiesCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.filter {
            Some(id) => write!(f, "Count - Tile Entities (id={id})"),
            None => f.write_str("Count - Tile Entities"),
        }
    }
}

impl Criterion for CountTileEntitiesCriterion {
    fn init(&mut self, ctx: &InitContext<'_>) -> ScanResult<()> {
        self.output = Some(ctx.open(&self.to_string())?);
        Ok(())
    }

    fn close(&mut self) -> ScanResult<()> {
        close_output(&mut self.output)
    }
}

impl ChunkCriterion for CountTileEntitiesCriterion {
    fn visit(&self, chunk: &Chunk) {
        let tile_entities = chunk.tile_entities();
        let count = match &self.filter {
            Some(id) => tile_entities.iter().filter(|te| te.id == *id).count(),
            None => tile_entities.len(),
        };
        let pos = chunk.pos();
        emit(
            self.output.as_ref(),
            &ChunkCount {
                x: pos.x,
                z: pos.z,
                count: count as u64,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use scan_world::{NbtCompound, TileEntity, TileEntityData};

    use super::*;
    use crate::test_support::{Harness, rows};

    fn chest(x: i32, z: i32) -> TileEntity {
        TileEntity::new(
            ResourceLocation::minecraft("chest"),
            x,
            64,
            z,
            TileEntityData::Generic(NbtCompound::new()),
        )
    }

    #[test]
    fn test_parse() {
        assert_eq!(
            from_args(&["type=block", "id=stone", "meta=3"]).unwrap().to_string(),
            "Count - Block (id=minecraft:stone, meta=3)"
        );
        assert_eq!(
            from_args(&["type=tileentity"]).unwrap().to_string(),
            "Count - Tile Entities"
        );
        assert_eq!(
            from_args(&["type=tileentity", "id=chest"]).unwrap().to_string(),
            "Count - Tile Entities (id=minecraft:chest)"
        );

        for args in [
            &["id=stone"][..],
            &["type=block"],
            &["type=tileentity", "meta=1"],
            &["type=fluid", "id=water"],
            &["type=block", "id=stone", "extra=1"],
        ] {
            assert!(from_args(args).is_err(), "{args:?} should be rejected");
        }
    }

    #[test]
    fn test_count_blocks() {
        let harness = Harness::new();
        let mut criterion =
            CountBlocksCriterion::new(ResourceLocation::minecraft("diamond_ore"), None);
        harness.init(&mut criterion).unwrap();

        let mut chunk = Chunk::new(2, -1);
        chunk.set_block(0, 5, 0, 56, 0);
        chunk.set_block(1, 12, 0, 56, 0);
        chunk.set_block(1, 80, 9, 56, 0);
        chunk.set_block(2, 12, 0, 1, 0);

        criterion.visit(&chunk);
        criterion.visit(&Chunk::new(0, 0));
        criterion.close().unwrap();

        assert_eq!(
            harness.store().rows("Count - Block (id=minecraft:diamond_ore)"),
            rows(&[&["2", "-1", "3"], &["0", "0", "0"]])
        );
    }

    #[test]
    fn test_count_air_includes_missing_sections() {
        let harness = Harness::new();
        let mut criterion = CountBlocksCriterion::new(ResourceLocation::minecraft("air"), None);
        harness.init(&mut criterion).unwrap();

        let mut chunk = Chunk::new(0, 0);
        chunk.set_block(0, 0, 0, 1, 0);
        criterion.visit(&chunk);
        criterion.close().unwrap();

        let expected = (16 * 4096 - 1).to_string();
        assert_eq!(
            harness.store().rows("Count - Block (id=minecraft:air)"),
            rows(&[&["0", "0", expected.as_str()]])
        );
    }

    #[test]
    fn test_count_tile_entities() {
        let harness = Harness::new();
        let mut all = CountTileEntitiesCriterion::new(None);
        let mut chests =
            CountTileEntitiesCriterion::new(Some(ResourceLocation::minecraft("chest")));
        harness.init(&mut all).unwrap();
        harness.init(&mut chests).unwrap();

        let mut chunk = Chunk::new(1, 1);
        chunk.add_tile_entity(chest(16, 16));
        chunk.add_tile_entity(chest(17, 16));
        chunk.add_tile_entity(TileEntity::new(
            ResourceLocation::minecraft("furnace"),
            18,
            64,
            16,
            TileEntityData::Generic(NbtCompound::new()),
        ));

        all.visit(&chunk);
        chests.visit(&chunk);
        all.close().unwrap();
        chests.close().unwrap();

        let store = harness.store();
        assert_eq!(store.rows("Count - Tile Entities"), rows(&[&["1", "1", "3"]]));
        assert_eq!(
            store.rows("Count - Tile Entities (id=minecraft:chest)"),
            rows(&[&["1", "1", "2"]])
        );
    }
}
