//! `--brokenlighting(,lightcleaner=<path>)`: chunks with stale sky light.
//!
//! A column is broken when the voxel right above its topmost solid block is
//! not fully sky-lit. Matches can additionally be exported as a LightCleaner
//! task file, a zlib-compressed big-endian stream:
//!
//! ```text
//! i32 -1, u8 2, i32 region_count
//! per region:
//!   utf "world", i32 1, i32 0, i32 chunk_count
//!   per chunk: i64 (x << 32) + z - i32::MIN
//! ```
//!
//! Each matching chunk is padded with its eight neighbours so the cleaner
//! relights across chunk borders.

use core::fmt;
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::write::ZlibEncoder;
use parking_lot::Mutex;
use scan_output::{Output, OutputError};
use scan_world::{CHUNK_HEIGHT, Chunk};
use tracing::info;

use super::{close_output, emit, key_value};
use crate::records::ChunkPosition;
use crate::{AnyCriterion, ChunkCriterion, Criterion, InitContext, ScanError, ScanResult};

const FLAG: &str = "--brokenlighting";
const PADDING: i32 = 1;

pub fn from_args(args: &[&str]) -> ScanResult<AnyCriterion> {
    let mut light_cleaner = None;
    for &arg in args {
        match key_value(FLAG, arg)? {
            ("lightcleaner", path) => light_cleaner = Some(PathBuf::from(path)),
            _ => return Err(ScanError::invalid(FLAG, format!("invalid argument: {arg}"))),
        }
    }
    Ok(AnyCriterion::Chunk(Box::new(BrokenLightingCriterion::new(
        light_cleaner,
    ))))
}

/// Chunks where a column's top block has an unlit voxel above it.
pub struct BrokenLightingCriterion {
    light_cleaner: Option<PathBuf>,
    matches: Mutex<Vec<ChunkPosition>>,
    output: Option<Output<ChunkPosition>>,
}

impl BrokenLightingCriterion {
    #[must_use]
    pub fn new(light_cleaner: Option<PathBuf>) -> Self {
        Self {
            light_cleaner,
            matches: Mutex::new(Vec::new()),
            output: None,
        }
    }

    fn is_broken(chunk: &Chunk) -> bool {
        (0..16).any(|z| {
            (0..16).any(|x| {
                let top = chunk.highest_block(x, z) - 1;
                top >= 0 && top != CHUNK_HEIGHT - 1 && chunk.sky_light(x, top + 1, z) != 15
            })
        })
    }
}

impl fmt::Display for BrokenLightingCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Broken Lighting")
    }
}

impl Criterion for BrokenLightingCriterion {
    fn init(&mut self, ctx: &InitContext<'_>) -> ScanResult<()> {
        self.output = Some(ctx.open(&self.to_string())?);
        Ok(())
    }

    fn close(&mut self) -> ScanResult<()> {
        let closed = close_output(&mut self.output);
        if let Some(path) = self.light_cleaner.take() {
            let matches = core::mem::take(&mut *self.matches.lock());
            write_light_cleaner(&path, &matches).map_err(OutputError::from)?;
            info!(path = %path.display(), chunks = matches.len(), "wrote LightCleaner task");
        }
        closed
    }
}

impl ChunkCriterion for BrokenLightingCriterion {
    fn visit(&self, chunk: &Chunk) {
        if !Self::is_broken(chunk) {
            return;
        }
        let pos = ChunkPosition::from(chunk.pos());
        emit(self.output.as_ref(), &pos);
        if self.light_cleaner.is_some() {
            self.matches.lock().push(pos);
        }
    }
}

/// Padded chunk sets grouped by the region of the chunk that matched.
fn group_by_region(matches: &[ChunkPosition]) -> BTreeMap<(i32, i32), BTreeSet<(i32, i32)>> {
    let mut regions: BTreeMap<_, BTreeSet<_>> = BTreeMap::new();
    for pos in matches {
        let padded = regions.entry((pos.x >> 5, pos.z >> 5)).or_default();
        for dx in -PADDING..=PADDING {
            for dz in -PADDING..=PADDING {
                padded.insert((pos.x + dx, pos.z + dz));
            }
        }
    }
    regions
}

const fn encode_chunk(x: i32, z: i32) -> i64 {
    ((x as i64) << 32) + z as i64 - i32::MIN as i64
}

fn write_utf(out: &mut impl Write, value: &str) -> io::Result<()> {
    let len = u16::try_from(value.len())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "string too long"))?;
    out.write_all(&len.to_be_bytes())?;
    out.write_all(value.as_bytes())
}

fn write_light_cleaner(path: &Path, matches: &[ChunkPosition]) -> io::Result<()> {
    let file = BufWriter::new(File::create(path)?);
    let mut out = ZlibEncoder::new(file, Compression::default());

    out.write_all(&(-1i32).to_be_bytes())?;
    out.write_all(&[2])?;

    let regions = group_by_region(matches);
    out.write_all(&(regions.len() as i32).to_be_bytes())?;
    for chunks in regions.values() {
        write_utf(&mut out, "world")?;
        out.write_all(&1i32.to_be_bytes())?;
        out.write_all(&0i32.to_be_bytes())?;
        out.write_all(&(chunks.len() as i32).to_be_bytes())?;
        for &(x, z) in chunks {
            out.write_all(&encode_chunk(x, z).to_be_bytes())?;
        }
    }

    out.finish()?.flush()
}
