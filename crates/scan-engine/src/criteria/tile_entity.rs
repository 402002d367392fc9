//! `--tileentity(,<id>)`: every tile entity, or every tile entity of one id.

use core::fmt;

use scan_output::Output;
use scan_world::{Chunk, ResourceLocation, TileEntity};

use super::{close_output, emit, optional_id};
use crate::records::{TileEntityRecord, nbt_json};
use crate::{AnyCriterion, Criterion, InitContext, ScanResult, TileEntityCriterion};

pub fn from_args(args: &[&str]) -> ScanResult<AnyCriterion> {
    let filter = optional_id("--tileentity", args)?;
    Ok(AnyCriterion::TileEntity(Box::new(TileEntitySearch::new(filter))))
}

/// Exports tile entities with their NBT. Fusible by declared id when filtered.
pub struct TileEntitySearch {
    filter: Option<ResourceLocation>,
    output: Option<Output<TileEntityRecord>>,
}

impl TileEntitySearch {
    #[must_use]
    pub const fn new(filter: Option<ResourceLocation>) -> Self {
        Self {
            filter,
            output: None,
        }
    }
}

impl fmt::Display for TileEntitySearch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.filter {
            Some(id) => write!(f, "Tile Entities (id={id})"),
            None => f.write_str("Tile Entities"),
        }
    }
}

impl Criterion for TileEntitySearch {
    fn init(&mut self, ctx: &InitContext<'_>) -> ScanResult<()> {
        self.output = Some(ctx.open(&self.to_string())?);
        Ok(())
    }

    fn close(&mut self) -> ScanResult<()> {
        close_output(&mut self.output)
    }
}

impl TileEntityCriterion for TileEntitySearch {
    fn visit(&self, chunk: &Chunk, tile_entity: &TileEntity) {
        if self.filter.as_ref().is_none_or(|id| *id == tile_entity.id) {
            self.accept_match(chunk, tile_entity);
        }
    }

    fn id_filter(&self) -> Option<&ResourceLocation> {
        self.filter.as_ref()
    }

    fn accept_match(&self, _chunk: &Chunk, tile_entity: &TileEntity) {
        emit(
            self.output.as_ref(),
            &TileEntityRecord {
                id: tile_entity.id.to_string(),
                x: tile_entity.x,
                y: tile_entity.y,
                z: tile_entity.z,
                nbt: nbt_json(&tile_entity.data.to_nbt()),
            },
        );
    }
}
