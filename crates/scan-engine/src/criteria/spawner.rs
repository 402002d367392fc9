//! `--spawner(,<entity id>)`: mob spawners, optionally only those able to
//! spawn a given entity.

use core::fmt;

use scan_output::Output;
use scan_world::{Chunk, ResourceLocation, TileEntity, TileEntityData, TileEntityKind};

use super::{close_output, emit, optional_id};
use crate::records::SpawnerRecord;
use crate::{AnyCriterion, Criterion, InitContext, ScanResult, TileEntityCriterion};

pub fn from_args(args: &[&str]) -> ScanResult<AnyCriterion> {
    let filter = optional_id("--spawner", args)?;
    Ok(AnyCriterion::TileEntity(Box::new(SpawnerCriterion::new(filter))))
}

/// Mob spawners, matched by structural kind.
///
/// The entity filter is checked in `accept_match`, so fused and unfused
/// dispatch write the same rows.
pub struct SpawnerCriterion {
    entity: Option<ResourceLocation>,
    output: Option<Output<SpawnerRecord>>,
}

impl SpawnerCriterion {
    #[must_use]
    pub const fn new(entity: Option<ResourceLocation>) -> Self {
        Self {
            entity,
            output: None,
        }
    }
}

impl fmt::Display for SpawnerCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.entity {
            Some(id) => write!(f, "Spawners (id={id})"),
            None => f.write_str("Spawners"),
        }
    }
}

impl Criterion for SpawnerCriterion {
    fn init(&mut self, ctx: &InitContext<'_>) -> ScanResult<()> {
        self.output = Some(ctx.open(&self.to_string())?);
        Ok(())
    }

    fn close(&mut self) -> ScanResult<()> {
        close_output(&mut self.output)
    }
}

impl TileEntityCriterion for SpawnerCriterion {
    fn visit(&self, chunk: &Chunk, tile_entity: &TileEntity) {
        if tile_entity.kind() == TileEntityKind::MobSpawner {
            self.accept_match(chunk, tile_entity);
        }
    }

    fn kind_filter(&self) -> Option<TileEntityKind> {
        Some(TileEntityKind::MobSpawner)
    }

    fn accept_match(&self, _chunk: &Chunk, tile_entity: &TileEntity) {
        let TileEntityData::MobSpawner { spawns } = &tile_entity.data else {
            return;
        };
        if let Some(entity) = &self.entity
            && !tile_entity.can_spawn(entity)
        {
            return;
        }

        let id = spawns
            .iter()
            .map(|spawn| spawn.id.as_str())
            .collect::<Vec<_>>()
            .join(";");
        emit(
            self.output.as_ref(),
            &SpawnerRecord {
                x: tile_entity.x,
                y: tile_entity.y,
                z: tile_entity.z,
                id,
            },
        );
    }
}
