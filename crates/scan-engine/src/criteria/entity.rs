//! `--entity(,<id>)`: every entity, or every entity of one id.

use core::fmt;

use scan_output::Output;
use scan_world::{Chunk, Entity, ResourceLocation};

use super::{close_output, emit, optional_id};
use crate::records::{EntityRecord, nbt_json};
use crate::{AnyCriterion, Criterion, EntityCriterion, InitContext, ScanResult};

/// Build the search described by `--entity` arguments.
pub fn from_args(args: &[&str]) -> ScanResult<AnyCriterion> {
    let filter = optional_id("--entity", args)?;
    Ok(AnyCriterion::Entity(Box::new(EntitySearch::new(filter))))
}

/// Exports entities with their NBT.
///
/// With an id filter the search is fusible by entity id; without one it
/// sees every entity.
pub struct EntitySearch {
    filter: Option<ResourceLocation>,
    output: Option<Output<EntityRecord>>,
}

impl EntitySearch {
    #[must_use]
    pub const fn new(filter: Option<ResourceLocation>) -> Self {
        Self {
            filter,
            output: None,
        }
    }
}

impl fmt::Display for EntitySearch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.filter {
            Some(id) => write!(f, "Entities (id={id})"),
            None => f.write_str("Entities"),
        }
    }
}

impl Criterion for EntitySearch {
    fn init(&mut self, ctx: &InitContext<'_>) -> ScanResult<()> {
        self.output = Some(ctx.open(&self.to_string())?);
        Ok(())
    }

    fn close(&mut self) -> ScanResult<()> {
        close_output(&mut self.output)
    }
}

impl EntityCriterion for EntitySearch {
    fn visit(&self, chunk: &Chunk, entity: &Entity) {
        if self.filter.as_ref().is_none_or(|id| *id == entity.id) {
            self.accept_match(chunk, entity);
        }
    }

    fn id_filter(&self) -> Option<&ResourceLocation> {
        self.filter.as_ref()
    }

    fn accept_match(&self, _chunk: &Chunk, entity: &Entity) {
        emit(
            self.output.as_ref(),
            &EntityRecord {
                id: entity.id.to_string(),
                x: entity.x,
                y: entity.y,
                z: entity.z,
                nbt: nbt_json(&entity.data),
            },
        );
    }
}
