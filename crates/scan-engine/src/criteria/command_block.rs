//! `--command_block(,<regex>)`: command blocks, optionally only those whose
//! whole command matches a regular expression.

use core::fmt;

use regex::Regex;
use scan_output::Output;
use scan_world::{Chunk, TileEntity, TileEntityData, TileEntityKind};

use super::{close_output, emit};
use crate::records::CommandBlockRecord;
use crate::{AnyCriterion, Criterion, InitContext, ScanError, ScanResult, TileEntityCriterion};

const FLAG: &str = "--command_block";

/// The pattern is taken verbatim, commas included.
pub fn from_args(args: &[&str]) -> ScanResult<AnyCriterion> {
    let criterion = match args {
        [] => CommandBlockCriterion::new(None)?,
        [pattern] => CommandBlockCriterion::new(Some(*pattern))?,
        _ => {
            return Err(ScanError::invalid(
                FLAG,
                "must be called with either no arguments or a regex matching the command",
            ));
        }
    };
    Ok(AnyCriterion::TileEntity(Box::new(criterion)))
}

/// A user pattern compiled to match the whole command.
struct CommandPattern {
    source: String,
    regex: Regex,
}

/// Command blocks, matched by structural kind.
pub struct CommandBlockCriterion {
    pattern: Option<CommandPattern>,
    output: Option<Output<CommandBlockRecord>>,
}

impl CommandBlockCriterion {
    /// Compile `pattern` anchored at both ends.
    pub fn new(pattern: Option<&str>) -> ScanResult<Self> {
        let pattern = pattern
            .map(|source| {
                Regex::new(&format!("^(?:{source})$")).map(|regex| CommandPattern {
                    source: source.to_string(),
                    regex,
                })
            })
            .transpose()?;
        Ok(Self {
            pattern,
            output: None,
        })
    }
}

impl fmt::Display for CommandBlockCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.pattern {
            Some(pattern) => write!(f, "Command Blocks (regex={})", pattern.source),
            None => f.write_str("Command Blocks"),
        }
    }
}

impl Criterion for CommandBlockCriterion {
    fn init(&mut self, ctx: &InitContext<'_>) -> ScanResult<()> {
        self.output = Some(ctx.open(&self.to_string())?);
        Ok(())
    }

    fn close(&mut self) -> ScanResult<()> {
        close_output(&mut self.output)
    }
}

impl TileEntityCriterion for CommandBlockCriterion {
    fn visit(&self, chunk: &Chunk, tile_entity: &TileEntity) {
        if tile_entity.kind() == TileEntityKind::CommandBlock {
            self.accept_match(chunk, tile_entity);
        }
    }

    fn kind_filter(&self) -> Option<TileEntityKind> {
        Some(TileEntityKind::CommandBlock)
    }

    fn accept_match(&self, _chunk: &Chunk, tile_entity: &TileEntity) {
        let TileEntityData::CommandBlock {
            command,
            last_output,
        } = &tile_entity.data
        else {
            return;
        };
        if self
            .pattern
            .as_ref()
            .is_some_and(|pattern| !pattern.regex.is_match(command))
        {
            return;
        }

        emit(
            self.output.as_ref(),
            &CommandBlockRecord {
                x: tile_entity.x,
                y: tile_entity.y,
                z: tile_entity.z,
                command: command.clone(),
                last_output: last_output.clone(),
            },
        );
    }
}
