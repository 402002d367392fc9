//! Built-in criteria.
//!
//! Each submodule owns one family of criteria plus the parser for its
//! command-line arguments (`key=value` pairs or a positional id).

pub mod block;
pub mod chunk;
pub mod command_block;
pub mod count;
pub mod double_chest;
pub mod entity;
pub mod lighting;
pub mod portal;
pub mod sign;
pub mod spawner;
pub mod tile_entity;

use core::str::FromStr;

use scan_output::{Output, Record};
use scan_world::ResourceLocation;

use crate::{ScanError, ScanResult};

pub use block::{AbsentBlockCriterion, BlockCriterion, BlockRangeCriterion};
pub use chunk::{AverageHeightCriterion, EmptyChunksCriterion, NetherChunksCriterion};
pub use command_block::CommandBlockCriterion;
pub use count::{CountBlocksCriterion, CountTileEntitiesCriterion};
pub use double_chest::DoubleChestCriterion;
pub use entity::EntitySearch;
pub use lighting::BrokenLightingCriterion;
pub use portal::BrokenPortalCriterion;
pub use sign::{SignCriterion, SignTextMode};
pub use spawner::SpawnerCriterion;
pub use tile_entity::TileEntitySearch;

/// Reject any argument for flags that take none.
pub(crate) fn no_args(flag: &'static str, args: &[&str]) -> ScanResult<()> {
    if args.is_empty() {
        Ok(())
    } else {
        Err(ScanError::invalid(flag, "takes no arguments"))
    }
}

/// Split a `key=value` argument.
pub(crate) fn key_value<'a>(
    flag: &'static str,
    arg: &'a str,
) -> ScanResult<(&'a str, &'a str)> {
    match arg.split_once('=') {
        Some((key, value)) if !value.contains('=') => Ok((key, value)),
        _ => Err(ScanError::invalid(flag, format!("invalid argument: {arg}"))),
    }
}

/// Parse a numeric argument value.
pub(crate) fn parse_number<T: FromStr>(
    flag: &'static str,
    key: &str,
    value: &str,
) -> ScanResult<T> {
    value
        .parse()
        .map_err(|_| ScanError::invalid(flag, format!("invalid {key}: {value}")))
}

/// Parse a block variant, which must be in 0..=15.
pub(crate) fn parse_meta(flag: &'static str, value: &str) -> ScanResult<u8> {
    let meta: i64 = parse_number(flag, "meta", value)?;
    u8::try_from(meta)
        .ok()
        .filter(|meta| *meta <= 15)
        .ok_or_else(|| {
            ScanError::invalid(flag, format!("invalid meta: {meta} (must be in range 0-15)"))
        })
}

/// Parse a resource location argument.
pub(crate) fn parse_id(value: &str) -> ScanResult<ResourceLocation> {
    Ok(ResourceLocation::new(value)?)
}

/// At most one positional id.
pub(crate) fn optional_id(
    flag: &'static str,
    args: &[&str],
) -> ScanResult<Option<ResourceLocation>> {
    match args {
        [] => Ok(None),
        [id] => parse_id(id).map(Some),
        _ => Err(ScanError::invalid(
            flag,
            "must be called with either no arguments or a single id",
        )),
    }
}

/// Write a record if the output is open.
#[inline]
pub(crate) fn emit<R: Record>(output: Option<&Output<R>>, record: &R) {
    if let Some(output) = output {
        output.accept(record);
    }
}

/// Close an output at most once.
pub(crate) fn close_output<R: Record>(output: &mut Option<Output<R>>) -> ScanResult<()> {
    match output.take() {
        Some(output) => Ok(output.close()?),
        None => Ok(()),
    }
}

/// ` (a, b)` suffix used in display names, empty when there is nothing to show.
pub(crate) fn describe(parts: &[String]) -> String {
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}
