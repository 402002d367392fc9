//! Criterion flags.
//!
//! A criterion is requested as `--<name>(,<arg>)*`. Most parsers receive the
//! comma-separated arguments; `--command_block` receives everything after the
//! first comma verbatim so its regex may contain commas.

use crate::criteria::{
    block, chunk, command_block, count, double_chest, entity, lighting, portal, sign, spawner,
    tile_entity,
};
use crate::{AnyCriterion, ScanError, ScanResult};

type Parser = fn(&[&str]) -> ScanResult<AnyCriterion>;

/// One recognised criterion flag.
pub struct FlagSpec {
    pub flag: &'static str,
    pub usage: &'static str,
    parse: Parser,
    raw: bool,
}

impl FlagSpec {
    const fn split(flag: &'static str, usage: &'static str, parse: Parser) -> Self {
        Self {
            flag,
            usage,
            parse,
            raw: false,
        }
    }
}

/// Every criterion flag, in help order.
pub const FLAGS: &[FlagSpec] = &[
    FlagSpec::split(
        "--block",
        "--block,id=<id>(,meta=<0-15>)(,min=<y>)(,max=<y>)(,invert|chunkinvert)",
        block::from_args,
    ),
    FlagSpec::split(
        "--count",
        "--count,type=block,id=<id>(,meta=<0-15>) | --count,type=tileentity(,id=<id>)",
        count::from_args,
    ),
    FlagSpec::split("--entity", "--entity(,<id>)", entity::from_args),
    FlagSpec::split("--tileentity", "--tileentity(,<id>)", tile_entity::from_args),
    FlagSpec::split("--spawner", "--spawner(,<entity id>)", spawner::from_args),
    FlagSpec::split(
        "--sign",
        "--sign(,mode=plain_text|formatted_legacy|raw)",
        sign::from_args,
    ),
    FlagSpec {
        flag: "--command_block",
        usage: "--command_block(,<regex>)",
        parse: command_block::from_args,
        raw: true,
    },
    FlagSpec::split("--emptychunks", "--emptychunks", chunk::empty_chunks),
    FlagSpec::split("--netherchunks", "--netherchunks", chunk::nether_chunks),
    FlagSpec::split(
        "--brokenlighting",
        "--brokenlighting(,lightcleaner=<path>)",
        lighting::from_args,
    ),
    FlagSpec::split("--avgheight", "--avgheight", chunk::average_height),
    FlagSpec::split("--doublechest", "--doublechest", double_chest::from_args),
    FlagSpec::split("--brokenportals", "--brokenportals", portal::from_args),
];

/// Build the criterion described by one command-line argument.
pub fn parse_criterion(arg: &str) -> ScanResult<AnyCriterion> {
    let (flag, rest) = match arg.split_once(',') {
        Some((flag, rest)) => (flag, Some(rest)),
        None => (arg, None),
    };
    let spec = FLAGS
        .iter()
        .find(|spec| spec.flag == flag)
        .ok_or_else(|| ScanError::UnknownFlag(arg.to_string()))?;

    let args: Vec<&str> = match rest {
        None => Vec::new(),
        Some(rest) if spec.raw => vec![rest],
        Some(rest) => rest.split(',').collect(),
    };
    (spec.parse)(&args)
}

/// Usage lines of every flag.
#[must_use]
pub fn usage() -> String {
    FLAGS
        .iter()
        .map(|spec| format!("  {}\n", spec.usage))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::Domain;

    #[test]
    fn test_every_flag_parses() {
        let cases = [
            ("--block,id=stone", Domain::Voxel),
            ("--block,id=stone,chunkinvert", Domain::Chunk),
            ("--count,type=tileentity", Domain::Chunk),
            ("--entity", Domain::Entity),
            ("--tileentity,chest", Domain::TileEntity),
            ("--spawner,zombie", Domain::TileEntity),
            ("--sign,mode=raw", Domain::TileEntity),
            ("--command_block", Domain::TileEntity),
            ("--emptychunks", Domain::Chunk),
            ("--netherchunks", Domain::Chunk),
            ("--brokenlighting", Domain::Chunk),
            ("--avgheight", Domain::Chunk),
            ("--doublechest", Domain::Chunk),
            ("--brokenportals", Domain::Chunk),
        ];
        for (arg, domain) in cases {
            assert_eq!(parse_criterion(arg).unwrap().domain(), domain, "{arg}");
        }

        let covered: BTreeSet<&str> = cases
            .iter()
            .map(|(arg, _)| arg.split_once(',').map_or(*arg, |(flag, _)| flag))
            .collect();
        let flags: BTreeSet<&str> = FLAGS.iter().map(|spec| spec.flag).collect();
        assert_eq!(covered, flags);
    }

    #[test]
    fn test_command_block_keeps_commas() {
        let criterion = parse_criterion("--command_block,/tp @a 0,64,0").unwrap();
        assert_eq!(criterion.to_string(), "Command Blocks (regex=/tp @a 0,64,0)");
    }

    #[test]
    fn test_unknown_flag() {
        assert!(matches!(
            parse_criterion("--biome,plains"),
            Err(ScanError::UnknownFlag(flag)) if flag == "--biome,plains"
        ));
        assert!(matches!(
            parse_criterion("--blocks,id=stone"),
            Err(ScanError::UnknownFlag(_))
        ));
    }

    #[test]
    fn test_usage_lists_flags() {
        let usage = usage();
        for spec in FLAGS {
            assert!(usage.contains(spec.usage));
        }
    }
}
