//! Run configuration parsed from command-line arguments.

use std::path::{Path, PathBuf};

use scan_output::{OutputFormat, SinkFactory, prepare_directory};

use crate::factory::{parse_criterion, usage};
use crate::{AnyCriterion, ScanError, ScanResult, SearchPlan};

/// Default output directory, relative to the working directory.
pub const DEFAULT_OUTPUT: &str = "scanresult";

/// Options of one scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    pub input: PathBuf,
    pub dimension: i32,
    pub format: OutputFormat,
    pub output: PathBuf,
    pub overwrite: bool,
    pub verbose: bool,
    /// Criterion flags, as given.
    pub criteria: Vec<String>,
}

impl ScanConfig {
    /// Whether the arguments ask for the help text instead of a scan.
    pub fn wants_help<S: AsRef<str>>(args: &[S]) -> bool {
        args.is_empty()
            || args
                .iter()
                .any(|arg| matches!(arg.as_ref(), "-h" | "--h" | "-help" | "--help"))
    }

    /// Parse top-level options; every other non-empty argument is a criterion flag.
    pub fn from_args<I, S>(args: I) -> ScanResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut input = None;
        let mut dimension = 0;
        let mut format = OutputFormat::default();
        let mut output = PathBuf::from(DEFAULT_OUTPUT);
        let mut overwrite = false;
        let mut verbose = false;
        let mut criteria = Vec::new();

        for arg in args {
            let arg = arg.as_ref();
            if arg.is_empty() {
                continue;
            }
            let (option, value) = match arg.split_once('=') {
                Some((option, value)) => (option, Some(value)),
                None => (arg, None),
            };
            match option {
                "--input" | "-i" => input = Some(PathBuf::from(required(option, value)?)),
                "--format" | "-f" => format = required(option, value)?.parse()?,
                "--output" => output = PathBuf::from(required(option, value)?),
                "--dim" => {
                    let value = required(option, value)?;
                    dimension = value.parse().map_err(|_| ScanError::InvalidOption {
                        option: option.to_string(),
                        message: format!("not a dimension id: {value}"),
                    })?;
                }
                "--overwrite" | "-o" => overwrite = true,
                "--verbose" | "-v" => verbose = true,
                _ => criteria.push(arg.to_string()),
            }
        }

        let input = input.ok_or(ScanError::MissingInput)?;
        if criteria.is_empty() {
            return Err(ScanError::NoCriteria);
        }

        Ok(Self {
            input,
            dimension,
            format,
            output,
            overwrite,
            verbose,
            criteria,
        })
    }

    /// Create the output directory, clearing it first when overwriting.
    pub fn prepare_output(&self) -> ScanResult<()> {
        Ok(prepare_directory(&self.output, self.overwrite)?)
    }

    /// Sink factory writing the configured format into the output directory.
    #[must_use]
    pub fn sink_factory(&self) -> Box<dyn SinkFactory> {
        self.format.factory(&self.output)
    }

    /// Instantiate every criterion flag.
    pub fn criteria(&self) -> ScanResult<Vec<AnyCriterion>> {
        self.criteria.iter().map(|arg| parse_criterion(arg)).collect()
    }

    /// Instantiate the criteria into a plan, dropping duplicates.
    pub fn plan(&self) -> ScanResult<SearchPlan> {
        Ok(SearchPlan::new(self.criteria()?))
    }

    #[must_use]
    pub fn input(&self) -> &Path {
        &self.input
    }

    /// `tracing` filter directive matching `--verbose`.
    #[must_use]
    pub const fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}

fn required<'a>(option: &str, value: Option<&'a str>) -> ScanResult<&'a str> {
    value
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ScanError::InvalidOption {
            option: option.to_string(),
            message: "missing value".to_string(),
        })
}

/// Help text for the command line.
#[must_use]
pub fn help() -> String {
    format!(
        "Options:\n  \
         --input=<path>, -i=<path>   world to scan (required)\n  \
         --dim=<id>                  dimension id, default 0\n  \
         --format=<format>, -f=...   csv (default) or csv_gz\n  \
         --output=<path>             output directory, default {DEFAULT_OUTPUT}\n  \
         --overwrite, -o             delete existing files in the output directory\n  \
         --verbose, -v               log every region as it is reached\n\
         \n\
         Criteria:\n{}",
        usage()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ScanConfig::from_args(["--input=world", "--emptychunks"]).unwrap();
        assert_eq!(config.input(), Path::new("world"));
        assert_eq!(config.dimension, 0);
        assert_eq!(config.format, OutputFormat::Csv);
        assert_eq!(config.output, PathBuf::from("scanresult"));
        assert!(!config.overwrite);
        assert_eq!(config.log_level(), "info");
        assert_eq!(config.criteria, vec!["--emptychunks".to_string()]);
    }

    #[test]
    fn test_all_options() {
        let config = ScanConfig::from_args([
            "-i=/saves/w",
            "--dim=-1",
            "-f=csv_gz",
            "--output=out",
            "-o",
            "-v",
            "",
            "--block,id=stone",
            "--netherchunks",
        ])
        .unwrap();
        assert_eq!(config.dimension, -1);
        assert_eq!(config.format, OutputFormat::CsvGz);
        assert_eq!(config.output, PathBuf::from("out"));
        assert!(config.overwrite);
        assert_eq!(config.log_level(), "debug");
        assert_eq!(config.criteria().unwrap().len(), 2);
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            ScanConfig::from_args(["--emptychunks"]),
            Err(ScanError::MissingInput)
        ));
        assert!(matches!(
            ScanConfig::from_args(["--input=w"]),
            Err(ScanError::NoCriteria)
        ));
        assert!(matches!(
            ScanConfig::from_args(["--input=w", "--format=json", "--emptychunks"]),
            Err(ScanError::Output(_))
        ));
        assert!(matches!(
            ScanConfig::from_args(["--input=w", "--dim=nether", "--emptychunks"]),
            Err(ScanError::InvalidOption { .. })
        ));
        assert!(matches!(
            ScanConfig::from_args(["--input", "--emptychunks"]),
            Err(ScanError::InvalidOption { .. })
        ));

        let config = ScanConfig::from_args(["--input=w", "--biome"]).unwrap();
        assert!(matches!(config.criteria(), Err(ScanError::UnknownFlag(_))));
    }

    #[test]
    fn test_help() {
        assert!(ScanConfig::wants_help::<&str>(&[]));
        assert!(ScanConfig::wants_help(&["--input=w", "-h"]));
        assert!(!ScanConfig::wants_help(&["--input=w", "--emptychunks"]));
        assert!(help().contains("--command_block(,<regex>)"));
    }

    #[test]
    fn test_prepare_output() {
        let root = tempfile::tempdir().unwrap();
        let out = root.path().join("results");
        let config = ScanConfig::from_args([
            "--input=w".to_string(),
            format!("--output={}", out.display()),
            "--avgheight".to_string(),
        ])
        .unwrap();

        config.prepare_output().unwrap();
        assert!(out.is_dir());
        std::fs::write(out.join("stale.csv"), "x").unwrap();
        assert!(config.prepare_output().is_err());
    }
}
