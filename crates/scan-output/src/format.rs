//! Output format selection.

use core::fmt;
use core::str::FromStr;
use std::path::PathBuf;

use crate::{CsvSinkFactory, OutputError, SinkFactory};

/// File format results are written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Csv,
    CsvGz,
}

impl OutputFormat {
    /// Sink factory writing this format into `dir`.
    #[must_use]
    pub fn factory(self, dir: impl Into<PathBuf>) -> Box<dyn SinkFactory> {
        Box::new(CsvSinkFactory::new(dir, self == Self::CsvGz))
    }
}

impl FromStr for OutputFormat {
    type Err = OutputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "csv" => Ok(Self::Csv),
            "csv_gz" => Ok(Self::CsvGz),
            other => Err(OutputError::UnknownFormat(other.to_string())),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Csv => "csv",
            Self::CsvGz => "csv_gz",
        })
    }
}
