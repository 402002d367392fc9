//! Output error types.

use std::path::PathBuf;

use thiserror::Error;

/// Output error type.
#[derive(Debug, Error)]
pub enum OutputError {
    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV encoding error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// A row was written to a sink before `init` was called.
    #[error("sink {0:?} was used before being initialised")]
    NotInitialized(String),

    /// Output format name not recognised.
    #[error("unknown output format: {0:?} (expected csv or csv_gz)")]
    UnknownFormat(String),

    /// Output directory already has files and overwriting was not requested.
    #[error("output directory {} is not empty", .0.display())]
    DirectoryNotEmpty(PathBuf),
}

/// Result type for output operations.
pub type OutputResult<T> = Result<T, OutputError>;
