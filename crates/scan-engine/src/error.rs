//! Scan engine error types.

use scan_output::OutputError;
use scan_world::{ResourceLocation, WorldError};
use thiserror::Error;

/// Scan engine error type.
#[derive(Debug, Error)]
pub enum ScanError {
    /// A block name is not present in the save's registry.
    #[error("invalid block id: {0}")]
    UnknownBlock(ResourceLocation),

    /// Criterion flag not recognised.
    #[error("invalid criterion: {0}")]
    UnknownFlag(String),

    /// Malformed or conflicting criterion arguments.
    #[error("{flag}: {message}")]
    InvalidArgument { flag: &'static str, message: String },

    /// Command block filter is not a valid regex.
    #[error("invalid regex: {0}")]
    Regex(#[from] regex::Error),

    /// World model error (bad resource location, ...).
    #[error(transparent)]
    World(#[from] WorldError),

    /// Output sink error.
    #[error(transparent)]
    Output(#[from] OutputError),

    /// Fused criteria are built from initialised members and cannot be initialised again.
    #[error("{0} is built from initialised criteria and cannot be initialised")]
    FusedInit(String),

    /// No `--input` given.
    #[error("world path not set (use --input=<path>)")]
    MissingInput,

    /// No criterion flag given.
    #[error("no criteria enabled")]
    NoCriteria,

    /// Top-level option with a missing or malformed value.
    #[error("invalid option {option}: {message}")]
    InvalidOption { option: String, message: String },
}

impl ScanError {
    pub(crate) fn invalid(flag: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            flag,
            message: message.into(),
        }
    }
}

/// Result type for scan operations.
pub type ScanResult<T> = Result<T, ScanError>;
