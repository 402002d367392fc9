//! World model error types.

use thiserror::Error;

/// World model error type.
#[derive(Debug, Error)]
pub enum WorldError {
    /// A resource location was not of the form `namespace:path`.
    #[error("invalid resource location: {0:?}")]
    InvalidResourceLocation(String),

    /// Tried to register the same block name twice.
    #[error("block {name} is already registered with id {id}")]
    DuplicateBlock { name: String, id: u16 },
}

/// Result type for world model operations.
pub type WorldResult<T> = Result<T, WorldError>;
