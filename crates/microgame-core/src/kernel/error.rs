//! # Microgame Core Kernel Errors
//!
//! Defines the crate-wide [`Error`]. Each subsystem keeps its own typed
//! error enum ([`StageSystemError`], [`StorageSystemError`]); the kernel
//! error wraps them through `#[from]` and adds the failures that only the
//! bootstrap layer can hit.
use std::path::PathBuf;
use std::result::Result as StdResult;

use crate::stage_manager::error::StageSystemError;
use crate::storage::error::StorageSystemError;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum Error {
    /// Specific, typed stage system error
    #[error("Stage system error: {0}")]
    StageSystem(#[from] StageSystemError),

    /// Specific, typed storage system error
    #[error("Storage system error: {0}")]
    StorageSystem(#[from] StorageSystemError),

    #[error("Transition '{name}' is already registered")]
    TransitionAlreadyExists { name: String },

    #[error("Transition '{name}' is not registered")]
    TransitionNotFound { name: String },

    /// A run did not reach its transition end within the frame budget,
    /// usually because a stage behavior never finished its stage.
    #[error("Run of transition '{transition}' stalled after {frames} frames (last stage: {})", .stage.map(|s| s.name()).unwrap_or("<none>"))]
    RunStalled {
        transition: String,
        frames: u64,
        stage: Option<crate::stage_manager::Stage>,
    },

    /// Generic error with message
    #[error("Error: {0}")]
    Other(String),
}

/// Shorthand for Result with our Error type
pub type Result<T> = StdResult<T, Error>;

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Other(msg.to_string())
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Other(msg)
    }
}

// Helper to create an I/O error with context, wrapped as a storage error
impl Error {
    pub fn io(source: std::io::Error, operation: impl Into<String>, path: PathBuf) -> Self {
        Error::StorageSystem(StorageSystemError::io(source, operation, path))
    }
}
