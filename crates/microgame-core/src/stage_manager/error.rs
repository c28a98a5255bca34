//! # Microgame Core Stage Manager Errors
//!
//! Defines error types specific to the stage sequencing engine.
//!
//! Everything here is an authoring error: a stage behavior finishing the
//! wrong stage, a caller re-triggering a running transition, a sequence that
//! names a stage nobody defined. None of it comes from I/O.
use thiserror::Error;

use crate::stage_manager::Stage;

#[derive(Debug, Error)]
pub enum StageSystemError {
    #[error("Unknown stage '{name}'")]
    UnknownStage { name: String },

    #[error("Transition '{transition}' was triggered with an empty stage sequence")]
    EmptySequence { transition: String },

    #[error("Transition '{transition}' has no active run")]
    NoActiveRun { transition: String },

    #[error("Transition '{transition}': stage '{stage}' is not active (current stage: {})", .current.map(|s| s.name()).unwrap_or("<none>"))]
    StageNotActive {
        transition: String,
        stage: Stage,
        current: Option<Stage>,
    },

    #[error("Transition '{transition}' is still running stage '{current}'")]
    RunInProgress { transition: String, current: Stage },

    #[error("Transition '{transition}' has no behavior registered for stage '{stage}'")]
    MissingBehavior { transition: String, stage: Stage },

    #[error("Definition of transition '{transition}' failed: {source}")]
    DefinitionFailed {
        transition: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },
}
