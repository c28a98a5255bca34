//! # Microgame Core Stage Manager
//!
//! The stage sequencing engine behind microgame transitions (the "you win",
//! "speed up", "boss stage" banners played between microgames).
//!
//! A transition is configured once through a definition callback that
//! registers a behavior per [`Stage`]. Each call to
//! [`TransitionHandle::trigger`] then plays a sequence of stages: the
//! [`StageController`] enters the first stage, and every time the active
//! stage's behavior calls [`StageController::finish_stage`] it moves on to the
//! next one, until the last stage finishes and the run tears itself down.
//!
//! - [`controller`]: run state, stage behaviors, advancement and teardown.
//! - [`handle`]: the caller-facing [`TransitionHandle`].
//! - [`definition`]: the one-shot definition contract and
//!   [`create_transition`].
//! - [`core_transition`]: the built-in transition covering every stage.
pub mod controller;
pub mod core_transition;
pub mod definition;
pub mod error;
pub mod handle;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::stage_manager::error::StageSystemError;

/// A named phase of a transition animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Stage {
    /// "Get ready" before a microgame
    Prep,
    /// The microgame was cleared
    Win,
    /// The microgame was failed
    Lose,
    /// "Get ready" before a boss microgame
    BossPrep,
    BossWin,
    BossLose,
    /// Tempo goes up
    Speed,
}

impl Stage {
    /// Every stage kind
    pub const ALL: [Stage; 7] = [
        Stage::Prep,
        Stage::Win,
        Stage::Lose,
        Stage::BossPrep,
        Stage::BossWin,
        Stage::BossLose,
        Stage::Speed,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Stage::Prep => "prep",
            Stage::Win => "win",
            Stage::Lose => "lose",
            Stage::BossPrep => "bossPrep",
            Stage::BossWin => "bossWin",
            Stage::BossLose => "bossLose",
            Stage::Speed => "speed",
        }
    }

    pub fn is_boss(&self) -> bool {
        matches!(self, Stage::BossPrep | Stage::BossWin | Stage::BossLose)
    }

    /// Stages that lead into a microgame and show its prompt
    pub fn is_prep(&self) -> bool {
        matches!(self, Stage::Prep | Stage::BossPrep)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Stage {
    type Err = StageSystemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Stage::ALL
            .into_iter()
            .find(|stage| stage.name() == s)
            .ok_or_else(|| StageSystemError::UnknownStage { name: s.to_string() })
    }
}

/// Parse a list of stage names, failing on the first unknown one
pub fn parse_stages<S: AsRef<str>>(names: &[S]) -> Result<Vec<Stage>, StageSystemError> {
    names.iter().map(|name| name.as_ref().parse()).collect()
}

// Re-export important types
pub use controller::{ControllerOptions, LifecycleChannels, StageController, TriggerPolicy};
pub use core_transition::{DefaultTransition, StageBeats};
pub use definition::{create_transition, DefinitionError, TransitionContext};
pub use handle::{TransitionHandle, TransitionObserver};

// Test module declaration
#[cfg(test)]
mod tests;
