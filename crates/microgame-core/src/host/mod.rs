//! # Microgame Core Host Interfaces
//!
//! The stage sequencing engine runs inside a host: a rendering/audio engine
//! that owns the scene graph and the frame clock, and an application that
//! owns the player's run (speed, lives, difficulty). This module defines the
//! narrow slice of both that transitions consume, plus headless
//! implementations used by the CLI and the tests.
//!
//! - [`HostEngine`]: node creation, viewport, delayed callbacks.
//! - [`HostApp`]: read-only ambient run state.
//! - [`scene`]: shared scene nodes and the capability views handed to
//!   transition definitions.
//! - [`HeadlessEngine`] / [`GameSession`]: in-memory implementations.
//! - [`BeatClock`]: derives once-per-beat callbacks from a playback position.
pub mod beat;
pub mod engine;
pub mod scene;
pub mod session;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use beat::BeatClock;
pub use engine::{HeadlessEngine, TimerId};
pub use scene::{CameraNode, ParentNode, SceneNode, Vec2};
pub use session::{GameSession, SessionState};

/// Callback scheduled with [`HostEngine::wait`]
pub type WaitCallback = Box<dyn FnOnce() + Send>;

/// Visible area of the host's screen, in world units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }
}

/// Difficulty tier of the current run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Normal,
    Hard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "easy"),
            Difficulty::Normal => write!(f, "normal"),
            Difficulty::Hard => write!(f, "hard"),
        }
    }
}

/// The rendering/audio engine hosting the transitions.
pub trait HostEngine: Send + Sync {
    /// Create a root-level scene node
    fn add_node(&self, name: &str) -> SceneNode;

    /// Current viewport
    fn viewport(&self) -> Viewport;

    /// Engine time in seconds since start
    fn time(&self) -> f64;

    /// Run `callback` once, `seconds` from now, from the frame loop
    fn wait(&self, seconds: f32, callback: WaitCallback) -> TimerId;
}

/// The application hosting the transitions. Read-only from a transition's
/// point of view.
pub trait HostApp: Send + Sync {
    /// Current speed multiplier, `1.0` at the start of a run
    fn speed(&self) -> f32;

    /// Lives left
    fn lives(&self) -> u32;

    fn difficulty(&self) -> Difficulty;
}
