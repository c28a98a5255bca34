//! Stage sequencing for microgame transitions.
//!
//! A transition is defined once against its host (scene nodes, timers,
//! read-only game state) and then triggered with a sequence of stages. The
//! controller walks the sequence one stage at a time, publishing the
//! lifecycle on typed event channels, and tears itself down when the last
//! stage finishes.
pub mod event;
pub mod host;
pub mod kernel;
pub mod stage_manager;
pub mod storage;

// Re-export key public types for the binary and host integrations
pub use event::{EventChannel, Subscription, TransitionEvent};
pub use host::{GameSession, HeadlessEngine, HostApp, HostEngine};
pub use kernel::error::Error as KernelError;
pub use kernel::{Application, PlayReport};
pub use stage_manager::{create_transition, Stage, StageController, TransitionContext, TransitionHandle};
pub use storage::RuntimeConfig;

#[cfg(test)]
mod tests;
