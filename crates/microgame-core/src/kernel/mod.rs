//! # Microgame Core Kernel
//!
//! The `kernel` module ties the crate together for a host that wants a
//! ready-made runtime rather than the individual pieces.
//!
//! ## Key Responsibilities & Components:
//!
//! - **Application Bootstrapping**: [`Application`](bootstrap::Application)
//!   builds the game session, the headless engine and the default transition
//!   from a [`RuntimeConfig`](crate::storage::RuntimeConfig), and steps the
//!   frame loop that plays stage sequences.
//! - **Core Constants**: defaults shared by the config layer and the CLI, in
//!   the `constants` submodule.
//! - **Error Handling**: the crate-wide [`Error`](error::Error), wrapping each
//!   subsystem's error enum, and the matching `Result` alias.
pub mod bootstrap;
pub mod constants;
pub mod error;

pub use bootstrap::{Application, PlayReport, RunRecorder};
pub use error::{Error, Result};
// Test module declaration
#[cfg(test)]
mod tests;
