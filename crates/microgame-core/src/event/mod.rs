//! # Microgame Core Event System
//!
//! Synchronous, typed publish/subscribe primitives used by the stage
//! sequencing engine and by the host glue around it.
//!
//! - [`EventChannel`] is the multi-subscriber channel. Handlers run in
//!   subscription order, on the caller's stack, against a snapshot of the
//!   subscriber list taken when `trigger` starts.
//! - [`Subscription`] is the handle returned by `subscribe`; it can be
//!   cancelled through the channel or on its own.
//! - [`TransitionEvent`] flattens the five transition lifecycle channels into
//!   one value for observers that want a single stream.
pub mod channel;
pub mod types;

/// Identifier handed out for each subscription, unique per channel
pub type SubscriptionId = u64;

/// Re-export important types
pub use channel::{EventChannel, Handler, Subscription};
pub use types::TransitionEvent;
