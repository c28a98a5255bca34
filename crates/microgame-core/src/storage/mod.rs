//! # Microgame Core Storage
//!
//! Runtime configuration: the typed [`RuntimeConfig`] and its loading from
//! JSON, YAML or TOML files (the last two behind the `yaml-config` and
//! `toml-config` features), format picked from the file extension.
pub mod config;
pub mod error;

/// Re-export key types
pub use config::{ConfigFormat, EngineConfig, RuntimeConfig, SessionConfig, TransitionConfig};
pub use error::StorageSystemError;
