use std::fs;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};
#[cfg(feature = "yaml-config")]
use serde_yaml;
#[cfg(feature = "toml-config")]
use toml;

use crate::host::{Difficulty, Viewport};
use crate::kernel::constants;
use crate::stage_manager::{ControllerOptions, StageBeats};
use crate::storage::error::StorageSystemError;

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigFormat {
    /// JSON format (.json)
    Json,
    /// YAML format (.yaml, .yml) - requires "yaml-config" feature
    #[cfg(feature = "yaml-config")]
    Yaml,
    /// TOML format (.toml) - requires "toml-config" feature
    #[cfg(feature = "toml-config")]
    Toml,
}

impl ConfigFormat {
    /// Get the file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            ConfigFormat::Json => "json",
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => "yaml",
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => "toml",
        }
    }

    /// Determine format from file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_name)
    }

    /// Determine format from a name such as `"json"` or `"yml"`
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "json" => Some(ConfigFormat::Json),
            #[cfg(feature = "yaml-config")]
            "yaml" | "yml" => Some(ConfigFormat::Yaml),
            #[cfg(feature = "toml-config")]
            "toml" => Some(ConfigFormat::Toml),
            _ => None,
        }
    }
}

/// Starting state of a game session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub speed: f32,
    pub lives: u32,
    pub difficulty: Difficulty,
    /// Speed added when a speed stage finishes
    pub speed_step: f32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            speed: 1.0,
            lives: constants::DEFAULT_LIVES,
            difficulty: Difficulty::default(),
            speed_step: constants::DEFAULT_SPEED_STEP,
        }
    }
}

/// Timing and controller behaviour of the default transition
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionConfig {
    pub bpm: f32,
    pub controller: ControllerOptions,
    pub beats: StageBeats,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            bpm: constants::DEFAULT_BPM,
            controller: ControllerOptions::default(),
            beats: StageBeats::default(),
        }
    }
}

/// Headless engine settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub frame_rate: u32,
    pub viewport_width: f32,
    pub viewport_height: f32,
    /// Frames a run may take before it counts as stalled
    pub max_frames: u64,
}

impl EngineConfig {
    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.viewport_width, self.viewport_height)
    }

    /// Length of one frame in seconds
    pub fn frame_time(&self) -> f32 {
        1.0 / self.frame_rate as f32
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            frame_rate: constants::DEFAULT_FRAME_RATE,
            viewport_width: constants::DEFAULT_VIEWPORT_WIDTH,
            viewport_height: constants::DEFAULT_VIEWPORT_HEIGHT,
            max_frames: constants::DEFAULT_MAX_FRAMES,
        }
    }
}

/// Everything the runtime reads from its config file. Every field has a
/// default, so a partial (or empty) file is valid.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub session: SessionConfig,
    pub transition: TransitionConfig,
    pub engine: EngineConfig,
}

impl RuntimeConfig {
    /// Read, parse and validate a config file
    pub fn load(path: &Path) -> Result<Self, StorageSystemError> {
        let format = ConfigFormat::from_path(path).ok_or_else(|| {
            StorageSystemError::UnsupportedConfigFormat(path.display().to_string())
        })?;
        if !path.exists() {
            return Err(StorageSystemError::FileNotFound(path.to_path_buf()));
        }
        let data = fs::read_to_string(path)
            .map_err(|e| StorageSystemError::io(e, "read_config", path.to_path_buf()))?;
        debug!("Loading {:?} config from {}", format, path.display());
        let config = Self::deserialize(&data, format)?;
        config.validate()?;
        Ok(config)
    }

    /// Write the config, format picked from the extension
    pub fn save(&self, path: &Path) -> Result<(), StorageSystemError> {
        let format = ConfigFormat::from_path(path).ok_or_else(|| {
            StorageSystemError::UnsupportedConfigFormat(path.display().to_string())
        })?;
        let data = self.serialize(format)?;
        fs::write(path, data).map_err(|e| StorageSystemError::io(e, "write_config", path.to_path_buf()))
    }

    /// Serialize to string based on format
    pub fn serialize(&self, format: ConfigFormat) -> Result<String, StorageSystemError> {
        let serialization_error = |source: Box<dyn std::error::Error + Send + Sync>| {
            StorageSystemError::SerializationError {
                format: format.extension().to_string(),
                source,
            }
        };
        match format {
            ConfigFormat::Json => {
                serde_json::to_string_pretty(self).map_err(|e| serialization_error(Box::new(e)))
            }
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => serde_yaml::to_string(self).map_err(|e| serialization_error(Box::new(e))),
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => toml::to_string_pretty(self).map_err(|e| serialization_error(Box::new(e))),
        }
    }

    /// Deserialize from string based on format
    pub fn deserialize(data: &str, format: ConfigFormat) -> Result<Self, StorageSystemError> {
        let deserialization_error = |source: Box<dyn std::error::Error + Send + Sync>| {
            StorageSystemError::DeserializationError {
                format: format.extension().to_string(),
                source,
            }
        };
        match format {
            ConfigFormat::Json => serde_json::from_str(data).map_err(|e| deserialization_error(Box::new(e))),
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => {
                // An empty YAML document is `null`, not an empty mapping.
                if data.trim().is_empty() {
                    return Ok(Self::default());
                }
                serde_yaml::from_str(data).map_err(|e| deserialization_error(Box::new(e)))
            }
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => toml::from_str(data).map_err(|e| deserialization_error(Box::new(e))),
        }
    }

    /// Reject values the runtime cannot work with
    pub fn validate(&self) -> Result<(), StorageSystemError> {
        let invalid = |key: &str, reason: String| StorageSystemError::InvalidValue {
            key: key.to_string(),
            reason,
        };
        if !(self.transition.bpm > 0.0) {
            return Err(invalid("transition.bpm", format!("must be positive, got {}", self.transition.bpm)));
        }
        if !(self.session.speed > 0.0) {
            return Err(invalid("session.speed", format!("must be positive, got {}", self.session.speed)));
        }
        if !(self.session.speed_step >= 0.0) {
            return Err(invalid(
                "session.speed_step",
                format!("must not be negative, got {}", self.session.speed_step),
            ));
        }
        if self.engine.frame_rate == 0 {
            return Err(invalid("engine.frame_rate", "must be at least 1".to_string()));
        }
        if self.engine.frame_rate > constants::MAX_FRAME_RATE {
            return Err(invalid(
                "engine.frame_rate",
                format!("must be at most {}, got {}", constants::MAX_FRAME_RATE, self.engine.frame_rate),
            ));
        }
        if self.engine.max_frames == 0 {
            return Err(invalid("engine.max_frames", "must be at least 1".to_string()));
        }
        for stage in crate::stage_manager::Stage::ALL {
            let beats = self.transition.beats.get(stage);
            if !(beats >= 0.0) {
                return Err(invalid(
                    &format!("transition.beats.{stage}"),
                    format!("must not be negative, got {beats}"),
                ));
            }
        }
        Ok(())
    }
}
