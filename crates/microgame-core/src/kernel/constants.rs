/// Application name
pub const APP_NAME: &str = "Microgame";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Config file looked up in the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "microgame.toml";

/// Name the built-in transition is registered under
pub const DEFAULT_TRANSITION: &str = "default";

/// Tempo of the transition music
pub const DEFAULT_BPM: f32 = 120.0;

/// Fixed-step frame rate of the headless loop
pub const DEFAULT_FRAME_RATE: u32 = 60;

/// Highest accepted frame rate. Above it a frame no longer has a usable
/// duration for realtime pacing.
pub const MAX_FRAME_RATE: u32 = 1000;

/// Lives at the start of a session
pub const DEFAULT_LIVES: u32 = 4;

/// Speed added each time a speed stage finishes
pub const DEFAULT_SPEED_STEP: f32 = 0.25;

/// Frames a single run may take before it is considered stalled
pub const DEFAULT_MAX_FRAMES: u64 = 36_000;

pub const DEFAULT_VIEWPORT_WIDTH: f32 = 800.0;
pub const DEFAULT_VIEWPORT_HEIGHT: f32 = 600.0;
