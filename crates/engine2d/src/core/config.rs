//! # Engine Configuration
//!
//! Configuration structures for the engine and its game loop. Every field has
//! a default so that partial TOML/RON files only need to mention what they
//! change.

use serde::{Serialize, Deserialize};

use crate::foundation::math::Size;

pub use crate::config::{Config, ConfigError};

/// # Loop Configuration
///
/// Pacing of the driver that calls the entity collection once per frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoopConfig {
    /// Frames per second the driver aims for (0 = unpaced)
    pub ticks_per_second: u32,
    /// Stop after this many frames (None = run until quit)
    pub max_frames: Option<u64>,
}

impl LoopConfig {
    /// Create a loop configuration with the default 60 ticks per second
    pub fn new() -> Self {
        Self {
            ticks_per_second: 60,
            max_frames: None,
        }
    }

    /// Set the tick rate
    pub fn with_ticks_per_second(mut self, ticks: u32) -> Self {
        self.ticks_per_second = ticks;
        self
    }

    /// Limit the number of frames
    pub fn with_max_frames(mut self, frames: u64) -> Self {
        self.max_frames = Some(frames);
        self
    }
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// # Debug Configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// Keep a bounding box visualizer for every collision-capable entity
    pub show_bounding_boxes: bool,
    /// Log the statistics snapshot every N frames (0 = never)
    pub statistics_log_interval: u64,
}

/// # Engine Configuration
///
/// Top-level configuration applications hand to the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Game title, used in log output
    pub title: String,
    /// Width of the game area
    pub width: f64,
    /// Height of the game area
    pub height: f64,
    /// Default log filter (overridden by `RUST_LOG`)
    pub log_level: String,
    /// Driver pacing
    pub game_loop: LoopConfig,
    /// Debug features
    pub debug: DebugConfig,
}

impl EngineConfig {
    /// Create a new engine configuration with a 640x480 game area
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            width: 640.0,
            height: 480.0,
            log_level: "info".to_string(),
            game_loop: LoopConfig::default(),
            debug: DebugConfig::default(),
        }
    }

    /// Set the game area size
    pub fn with_size(mut self, size: Size) -> Self {
        self.width = size.width;
        self.height = size.height;
        self
    }

    /// Set log level
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Set the loop configuration
    pub fn with_loop(mut self, game_loop: LoopConfig) -> Self {
        self.game_loop = game_loop;
        self
    }

    /// Enable bounding box visualization
    pub fn with_bounding_boxes(mut self, enabled: bool) -> Self {
        self.debug.show_bounding_boxes = enabled;
        self
    }

    /// Size of the game area
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.size().is_empty() {
            return Err(ConfigError::Invalid(format!(
                "game size must be positive, got {}x{}",
                self.width, self.height
            )));
        }

        if self.game_loop.ticks_per_second == 0 && self.game_loop.max_frames.is_none() {
            return Err(ConfigError::Invalid(
                "an unpaced loop needs max_frames to terminate".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new("Engine2D Game")
    }
}

impl Config for EngineConfig {}
