//! PlayerConfig data structure
//!
//! Playback settings loadable from a JSON file. Every field has a default so
//! a partial file (or none at all) is valid.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{PlayerError, Result};

/// Frame rate used when the stream does not declare one
pub const DEFAULT_FRAME_RATE: f64 = 25.0;

/// How a rational average frame rate is turned into frames per second
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum FrameRateMode {
    /// Integer division of numerator by denominator (29.97 plays at 29)
    #[default]
    Truncate,
    /// Round to the nearest whole frame rate (29.97 plays at 30)
    Nearest,
}

/// Player configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Fallback frame rate for streams without an average frame rate
    #[serde(default = "default_frame_rate")]
    pub default_frame_rate: f64,

    /// Rational to fps conversion
    #[serde(default)]
    pub frame_rate_mode: FrameRateMode,

    /// Sync presentation to the display refresh
    #[serde(default = "default_true")]
    pub vsync: bool,

    /// Window title
    #[serde(default = "default_window_title")]
    pub window_title: String,

    /// Close the window when Escape is pressed
    #[serde(default = "default_true")]
    pub close_on_escape: bool,
}

fn default_frame_rate() -> f64 {
    DEFAULT_FRAME_RATE
}

fn default_true() -> bool {
    true
}

fn default_window_title() -> String {
    "Video Player".to_string()
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            default_frame_rate: default_frame_rate(),
            frame_rate_mode: FrameRateMode::default(),
            vsync: true,
            window_title: default_window_title(),
            close_on_escape: true,
        }
    }
}

impl PlayerConfig {
    /// Load configuration from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| PlayerError::Config(format!("{}: {}", path.display(), e)))?;
        let config: PlayerConfig = serde_json::from_str(&content)
            .map_err(|e| PlayerError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the pacer cannot work with
    pub fn validate(&self) -> Result<()> {
        if !self.default_frame_rate.is_finite() || self.default_frame_rate <= 0.0 {
            return Err(PlayerError::Config(format!(
                "default_frame_rate must be positive, got {}",
                self.default_frame_rate
            )));
        }
        Ok(())
    }
}
