//! Startup settings.
//!
//! Loaded from a JSON file given as the first command line argument or through
//! `TORNADO_CONFIG`. Every field is optional:
//!
//! ```json
//! { "initial_point_count": 50000, "rotation_rate": 0.5 }
//! ```

use crate::error::ConfigError;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable naming a settings file.
pub const CONFIG_ENV: &str = "TORNADO_CONFIG";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Points generated at startup.
    pub initial_point_count: i64,
    /// Upper bound of the point count slider.
    pub max_point_count: i64,
    /// Initial spin rate in revs/sec.
    pub rotation_rate: f32,
    /// Point diameter in pixels.
    pub point_size: f32,
    /// Initial window width; height follows the 4:3 canvas.
    pub window_width: u32,
    pub vsync: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            initial_point_count: 10_000,
            max_point_count: 100_000,
            rotation_rate: 0.2,
            point_size: 1.5,
            window_width: 640,
            vsync: true,
        }
    }
}

impl Settings {
    /// Parse settings from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read settings from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Settings from the command line argument or environment, else defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let path = std::env::args()
            .nth(1)
            .or_else(|| std::env::var(CONFIG_ENV).ok())
            .map(PathBuf::from);

        match path {
            Some(path) => {
                log::info!("Loading settings from {}", path.display());
                Self::load(&path)
            }
            None => Ok(Self::default()),
        }
    }
}
