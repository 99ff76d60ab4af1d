//! Configuration for the demo shell

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::{FrameStyle, Rgba};

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Colors
    pub theme: Theme,
    /// Album art width in cells
    pub art_width: u32,
    /// Album art height in cells
    pub art_height: u32,
    /// Keyboard settings
    pub input: InputConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            art_width: 30,
            art_height: 15,
            input: InputConfig::default(),
        }
    }
}

/// Color theme, as packed `0xRRGGBBAA` values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub foreground: Rgba,
    pub background: Rgba,
    pub frame: Rgba,
    /// Filled part of the seek bar
    pub accent: Rgba,
    /// Unfilled part of the seek bar
    pub muted: Rgba,
    /// Broken-image glyphs
    pub error: Rgba,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            foreground: Rgba::WHITE,
            background: Rgba::BLACK,
            frame: Rgba::WHITE,
            accent: Rgba::WHITE,
            muted: Rgba::DARK_GRAY,
            error: Rgba::RED,
        }
    }
}

impl From<&Theme> for FrameStyle {
    fn from(theme: &Theme) -> Self {
        FrameStyle {
            color: theme.frame,
            ..FrameStyle::default()
        }
    }
}

/// Keyboard configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// How long a stdin poll waits before checking for shutdown
    pub poll_interval_ms: u64,
    /// Hotkey that quits
    pub quit_key: char,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 100,
            quit_key: 'q',
        }
    }
}

impl InputConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a file, creating its directory
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load from `~/.config/glyphframe/config.json`, or fall back to defaults
    pub fn load_or_default() -> Self {
        let Some(path) = default_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load(&path) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Ignoring unreadable config");
                Self::default()
            }
        }
    }
}

/// Default configuration file location
pub fn default_path() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| {
        PathBuf::from(home)
            .join(".config")
            .join("glyphframe")
            .join("config.json")
    })
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
