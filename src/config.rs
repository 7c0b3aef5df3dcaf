/// User settings
///
/// Stored as JSON in the user's config directory:
/// - Linux: ~/.config/svg-converter/settings.json
/// - macOS: ~/Library/Application Support/svg-converter/settings.json
/// - Windows: %APPDATA%\svg-converter\settings.json
///
/// A missing file means defaults. A broken file is logged and ignored.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::export::DOWNLOAD_FILE_NAME;
use crate::state::debounce::DEBOUNCE_MS;
use crate::state::params::SliderKnob;

const APP_DIR: &str = "svg-converter";
const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not read settings: {0}")]
    Read(String),

    #[error("Invalid settings file: {0}")]
    Parse(String),

    #[error("Could not write settings: {0}")]
    Write(String),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Quiescence window before a slider value is committed
    pub debounce_ms: u64,
    /// What the slider controls
    pub slider: SliderKnob,
    /// File name suggested in the save dialog
    pub download_name: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debounce_ms: DEBOUNCE_MS,
            slider: SliderKnob::default(),
            download_name: DOWNLOAD_FILE_NAME.to_string(),
        }
    }
}

impl Settings {
    pub fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Default location of the settings file, if the platform has one
    pub fn default_path() -> Option<PathBuf> {
        let mut path = dirs::config_dir().or_else(dirs::home_dir)?;
        path.push(APP_DIR);
        path.push(SETTINGS_FILE);
        Some(path)
    }

    /// Read settings from `path`; `Ok(None)` when the file does not exist
    pub fn read(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }

        let json = std::fs::read_to_string(path).map_err(|e| ConfigError::Read(e.to_string()))?;
        Self::from_json(&json)
            .map(Some)
            .map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load settings, falling back to defaults on any problem
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            log::warn!("⚠️  No config directory available, using default settings");
            return Self::default();
        };

        match Self::read(path) {
            Ok(Some(settings)) => {
                log::info!("⚙️  Loaded settings from {}", path.display());
                settings
            }
            Ok(None) => {
                // first run: leave an editable file behind
                let settings = Self::default();
                if let Err(e) = settings.save(path) {
                    log::warn!("⚠️  {}", e);
                }
                settings
            }
            Err(e) => {
                log::warn!("⚠️  {} ({}), using defaults", e, path.display());
                Self::default()
            }
        }
    }

    /// Write settings to `path`, creating parent directories
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write(e.to_string()))?;
        }
        let json = self.to_json().map_err(|e| ConfigError::Write(e.to_string()))?;
        std::fs::write(path, json).map_err(|e| ConfigError::Write(e.to_string()))
    }
}
