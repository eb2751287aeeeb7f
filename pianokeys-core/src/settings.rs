//! User settings: theme flag and hotkey pair, stored as JSON.
//!
//! Loading never fails. A missing, unreadable or malformed file yields the
//! defaults with a warning; a stored hotkey pair that is empty or
//! self-colliding is replaced by the default pair.

use std::path::{Path, PathBuf};

use pianokeys_types::{HotkeyConfig, DEFAULT_PAUSE_KEY, DEFAULT_STOP_KEY};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    #[serde(alias = "darkMode")]
    pub dark_mode: bool,
    #[serde(alias = "hotkeyStop")]
    pub hotkey_stop: String,
    #[serde(alias = "hotkeyPause")]
    pub hotkey_pause: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dark_mode: false,
            hotkey_stop: DEFAULT_STOP_KEY.to_string(),
            hotkey_pause: DEFAULT_PAUSE_KEY.to_string(),
        }
    }
}

impl Settings {
    /// Load from the user config path, or defaults.
    pub fn load() -> Self {
        match settings_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        let settings = match std::fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str::<Settings>(&contents) {
                Ok(settings) => settings,
                Err(e) => {
                    log::warn!(target: "config", "ignoring malformed settings {}: {}", path.display(), e);
                    return Self::default();
                }
            },
            Err(e) => {
                log::warn!(target: "config", "could not read settings {}: {}", path.display(), e);
                return Self::default();
            }
        };
        settings.sanitized()
    }

    /// Write pretty JSON, creating the parent directory if needed.
    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, json)
    }

    pub fn save(&self) -> std::io::Result<()> {
        match settings_path() {
            Some(path) => self.save_to(&path),
            None => Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "no config directory on this platform",
            )),
        }
    }

    pub fn hotkeys(&self) -> HotkeyConfig {
        HotkeyConfig::new(&self.hotkey_stop, &self.hotkey_pause).unwrap_or_default()
    }

    pub fn set_hotkeys(&mut self, hotkeys: &HotkeyConfig) {
        self.hotkey_stop = hotkeys.stop().to_string();
        self.hotkey_pause = hotkeys.pause().to_string();
    }

    fn sanitized(mut self) -> Self {
        match HotkeyConfig::new(&self.hotkey_stop, &self.hotkey_pause) {
            Ok(hotkeys) => self.set_hotkeys(&hotkeys),
            Err(e) => {
                log::warn!(target: "config", "stored hotkeys rejected ({}), using defaults", e);
                self.set_hotkeys(&HotkeyConfig::default());
            }
        }
        self
    }
}

pub fn settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("pianokeys").join("config.json"))
}
