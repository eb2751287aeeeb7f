use std::fmt;

pub const DEFAULT_STOP_KEY: &str = "f1";
pub const DEFAULT_PAUSE_KEY: &str = "f2";

/// Why a hotkey pair was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HotkeyError {
    EmptyStop,
    EmptyPause,
    SameKey,
}

impl fmt::Display for HotkeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HotkeyError::EmptyStop => write!(f, "stop hotkey cannot be empty"),
            HotkeyError::EmptyPause => write!(f, "pause hotkey cannot be empty"),
            HotkeyError::SameKey => write!(f, "stop and pause hotkeys cannot be the same"),
        }
    }
}

impl std::error::Error for HotkeyError {}

/// Stop/pause key names. Both are non-empty and distinct; the only way to
/// build one is through [`HotkeyConfig::new`], which normalizes and checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HotkeyConfig {
    stop: String,
    pause: String,
}

impl HotkeyConfig {
    /// Names are trimmed and lowercased before validation.
    pub fn new(stop: &str, pause: &str) -> Result<Self, HotkeyError> {
        let stop = stop.trim().to_lowercase();
        let pause = pause.trim().to_lowercase();
        if stop.is_empty() {
            return Err(HotkeyError::EmptyStop);
        }
        if pause.is_empty() {
            return Err(HotkeyError::EmptyPause);
        }
        if stop == pause {
            return Err(HotkeyError::SameKey);
        }
        Ok(Self { stop, pause })
    }

    pub fn stop(&self) -> &str {
        &self.stop
    }

    pub fn pause(&self) -> &str {
        &self.pause
    }
}

impl Default for HotkeyConfig {
    fn default() -> Self {
        Self {
            stop: DEFAULT_STOP_KEY.to_string(),
            pause: DEFAULT_PAUSE_KEY.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalizes_names() {
        let config = HotkeyConfig::new("  F3 ", "Escape").unwrap();
        assert_eq!(config.stop(), "f3");
        assert_eq!(config.pause(), "escape");
    }

    #[test]
    fn test_rejects_empty_and_equal() {
        assert_eq!(HotkeyConfig::new("", "f2"), Err(HotkeyError::EmptyStop));
        assert_eq!(HotkeyConfig::new("f1", "   "), Err(HotkeyError::EmptyPause));
        assert_eq!(HotkeyConfig::new("f1", "F1"), Err(HotkeyError::SameKey));
    }

    #[test]
    fn test_default_pair() {
        let config = HotkeyConfig::default();
        assert_eq!(config.stop(), "f1");
        assert_eq!(config.pause(), "f2");
    }
}
