//! Error kinds surfaced at the core's boundaries.

use std::fmt;

use pianokeys_types::HotkeyError;

use crate::midi::SourceError;

pub type CoreResult<T = ()> = Result<T, CoreError>;

/// Every variant is logged once where it is raised and leaves the engine in
/// an unchanged or terminal state. Unmapped notes are not errors.
#[derive(Debug)]
pub enum CoreError {
    /// A note file could not be opened or parsed.
    Load(SourceError),
    /// The device name is not in the current enumeration.
    DeviceNotFound(String),
    /// The device exists but a subscription could not be opened.
    DeviceOpen { device: String, source: SourceError },
    /// A hotkey update was rejected; the previous pair is kept.
    Validation(HotkeyError),
    /// Another file or device session is still running.
    SessionActive,
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::Load(e) => write!(f, "could not load MIDI file: {}", e),
            CoreError::DeviceNotFound(name) => write!(f, "MIDI device not found: {}", name),
            CoreError::DeviceOpen { device, source } => {
                write!(f, "could not open MIDI device {}: {}", device, source)
            }
            CoreError::Validation(e) => write!(f, "invalid hotkeys: {}", e),
            CoreError::SessionActive => write!(f, "a playback or listener session is already running"),
        }
    }
}

impl std::error::Error for CoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CoreError::Load(e) => Some(e),
            CoreError::DeviceOpen { source, .. } => Some(source),
            CoreError::Validation(e) => Some(e),
            CoreError::DeviceNotFound(_) | CoreError::SessionActive => None,
        }
    }
}

impl From<HotkeyError> for CoreError {
    fn from(e: HotkeyError) -> Self {
        Self::Validation(e)
    }
}
