//! # pianokeys-types
//!
//! Plain data shared by the translation core and the shell: note events read
//! from files or devices, virtual-keyboard key identifiers, the playback state
//! machine and the hotkey pair.

mod hotkey;
mod key;
mod note;
mod playback;

pub use hotkey::{HotkeyConfig, HotkeyError, DEFAULT_PAUSE_KEY, DEFAULT_STOP_KEY};
pub use key::KeyId;
pub use note::{NoteEvent, NoteEventKind};
pub use playback::PlaybackState;
