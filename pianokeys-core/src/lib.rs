//! # pianokeys-core
//!
//! Translates note events, from a MIDI file or a live input device, into
//! keystrokes for a fixed virtual-piano layout. Independent of any front-end.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use pianokeys_core::prelude::*;
//!
//! let settings = Settings::load();
//! let hotkeys = Arc::new(HotkeyController::new(Arc::new(NoKeys), settings.hotkeys()));
//! let (tx, rx) = crossbeam_channel::unbounded();
//! let engine = Engine::new(
//!     Arc::new(SystemMidi::new()),
//!     KeySimulator::new(DryRunActuator),
//!     hotkeys,
//!     Arc::new(ChannelSink::new(tx)),
//! );
//!
//! let session = engine.play_file("song.mid")?;
//! for line in rx.iter() { println!("{}", line); }
//! session.join();
//! ```
//!
//! ## Module Overview
//!
//! - [`mapping`]: note number to virtual-piano key (`NoteMapper`)
//! - [`simulator`]: serialized press/release pulses with shift bracketing
//! - [`actuator`]: the key injection capability and its dry-run/recording impls
//! - [`hotkeys`]: polled stop (level) and pause (edge, debounced) hotkeys
//! - [`playback`]: the file playback state machine
//! - [`listener`]: live device listening with a stop-hotkey watcher
//! - [`engine`]: session lifecycle, one session at a time
//! - [`midi`]: `midly` file loading and `midir` device input
//! - [`settings`]: JSON settings with silent fallback to defaults
//! - [`log_sink`]: the one-way message channel to the front-end

pub mod actuator;
pub mod clock;
pub mod engine;
pub mod error;
pub mod hotkeys;
pub mod listener;
pub mod log_sink;
pub mod mapping;
pub mod midi;
pub mod playback;
pub mod router;
pub mod session;
pub mod settings;
pub mod simulator;

pub mod prelude {
    pub use crate::actuator::{DryRunActuator, KeyActuator, KeyCode};
    pub use crate::clock::{Clock, SystemClock};
    pub use crate::engine::Engine;
    pub use crate::error::{CoreError, CoreResult};
    pub use crate::hotkeys::{HotkeyController, KeyState, NoKeys, POLL_INTERVAL};
    pub use crate::log_sink::{ChannelSink, LogSink, SessionLog};
    pub use crate::mapping::NoteMapper;
    pub use crate::midi::{MidiBackend, SystemMidi, NO_DEVICES_SENTINEL};
    pub use crate::session::{SessionHandle, SessionKind, SessionOutcome};
    pub use crate::settings::Settings;
    pub use crate::simulator::KeySimulator;
    pub use pianokeys_types::{HotkeyConfig, KeyId, NoteEvent, NoteEventKind, PlaybackState};
}
