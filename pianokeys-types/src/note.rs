use std::time::Duration;

use serde::{Deserialize, Serialize};

/// What a [`NoteEvent`] signals. Anything that is not a note boundary
/// (controllers, meta events, sysex) collapses into `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoteEventKind {
    NoteOn,
    NoteOff,
    Other,
}

/// A single event from a file or device, immutable once read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteEvent {
    pub kind: NoteEventKind,
    pub note: u8,
    pub velocity: u8,
    /// Wall time since the previous event in the same stream.
    pub delay: Duration,
}

impl NoteEvent {
    pub fn note_on(note: u8, velocity: u8, delay: Duration) -> Self {
        Self {
            kind: NoteEventKind::NoteOn,
            note,
            velocity,
            delay,
        }
    }

    pub fn note_off(note: u8, delay: Duration) -> Self {
        Self {
            kind: NoteEventKind::NoteOff,
            note,
            velocity: 0,
            delay,
        }
    }

    pub fn other(delay: Duration) -> Self {
        Self {
            kind: NoteEventKind::Other,
            note: 0,
            velocity: 0,
            delay,
        }
    }

    /// True for a note-on that actually sounds. A note-on with velocity 0 is
    /// a note-off by convention.
    pub fn is_audible_note_on(&self) -> bool {
        self.kind == NoteEventKind::NoteOn && self.velocity > 0
    }
}
