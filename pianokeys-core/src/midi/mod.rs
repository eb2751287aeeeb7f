//! MIDI collaborators: note files (via `midly`) and live input ports (via
//! `midir`), behind the [`MidiBackend`] capability so the engines can be
//! driven by in-memory fakes.

pub mod device;
pub mod file;

use std::fmt;
use std::path::Path;
use std::time::Duration;

use pianokeys_types::NoteEvent;

/// Placeholder shown when enumeration finds nothing. It is never opened.
pub const NO_DEVICES_SENTINEL: &str = "No MIDI devices found";

/// Ordered events of one file, each item possibly a read fault.
pub type NoteStream = Box<dyn Iterator<Item = Result<NoteEvent, SourceError>> + Send>;

/// Error from a MIDI collaborator.
#[derive(Debug)]
pub enum SourceError {
    Io(std::io::Error),
    Parse(String),
    Unsupported(String),
    Device(String),
    /// Fault while a stream was already being consumed.
    Read(String),
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::Io(e) => write!(f, "IO error: {}", e),
            SourceError::Parse(e) => write!(f, "malformed MIDI data: {}", e),
            SourceError::Unsupported(what) => write!(f, "unsupported MIDI file: {}", what),
            SourceError::Device(e) => write!(f, "device error: {}", e),
            SourceError::Read(e) => write!(f, "read error: {}", e),
        }
    }
}

impl std::error::Error for SourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SourceError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SourceError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<midly::Error> for SourceError {
    fn from(e: midly::Error) -> Self {
        Self::Parse(e.to_string())
    }
}

/// Outcome of waiting on a live subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiveRecv {
    Event(NoteEvent),
    Timeout,
    /// The subscription ended; no more events will arrive.
    Closed,
}

/// An open streaming subscription to one input device.
pub trait LiveInput {
    fn next_event(&mut self, timeout: Duration) -> LiveRecv;
    fn close(self: Box<Self>);
}

/// File parsing, device enumeration and device subscription.
pub trait MidiBackend: Send + Sync {
    fn load_file(&self, path: &Path) -> Result<NoteStream, SourceError>;
    /// Freshly enumerated input port names. Never cached.
    fn input_names(&self) -> Vec<String>;
    fn open_input(&self, name: &str) -> Result<Box<dyn LiveInput>, SourceError>;
}

/// `midly` for files, `midir` for ports.
#[derive(Debug, Clone)]
pub struct SystemMidi {
    client_name: String,
}

impl SystemMidi {
    pub fn new() -> Self {
        Self {
            client_name: "pianokeys".to_string(),
        }
    }
}

impl Default for SystemMidi {
    fn default() -> Self {
        Self::new()
    }
}

impl MidiBackend for SystemMidi {
    fn load_file(&self, path: &Path) -> Result<NoteStream, SourceError> {
        let events = file::load(path)?;
        Ok(Box::new(events.into_iter().map(Ok::<_, SourceError>)))
    }

    fn input_names(&self) -> Vec<String> {
        device::input_names(&self.client_name)
    }

    fn open_input(&self, name: &str) -> Result<Box<dyn LiveInput>, SourceError> {
        let input = device::DeviceInput::open(&self.client_name, name)?;
        Ok(Box::new(input))
    }
}
