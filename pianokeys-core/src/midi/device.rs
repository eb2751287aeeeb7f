//! Live MIDI input ports via `midir`.

use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError};
use midir::{MidiInput, MidiInputConnection};
use pianokeys_types::NoteEvent;

use super::{LiveInput, LiveRecv, SourceError};

/// Port names visible right now. A fresh `MidiInput` is created on every
/// call since devices come and go between sessions.
pub fn input_names(client_name: &str) -> Vec<String> {
    let midi_in = match MidiInput::new(client_name) {
        Ok(m) => m,
        Err(e) => {
            log::warn!(target: "midi", "MIDI input unavailable: {}", e);
            return Vec::new();
        }
    };
    midi_in
        .ports()
        .iter()
        .filter_map(|port| midi_in.port_name(port).ok())
        .collect()
}

/// An open connection to one input port. Parsed events arrive over a
/// channel fed by the driver callback.
pub struct DeviceInput {
    connection: Option<MidiInputConnection<()>>,
    events: Receiver<NoteEvent>,
}

impl DeviceInput {
    /// Connect to the first port whose name matches `device` exactly.
    pub fn open(client_name: &str, device: &str) -> Result<Self, SourceError> {
        let midi_in = MidiInput::new(client_name).map_err(|e| SourceError::Device(e.to_string()))?;
        let port = midi_in
            .ports()
            .into_iter()
            .find(|port| midi_in.port_name(port).map_or(false, |name| name == device))
            .ok_or_else(|| SourceError::Device(format!("port {} is no longer available", device)))?;

        let (tx, rx) = crossbeam_channel::unbounded();
        let mut last_timestamp: Option<u64> = None;
        let connection = midi_in
            .connect(
                &port,
                "pianokeys-input",
                move |timestamp, message, _| {
                    let delay = last_timestamp
                        .map(|last| Duration::from_micros(timestamp.saturating_sub(last)))
                        .unwrap_or(Duration::ZERO);
                    last_timestamp = Some(timestamp);
                    if let Some(event) = parse_midi_message(message, delay) {
                        let _ = tx.send(event);
                    }
                },
                (),
            )
            .map_err(|e| SourceError::Device(e.to_string()))?;

        log::debug!(target: "midi", "connected to {}", device);
        Ok(Self {
            connection: Some(connection),
            events: rx,
        })
    }
}

impl LiveInput for DeviceInput {
    fn next_event(&mut self, timeout: Duration) -> LiveRecv {
        match self.events.recv_timeout(timeout) {
            Ok(event) => LiveRecv::Event(event),
            Err(RecvTimeoutError::Timeout) => LiveRecv::Timeout,
            Err(RecvTimeoutError::Disconnected) => LiveRecv::Closed,
        }
    }

    fn close(mut self: Box<Self>) {
        if let Some(conn) = self.connection.take() {
            conn.close();
        }
    }
}

impl Drop for DeviceInput {
    fn drop(&mut self) {
        if let Some(conn) = self.connection.take() {
            conn.close();
        }
    }
}

/// Parse a raw channel message. Note-on with velocity 0 is a note-off;
/// every other well-formed channel message becomes `Other`.
fn parse_midi_message(data: &[u8], delay: Duration) -> Option<NoteEvent> {
    let status = *data.first()?;
    match status & 0xF0 {
        0x80 if data.len() >= 3 => Some(NoteEvent::note_off(data[1], delay)),
        0x90 if data.len() >= 3 => {
            let velocity = data[2];
            if velocity == 0 {
                Some(NoteEvent::note_off(data[1], delay))
            } else {
                Some(NoteEvent::note_on(data[1], velocity, delay))
            }
        }
        0xA0 | 0xB0 | 0xE0 if data.len() >= 3 => Some(NoteEvent::other(delay)),
        0xC0 | 0xD0 if data.len() >= 2 => Some(NoteEvent::other(delay)),
        _ => None,
    }
}
