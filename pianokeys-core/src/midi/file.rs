//! Standard MIDI file loading.
//!
//! Tracks are merged into one time-ordered stream and tick deltas are
//! converted to wall time with the running tempo map, so the playback
//! engine only ever sees "wait this long, then handle this event".

use std::path::Path;
use std::time::Duration;

use midly::{Format, MetaMessage, MidiMessage, Smf, Timing, TrackEventKind};
use pianokeys_types::NoteEvent;

use super::SourceError;

/// Microseconds per quarter note until the first tempo event.
pub const DEFAULT_TEMPO_US: u32 = 500_000;

pub fn load(path: &Path) -> Result<Vec<NoteEvent>, SourceError> {
    let data = std::fs::read(path)?;
    parse(&data)
}

pub fn parse(data: &[u8]) -> Result<Vec<NoteEvent>, SourceError> {
    let smf = Smf::parse(data)?;
    if smf.header.format == Format::Sequential {
        return Err(SourceError::Unsupported(
            "format 2 (sequential tracks) cannot be played as one stream".to_string(),
        ));
    }
    let clock = TickClock::new(smf.header.timing)?;

    // (absolute tick, track index, kind). The sort is stable, so events on
    // the same tick keep track order and then in-track order.
    let mut merged: Vec<(u64, usize, TrackEventKind)> = Vec::new();
    for (index, track) in smf.tracks.iter().enumerate() {
        let mut tick: u64 = 0;
        for event in track {
            tick += u64::from(event.delta.as_int());
            merged.push((tick, index, event.kind));
        }
    }
    merged.sort_by_key(|&(tick, index, _)| (tick, index));

    let mut tempo_us = DEFAULT_TEMPO_US;
    let mut last_tick: u64 = 0;
    let mut events = Vec::with_capacity(merged.len());
    for (tick, _, kind) in merged {
        let delay = clock.duration(tick - last_tick, tempo_us);
        last_tick = tick;
        // A tempo change applies from the next delta on.
        if let TrackEventKind::Meta(MetaMessage::Tempo(tempo)) = kind {
            tempo_us = tempo.as_int();
        }
        events.push(to_note_event(kind, delay));
    }
    Ok(events)
}

fn to_note_event(kind: TrackEventKind, delay: Duration) -> NoteEvent {
    match kind {
        TrackEventKind::Midi {
            message: MidiMessage::NoteOn { key, vel },
            ..
        } => NoteEvent::note_on(key.as_int(), vel.as_int(), delay),
        TrackEventKind::Midi {
            message: MidiMessage::NoteOff { key, .. },
            ..
        } => NoteEvent::note_off(key.as_int(), delay),
        _ => NoteEvent::other(delay),
    }
}

#[derive(Debug, Clone, Copy)]
enum TickClock {
    /// Ticks per quarter note; wall time depends on tempo.
    Metrical(u64),
    /// Fixed ticks per second.
    Timecode(f64),
}

impl TickClock {
    fn new(timing: Timing) -> Result<Self, SourceError> {
        match timing {
            Timing::Metrical(tpb) if tpb.as_int() == 0 => Err(SourceError::Unsupported(
                "zero ticks per beat".to_string(),
            )),
            Timing::Metrical(tpb) => Ok(TickClock::Metrical(u64::from(tpb.as_int()))),
            Timing::Timecode(fps, subframes) => {
                let per_second = f64::from(fps.as_f32()) * f64::from(subframes.max(1));
                Ok(TickClock::Timecode(per_second))
            }
        }
    }

    fn duration(self, ticks: u64, tempo_us: u32) -> Duration {
        match self {
            TickClock::Metrical(tpb) => {
                let micros = u128::from(ticks) * u128::from(tempo_us) / u128::from(tpb);
                Duration::from_micros(u64::try_from(micros).unwrap_or(u64::MAX))
            }
            TickClock::Timecode(per_second) => Duration::from_secs_f64(ticks as f64 / per_second),
        }
    }
}
