use std::sync::Arc;

use pianokeys_types::NoteEvent;

use crate::mapping::NoteMapper;
use crate::simulator::KeySimulator;

/// The note-on path shared by file playback and live listening:
/// audible note-on -> mapper -> simulator. Everything else is a no-op.
#[derive(Clone)]
pub struct NoteRouter {
    mapper: Arc<NoteMapper>,
    simulator: KeySimulator,
}

impl NoteRouter {
    pub fn new(mapper: Arc<NoteMapper>, simulator: KeySimulator) -> Self {
        Self { mapper, simulator }
    }

    /// Returns true if a key pulse was emitted.
    pub fn route(&self, event: &NoteEvent) -> bool {
        if !event.is_audible_note_on() {
            return false;
        }
        let Some(key) = self.mapper.map(i32::from(event.note)) else {
            return false;
        };
        match self.simulator.press(key) {
            Ok(()) => true,
            Err(e) => {
                log::warn!(target: "keys", "could not press {}: {}", key, e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actuator::RecordingActuator;
    use std::time::Duration;

    fn router() -> (NoteRouter, RecordingActuator) {
        let recorder = RecordingActuator::new();
        let router = NoteRouter::new(
            Arc::new(NoteMapper::virtual_piano()),
            KeySimulator::new(recorder.clone()),
        );
        (router, recorder)
    }

    #[test]
    fn test_only_audible_mapped_note_ons_press() {
        let (router, recorder) = router();
        assert!(router.route(&NoteEvent::note_on(48, 100, Duration::ZERO)));
        assert!(!router.route(&NoteEvent::note_on(48, 0, Duration::ZERO)));
        assert!(!router.route(&NoteEvent::note_off(48, Duration::ZERO)));
        assert!(!router.route(&NoteEvent::note_on(20, 100, Duration::ZERO)));
        assert!(!router.route(&NoteEvent::other(Duration::ZERO)));
        assert_eq!(recorder.pressed_chars(), vec!['1']);
    }

    #[test]
    fn test_velocity_does_not_change_the_pulse() {
        let (router, recorder) = router();
        router.route(&NoteEvent::note_on(60, 1, Duration::ZERO));
        let soft = recorder.operations();
        recorder.clear();
        router.route(&NoteEvent::note_on(60, 127, Duration::ZERO));
        assert_eq!(recorder.operations(), soft);
    }
}
