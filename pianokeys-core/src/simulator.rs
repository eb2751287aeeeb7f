//! Key Simulator: turns a [`KeyId`] into one press/release pulse on the
//! shared actuator, bracketing shifted keys with shift down/up.

use std::sync::{Arc, Mutex, PoisonError};

use pianokeys_types::KeyId;

use crate::actuator::{ActuatorResult, KeyActuator, KeyCode};

/// How a key is typed on a US layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stroke {
    Plain(char),
    Shifted(char),
}

/// Uppercase letters and symbols need shift; the pressed key is the
/// lowercase letter or the digit the symbol sits on.
pub fn stroke_for(key: KeyId) -> Stroke {
    let c = key.as_char();
    if c.is_alphabetic() && c.is_uppercase() {
        Stroke::Shifted(c.to_lowercase().next().unwrap_or(c))
    } else if !c.is_alphanumeric() {
        Stroke::Shifted(unshifted_symbol(c))
    } else {
        Stroke::Plain(c)
    }
}

fn unshifted_symbol(c: char) -> char {
    match c {
        '!' => '1',
        '@' => '2',
        '#' => '3',
        '$' => '4',
        '%' => '5',
        '^' => '6',
        '&' => '7',
        '*' => '8',
        '(' => '9',
        ')' => '0',
        other => other,
    }
}

/// Single-owner handle to the actuator. Clones share the same actuator and
/// lock, so every press sequence from every session is serialized end to end.
#[derive(Clone)]
pub struct KeySimulator {
    actuator: Arc<Mutex<Box<dyn KeyActuator>>>,
}

impl KeySimulator {
    pub fn new(actuator: impl KeyActuator + 'static) -> Self {
        Self {
            actuator: Arc::new(Mutex::new(Box::new(actuator))),
        }
    }

    /// Emit exactly one discrete pulse for `key`. The whole sequence,
    /// including the shift bracket, runs under the actuator lock.
    pub fn press(&self, key: KeyId) -> ActuatorResult {
        let mut guard = self
            .actuator
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let actuator: &mut dyn KeyActuator = &mut **guard;
        match stroke_for(key) {
            Stroke::Plain(c) => tap(actuator, c),
            Stroke::Shifted(c) => {
                actuator.press(KeyCode::Shift)?;
                let tapped = tap(actuator, c);
                // Shift is released even if the tap failed.
                let released = actuator.release(KeyCode::Shift);
                tapped.and(released)
            }
        }
    }
}

fn tap(actuator: &mut dyn KeyActuator, c: char) -> ActuatorResult {
    actuator.press(KeyCode::Char(c))?;
    actuator.release(KeyCode::Char(c))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actuator::{ActuatorError, KeyOp, RecordingActuator};

    #[test]
    fn test_stroke_classification() {
        assert_eq!(stroke_for(KeyId::new('q')), Stroke::Plain('q'));
        assert_eq!(stroke_for(KeyId::new('7')), Stroke::Plain('7'));
        assert_eq!(stroke_for(KeyId::new('Q')), Stroke::Shifted('q'));
        assert_eq!(stroke_for(KeyId::new('!')), Stroke::Shifted('1'));
        assert_eq!(stroke_for(KeyId::new('(')), Stroke::Shifted('9'));
        assert_eq!(stroke_for(KeyId::new('$')), Stroke::Shifted('4'));
    }

    #[test]
    fn test_plain_key_is_press_release() {
        let recorder = RecordingActuator::new();
        let sim = KeySimulator::new(recorder.clone());
        sim.press(KeyId::new('t')).unwrap();
        assert_eq!(
            recorder.operations(),
            vec![
                KeyOp::Press(KeyCode::Char('t')),
                KeyOp::Release(KeyCode::Char('t')),
            ]
        );
    }

    #[test]
    fn test_shifted_key_is_bracketed() {
        let recorder = RecordingActuator::new();
        let sim = KeySimulator::new(recorder.clone());
        sim.press(KeyId::new('T')).unwrap();
        assert_eq!(
            recorder.operations(),
            vec![
                KeyOp::Press(KeyCode::Shift),
                KeyOp::Press(KeyCode::Char('t')),
                KeyOp::Release(KeyCode::Char('t')),
                KeyOp::Release(KeyCode::Shift),
            ]
        );
    }

    #[derive(Clone, Default)]
    struct FailingTap {
        ops: Arc<Mutex<Vec<KeyOp>>>,
    }

    impl KeyActuator for FailingTap {
        fn press(&mut self, key: KeyCode) -> ActuatorResult {
            self.ops.lock().unwrap().push(KeyOp::Press(key));
            match key {
                KeyCode::Shift => Ok(()),
                KeyCode::Char(_) => Err(ActuatorError("injection refused".into())),
            }
        }

        fn release(&mut self, key: KeyCode) -> ActuatorResult {
            self.ops.lock().unwrap().push(KeyOp::Release(key));
            Ok(())
        }
    }

    #[test]
    fn test_shift_released_when_tap_fails() {
        let actuator = FailingTap::default();
        let sim = KeySimulator::new(actuator.clone());
        assert!(sim.press(KeyId::new('@')).is_err());
        assert_eq!(
            *actuator.ops.lock().unwrap(),
            vec![
                KeyOp::Press(KeyCode::Shift),
                KeyOp::Press(KeyCode::Char('2')),
                KeyOp::Release(KeyCode::Shift),
            ]
        );
    }

    #[test]
    fn test_presses_from_many_threads_never_interleave() {
        let recorder = RecordingActuator::with_delay(std::time::Duration::from_micros(200));
        let sim = KeySimulator::new(recorder.clone());
        let handles: Vec<_> = ['Q', 'w', '!', 'E']
            .into_iter()
            .map(|c| {
                let sim = sim.clone();
                std::thread::spawn(move || {
                    for _ in 0..10 {
                        sim.press(KeyId::new(c)).unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let ops = recorder.operations();
        assert_eq!(ops.len(), 10 * (4 + 2 + 4 + 4));
        let mut i = 0;
        while i < ops.len() {
            match ops[i] {
                KeyOp::Press(KeyCode::Shift) => {
                    let KeyOp::Press(KeyCode::Char(c)) = ops[i + 1] else {
                        panic!("shift bracket interrupted at {}", i);
                    };
                    assert_eq!(ops[i + 2], KeyOp::Release(KeyCode::Char(c)));
                    assert_eq!(ops[i + 3], KeyOp::Release(KeyCode::Shift));
                    i += 4;
                }
                KeyOp::Press(KeyCode::Char(c)) => {
                    assert_eq!(ops[i + 1], KeyOp::Release(KeyCode::Char(c)));
                    i += 2;
                }
                other => panic!("unexpected {:?} at {}", other, i),
            }
        }
    }
}
