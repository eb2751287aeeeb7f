//! Key actuator trait: the OS-level keystroke injection capability.
//!
//! `KeyActuator` captures what the simulator *means* to do (hold shift, tap a
//! character) independently of how the platform does it. This enables unit
//! testing of press sequences without touching the real input queue.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Result type for actuator operations.
pub type ActuatorResult = Result<(), ActuatorError>;

/// Error from an actuator operation.
#[derive(Debug, Clone)]
pub struct ActuatorError(pub String);

impl fmt::Display for ActuatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ActuatorError {}

impl From<String> for ActuatorError {
    fn from(s: String) -> Self {
        ActuatorError(s)
    }
}

/// A physical key as the actuator sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Shift,
    /// Unshifted character key.
    Char(char),
}

/// Press/release primitives of the platform input-injection layer.
pub trait KeyActuator: Send {
    fn press(&mut self, key: KeyCode) -> ActuatorResult;
    fn release(&mut self, key: KeyCode) -> ActuatorResult;
}

/// Logs keystrokes instead of injecting them.
#[derive(Debug, Default)]
pub struct DryRunActuator;

impl KeyActuator for DryRunActuator {
    fn press(&mut self, key: KeyCode) -> ActuatorResult {
        log::debug!(target: "keys", "press {:?}", key);
        Ok(())
    }

    fn release(&mut self, key: KeyCode) -> ActuatorResult {
        log::debug!(target: "keys", "release {:?}", key);
        Ok(())
    }
}

/// A recorded actuator call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOp {
    Press(KeyCode),
    Release(KeyCode),
}

/// An actuator that records all operations for assertions.
///
/// Clones share the same record, so a test can keep one handle while the
/// simulator owns the other. An optional per-operation delay widens the
/// window in which unsynchronized callers would interleave.
#[derive(Debug, Clone, Default)]
pub struct RecordingActuator {
    ops: Arc<Mutex<Vec<KeyOp>>>,
    delay: Duration,
}

impl RecordingActuator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            ops: Arc::default(),
            delay,
        }
    }

    /// Return all recorded operations.
    pub fn operations(&self) -> Vec<KeyOp> {
        self.ops
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Characters that were pressed, in order.
    pub fn pressed_chars(&self) -> Vec<char> {
        self.operations()
            .into_iter()
            .filter_map(|op| match op {
                KeyOp::Press(KeyCode::Char(c)) => Some(c),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.ops
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn record(&self, op: KeyOp) -> ActuatorResult {
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        self.ops
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(op);
        Ok(())
    }
}

impl KeyActuator for RecordingActuator {
    fn press(&mut self, key: KeyCode) -> ActuatorResult {
        self.record(KeyOp::Press(key))
    }

    fn release(&mut self, key: KeyCode) -> ActuatorResult {
        self.record(KeyOp::Release(key))
    }
}
