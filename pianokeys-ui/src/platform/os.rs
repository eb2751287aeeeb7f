//! Real keyboard: `enigo` for injection, `device_query` for held keys.
//!
//! Both handles live on dedicated threads so the rest of the program only
//! shares channels and a snapshot set.

use std::collections::HashSet;
use std::sync::{Arc, PoisonError, RwLock};
use std::thread;
use std::time::Duration;

use crossbeam_channel::Sender;
use device_query::{DeviceQuery, DeviceState, Keycode};
use enigo::{Direction, Enigo, Key, Keyboard, Settings};
use pianokeys_core::actuator::{ActuatorError, ActuatorResult, KeyActuator, KeyCode};
use pianokeys_core::hotkeys::KeyState;

/// How often the held-key snapshot is refreshed.
const SAMPLE_INTERVAL: Duration = Duration::from_millis(10);

/// Single-consumer queue in front of the thread that owns `Enigo`.
pub struct EnigoActuator {
    tx: Sender<(KeyCode, Direction)>,
}

impl EnigoActuator {
    pub fn spawn() -> Result<Self, String> {
        let (tx, rx) = crossbeam_channel::unbounded::<(KeyCode, Direction)>();
        let (ready_tx, ready_rx) = crossbeam_channel::bounded::<Result<(), String>>(1);

        thread::Builder::new()
            .name("key-actuator".to_string())
            .spawn(move || {
                let mut enigo = match Enigo::new(&Settings::default()) {
                    Ok(enigo) => {
                        let _ = ready_tx.send(Ok(()));
                        enigo
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(e.to_string()));
                        return;
                    }
                };
                for (code, direction) in rx.iter() {
                    let key = match code {
                        KeyCode::Shift => Key::Shift,
                        KeyCode::Char(c) => Key::Unicode(c),
                    };
                    if let Err(e) = enigo.key(key, direction) {
                        log::warn!(target: "keys", "{:?} {:?} failed: {}", code, direction, e);
                    }
                }
            })
            .map_err(|e| e.to_string())?;

        ready_rx.recv().map_err(|e| e.to_string())??;
        Ok(Self { tx })
    }

    fn send(&self, code: KeyCode, direction: Direction) -> ActuatorResult {
        self.tx
            .send((code, direction))
            .map_err(|_| ActuatorError("key actuator thread is gone".to_string()))
    }
}

impl KeyActuator for EnigoActuator {
    fn press(&mut self, key: KeyCode) -> ActuatorResult {
        self.send(key, Direction::Press)
    }

    fn release(&mut self, key: KeyCode) -> ActuatorResult {
        self.send(key, Direction::Release)
    }
}

/// Held keys, sampled by a background thread.
pub struct PolledKeys {
    held: Arc<RwLock<HashSet<String>>>,
}

impl PolledKeys {
    pub fn spawn() -> Self {
        let held = Arc::new(RwLock::new(HashSet::new()));
        let writer = Arc::clone(&held);
        let spawned = thread::Builder::new()
            .name("key-sampler".to_string())
            .spawn(move || {
                let device = DeviceState::new();
                loop {
                    let keys: HashSet<String> = device.get_keys().iter().map(key_name).collect();
                    *writer.write().unwrap_or_else(PoisonError::into_inner) = keys;
                    thread::sleep(SAMPLE_INTERVAL);
                }
            });
        if let Err(e) = spawned {
            log::warn!(target: "hotkeys", "key sampler not started, hotkeys disabled: {}", e);
        }
        Self { held }
    }
}

impl KeyState for PolledKeys {
    fn is_key_held(&self, name: &str) -> bool {
        self.held
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(name)
    }
}

/// `F1` -> `f1`, `Key7` -> `7`, `Escape` -> `escape`.
fn key_name(key: &Keycode) -> String {
    let name = format!("{:?}", key).to_lowercase();
    match name.strip_prefix("key") {
        Some(digit) if digit.len() == 1 && digit.chars().all(|c| c.is_ascii_digit()) => {
            digit.to_string()
        }
        _ => name,
    }
}
