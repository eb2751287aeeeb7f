//! Hotkey Controller: samples the stop and pause keys at a fixed cadence.
//!
//! Stop is level-triggered, pause is edge-triggered with a one-interval
//! debounce. Key state comes from a [`KeyState`] capability, so a push-based
//! hook can replace polling without touching the engines.

use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::{Duration, Instant};

use pianokeys_types::{HotkeyConfig, HotkeyError};

use crate::clock::{Clock, SystemClock};

/// Fixed hotkey poll cadence.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Whether a named key is currently held down.
pub trait KeyState: Send + Sync {
    fn is_key_held(&self, name: &str) -> bool;
}

/// Never reports a key as held.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoKeys;

impl KeyState for NoKeys {
    fn is_key_held(&self, _name: &str) -> bool {
        false
    }
}

#[derive(Debug, Default)]
struct PauseEdge {
    was_held: bool,
    last_toggle: Option<Instant>,
}

pub struct HotkeyController {
    keys: Arc<dyn KeyState>,
    config: RwLock<HotkeyConfig>,
    pause_edge: Mutex<PauseEdge>,
    debounce: Duration,
    clock: Arc<dyn Clock>,
}

impl HotkeyController {
    pub fn new(keys: Arc<dyn KeyState>, config: HotkeyConfig) -> Self {
        Self {
            keys,
            config: RwLock::new(config),
            pause_edge: Mutex::new(PauseEdge::default()),
            debounce: POLL_INTERVAL,
            clock: Arc::new(SystemClock),
        }
    }

    /// Time source for the debounce window.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Minimum time between two registered pause toggles.
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn config(&self) -> HotkeyConfig {
        self.config
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace both hotkeys at once. On error the previous pair stays active.
    /// A new pause key that is already down does not count as a press, and the
    /// debounce window carries over.
    pub fn update(&self, stop: &str, pause: &str) -> Result<HotkeyConfig, HotkeyError> {
        let next = HotkeyConfig::new(stop, pause)?;
        let mut edge = self.pause_edge.lock().unwrap_or_else(PoisonError::into_inner);
        *self.config.write().unwrap_or_else(PoisonError::into_inner) = next.clone();
        edge.was_held = self.keys.is_key_held(next.pause());
        drop(edge);
        log::debug!(target: "hotkeys", "stop={} pause={}", next.stop(), next.pause());
        Ok(next)
    }

    /// Level-triggered: true for as long as the stop key is held.
    pub fn poll_stop(&self) -> bool {
        let config = self.config.read().unwrap_or_else(PoisonError::into_inner);
        self.keys.is_key_held(config.stop())
    }

    /// Edge-triggered: true only on a released-to-held transition, and only
    /// if the previous registered toggle is at least one debounce window old.
    pub fn poll_pause(&self) -> bool {
        let held = {
            let config = self.config.read().unwrap_or_else(PoisonError::into_inner);
            self.keys.is_key_held(config.pause())
        };
        let mut edge = self.pause_edge.lock().unwrap_or_else(PoisonError::into_inner);
        let rising = held && !edge.was_held;
        edge.was_held = held;
        if !rising {
            return false;
        }
        let now = self.clock.now();
        if let Some(last) = edge.last_toggle {
            if now.duration_since(last) < self.debounce {
                log::debug!(target: "hotkeys", "pause edge inside debounce window ignored");
                return false;
            }
        }
        edge.last_toggle = Some(now);
        true
    }
}
