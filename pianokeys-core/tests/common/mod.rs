#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use pianokeys_core::actuator::RecordingActuator;
use pianokeys_core::clock::Clock;
use pianokeys_core::engine::Engine;
use pianokeys_core::hotkeys::{HotkeyController, KeyState};
use pianokeys_core::log_sink::{MemorySink, SessionLog};
use pianokeys_core::mapping::NoteMapper;
use pianokeys_core::midi::{LiveInput, LiveRecv, MidiBackend, NoteStream, SourceError};
use pianokeys_core::router::NoteRouter;
use pianokeys_core::session::SessionContext;
use pianokeys_core::simulator::KeySimulator;
use pianokeys_types::{HotkeyConfig, NoteEvent};

// ---------------------------------------------------------------------------
// Key state
// ---------------------------------------------------------------------------

#[derive(Default)]
struct KeyScript {
    samples: VecDeque<bool>,
    rest: bool,
    queries: usize,
}

/// Key-state source driven by per-key scripts. Each query of a key pops the
/// next scripted sample; once the script runs out the key reports `rest`.
#[derive(Default)]
pub struct ScriptedKeys {
    keys: Mutex<HashMap<String, KeyScript>>,
}

impl ScriptedKeys {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn script(&self, key: &str, samples: &[bool], rest: bool) {
        let mut keys = self.keys.lock().unwrap();
        let entry = keys.entry(key.to_string()).or_default();
        entry.samples = samples.iter().copied().collect();
        entry.rest = rest;
    }

    pub fn hold(&self, key: &str) {
        self.script(key, &[], true);
    }

    pub fn release(&self, key: &str) {
        self.script(key, &[], false);
    }

    pub fn queries(&self, key: &str) -> usize {
        self.keys.lock().unwrap().get(key).map_or(0, |k| k.queries)
    }
}

impl KeyState for ScriptedKeys {
    fn is_key_held(&self, name: &str) -> bool {
        let mut keys = self.keys.lock().unwrap();
        let entry = keys.entry(name.to_string()).or_default();
        entry.queries += 1;
        entry.samples.pop_front().unwrap_or(entry.rest)
    }
}

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Records requested sleeps; only yields briefly so watcher loops don't spin hot.
/// Its `now` advances by exactly the time slept.
pub struct ManualClock {
    start: Instant,
    slept: Mutex<Duration>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self {
            start: Instant::now(),
            slept: Mutex::new(Duration::ZERO),
        }
    }
}

impl ManualClock {
    pub fn total(&self) -> Duration {
        *self.slept.lock().unwrap()
    }
}

impl Clock for ManualClock {
    fn sleep(&self, duration: Duration) {
        *self.slept.lock().unwrap() += duration;
        std::thread::sleep(Duration::from_micros(50));
    }

    fn now(&self) -> Instant {
        self.start + self.total()
    }
}

// ---------------------------------------------------------------------------
// MIDI backend
// ---------------------------------------------------------------------------

/// Item of a fake file: an event or a read fault.
pub type FakeItem = Result<NoteEvent, String>;

#[derive(Clone)]
pub struct FakeDevice {
    pub events: Vec<NoteEvent>,
    /// Close the stream once the events are drained; otherwise time out forever.
    pub close_when_drained: bool,
}

#[derive(Default)]
pub struct FakeMidi {
    files: Mutex<HashMap<PathBuf, Vec<FakeItem>>>,
    devices: Mutex<Vec<(String, FakeDevice)>>,
    fail_open: AtomicBool,
    pub opens: AtomicUsize,
    pub enumerations: AtomicUsize,
    pub closes: Arc<AtomicUsize>,
}

impl FakeMidi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn add_file(&self, path: &str, events: Vec<NoteEvent>) {
        self.add_file_items(path, events.into_iter().map(Ok).collect());
    }

    pub fn add_file_items(&self, path: &str, items: Vec<FakeItem>) {
        self.files.lock().unwrap().insert(PathBuf::from(path), items);
    }

    pub fn add_device(&self, name: &str, device: FakeDevice) {
        self.devices.lock().unwrap().push((name.to_string(), device));
    }

    /// Drop `name` from the enumeration, as if it were unplugged.
    pub fn remove_device(&self, name: &str) {
        self.devices.lock().unwrap().retain(|(n, _)| n != name);
    }

    pub fn fail_open(&self) {
        self.fail_open.store(true, Ordering::SeqCst);
    }

    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

impl MidiBackend for FakeMidi {
    fn load_file(&self, path: &Path) -> Result<NoteStream, SourceError> {
        let items = self.files.lock().unwrap().get(path).cloned().ok_or_else(|| {
            SourceError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "no such file",
            ))
        })?;
        Ok(Box::new(
            items.into_iter().map(|item| item.map_err(SourceError::Read)),
        ))
    }

    fn input_names(&self) -> Vec<String> {
        self.enumerations.fetch_add(1, Ordering::SeqCst);
        self.devices
            .lock()
            .unwrap()
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }

    fn open_input(&self, name: &str) -> Result<Box<dyn LiveInput>, SourceError> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        if self.fail_open.load(Ordering::SeqCst) {
            return Err(SourceError::Device("port busy".to_string()));
        }
        let device = self
            .devices
            .lock()
            .unwrap()
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, d)| d.clone())
            .ok_or_else(|| SourceError::Device("gone".to_string()))?;
        Ok(Box::new(FakeInput {
            events: device.events.into_iter().collect(),
            close_when_drained: device.close_when_drained,
            closes: Arc::clone(&self.closes),
        }))
    }
}

struct FakeInput {
    events: VecDeque<NoteEvent>,
    close_when_drained: bool,
    closes: Arc<AtomicUsize>,
}

impl LiveInput for FakeInput {
    fn next_event(&mut self, _timeout: Duration) -> LiveRecv {
        match self.events.pop_front() {
            Some(event) => LiveRecv::Event(event),
            None if self.close_when_drained => LiveRecv::Closed,
            None => {
                std::thread::sleep(Duration::from_millis(1));
                LiveRecv::Timeout
            }
        }
    }

    fn close(self: Box<Self>) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

pub struct Harness {
    pub keys: Arc<ScriptedKeys>,
    pub midi: Arc<FakeMidi>,
    pub recorder: RecordingActuator,
    pub simulator: KeySimulator,
    pub sink: Arc<MemorySink>,
    pub clock: Arc<ManualClock>,
    pub hotkeys: Arc<HotkeyController>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_debounce(pianokeys_core::hotkeys::POLL_INTERVAL)
    }

    pub fn with_debounce(debounce: Duration) -> Self {
        let keys = ScriptedKeys::new();
        let recorder = RecordingActuator::new();
        let clock = Arc::new(ManualClock::default());
        let hotkeys = Arc::new(
            HotkeyController::new(keys.clone(), HotkeyConfig::default())
                .with_debounce(debounce)
                .with_clock(clock.clone()),
        );
        Self {
            keys,
            midi: FakeMidi::new(),
            simulator: KeySimulator::new(recorder.clone()),
            recorder,
            sink: Arc::new(MemorySink::new()),
            clock,
            hotkeys,
        }
    }

    pub fn context(&self) -> SessionContext {
        SessionContext {
            router: NoteRouter::new(Arc::new(NoteMapper::virtual_piano()), self.simulator.clone()),
            hotkeys: Arc::clone(&self.hotkeys),
            backend: self.midi.clone(),
            clock: self.clock.clone(),
            log: SessionLog::new(self.sink.clone()),
        }
    }

    pub fn engine(&self) -> Engine {
        Engine::new(
            self.midi.clone(),
            self.simulator.clone(),
            Arc::clone(&self.hotkeys),
            self.sink.clone(),
        )
        .with_clock(self.clock.clone())
    }
}

pub fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

pub fn on(note: u8, delay_ms: u64) -> NoteEvent {
    NoteEvent::note_on(note, 100, ms(delay_ms))
}
