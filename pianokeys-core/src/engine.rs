//! Engine: the entry point a front-end drives.
//!
//! Owns the shared collaborators and enforces that at most one file or
//! device session runs at a time. Sessions run on their own threads; the
//! caller gets a [`SessionHandle`] back and learns everything else through
//! the log sink.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;

use pianokeys_types::HotkeyConfig;

use crate::clock::{Clock, SystemClock};
use crate::error::{CoreError, CoreResult};
use crate::hotkeys::HotkeyController;
use crate::listener::{self, LiveListener};
use crate::log_sink::{LogSink, SessionLog};
use crate::mapping::NoteMapper;
use crate::midi::{MidiBackend, SourceError, NO_DEVICES_SENTINEL};
use crate::playback::PlaybackEngine;
use crate::router::NoteRouter;
use crate::session::{CancelToken, SessionContext, SessionHandle, SessionKind, SessionOutcome};
use crate::simulator::KeySimulator;

type ActiveSlot = Arc<Mutex<Option<(SessionKind, CancelToken)>>>;

/// Frees the active slot when the worker returns or unwinds.
struct SlotGuard(ActiveSlot);

impl Drop for SlotGuard {
    fn drop(&mut self) {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

pub struct Engine {
    mapper: Arc<NoteMapper>,
    simulator: KeySimulator,
    hotkeys: Arc<HotkeyController>,
    backend: Arc<dyn MidiBackend>,
    clock: Arc<dyn Clock>,
    log: SessionLog,
    active: ActiveSlot,
}

impl Engine {
    pub fn new(
        backend: Arc<dyn MidiBackend>,
        simulator: KeySimulator,
        hotkeys: Arc<HotkeyController>,
        sink: Arc<dyn LogSink>,
    ) -> Self {
        Self {
            mapper: Arc::new(NoteMapper::virtual_piano()),
            simulator,
            hotkeys,
            backend,
            clock: Arc::new(SystemClock),
            log: SessionLog::new(sink),
            active: Arc::new(Mutex::new(None)),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_mapper(mut self, mapper: NoteMapper) -> Self {
        self.mapper = Arc::new(mapper);
        self
    }

    pub fn hotkeys(&self) -> &Arc<HotkeyController> {
        &self.hotkeys
    }

    /// Input device names, queried fresh. An empty enumeration becomes the
    /// single sentinel entry.
    pub fn devices(&self) -> Vec<String> {
        let names = self.backend.input_names();
        if names.is_empty() {
            vec![NO_DEVICES_SENTINEL.to_string()]
        } else {
            names
        }
    }

    /// Validate and apply a new hotkey pair. The outcome is logged once.
    pub fn update_hotkeys(&self, stop: &str, pause: &str) -> CoreResult<HotkeyConfig> {
        match self.hotkeys.update(stop, pause) {
            Ok(config) => {
                self.log.with_target("hotkeys").info(&format!(
                    "Hotkeys saved! Stop: {}, Pause: {}",
                    config.stop().to_uppercase(),
                    config.pause().to_uppercase()
                ));
                Ok(config)
            }
            Err(e) => {
                let err = CoreError::Validation(e);
                self.log.with_target("hotkeys").error(&err.to_string());
                Err(err)
            }
        }
    }

    pub fn is_busy(&self) -> bool {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Arm the running session's cancellation token. Returns false when idle.
    pub fn stop(&self) -> bool {
        let active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        match active.as_ref() {
            Some((kind, cancel)) => {
                let what = match kind {
                    SessionKind::File => "playback",
                    SessionKind::Device => "MIDI device listener",
                };
                self.log.info(&format!("Stopping {}.", what));
                cancel.cancel();
                true
            }
            None => false,
        }
    }

    /// Play a note file on a worker thread. Load failures end the session
    /// as `Failed`; they are reported through the log and the outcome.
    pub fn play_file(&self, path: impl AsRef<Path>) -> CoreResult<SessionHandle> {
        let cancel = self.claim(SessionKind::File)?;
        let guard = SlotGuard(Arc::clone(&self.active));
        let engine = PlaybackEngine::new(self.context("playback"), cancel.clone());
        let path: PathBuf = path.as_ref().to_path_buf();

        let worker = thread::spawn(move || {
            let _guard = guard;
            SessionOutcome::Playback(engine.start(&path))
        });
        Ok(SessionHandle::new(SessionKind::File, cancel, worker))
    }

    /// Listen to `device` on a worker thread. Returns once the subscription
    /// is open, or with the error that prevented it.
    pub fn listen(&self, device: &str) -> CoreResult<SessionHandle> {
        let cancel = self.claim(SessionKind::Device)?;
        let guard = SlotGuard(Arc::clone(&self.active));
        if let Err(err) = listener::check_device(self.backend.as_ref(), device) {
            self.log.with_target("listener").error(&err.to_string());
            return Err(err);
        }
        let session = LiveListener::new(self.context("listener"), cancel.clone(), device);

        let (opened_tx, opened_rx) = crossbeam_channel::bounded::<CoreResult<()>>(1);
        let worker = thread::spawn(move || {
            let _guard = guard;
            // The subscription lives and dies on this thread.
            let input = match session.open() {
                Ok(input) => {
                    let _ = opened_tx.send(Ok(()));
                    input
                }
                Err(e) => {
                    let _ = opened_tx.send(Err(e));
                    return SessionOutcome::Aborted;
                }
            };
            SessionOutcome::Listener(session.run(input))
        });

        match opened_rx.recv() {
            Ok(Ok(())) => Ok(SessionHandle::new(SessionKind::Device, cancel, worker)),
            Ok(Err(e)) => {
                // Join so the slot is free before the caller can retry.
                let _ = worker.join();
                Err(e)
            }
            Err(_) => {
                let _ = worker.join();
                let err = CoreError::DeviceOpen {
                    device: device.to_string(),
                    source: SourceError::Device("listener thread exited".to_string()),
                };
                self.log.with_target("listener").error(&err.to_string());
                Err(err)
            }
        }
    }

    fn claim(&self, kind: SessionKind) -> CoreResult<CancelToken> {
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        if active.is_some() {
            let err = CoreError::SessionActive;
            self.log.error(&err.to_string());
            return Err(err);
        }
        let cancel = CancelToken::new();
        *active = Some((kind, cancel.clone()));
        Ok(cancel)
    }

    fn context(&self, target: &'static str) -> SessionContext {
        SessionContext {
            router: NoteRouter::new(Arc::clone(&self.mapper), self.simulator.clone()),
            hotkeys: Arc::clone(&self.hotkeys),
            backend: Arc::clone(&self.backend),
            clock: Arc::clone(&self.clock),
            log: self.log.with_target(target),
        }
    }
}
