//! Per-session handles. Each `start` builds a fresh session with its own
//! cancellation token; nothing outlives it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use crate::clock::Clock;
use crate::hotkeys::HotkeyController;
use crate::listener::ListenerReport;
use crate::log_sink::SessionLog;
use crate::midi::MidiBackend;
use crate::playback::PlaybackReport;
use crate::router::NoteRouter;

/// Collaborators every session borrows. Cloned into each worker.
#[derive(Clone)]
pub struct SessionContext {
    pub router: NoteRouter,
    pub hotkeys: Arc<HotkeyController>,
    pub backend: Arc<dyn MidiBackend>,
    pub clock: Arc<dyn Clock>,
    pub log: SessionLog,
}

/// Shared cancellation flag. Readers may see a set flag up to one poll
/// interval late.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionKind {
    File,
    Device,
}

/// How a session ended.
#[derive(Debug, Clone)]
pub enum SessionOutcome {
    Playback(PlaybackReport),
    Listener(ListenerReport),
    /// The session never got going; the error went back to the caller.
    Aborted,
    /// The worker thread panicked; already logged.
    Crashed,
}

/// Handle to a running session, returned to the caller instead of a bare thread.
#[derive(Debug)]
pub struct SessionHandle {
    kind: SessionKind,
    cancel: CancelToken,
    worker: Option<JoinHandle<SessionOutcome>>,
}

impl SessionHandle {
    pub(crate) fn new(
        kind: SessionKind,
        cancel: CancelToken,
        worker: JoinHandle<SessionOutcome>,
    ) -> Self {
        Self {
            kind,
            cancel,
            worker: Some(worker),
        }
    }

    pub fn kind(&self) -> SessionKind {
        self.kind
    }

    /// Ask the session to wind down. It notices at its next poll.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.worker.as_ref().map_or(true, |w| w.is_finished())
    }

    /// Wait for the session to end.
    pub fn join(mut self) -> SessionOutcome {
        match self.worker.take() {
            Some(worker) => worker.join().unwrap_or_else(|_| {
                log::error!(target: "session", "{:?} session worker panicked", self.kind);
                SessionOutcome::Crashed
            }),
            None => SessionOutcome::Crashed,
        }
    }
}
