//! One-way message channel from the core to whatever front-end hosts it.
//!
//! The core never touches presentation state. Each state change, error and
//! informational message is appended to a [`LogSink`] exactly once and
//! mirrored into the `log` facade.

use std::sync::{Arc, Mutex, PoisonError};

use crossbeam_channel::Sender;

/// Prefix carried by every error line.
pub const ERROR_PREFIX: &str = "error: ";

/// "Append a line" capability, consumed identically by any front-end.
pub trait LogSink: Send + Sync {
    fn append(&self, line: &str);
}

/// Forwards lines over a channel; the shell drains the receiver.
pub struct ChannelSink {
    tx: Sender<String>,
}

impl ChannelSink {
    pub fn new(tx: Sender<String>) -> Self {
        Self { tx }
    }
}

impl LogSink for ChannelSink {
    fn append(&self, line: &str) {
        // A dropped receiver means the front-end is gone; the log facade still has the line.
        let _ = self.tx.send(line.to_string());
    }
}

/// Collects lines in memory.
#[derive(Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn error_lines(&self) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|l| l.starts_with(ERROR_PREFIX))
            .collect()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines().iter().any(|l| l.contains(needle))
    }
}

impl LogSink for MemorySink {
    fn append(&self, line: &str) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line.to_string());
    }
}

/// A sink paired with a `log` target. Cheap to clone; sessions each carry one.
#[derive(Clone)]
pub struct SessionLog {
    sink: Arc<dyn LogSink>,
    target: &'static str,
}

impl SessionLog {
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self {
            sink,
            target: "pianokeys",
        }
    }

    /// Same sink, different `log` target.
    pub fn with_target(&self, target: &'static str) -> Self {
        Self {
            sink: Arc::clone(&self.sink),
            target,
        }
    }

    pub fn info(&self, message: &str) {
        log::info!(target: self.target, "{}", message);
        self.sink.append(message);
    }

    pub fn error(&self, message: &str) {
        log::error!(target: self.target, "{}", message);
        self.sink.append(&format!("{}{}", ERROR_PREFIX, message));
    }
}
