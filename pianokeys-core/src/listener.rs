//! Live Listener: streams note events from an input device through the
//! shared note path until the stop hotkey, a cancel, or the device going away.
//!
//! A hotkey watcher thread polls the stop key and arms the session's
//! cancellation token; the listener checks the token between events.
//! There is no pause in live mode.

use std::thread::{self, JoinHandle};

use crate::error::{CoreError, CoreResult};
use crate::hotkeys::POLL_INTERVAL;
use crate::midi::{LiveInput, LiveRecv, MidiBackend, NO_DEVICES_SENTINEL};
use crate::session::{CancelToken, SessionContext};

/// Consecutive silent polls between checks that the device is still
/// enumerated. Drivers keep a connection open after an unplug, so a gone
/// device only shows up as silence.
const PRESENCE_CHECK_POLLS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerEnd {
    /// Stop hotkey or an explicit cancel.
    Cancelled,
    /// The device stream ended or the device left the enumeration.
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerReport {
    pub device: String,
    pub end: ListenerEnd,
    pub events: usize,
    pub presses: usize,
}

/// Check `device` against a fresh enumeration. The sentinel never passes.
pub fn check_device(backend: &dyn MidiBackend, device: &str) -> CoreResult<()> {
    if device.is_empty() || device == NO_DEVICES_SENTINEL {
        return Err(CoreError::DeviceNotFound(device.to_string()));
    }
    if backend.input_names().iter().any(|name| name == device) {
        Ok(())
    } else {
        Err(CoreError::DeviceNotFound(device.to_string()))
    }
}

/// One live session on one device.
pub struct LiveListener {
    ctx: SessionContext,
    cancel: CancelToken,
    device: String,
}

impl LiveListener {
    pub fn new(ctx: SessionContext, cancel: CancelToken, device: &str) -> Self {
        Self {
            ctx,
            cancel,
            device: device.to_string(),
        }
    }

    /// Open the subscription. Failure is logged once and not retried.
    pub fn open(&self) -> CoreResult<Box<dyn LiveInput>> {
        self.ctx.backend.open_input(&self.device).map_err(|source| {
            let err = CoreError::DeviceOpen {
                device: self.device.clone(),
                source,
            };
            self.ctx.log.error(&err.to_string());
            err
        })
    }

    /// Consume events until cancelled, the stream closes, or a silent device
    /// drops out of the enumeration. Then close the subscription and wait
    /// for the watcher.
    pub fn run(self, mut input: Box<dyn LiveInput>) -> ListenerReport {
        self.ctx
            .log
            .info(&format!("Listening to MIDI device: {}", self.device));
        self.ctx.log.info(&format!(
            "Press {} to stop listening.",
            self.ctx.hotkeys.config().stop().to_uppercase()
        ));
        let watcher = spawn_watcher(&self.ctx, self.cancel.clone());

        let mut report = ListenerReport {
            device: self.device.clone(),
            end: ListenerEnd::Cancelled,
            events: 0,
            presses: 0,
        };
        let mut silent_polls: u32 = 0;
        loop {
            if self.cancel.is_cancelled() {
                report.end = ListenerEnd::Cancelled;
                break;
            }
            match input.next_event(POLL_INTERVAL) {
                LiveRecv::Event(event) => {
                    silent_polls = 0;
                    report.events += 1;
                    if self.ctx.router.route(&event) {
                        report.presses += 1;
                    }
                }
                LiveRecv::Timeout => {
                    silent_polls += 1;
                    if silent_polls >= PRESENCE_CHECK_POLLS {
                        silent_polls = 0;
                        if !self.device_present() {
                            log::info!(target: "listener", "{} is no longer enumerated", self.device);
                            report.end = ListenerEnd::Closed;
                            break;
                        }
                    }
                }
                LiveRecv::Closed => {
                    log::info!(target: "listener", "{} closed its stream", self.device);
                    report.end = ListenerEnd::Closed;
                    break;
                }
            }
        }
        input.close();

        // Releases the watcher if the stream ended on its own.
        self.cancel.cancel();
        if watcher.join().is_err() {
            log::error!(target: "listener", "hotkey watcher panicked");
        }
        self.ctx.log.info("Stopped live MIDI listener.");
        report
    }

    fn device_present(&self) -> bool {
        self.ctx
            .backend
            .input_names()
            .iter()
            .any(|name| name == &self.device)
    }
}

/// Poll the stop key every interval; arm `cancel` when it is held. Exits as
/// soon as the token is set by anyone.
fn spawn_watcher(ctx: &SessionContext, cancel: CancelToken) -> JoinHandle<()> {
    let hotkeys = ctx.hotkeys.clone();
    let clock = ctx.clock.clone();
    let log = ctx.log.with_target("listener");
    thread::spawn(move || loop {
        if cancel.is_cancelled() {
            break;
        }
        if hotkeys.poll_stop() {
            log.info(&format!(
                "Stopping listener by {} press...",
                hotkeys.config().stop().to_uppercase()
            ));
            cancel.cancel();
            break;
        }
        clock.sleep(POLL_INTERVAL);
    })
}
