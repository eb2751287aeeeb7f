//! Playback Engine: plays one note file through the shared note path,
//! honoring the stop and pause hotkeys.
//!
//! Timing comes from each event's own delay. The delay is waited out in
//! poll-interval slices with the hotkeys sampled between slices, and time
//! spent paused is never charged against the schedule, so resuming picks
//! up exactly where the song left off.

use std::path::Path;
use std::time::Duration;

use pianokeys_types::{NoteEvent, PlaybackState};

use crate::error::CoreError;
use crate::hotkeys::POLL_INTERVAL;
use crate::midi::NoteStream;
use crate::session::{CancelToken, SessionContext};

/// Sleep between hotkey samples while paused.
pub const PAUSE_SLEEP: Duration = POLL_INTERVAL;

/// Summary of one playback session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaybackReport {
    /// Terminal state.
    pub state: PlaybackState,
    /// Every state entered, in order, starting after `Idle`.
    pub transitions: Vec<PlaybackState>,
    /// Events consumed from the stream.
    pub events: usize,
    /// Key pulses emitted.
    pub presses: usize,
    /// Schedule time waited out between events.
    pub scheduled: Duration,
    /// Time spent paused.
    pub paused: Duration,
}

impl PlaybackReport {
    pub fn visited(&self, state: PlaybackState) -> bool {
        self.transitions.contains(&state)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StopReason {
    Hotkey,
    Cancelled,
}

/// One playback session. Built per `start`, consumed by it.
pub struct PlaybackEngine {
    ctx: SessionContext,
    cancel: CancelToken,
    state: PlaybackState,
    stop_reason: Option<StopReason>,
    report: PlaybackReport,
}

impl PlaybackEngine {
    pub fn new(ctx: SessionContext, cancel: CancelToken) -> Self {
        Self {
            ctx,
            cancel,
            state: PlaybackState::Idle,
            stop_reason: None,
            report: PlaybackReport::default(),
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Load `path` and play it to a terminal state.
    pub fn start(mut self, path: &Path) -> PlaybackReport {
        self.enter(PlaybackState::Loading);
        let stream = match self.ctx.backend.load_file(path) {
            Ok(stream) => stream,
            Err(e) => {
                self.ctx.log.error(&CoreError::Load(e).to_string());
                return self.finish(PlaybackState::Failed);
            }
        };

        let hotkeys = self.ctx.hotkeys.config();
        self.ctx.log.info(&format!("Playing {}...", path.display()));
        self.ctx.log.info(&format!(
            "Press {} to stop playback.",
            hotkeys.stop().to_uppercase()
        ));
        self.ctx.log.info(&format!(
            "Press {} to pause/resume playback.",
            hotkeys.pause().to_uppercase()
        ));
        self.run(stream)
    }

    /// Play an already-open stream.
    pub fn run(mut self, stream: NoteStream) -> PlaybackReport {
        self.enter(PlaybackState::Playing);
        for item in stream {
            let event = match item {
                Ok(event) => event,
                Err(e) => {
                    self.ctx.log.error(&format!("playback aborted: {}", e));
                    return self.finish(PlaybackState::Failed);
                }
            };
            if self.wait(event.delay) == Flow::Stop {
                return self.stopped();
            }
            self.consume(&event);
        }
        self.ctx.log.info("Playback finished.");
        self.finish(PlaybackState::Finished)
    }

    fn consume(&mut self, event: &NoteEvent) {
        self.report.events += 1;
        if self.ctx.router.route(event) {
            self.report.presses += 1;
        }
    }

    /// Wait out one event's delay. Controls are checked before the first
    /// slice and after every slice, so even a zero delay gets one check.
    fn wait(&mut self, delay: Duration) -> Flow {
        let mut remaining = delay;
        loop {
            if self.check_controls() == Flow::Stop {
                return Flow::Stop;
            }
            if remaining.is_zero() {
                return Flow::Continue;
            }
            let slice = remaining.min(POLL_INTERVAL);
            self.ctx.clock.sleep(slice);
            self.report.scheduled += slice;
            remaining -= slice;
        }
    }

    /// Sample stop, then pause. While paused, keep sampling without
    /// touching the event iterator or the schedule.
    fn check_controls(&mut self) -> Flow {
        if self.stop_requested() {
            return Flow::Stop;
        }
        if self.ctx.hotkeys.poll_pause() {
            self.toggle_pause();
        }
        while self.state == PlaybackState::Paused {
            self.ctx.clock.sleep(PAUSE_SLEEP);
            self.report.paused += PAUSE_SLEEP;
            if self.stop_requested() {
                return Flow::Stop;
            }
            if self.ctx.hotkeys.poll_pause() {
                self.toggle_pause();
            }
        }
        Flow::Continue
    }

    fn stop_requested(&mut self) -> bool {
        if self.cancel.is_cancelled() {
            self.stop_reason = Some(StopReason::Cancelled);
            return true;
        }
        if self.ctx.hotkeys.poll_stop() {
            self.stop_reason = Some(StopReason::Hotkey);
            return true;
        }
        false
    }

    fn toggle_pause(&mut self) {
        let pause_key = self.ctx.hotkeys.config().pause().to_uppercase();
        if self.state == PlaybackState::Paused {
            self.enter(PlaybackState::Playing);
            self.ctx
                .log
                .info(&format!("Resumed playback by {} press.", pause_key));
        } else {
            self.enter(PlaybackState::Paused);
            self.ctx
                .log
                .info(&format!("Paused playback by {} press.", pause_key));
        }
    }

    fn stopped(self) -> PlaybackReport {
        match self.stop_reason {
            Some(StopReason::Hotkey) => {
                let stop_key = self.ctx.hotkeys.config().stop().to_uppercase();
                self.ctx
                    .log
                    .info(&format!("Stopping playback by {} press...", stop_key));
            }
            Some(StopReason::Cancelled) | None => self.ctx.log.info("Playback stopped."),
        }
        self.finish(PlaybackState::Stopped)
    }

    fn enter(&mut self, state: PlaybackState) {
        log::debug!(target: "playback", "{} -> {}", self.state, state);
        self.state = state;
        self.report.transitions.push(state);
    }

    fn finish(mut self, state: PlaybackState) -> PlaybackReport {
        self.enter(state);
        self.report.state = state;
        self.report
    }
}
