use serde::{Deserialize, Serialize};

/// File playback state machine:
/// `Idle -> Loading -> Playing <-> Paused -> {Finished | Stopped | Failed}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlaybackState {
    #[default]
    Idle,
    Loading,
    Playing,
    Paused,
    Finished,
    Stopped,
    Failed,
}

impl PlaybackState {
    /// Terminal states end a session; a new session starts again from `Idle`.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            PlaybackState::Finished | PlaybackState::Stopped | PlaybackState::Failed
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            PlaybackState::Idle => "idle",
            PlaybackState::Loading => "loading",
            PlaybackState::Playing => "playing",
            PlaybackState::Paused => "paused",
            PlaybackState::Finished => "finished",
            PlaybackState::Stopped => "stopped",
            PlaybackState::Failed => "failed",
        }
    }
}

impl std::fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
