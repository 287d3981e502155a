/// Narration state. Exactly one is active at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PlaybackState {
    #[default]
    Idle,
    Fetching,
    Speaking,
    Paused,
    /// The last fetch or narration failed; carries the user-facing message.
    Errored(String),
}

impl PlaybackState {
    pub fn label(&self) -> &'static str {
        match self {
            PlaybackState::Idle => "idle",
            PlaybackState::Fetching => "fetching",
            PlaybackState::Speaking => "speaking",
            PlaybackState::Paused => "paused",
            PlaybackState::Errored(_) => "errored",
        }
    }

    /// Whether a new link may be submitted.
    pub fn accepts_input(&self) -> bool {
        !matches!(self, PlaybackState::Fetching)
    }

    pub fn can_play(&self) -> bool {
        matches!(
            self,
            PlaybackState::Idle | PlaybackState::Paused | PlaybackState::Errored(_)
        )
    }

    pub fn can_pause(&self) -> bool {
        matches!(self, PlaybackState::Speaking)
    }

    pub fn can_stop(&self) -> bool {
        matches!(self, PlaybackState::Speaking | PlaybackState::Paused)
    }

    pub fn is_active(&self) -> bool {
        self.can_stop()
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            PlaybackState::Errored(message) => Some(message),
            _ => None,
        }
    }
}
