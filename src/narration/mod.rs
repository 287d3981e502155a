//! Playback state machine driving a [`SpeechEngine`].
//!
//! ```text
//! Idle/Errored ──start_fetch──▶ Fetching ──ok──▶ Speaking ◀──resume── Paused
//!      ▲                           │                │  ──pause──▶   │
//!      │                           └─fail─▶ Errored │               │
//!      └──────────── stop / finished ───────────────┴───────────────┘
//! ```

pub mod event;

use std::future::Future;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::app::{HearsayError, Result};
use crate::domain::{ExtractedContent, PlaybackState};
use crate::speech::{SessionId, SpeechEngine, SpeechEvent};

pub struct NarrationController {
    engine: Arc<dyn SpeechEngine>,
    state: PlaybackState,
    content: Option<ExtractedContent>,
    text: Option<String>,
    session: SessionId,
}

impl NarrationController {
    pub fn new(engine: Arc<dyn SpeechEngine>) -> Self {
        Self {
            engine,
            state: PlaybackState::Idle,
            content: None,
            text: None,
            session: 0,
        }
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn content(&self) -> Option<&ExtractedContent> {
        self.content.as_ref()
    }

    /// The narration text retained for replay.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn engine_name(&self) -> &str {
        self.engine.name()
    }

    fn invalid(&self, action: &'static str) -> HearsayError {
        HearsayError::InvalidTransition {
            action,
            state: self.state.label(),
        }
    }

    /// Enter Fetching. A narration in progress is cancelled first.
    pub async fn start_fetch(&mut self) -> Result<()> {
        if !self.state.accepts_input() {
            return Err(self.invalid("fetch"));
        }

        if self.state.is_active() {
            debug!("Cancelling narration {} for a new fetch", self.session);
            if let Err(e) = self.engine.cancel().await {
                warn!("Failed to cancel narration: {}", e);
            }
        }

        self.content = None;
        self.text = None;
        self.state = PlaybackState::Fetching;
        Ok(())
    }

    pub fn fetch_failed(&mut self, error: &HearsayError) {
        if self.state == PlaybackState::Fetching {
            self.state = PlaybackState::Errored(error.to_string());
        }
    }

    /// Store fetched content and start reading it.
    pub async fn fetch_succeeded(&mut self, content: ExtractedContent) -> Result<()> {
        if self.state != PlaybackState::Fetching {
            return Err(self.invalid("finish fetching"));
        }

        self.text = Some(content.narration_text());
        self.content = Some(content);
        self.state = PlaybackState::Idle;
        self.speak().await
    }

    /// Fetch with `load` and start narration; failures land in Errored.
    pub async fn fetch_and_play<F>(&mut self, load: F) -> Result<()>
    where
        F: Future<Output = Result<ExtractedContent>>,
    {
        self.start_fetch().await?;

        match load.await {
            Ok(content) => self.fetch_succeeded(content).await,
            Err(e) => {
                self.fetch_failed(&e);
                Err(e)
            }
        }
    }

    async fn speak(&mut self) -> Result<()> {
        let text = match self.text.as_deref() {
            Some(text) if !text.trim().is_empty() => text.to_string(),
            _ => {
                let err = HearsayError::EmptyContent("No text to speak.".into());
                self.state = PlaybackState::Errored(err.to_string());
                return Err(err);
            }
        };

        if !self.engine.is_available() {
            let err = HearsayError::SpeechUnsupported(format!(
                "speech engine {} is not available",
                self.engine.name()
            ));
            self.state = PlaybackState::Errored(err.to_string());
            return Err(err);
        }

        self.session += 1;
        match self.engine.speak(self.session, &text).await {
            Ok(()) => {
                info!("Narration {} speaking", self.session);
                self.state = PlaybackState::Speaking;
                Ok(())
            }
            Err(e) => {
                self.state = PlaybackState::Errored(e.to_string());
                Err(e)
            }
        }
    }

    /// Resume when paused, otherwise read the retained text from the start.
    pub async fn play(&mut self) -> Result<()> {
        match self.state {
            PlaybackState::Paused => self.resume().await,
            PlaybackState::Speaking | PlaybackState::Fetching => Err(self.invalid("play")),
            PlaybackState::Idle | PlaybackState::Errored(_) => {
                if self.text.is_none() {
                    return Err(HearsayError::InvalidInput(
                        "No content to play. Fetch a Reddit post first.".into(),
                    ));
                }
                self.speak().await
            }
        }
    }

    pub async fn pause(&mut self) -> Result<()> {
        if !self.state.can_pause() {
            return Err(self.invalid("pause"));
        }

        self.engine.pause().await?;
        self.state = PlaybackState::Paused;
        Ok(())
    }

    pub async fn resume(&mut self) -> Result<()> {
        if self.state != PlaybackState::Paused {
            return Err(self.invalid("resume"));
        }

        self.engine.resume().await?;
        self.state = PlaybackState::Speaking;
        Ok(())
    }

    /// Stop reading. The text is kept so it can be played again.
    pub async fn stop(&mut self) -> Result<()> {
        match self.state {
            PlaybackState::Speaking | PlaybackState::Paused => {
                self.engine.cancel().await?;
                info!("Narration {} stopped", self.session);
                self.state = PlaybackState::Idle;
                Ok(())
            }
            PlaybackState::Errored(_) => {
                self.state = PlaybackState::Idle;
                Ok(())
            }
            PlaybackState::Idle | PlaybackState::Fetching => Err(self.invalid("stop")),
        }
    }

    /// Apply an engine event. Returns the error to show, if any.
    ///
    /// Events from earlier sessions and cancellations are ignored.
    pub fn handle_event(&mut self, event: SpeechEvent) -> Option<HearsayError> {
        if event.session() != self.session {
            debug!("Ignoring event from stale narration: {:?}", event);
            return None;
        }

        match event {
            SpeechEvent::Finished(_) => {
                if self.state.is_active() {
                    info!("Narration {} finished", self.session);
                    self.state = PlaybackState::Idle;
                }
                None
            }
            SpeechEvent::Cancelled(_) => None,
            SpeechEvent::Failed { message, .. } => {
                if !self.state.is_active() {
                    return None;
                }
                warn!("Narration {} failed: {}", self.session, message);
                let err = HearsayError::SpeechFailure(message);
                self.state = PlaybackState::Errored(err.to_string());
                Some(err)
            }
        }
    }
}
