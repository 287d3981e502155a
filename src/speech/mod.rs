//! Speech output behind a small async trait.
//!
//! Engines announce how each narration ended through [`SpeechEvent`]s sent on
//! the channel they were built with. Every narration carries a
//! [`SessionId`] so the caller can drop events from superseded sessions.

mod command;

pub use command::{CommandSpeechEngine, EngineKind};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::app::{HearsayError, Result};
use crate::config::SpeechConfig;

pub type SessionId = u64;

/// How a narration session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechEvent {
    Finished(SessionId),
    /// Stopped on request; never a user-facing error
    Cancelled(SessionId),
    Failed { session: SessionId, message: String },
}

impl SpeechEvent {
    pub fn session(&self) -> SessionId {
        match self {
            SpeechEvent::Finished(session) | SpeechEvent::Cancelled(session) => *session,
            SpeechEvent::Failed { session, .. } => *session,
        }
    }
}

pub type EventSender = mpsc::UnboundedSender<SpeechEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<SpeechEvent>;

pub fn event_channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

#[async_trait]
pub trait SpeechEngine: Send + Sync {
    fn name(&self) -> &str;

    fn is_available(&self) -> bool;

    /// Start narrating `text`. Any narration still running is cancelled
    /// first. Returns once narration has started.
    async fn speak(&self, session: SessionId, text: &str) -> Result<()>;

    async fn pause(&self) -> Result<()>;

    async fn resume(&self) -> Result<()>;

    /// Stop the current narration and wait until it has stopped.
    async fn cancel(&self) -> Result<()>;
}

/// Stand-in used when no speech program could be found.
pub struct UnavailableEngine {
    reason: String,
}

impl UnavailableEngine {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    fn error(&self) -> HearsayError {
        HearsayError::SpeechUnsupported(self.reason.clone())
    }
}

#[async_trait]
impl SpeechEngine for UnavailableEngine {
    fn name(&self) -> &str {
        "unavailable"
    }

    fn is_available(&self) -> bool {
        false
    }

    async fn speak(&self, _session: SessionId, _text: &str) -> Result<()> {
        Err(self.error())
    }

    async fn pause(&self) -> Result<()> {
        Err(self.error())
    }

    async fn resume(&self) -> Result<()> {
        Err(self.error())
    }

    async fn cancel(&self) -> Result<()> {
        Ok(())
    }
}

/// Programs probed on PATH, in order of preference.
const CANDIDATES: [&str; 4] = ["espeak-ng", "espeak", "say", "spd-say"];

/// Pick a speech engine: the configured command, or the first known
/// program on PATH, or [`UnavailableEngine`].
pub fn detect(config: &SpeechConfig, events: EventSender) -> Arc<dyn SpeechEngine> {
    let path_var = std::env::var_os("PATH").unwrap_or_default();
    let search: Vec<PathBuf> = std::env::split_paths(&path_var).collect();
    detect_in(config, events, &search)
}

fn detect_in(config: &SpeechConfig, events: EventSender, search: &[PathBuf]) -> Arc<dyn SpeechEngine> {
    if let Some(command) = config.command.as_deref().filter(|c| !c.is_empty()) {
        let program = find_program(command, search);
        return match program {
            Some(program) => {
                info!("Using configured speech command {}", program.display());
                Arc::new(CommandSpeechEngine::new(program, config, events))
            }
            None => Arc::new(UnavailableEngine::new(format!(
                "configured speech command {:?} was not found",
                command
            ))),
        };
    }

    for candidate in CANDIDATES {
        if let Some(program) = find_program(candidate, search) {
            info!("Using speech program {}", program.display());
            return Arc::new(CommandSpeechEngine::new(program, config, events));
        }
        debug!("Speech program {} not found", candidate);
    }

    Arc::new(UnavailableEngine::new(format!(
        "none of {} found on PATH; set speech.command in the config",
        CANDIDATES.join(", ")
    )))
}

fn find_program(name: &str, search: &[PathBuf]) -> Option<PathBuf> {
    let direct = Path::new(name);
    if direct.components().count() > 1 {
        return direct.is_file().then(|| direct.to_path_buf());
    }

    search
        .iter()
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.is_file())
}

/// Split text into sentences at `.`/`!`/`?` followed by whitespace, and at
/// line breaks.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();

    for line in text.lines() {
        let bytes = line.as_bytes();
        let mut start = 0;

        for (i, &b) in bytes.iter().enumerate() {
            if (b == b'.' || b == b'!' || b == b'?')
                && i + 1 < bytes.len()
                && bytes[i + 1].is_ascii_whitespace()
            {
                let s = line[start..=i].trim();
                if !s.is_empty() {
                    sentences.push(s.to_string());
                }
                start = i + 1;
            }
        }

        let s = line[start..].trim();
        if !s.is_empty() {
            sentences.push(s.to_string());
        }
    }

    sentences
}
