use thiserror::Error;

use crate::config::ConfigError;

/// Coarse classification of a [`HearsayError`], used by the play loop to
/// pick a hint for the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    ResolutionFailure,
    NetworkFailure,
    EmptyContent,
    SpeechUnsupported,
    SpeechFailure,
    InvalidTransition,
    Internal,
}

#[derive(Error, Debug)]
pub enum HearsayError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("Could not resolve share link {url} (tried: {})", attempted.join(", "))]
    ResolutionFailure { url: String, attempted: Vec<String> },

    #[error("{0}")]
    NoMatch(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// `final_url` is where redirects ended up; equal to `url` when there were none.
    #[error("Request to {url} failed with status {status}")]
    HttpStatus {
        url: String,
        final_url: String,
        status: u16,
    },

    #[error("Could not parse listing response: {0}")]
    ListingParse(String),

    #[error("Nothing to read: {0}")]
    EmptyContent(String),

    #[error("Speech synthesis is not available: {0}")]
    SpeechUnsupported(String),

    #[error("Speech error: {0}")]
    SpeechFailure(String),

    #[error("Cannot {action} while {state}")]
    InvalidTransition {
        action: &'static str,
        state: &'static str,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl HearsayError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            HearsayError::InvalidInput(_) => ErrorKind::InvalidInput,
            HearsayError::ResolutionFailure { .. } | HearsayError::NoMatch(_) => {
                ErrorKind::ResolutionFailure
            }
            HearsayError::Http(_) | HearsayError::HttpStatus { .. } => ErrorKind::NetworkFailure,
            HearsayError::ListingParse(_) => ErrorKind::NetworkFailure,
            HearsayError::EmptyContent(_) => ErrorKind::EmptyContent,
            HearsayError::SpeechUnsupported(_) => ErrorKind::SpeechUnsupported,
            HearsayError::SpeechFailure(_) => ErrorKind::SpeechFailure,
            HearsayError::InvalidTransition { .. } => ErrorKind::InvalidTransition,
            HearsayError::Config(_) | HearsayError::Io(_) => ErrorKind::Internal,
        }
    }

    /// True when the failure came from the network layer timing out.
    pub fn is_timeout(&self) -> bool {
        matches!(self, HearsayError::Http(e) if e.is_timeout())
    }
}

pub type Result<T> = std::result::Result<T, HearsayError>;
