use error_common::AptekaError;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VoiceError {
    #[error("Voice message is {duration:?} long, limit is {max:?}")]
    TooLong { duration: Duration, max: Duration },

    #[error("Voice recognition is disabled")]
    Disabled,

    #[error("Configuration error: {0}")]
    Config(String),

    /// Rate limiting, provider outage or network trouble; a retry may succeed
    #[error("Provider temporarily unavailable: {0}")]
    Transient(String),

    #[error("Provider rejected the request: {0}")]
    Permanent(String),
}

impl VoiceError {
    pub fn is_transient(&self) -> bool {
        matches!(self, VoiceError::Transient(_))
    }
}

impl From<reqwest::Error> for VoiceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            VoiceError::Config(err.to_string())
        } else if err.is_decode() {
            VoiceError::Permanent(err.to_string())
        } else {
            VoiceError::Transient(err.to_string())
        }
    }
}

pub type VoiceResult<T> = Result<T, VoiceError>;

impl From<VoiceError> for AptekaError {
    fn from(err: VoiceError) -> Self {
        match err {
            VoiceError::TooLong { .. } => AptekaError::InputTooLarge(err.to_string()),
            VoiceError::Config(message) => AptekaError::ConfigError(message),
            other => AptekaError::TranscriptionFailure {
                transient: other.is_transient(),
                message: other.to_string(),
            },
        }
    }
}
