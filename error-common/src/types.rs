use serde::Serialize;
use thiserror::Error;

use crate::codes;

/// Error taxonomy shared by every Apteka crate.
///
/// Crate-local errors convert into this type at the handler boundary. Empty
/// search results are not errors and never appear here.
#[derive(Error, Debug)]
pub enum AptekaError {
    /// Query text, token count or audio duration exceeds its bound
    #[error("Input too large: {0}")]
    InputTooLarge(String),

    /// Speech-to-text collaborator failed
    #[error("Transcription failed: {message}")]
    TranscriptionFailure { message: String, transient: bool },

    /// Registration payload failed schema or field checks
    #[error("Validation error: {0}")]
    ValidationFailure(String),

    /// Transaction-level failure (connectivity, constraint violation)
    #[error("Persistence error: {0}")]
    PersistenceFailure(String),

    /// Outbound messaging collaborator failed
    #[error("Dispatch error: {0}")]
    DispatchFailure(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Wrapped external errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Coarse category used for log fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    Input,
    Transcription,
    Validation,
    Persistence,
    Dispatch,
    Configuration,
    Internal,
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorType::Input => "input",
            ErrorType::Transcription => "transcription",
            ErrorType::Validation => "validation",
            ErrorType::Persistence => "persistence",
            ErrorType::Dispatch => "dispatch",
            ErrorType::Configuration => "configuration",
            ErrorType::Internal => "internal",
        };
        f.write_str(name)
    }
}

impl AptekaError {
    pub fn error_type(&self) -> ErrorType {
        match self {
            AptekaError::InputTooLarge(_) => ErrorType::Input,
            AptekaError::TranscriptionFailure { .. } => ErrorType::Transcription,
            AptekaError::ValidationFailure(_) => ErrorType::Validation,
            AptekaError::PersistenceFailure(_) => ErrorType::Persistence,
            AptekaError::DispatchFailure(_) => ErrorType::Dispatch,
            AptekaError::ConfigError(_) => ErrorType::Configuration,
            AptekaError::Other(_) => ErrorType::Internal,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AptekaError::InputTooLarge(_) => codes::input::INPUT_TOO_LARGE,
            AptekaError::TranscriptionFailure { transient: true, .. } => {
                codes::voice::TRANSCRIPTION_TRANSIENT
            }
            AptekaError::TranscriptionFailure { transient: false, .. } => {
                codes::voice::TRANSCRIPTION_PERMANENT
            }
            AptekaError::ValidationFailure(_) => codes::validation::INVALID_PAYLOAD,
            AptekaError::PersistenceFailure(_) => codes::database::PERSISTENCE_FAILED,
            AptekaError::DispatchFailure(_) => codes::dispatch::DELIVERY_FAILED,
            AptekaError::ConfigError(_) => codes::config::INVALID_CONFIGURATION,
            AptekaError::Other(_) => codes::internal::UNEXPECTED,
        }
    }

    /// Whether the caller may reasonably try the same request again.
    ///
    /// Nothing is retried automatically; the reply for a failed transcription
    /// asks for a retry only when this holds.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AptekaError::TranscriptionFailure { transient: true, .. }
                | AptekaError::PersistenceFailure(_)
                | AptekaError::DispatchFailure(_)
        )
    }

    /// Errors caused by what the user sent rather than by the system.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            AptekaError::InputTooLarge(_) | AptekaError::ValidationFailure(_)
        )
    }

    pub fn user_message(&self) -> &'static str {
        crate::sanitization::user_message(self)
    }
}

/// Result type alias for Apteka operations
pub type Result<T> = std::result::Result<T, AptekaError>;

/// Log an error with its code and category at a level matching who caused it
pub fn log_error(context: &str, error: &AptekaError) {
    if error.is_user_error() {
        tracing::warn!(
            context = context,
            error_code = error.code(),
            error_type = %error.error_type(),
            error = %error,
            "Request rejected"
        );
    } else {
        tracing::error!(
            context = context,
            error_code = error.code(),
            error_type = %error.error_type(),
            error = %error,
            "Apteka error occurred"
        );
    }
}
