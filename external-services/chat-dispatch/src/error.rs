use error_common::AptekaError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Dispatch queue is closed")]
    QueueClosed,

    #[error("Dispatch worker dropped the batch before reporting")]
    ReportLost,

    #[error("Messenger rejected the message: {0}")]
    Rejected(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

pub type DispatchResult<T> = Result<T, DispatchError>;

impl From<DispatchError> for AptekaError {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::Config(message) => AptekaError::ConfigError(message),
            other => AptekaError::DispatchFailure(other.to_string()),
        }
    }
}
