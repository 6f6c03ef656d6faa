use database_layer::DatabaseError;
use error_common::AptekaError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Input too large: {0}")]
    InputTooLarge(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Malformed payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),

    #[error(transparent)]
    Persistence(#[from] DatabaseError),
}

impl SearchError {
    pub fn validation(message: impl Into<String>) -> Self {
        SearchError::Validation(message.into())
    }
}

pub type SearchResult<T> = Result<T, SearchError>;

impl From<SearchError> for AptekaError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::InputTooLarge(message) => AptekaError::InputTooLarge(message),
            SearchError::Validation(message) => AptekaError::ValidationFailure(message),
            SearchError::MalformedPayload(e) => AptekaError::ValidationFailure(e.to_string()),
            SearchError::Persistence(e) => e.into(),
        }
    }
}
