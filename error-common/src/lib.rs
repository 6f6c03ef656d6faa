//! Common error handling utilities for Apteka Engine
//!
//! Every crate in the workspace keeps its own `thiserror` enum and converts it
//! into [`AptekaError`] at the handler boundary. This crate owns:
//!
//! - **Error taxonomy**: input bounds, transcription, validation, persistence,
//!   dispatch and configuration failures
//! - **Error codes**: stable identifiers for logs (`DB_4001`, `VOICE_2001`, ...)
//! - **Sanitization**: the fixed texts a chat user may see; raw database or
//!   provider messages never leave the process
//!
//! "No medicine recognised" and "nobody stocks it" are search outcomes, not
//! errors, and are modelled in `pharmacy-search`.
//!
//! # Example
//!
//! ```rust
//! use error_common::{AptekaError, log_error};
//!
//! let err = AptekaError::PersistenceFailure("connection reset".into());
//! log_error("search", &err);
//! assert_eq!(err.user_message(), "Что-то пошло не так - попробуйте еще раз");
//! ```

pub mod codes;
pub mod sanitization;
pub mod types;

pub use sanitization::*;
pub use types::*;
