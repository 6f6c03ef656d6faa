//! Logging setup for Apteka Engine with PII redaction
//!
//! Pharmacy phone numbers and the chat ids of the people searching are the
//! only personal data this system handles. Everything that logs them goes
//! through [`PiiRedactor`] first; the rest of the workspace logs through plain
//! `tracing` macros with structured fields.
//!
//! # Example
//!
//! ```rust,no_run
//! use logger_redacted::{init, LoggerConfig, PiiRedactor};
//!
//! let _guard = init(&LoggerConfig::default()).expect("logger");
//! let redactor = PiiRedactor::default();
//! tracing::info!(chat = %redactor.chat_id(123456789), "Voice query received");
//! ```

pub mod config;
pub mod redactor;

pub use config::*;
pub use redactor::*;

use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Error, Debug)]
pub enum LoggerError {
    #[error("Invalid log filter '{0}'")]
    InvalidFilter(String),

    #[error("Global subscriber already installed: {0}")]
    AlreadyInitialized(String),
}

/// Install the global subscriber.
///
/// `RUST_LOG` wins over `config.log_level`. The returned guard flushes the
/// file writer and must be held for the life of the process.
pub fn init(config: &LoggerConfig) -> Result<Option<WorkerGuard>, LoggerError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.log_level)
            .map_err(|_| LoggerError::InvalidFilter(config.log_level.clone()))?,
    };

    let (json_layer, pretty_layer) = match config.format {
        LogFormat::Json => (Some(fmt::layer().json().with_current_span(false)), None),
        LogFormat::Pretty => (None, Some(fmt::layer().with_target(true))),
    };

    let (file_layer, guard) = match &config.log_directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, &config.file_prefix);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().json().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(pretty_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| LoggerError::AlreadyInitialized(e.to_string()))?;

    Ok(guard)
}

/// Redactor matching the configuration switch.
pub fn redactor_for(config: &LoggerConfig) -> PiiRedactor {
    if config.redaction_enabled {
        PiiRedactor::default()
    } else {
        PiiRedactor::disabled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redactor_follows_config_switch() {
        let mut config = LoggerConfig::default();
        assert!(redactor_for(&config).chat_id(42).starts_with("CHAT["));

        config.redaction_enabled = false;
        assert_eq!(redactor_for(&config).chat_id(42), "42");
    }
}
