// Logger configuration
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is not set
    pub log_level: String,
    pub format: LogFormat,
    /// Daily-rolling JSON file output next to stdout when set
    pub log_directory: Option<PathBuf>,
    pub file_prefix: String,
    pub redaction_enabled: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            format: LogFormat::Pretty,
            log_directory: None,
            file_prefix: "apteka.log".to_string(),
            redaction_enabled: true,
        }
    }
}
