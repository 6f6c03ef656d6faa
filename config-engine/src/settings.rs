use logger_redacted::LoggerConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration, one section per collaborator
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub database: DatabaseSettings,
    pub matching: MatchingSettings,
    pub limits: QueryLimitSettings,
    pub voice: VoiceSettings,
    pub dispatch: DispatchSettings,
    pub telegram: TelegramSettings,
    pub logging: LoggerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: "postgresql://localhost:5432/apteka".to_string(),
            max_connections: 20,
            min_connections: 2,
            acquire_timeout_secs: 30,
        }
    }
}

impl DatabaseSettings {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }
}

/// Fuzzy matching knobs for the medicine resolver
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingSettings {
    /// Acceptance threshold τ for the normalized edit-distance ratio
    pub threshold: f64,
    /// Trigram similarity below which the shortlist skips a name. Names it
    /// skips are still reached through the key-length band.
    pub candidate_floor: f64,
    /// Shortlisted candidates per token before scoring
    pub candidate_limit: usize,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            threshold: 0.8,
            candidate_floor: 0.3,
            candidate_limit: 25,
        }
    }
}

/// Hard bounds on text queries; audio length is bounded in [`VoiceSettings`]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryLimitSettings {
    pub max_text_chars: usize,
    pub max_tokens: usize,
    pub max_token_chars: usize,
}

impl Default for QueryLimitSettings {
    fn default() -> Self {
        Self {
            max_text_chars: 1000,
            max_tokens: 10,
            max_token_chars: 64,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceSettings {
    pub enabled: bool,
    /// Base URL of an OpenAI-compatible transcription API
    pub api_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub language: String,
    /// Frequently expected medicine names passed to the recognizer as a prompt
    pub vocabulary: Vec<String>,
    pub max_duration_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            api_url: "https://api.openai.com".to_string(),
            api_key: None,
            model: "whisper-1".to_string(),
            language: "ru".to_string(),
            vocabulary: vec![
                "Парацетамол".to_string(),
                "ТайлолХот".to_string(),
                "Тримол".to_string(),
            ],
            max_duration_secs: 20,
            request_timeout_secs: 30,
        }
    }
}

impl VoiceSettings {
    pub fn max_duration(&self) -> Duration {
        Duration::from_secs(self.max_duration_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchSettings {
    /// Minimum spacing between two outbound messages
    pub interval_ms: u64,
    /// Messages of a batch still queued after this long are dropped
    pub delivery_timeout_secs: Option<u64>,
    pub queue_capacity: usize,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            interval_ms: 2000,
            delivery_timeout_secs: Some(60),
            queue_capacity: 64,
        }
    }
}

impl DispatchSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn delivery_timeout(&self) -> Option<Duration> {
        self.delivery_timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramSettings {
    pub api_url: String,
    pub bot_token: Option<String>,
    pub request_timeout_secs: u64,
}

impl Default for TelegramSettings {
    fn default() -> Self {
        Self {
            api_url: "https://api.telegram.org".to_string(),
            bot_token: None,
            request_timeout_secs: 10,
        }
    }
}
