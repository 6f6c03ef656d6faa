use crate::error::{ConfigError, Result};
use crate::settings::EngineConfig;
use figment::providers::{Env, Format, Serialized, Toml, Yaml};
use figment::Figment;
use std::path::Path;
use tracing::{debug, info};

/// Environment prefix; `__` separates nested keys (`APTEKA_MATCHING__THRESHOLD`)
pub const ENV_PREFIX: &str = "APTEKA_";

impl EngineConfig {
    /// Defaults, then the optional file, then the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(EngineConfig::default()));

        if let Some(path) = path {
            if !path.exists() {
                return Err(ConfigError::SourceNotFound(path.display().to_string()));
            }
            debug!(path = %path.display(), "Merging configuration file");
            figment = match path.extension().and_then(|ext| ext.to_str()) {
                Some("yaml" | "yml") => figment.merge(Yaml::file(path)),
                _ => figment.merge(Toml::file(path)),
            };
        }

        let figment = figment
            .merge(Env::raw().only(&["DATABASE_URL"]).map(|_| "database.url".into()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config = Self::from_figment(&figment)?;
        info!(
            threshold = config.matching.threshold,
            dispatch_interval_ms = config.dispatch.interval_ms,
            max_voice_secs = config.voice.max_duration_secs,
            "Configuration loaded"
        );
        Ok(config)
    }

    pub fn from_figment(figment: &Figment) -> Result<Self> {
        let config: EngineConfig = figment
            .extract()
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let matching = &self.matching;
        if !(matching.threshold > 0.0 && matching.threshold <= 1.0) {
            return Err(ConfigError::ValidationError(format!(
                "matching.threshold must be in (0, 1], got {}",
                matching.threshold
            )));
        }
        if !(0.0..1.0).contains(&matching.candidate_floor) {
            return Err(ConfigError::ValidationError(format!(
                "matching.candidate_floor must be in [0, 1), got {}",
                matching.candidate_floor
            )));
        }
        if matching.candidate_limit == 0 {
            return Err(ConfigError::ValidationError(
                "matching.candidate_limit must be positive".into(),
            ));
        }

        let limits = &self.limits;
        if limits.max_text_chars == 0 || limits.max_tokens == 0 || limits.max_token_chars == 0 {
            return Err(ConfigError::ValidationError(
                "limits must all be positive".into(),
            ));
        }

        if self.voice.max_duration_secs == 0 {
            return Err(ConfigError::ValidationError(
                "voice.max_duration_secs must be positive".into(),
            ));
        }

        if self.dispatch.queue_capacity == 0 {
            return Err(ConfigError::ValidationError(
                "dispatch.queue_capacity must be positive".into(),
            ));
        }

        let db = &self.database;
        if db.max_connections == 0 || db.min_connections > db.max_connections {
            return Err(ConfigError::ValidationError(format!(
                "database pool bounds invalid: min {} max {}",
                db.min_connections, db.max_connections
            )));
        }

        Ok(())
    }
}
