use base64::{engine::general_purpose, Engine as _};
use lazy_static::lazy_static;
use regex::Regex;
use sha2::{Digest, Sha256};

lazy_static! {
    // International and local phone numbers: +996 (555) 12-34-56, 8 800 555 35 35, 0555123456
    #[allow(clippy::expect_used)]
    static ref PHONE_REGEX: Regex =
        Regex::new(r"\+?\d[\d\s\-()]{5,}\d").expect("phone pattern compiles");
}

/// PII redaction configuration
#[derive(Debug, Clone)]
pub struct RedactionConfig {
    pub enabled: bool,
    pub redact_phones: bool,
    pub redact_chat_ids: bool,
    pub hash_for_correlation: bool,
    pub custom_patterns: Vec<(Regex, String)>,
}

impl Default for RedactionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            redact_phones: true,
            redact_chat_ids: true,
            hash_for_correlation: true,
            custom_patterns: Vec::new(),
        }
    }
}

/// Masks pharmacy phone numbers and chat identifiers before they are logged.
pub struct PiiRedactor {
    config: RedactionConfig,
}

impl Default for PiiRedactor {
    fn default() -> Self {
        Self::new(RedactionConfig::default())
    }
}

impl PiiRedactor {
    pub fn new(config: RedactionConfig) -> Self {
        Self { config }
    }

    pub fn disabled() -> Self {
        Self::new(RedactionConfig {
            enabled: false,
            ..Default::default()
        })
    }

    pub fn redact(&self, text: &str) -> String {
        if !self.config.enabled {
            return text.to_string();
        }

        let mut result = text.to_string();

        if self.config.redact_phones {
            result = self.redact_phones(&result);
        }

        for (pattern, replacement) in &self.config.custom_patterns {
            result = pattern.replace_all(&result, replacement.as_str()).to_string();
        }

        result
    }

    /// Chat ids are stable user identifiers; logs only get a hash or the last digits.
    pub fn chat_id(&self, chat_id: i64) -> String {
        if !self.config.enabled || !self.config.redact_chat_ids {
            return chat_id.to_string();
        }

        let digits = chat_id.unsigned_abs().to_string();
        if self.config.hash_for_correlation {
            format!("CHAT[{}]", self.hash_value(&digits))
        } else {
            let tail: String = digits
                .chars()
                .rev()
                .take(3)
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
                .collect();
            format!("***{tail}")
        }
    }

    fn redact_phones(&self, text: &str) -> String {
        PHONE_REGEX
            .replace_all(text, |caps: &regex::Captures| {
                let phone = caps.get(0).map_or("", |m| m.as_str());
                if self.config.hash_for_correlation {
                    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
                    format!("PHONE[{}]", self.hash_value(&digits))
                } else {
                    let last_two: String = phone
                        .chars()
                        .filter(char::is_ascii_digit)
                        .rev()
                        .take(2)
                        .collect::<Vec<_>>()
                        .into_iter()
                        .rev()
                        .collect();
                    format!("***-**{last_two}")
                }
            })
            .to_string()
    }

    fn hash_value(&self, value: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(value.as_bytes());
        let digest = hasher.finalize();
        // First 8 bytes keep the correlation tag short
        let short = digest.get(..8).unwrap_or(digest.as_slice());
        general_purpose::STANDARD.encode(short)
    }
}
