use crate::error::{SearchError, SearchResult};
use config_engine::QueryLimitSettings;

const SEPARATORS: [char; 3] = [',', ';', '\n'];

/// Ordered medicine tokens of one request, plus the text they came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    raw: String,
    tokens: Vec<String>,
}

impl Query {
    /// Split free text (a transcript or a typed message) into tokens and
    /// enforce the input bounds.
    pub fn parse(raw: &str, limits: &QueryLimitSettings) -> SearchResult<Self> {
        let text_chars = raw.chars().count();
        if text_chars > limits.max_text_chars {
            return Err(SearchError::InputTooLarge(format!(
                "query text has {} characters, limit is {}",
                text_chars, limits.max_text_chars
            )));
        }

        let tokens = raw
            .split(SEPARATORS)
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(str::to_string)
            .collect();

        Self::checked(raw.trim().to_string(), tokens, limits)
    }

    /// Build a query from tokens that were split upstream.
    pub fn from_tokens(tokens: Vec<String>, limits: &QueryLimitSettings) -> SearchResult<Self> {
        let tokens: Vec<String> = tokens
            .into_iter()
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty())
            .collect();
        let raw = tokens.join(", ");
        Self::checked(raw, tokens, limits)
    }

    fn checked(raw: String, tokens: Vec<String>, limits: &QueryLimitSettings) -> SearchResult<Self> {
        if tokens.len() > limits.max_tokens {
            return Err(SearchError::InputTooLarge(format!(
                "query has {} names, limit is {}",
                tokens.len(),
                limits.max_tokens
            )));
        }
        if let Some(token) = tokens
            .iter()
            .find(|token| token.chars().count() > limits.max_token_chars)
        {
            return Err(SearchError::InputTooLarge(format!(
                "name of {} characters exceeds limit of {}",
                token.chars().count(),
                limits.max_token_chars
            )));
        }
        Ok(Self { raw, tokens })
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}
