use crate::error::{DispatchError, DispatchResult};
use async_trait::async_trait;
use config_engine::TelegramSettings;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Outbound chat channel
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send_text(&self, chat_id: i64, text: &str) -> DispatchResult<()>;
}

/// Telegram Bot API `sendMessage` client
pub struct TelegramMessenger {
    client: Client,
    base_url: String,
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: i64,
    text: &'a str,
}

#[derive(Deserialize)]
struct BotResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

impl TelegramMessenger {
    pub fn new(settings: &TelegramSettings) -> DispatchResult<Self> {
        let token = settings
            .bot_token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| DispatchError::Config("telegram.bot_token is not set".to_string()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()
            .map_err(|e| DispatchError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: format!("{}/bot{}", settings.api_url.trim_end_matches('/'), token),
        })
    }
}

#[async_trait]
impl Messenger for TelegramMessenger {
    async fn send_text(&self, chat_id: i64, text: &str) -> DispatchResult<()> {
        let response = self
            .client
            .post(format!("{}/sendMessage", self.base_url))
            .json(&SendMessage { chat_id, text })
            .send()
            .await?;

        let status = response.status();
        let body: BotResponse = response.json().await?;
        if !body.ok {
            return Err(DispatchError::Rejected(format!(
                "HTTP {}: {}",
                status.as_u16(),
                body.description.unwrap_or_default()
            )));
        }

        debug!(chars = text.chars().count(), "Telegram message sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn settings(url: String) -> TelegramSettings {
        TelegramSettings {
            api_url: url,
            bot_token: Some("123:abc".to_string()),
            ..TelegramSettings::default()
        }
    }

    #[test]
    fn test_missing_token_is_config_error() {
        let settings = TelegramSettings {
            bot_token: None,
            ..TelegramSettings::default()
        };
        assert!(matches!(TelegramMessenger::new(&settings), Err(DispatchError::Config(_))));
    }

    #[tokio::test]
    async fn test_send_message_posts_chat_and_text() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/bot123:abc/sendMessage")
            .match_body(Matcher::Json(serde_json::json!({
                "chat_id": 42,
                "text": "Аптека успешно создана ✅"
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"ok": true, "result": {}}"#)
            .create_async()
            .await;

        let messenger = TelegramMessenger::new(&settings(server.url())).unwrap();
        messenger.send_text(42, "Аптека успешно создана ✅").await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_api_rejection_surfaces_description() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/bot123:abc/sendMessage")
            .with_status(403)
            .with_header("content-type", "application/json")
            .with_body(r#"{"ok": false, "description": "Forbidden: bot was blocked by the user"}"#)
            .create_async()
            .await;

        let messenger = TelegramMessenger::new(&settings(server.url())).unwrap();
        match messenger.send_text(42, "привет").await {
            Err(DispatchError::Rejected(message)) => assert!(message.contains("blocked")),
            other => panic!("unexpected: {:?}", other),
        }
    }
}
