//! OpenAI-compatible Whisper provider
//!
//! Works against the hosted API or any self-hosted server exposing
//! `/v1/audio/transcriptions`.

use crate::clip::{Transcript, TranscriptionHints, VoiceClip};
use crate::error::{VoiceError, VoiceResult};
use crate::providers::TranscriptionProvider;
use async_trait::async_trait;
use config_engine::VoiceSettings;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};

pub struct WhisperProvider {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
}

#[derive(Deserialize)]
struct TranscriptionResponse {
    text: String,
}

impl WhisperProvider {
    pub fn new(settings: &VoiceSettings) -> VoiceResult<Self> {
        let client = Client::builder()
            .timeout(settings.request_timeout())
            .build()
            .map_err(|e| VoiceError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: format!(
                "{}/v1/audio/transcriptions",
                settings.api_url.trim_end_matches('/')
            ),
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
        })
    }

    fn form(&self, clip: &VoiceClip, hints: &TranscriptionHints) -> VoiceResult<Form> {
        let file = Part::bytes(clip.audio.clone())
            .file_name(clip.file_name.clone())
            .mime_str(clip.mime_type())
            .map_err(|e| VoiceError::Config(e.to_string()))?;

        let mut form = Form::new()
            .part("file", file)
            .text("model", self.model.clone())
            .text("language", hints.language.clone());
        if !hints.vocabulary.is_empty() {
            form = form.text("prompt", hints.vocabulary.join(", "));
        }
        Ok(form)
    }
}

/// 429 and 5xx may succeed on retry; any other non-success status will not.
pub(crate) fn classify_status(status: StatusCode, body: &str) -> VoiceError {
    let message = format!("HTTP {}: {}", status.as_u16(), body.chars().take(200).collect::<String>());
    if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        VoiceError::Transient(message)
    } else {
        VoiceError::Permanent(message)
    }
}

#[async_trait]
impl TranscriptionProvider for WhisperProvider {
    async fn transcribe(&self, clip: &VoiceClip, hints: &TranscriptionHints) -> VoiceResult<Transcript> {
        debug!(audio_size = clip.audio.len(), model = %self.model, "Sending audio to Whisper");

        let mut request = self.client.post(&self.endpoint).multipart(self.form(clip, hints)?);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = classify_status(status, &body);
            warn!(status = status.as_u16(), transient = err.is_transient(), "Whisper request failed");
            return Err(err);
        }

        let body: TranscriptionResponse = response.json().await?;
        Ok(Transcript {
            text: body.text.trim().to_string(),
            language: hints.language.clone(),
            provider: self.name().to_string(),
        })
    }

    fn name(&self) -> &'static str {
        "whisper"
    }
}
