//! Chat-facing handlers.
//!
//! Each handler runs the core operation to completion, maps the result to
//! reply texts and hands them to the dispatch throttler. Search transactions
//! are finished before anything is enqueued.

use crate::replies;
use chat_dispatch::{DeliveryReceipt, DispatchThrottler};
use database_layer::models::ChatId;
use database_layer::CatalogStore;
use error_common::{log_error, AptekaError};
use logger_redacted::PiiRedactor;
use pharmacy_search::{register, PharmacyPayload, PharmacySearch};
use std::sync::Arc;
use tracing::{info, instrument};
use voice_recognition_service::{VoiceClip, VoiceService};

pub type HandlerResult<T> = Result<T, AptekaError>;

/// Answers medicine queries sent as text or voice
pub struct QueryHandler {
    search: PharmacySearch,
    voice: Option<Arc<VoiceService>>,
    dispatch: DispatchThrottler,
    redactor: PiiRedactor,
}

impl QueryHandler {
    pub fn new(search: PharmacySearch, dispatch: DispatchThrottler) -> Self {
        Self {
            search,
            voice: None,
            dispatch,
            redactor: PiiRedactor::default(),
        }
    }

    pub fn with_voice(mut self, voice: Arc<VoiceService>) -> Self {
        self.voice = Some(voice);
        self
    }

    pub fn with_redactor(mut self, redactor: PiiRedactor) -> Self {
        self.redactor = redactor;
        self
    }

    /// Transcribe a voice message and answer the medicines it names
    #[instrument(skip_all, fields(chat = %self.redactor.chat_id(chat_id.0)))]
    pub async fn handle_voice(&self, chat_id: ChatId, clip: VoiceClip) -> HandlerResult<DeliveryReceipt> {
        let texts = match self.transcribe(&clip).await {
            Ok(transcript) => {
                info!(chars = transcript.chars().count(), "Voice message transcribed");
                self.answer(&transcript).await
            }
            Err(e) => {
                log_error("voice", &e);
                vec![replies::for_error(&e)]
            }
        };
        self.reply(chat_id, texts).await
    }

    /// Answer the medicines named in a text message
    #[instrument(skip_all, fields(chat = %self.redactor.chat_id(chat_id.0)))]
    pub async fn handle_text(&self, chat_id: ChatId, text: &str) -> HandlerResult<DeliveryReceipt> {
        let texts = self.answer(text).await;
        self.reply(chat_id, texts).await
    }

    async fn transcribe(&self, clip: &VoiceClip) -> HandlerResult<String> {
        let voice = self.voice.as_ref().ok_or_else(|| AptekaError::TranscriptionFailure {
            message: "voice recognition is not configured".to_string(),
            transient: false,
        })?;
        Ok(voice.transcribe(clip).await?.text)
    }

    async fn answer(&self, text: &str) -> Vec<String> {
        match self.search.search_text(text).await {
            Ok(outcome) => replies::for_outcome(&outcome),
            Err(e) => {
                let err = AptekaError::from(e);
                log_error("search", &err);
                vec![replies::for_error(&err)]
            }
        }
    }

    async fn reply(&self, chat_id: ChatId, texts: Vec<String>) -> HandlerResult<DeliveryReceipt> {
        Ok(self.dispatch.dispatch(chat_id.0, texts).await?)
    }
}

/// Creates pharmacies from registration form payloads
pub struct RegistrationHandler {
    store: Arc<dyn CatalogStore>,
    dispatch: DispatchThrottler,
    redactor: PiiRedactor,
}

impl RegistrationHandler {
    pub fn new(store: Arc<dyn CatalogStore>, dispatch: DispatchThrottler) -> Self {
        Self {
            store,
            dispatch,
            redactor: PiiRedactor::default(),
        }
    }

    pub fn with_redactor(mut self, redactor: PiiRedactor) -> Self {
        self.redactor = redactor;
        self
    }

    #[instrument(skip_all, fields(chat = %self.redactor.chat_id(chat_id.0)))]
    pub async fn handle_payload(&self, chat_id: ChatId, json: &str) -> HandlerResult<DeliveryReceipt> {
        let reply = match self.create(chat_id, json).await {
            Ok(()) => replies::REGISTRATION_SUCCESS.to_string(),
            Err(e) => {
                log_error("registration", &e);
                replies::for_error(&e)
            }
        };
        Ok(self.dispatch.dispatch(chat_id.0, vec![reply]).await?)
    }

    async fn create(&self, chat_id: ChatId, json: &str) -> HandlerResult<()> {
        let payload = PharmacyPayload::from_json(json)?;
        register(self.store.as_ref(), chat_id, payload).await?;
        Ok(())
    }
}
