use crate::clip::{Transcript, TranscriptionHints, VoiceClip};
use crate::error::{VoiceError, VoiceResult};
use crate::providers::{create_provider, TranscriptionProvider};
use crate::vocabulary::DomainVocabulary;
use config_engine::VoiceSettings;
use std::time::Duration;
use tracing::{debug, info};

/// Voice message transcription with an input-length guard
pub struct VoiceService {
    provider: Box<dyn TranscriptionProvider>,
    hints: TranscriptionHints,
    max_duration: Duration,
}

impl VoiceService {
    /// Create the service with the provider configured in `settings`
    pub fn new(settings: &VoiceSettings) -> VoiceResult<Self> {
        let provider = create_provider(settings)?;
        Ok(Self::with_provider(provider, settings))
    }

    pub fn with_provider(provider: Box<dyn TranscriptionProvider>, settings: &VoiceSettings) -> Self {
        let vocabulary = if settings.vocabulary.is_empty() {
            DomainVocabulary::default()
        } else {
            DomainVocabulary::new(settings.vocabulary.iter().cloned())
        };
        info!(provider = provider.name(), terms = vocabulary.terms().len(), "Voice recognition ready");

        Self {
            provider,
            hints: TranscriptionHints {
                language: settings.language.clone(),
                vocabulary: vocabulary.terms().to_vec(),
            },
            max_duration: settings.max_duration(),
        }
    }

    /// Transcribe `clip`. Clips longer than the configured maximum are
    /// rejected before the provider is called.
    pub async fn transcribe(&self, clip: &VoiceClip) -> VoiceResult<Transcript> {
        if clip.duration > self.max_duration {
            return Err(VoiceError::TooLong {
                duration: clip.duration,
                max: self.max_duration,
            });
        }

        debug!(duration_ms = clip.duration.as_millis() as u64, "Transcribing voice message");
        let transcript = self.provider.transcribe(clip, &self.hints).await?;
        debug!(chars = transcript.text.chars().count(), "Transcription complete");
        Ok(transcript)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct FixedProvider {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl TranscriptionProvider for FixedProvider {
        async fn transcribe(&self, _clip: &VoiceClip, hints: &TranscriptionHints) -> VoiceResult<Transcript> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Transcript {
                text: hints.vocabulary.join(", "),
                language: hints.language.clone(),
                provider: "fixed".to_string(),
            })
        }

        fn name(&self) -> &'static str {
            "fixed"
        }
    }

    fn service(calls: Arc<AtomicUsize>) -> VoiceService {
        VoiceService::with_provider(Box::new(FixedProvider { calls }), &VoiceSettings::default())
    }

    #[tokio::test]
    async fn test_long_clip_rejected_before_provider_call() {
        let calls = Arc::new(AtomicUsize::new(0));
        let service = service(calls.clone());

        let clip = VoiceClip::new(vec![1, 2, 3], Duration::from_secs(21));
        let err = service.transcribe(&clip).await.unwrap_err();

        assert!(matches!(err, VoiceError::TooLong { .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_clip_at_limit_is_transcribed_with_hints() {
        let calls = Arc::new(AtomicUsize::new(0));
        let service = service(calls.clone());

        let clip = VoiceClip::new(vec![1, 2, 3], Duration::from_secs(20));
        let transcript = service.transcribe(&clip).await.unwrap();

        assert_eq!(transcript.text, "Парацетамол, ТайлолХот, Тримол");
        assert_eq!(transcript.language, "ru");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_disabled_provider() {
        let settings = VoiceSettings {
            enabled: false,
            ..VoiceSettings::default()
        };
        assert!(matches!(VoiceService::new(&settings), Err(VoiceError::Disabled)));
    }
}
