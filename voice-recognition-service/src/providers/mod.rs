pub mod whisper;

use crate::clip::{Transcript, TranscriptionHints, VoiceClip};
use crate::error::{VoiceError, VoiceResult};
use async_trait::async_trait;
use config_engine::VoiceSettings;

pub use whisper::WhisperProvider;

/// Speech-to-text backend
#[async_trait]
pub trait TranscriptionProvider: Send + Sync {
    /// Transcribe one clip
    async fn transcribe(&self, clip: &VoiceClip, hints: &TranscriptionHints) -> VoiceResult<Transcript>;

    /// Provider name for logs
    fn name(&self) -> &'static str;
}

/// Create the provider configured in `settings`
pub fn create_provider(settings: &VoiceSettings) -> VoiceResult<Box<dyn TranscriptionProvider>> {
    if !settings.enabled {
        return Err(VoiceError::Disabled);
    }
    Ok(Box::new(WhisperProvider::new(settings)?))
}
