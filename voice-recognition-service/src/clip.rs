use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A recorded voice message as received from the chat
#[derive(Debug, Clone)]
pub struct VoiceClip {
    pub audio: Vec<u8>,
    /// Duration reported by the messaging platform
    pub duration: Duration,
    pub file_name: String,
}

impl VoiceClip {
    pub fn new(audio: Vec<u8>, duration: Duration) -> Self {
        Self {
            audio,
            duration,
            file_name: "voice.ogg".to_string(),
        }
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }

    /// MIME type guessed from the file extension
    pub fn mime_type(&self) -> &'static str {
        match self.file_name.rsplit('.').next().map(str::to_ascii_lowercase).as_deref() {
            Some("ogg") | Some("oga") | Some("opus") => "audio/ogg",
            Some("mp3") => "audio/mpeg",
            Some("wav") => "audio/wav",
            Some("m4a") => "audio/mp4",
            Some("webm") => "audio/webm",
            _ => "application/octet-stream",
        }
    }
}

/// Hints passed to the provider to bias recognition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptionHints {
    pub language: String,
    pub vocabulary: Vec<String>,
}

/// Recognized text of one clip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    pub text: String,
    pub language: String,
    pub provider: String,
}
