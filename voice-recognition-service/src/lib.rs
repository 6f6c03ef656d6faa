//! Voice message transcription for medicine queries
//!
//! Users may dictate the medicines they are looking for instead of typing
//! them. This crate turns a short voice message into text:
//!
//! - **Duration guard**: clips longer than the configured maximum (20 s by
//!   default) are rejected before any provider call
//! - **Domain vocabulary**: known medicine names are sent as a prompt so the
//!   model spells them the way the catalog does
//! - **Whisper provider**: any OpenAI-compatible `/v1/audio/transcriptions`
//!   endpoint, hosted or self-hosted
//! - **Error classes**: rate limiting, outages and network failures are
//!   transient; other rejections are permanent
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use config_engine::VoiceSettings;
//! use voice_recognition_service::{VoiceClip, VoiceService};
//!
//! # async fn example(audio: Vec<u8>) -> Result<(), Box<dyn std::error::Error>> {
//! let service = VoiceService::new(&VoiceSettings::default())?;
//! let clip = VoiceClip::new(audio, Duration::from_secs(4));
//! let transcript = service.transcribe(&clip).await?;
//! println!("Transcription: {}", transcript.text);
//! # Ok(())
//! # }
//! ```

pub mod clip;
pub mod error;
pub mod providers;
pub mod service;
pub mod vocabulary;

pub use clip::*;
pub use error::*;
pub use providers::{create_provider, TranscriptionProvider, WhisperProvider};
pub use service::*;
pub use vocabulary::*;
