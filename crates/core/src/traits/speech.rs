//! Speech I/O traits

use async_trait::async_trait;

use crate::audio::AudioPayload;
use crate::error::Result;
use crate::language::Language;

/// Speech-to-text boundary.
///
/// A failing transcription is the one error the orchestrator does not
/// degrade around: it aborts the turn and returns the history unchanged.
#[async_trait]
pub trait SpeechToText: Send + Sync {
    /// Transcribe an encoded audio payload. The capability auto-detects the
    /// spoken language among the supported scripts; an empty string means
    /// nothing intelligible was heard.
    async fn transcribe(&self, audio: &AudioPayload) -> Result<String>;
}

/// Text-to-speech boundary.
///
/// Synthesis never fails outward: retry handling lives behind this trait
/// and exhaustion yields `None`. Callers must treat absent audio as a
/// valid, non-error outcome.
#[async_trait]
pub trait TextToSpeech: Send + Sync {
    /// Synthesize `text` with the voice configured for `language`,
    /// returning a playback-ready container or `None` on degrade.
    async fn synthesize(&self, text: &str, language: Language) -> Option<AudioPayload>;
}
