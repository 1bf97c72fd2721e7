//! Speech capability clients
//!
//! Both directions run against Gemini multimodal endpoints behind small
//! trait seams so the adapters stay testable without a network.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

use agrivoice_core::{AudioPayload, Error, Result, SynthesisError};

/// Transcription prompt: language auto-detection across the three scripts
const TRANSCRIBE_PROMPT: &str = "Transcribe this audio recording. The speaker may be using \
    English, Hindi, or Kannada. Detect the language and transcribe accurately. If the language \
    is Hindi, use Devanagari script. If the language is Kannada, use Kannada script. Respond \
    ONLY with the transcribed text, nothing else.";

/// Raw speech-to-text call
#[async_trait]
pub trait TranscriptionClient: Send + Sync {
    async fn transcribe_raw(&self, audio: &AudioPayload) -> Result<String>;
}

/// Raw text-to-speech call, returning PCM16LE at 24 kHz mono
#[async_trait]
pub trait SynthesisClient: Send + Sync {
    async fn synthesize_raw(
        &self,
        text: &str,
        voice: &str,
    ) -> std::result::Result<Vec<u8>, SynthesisError>;
}

/// Gemini speech configuration
#[derive(Debug, Clone)]
pub struct GeminiSpeechConfig {
    pub api_key: String,
    pub stt_model: String,
    pub tts_model: String,
    pub endpoint: String,
    pub timeout: Duration,
}

impl GeminiSpeechConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            stt_model: "gemini-2.5-flash".to_string(),
            tts_model: "gemini-2.5-flash-preview-tts".to_string(),
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Multimodal transcription + synthesis over Gemini
pub struct GeminiSpeechClient {
    client: Client,
    config: GeminiSpeechConfig,
}

impl GeminiSpeechClient {
    pub fn new(config: GeminiSpeechConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Config(format!("http client: {e}")))?;
        Ok(Self { client, config })
    }

    fn url(&self, model: &str) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.config.endpoint, model, self.config.api_key
        )
    }

    fn first_text(response: &Value) -> Option<String> {
        response
            .pointer("/candidates/0/content/parts")
            .and_then(Value::as_array)?
            .iter()
            .filter_map(|p| p.get("text").and_then(Value::as_str))
            .next()
            .map(str::to_string)
    }

    fn first_audio(response: &Value) -> Option<&str> {
        response
            .pointer("/candidates/0/content/parts")
            .and_then(Value::as_array)?
            .iter()
            .find_map(|p| p.pointer("/inlineData/data").and_then(Value::as_str))
    }
}

#[async_trait]
impl TranscriptionClient for GeminiSpeechClient {
    async fn transcribe_raw(&self, audio: &AudioPayload) -> Result<String> {
        let body = json!({
            "contents": [{
                "parts": [
                    { "text": TRANSCRIBE_PROMPT },
                    { "inlineData": { "mimeType": audio.mime_type, "data": audio.data } },
                ]
            }]
        });

        let response = self
            .client
            .post(self.url(&self.config.stt_model))
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Transcription(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(Error::Transcription(format!("{status}: {text}")));
        }

        let parsed: Value = response
            .json()
            .await
            .map_err(|e| Error::Transcription(e.to_string()))?;
        Self::first_text(&parsed)
            .ok_or_else(|| Error::Transcription("no transcript in response".into()))
    }
}

#[async_trait]
impl SynthesisClient for GeminiSpeechClient {
    async fn synthesize_raw(
        &self,
        text: &str,
        voice: &str,
    ) -> std::result::Result<Vec<u8>, SynthesisError> {
        let body = json!({
            "contents": [{ "parts": [{ "text": text }] }],
            "generationConfig": {
                "responseModalities": ["AUDIO"],
                "speechConfig": {
                    "voiceConfig": { "prebuiltVoiceConfig": { "voiceName": voice } }
                }
            }
        });

        let response = self
            .client
            .post(self.url(&self.config.tts_model))
            .json(&body)
            .send()
            .await
            .map_err(|e| SynthesisError::Transient(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            // Only server-class failures are worth another attempt
            if status.is_server_error() {
                return Err(SynthesisError::Transient(format!("{status}: {text}")));
            }
            return Err(SynthesisError::Fatal(format!("{status}: {text}")));
        }

        let parsed: Value = response
            .json()
            .await
            .map_err(|e| SynthesisError::Fatal(e.to_string()))?;
        let encoded = Self::first_audio(&parsed)
            .ok_or_else(|| SynthesisError::Fatal("no audio in response".into()))?;
        BASE64
            .decode(encoded)
            .map_err(|e| SynthesisError::Fatal(format!("audio decode: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_text_and_audio_parts() {
        let response = json!({
            "candidates": [{
                "content": {
                    "parts": [
                        { "text": "ಹವಾಮಾನ ಹೇಗಿದೆ" },
                        { "inlineData": { "mimeType": "audio/pcm", "data": "AAAA" } }
                    ]
                }
            }]
        });
        assert_eq!(
            GeminiSpeechClient::first_text(&response).as_deref(),
            Some("ಹವಾಮಾನ ಹೇಗಿದೆ")
        );
        assert_eq!(GeminiSpeechClient::first_audio(&response), Some("AAAA"));
    }

    #[test]
    fn empty_candidates_extract_nothing() {
        let response = json!({ "candidates": [] });
        assert!(GeminiSpeechClient::first_text(&response).is_none());
        assert!(GeminiSpeechClient::first_audio(&response).is_none());
    }
}
