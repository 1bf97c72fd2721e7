//! Speech-to-text adapter

use async_trait::async_trait;
use std::sync::Arc;

use agrivoice_core::{AudioPayload, Result, SpeechToText};

use crate::client::TranscriptionClient;

/// [`SpeechToText`] over a transcription capability.
///
/// One call, no retry: a failed or empty transcription aborts the turn
/// upstream, so there is nothing to degrade to here.
pub struct SpeechTranscriber {
    client: Arc<dyn TranscriptionClient>,
}

impl SpeechTranscriber {
    pub fn new(client: Arc<dyn TranscriptionClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SpeechToText for SpeechTranscriber {
    async fn transcribe(&self, audio: &AudioPayload) -> Result<String> {
        let text = self.client.transcribe_raw(audio).await?;
        let text = text.trim().to_string();
        tracing::debug!(chars = text.len(), "audio transcribed");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agrivoice_core::Error;

    struct Fixed(&'static str);

    #[async_trait]
    impl TranscriptionClient for Fixed {
        async fn transcribe_raw(&self, _audio: &AudioPayload) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    struct Failing;

    #[async_trait]
    impl TranscriptionClient for Failing {
        async fn transcribe_raw(&self, _audio: &AudioPayload) -> Result<String> {
            Err(Error::Transcription("garbled".into()))
        }
    }

    fn sample() -> AudioPayload {
        AudioPayload::from_bytes("audio/webm", b"frames")
    }

    #[tokio::test]
    async fn trims_transcript() {
        let stt = SpeechTranscriber::new(Arc::new(Fixed("  mausam kaisa hai \n")));
        assert_eq!(stt.transcribe(&sample()).await.unwrap(), "mausam kaisa hai");
    }

    #[tokio::test]
    async fn whitespace_only_becomes_empty() {
        let stt = SpeechTranscriber::new(Arc::new(Fixed("   \n\t ")));
        assert_eq!(stt.transcribe(&sample()).await.unwrap(), "");
    }

    #[tokio::test]
    async fn failure_propagates() {
        let stt = SpeechTranscriber::new(Arc::new(Failing));
        assert!(stt.transcribe(&sample()).await.is_err());
    }
}
