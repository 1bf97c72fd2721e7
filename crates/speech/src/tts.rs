//! Text-to-speech adapter with bounded retry

use async_trait::async_trait;
use std::sync::Arc;

use agrivoice_core::{AudioPayload, Language, RetryPolicy, SynthesisError, TextToSpeech};
use agrivoice_config::voice_name;

use crate::client::SynthesisClient;
use crate::wav;

/// [`TextToSpeech`] over a synthesis capability.
///
/// Transient failures are retried under the shared policy (3 attempts,
/// delay doubling from 1s); anything else aborts immediately. Exhaustion
/// degrades to `None` — absence of audio is a valid outcome, never an
/// error. The PCM→WAV transform is deterministic and runs once, after a
/// successful attempt.
pub struct SpeechSynthesizer {
    client: Arc<dyn SynthesisClient>,
    policy: RetryPolicy,
}

impl SpeechSynthesizer {
    pub fn new(client: Arc<dyn SynthesisClient>) -> Self {
        Self {
            client,
            policy: RetryPolicy::synthesis(),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }
}

#[async_trait]
impl TextToSpeech for SpeechSynthesizer {
    async fn synthesize(&self, text: &str, language: Language) -> Option<AudioPayload> {
        let voice = voice_name(language);

        let pcm = self
            .policy
            .run(SynthesisError::is_transient, |attempt| {
                tracing::debug!(attempt, voice, "synthesis attempt");
                self.client.synthesize_raw(text, voice)
            })
            .await;

        let pcm = match pcm {
            Ok(pcm) => pcm,
            Err(e) => {
                tracing::warn!(error = %e, "synthesis degraded to text-only");
                return None;
            }
        };

        match wav::wav_payload(&pcm) {
            Ok(payload) => Some(payload),
            Err(e) => {
                tracing::warn!(error = %e, "wav containerization failed");
                None
            }
        }
    }
}
