//! Composition root
//!
//! Builds a [`TurnOrchestrator`] from [`Settings`]: real provider backends
//! in priority order, the shared liveness directory, detector, translator,
//! tool registry, and the speech adapters. All process-wide mutable state
//! (provider health cache, detector breaker) is created here and injected,
//! never ambient.

use std::sync::Arc;
use std::time::Duration;

use agrivoice_config::Settings;
use agrivoice_core::{ChatBackend, LanguageDetector, Result, SpeechToText, TextToSpeech, Translator};
use agrivoice_llm::{
    ChatRouter, GeminiBackend, GeminiProviderConfig, GroqBackend, GroqProviderConfig,
    OllamaBackend, OllamaProviderConfig, ProviderDirectory,
};
use agrivoice_speech::{GeminiSpeechClient, GeminiSpeechConfig, SpeechSynthesizer, SpeechTranscriber};
use agrivoice_text_processing::{
    CloudDetectApi, CloudTranslator, GoogleTextApi, HybridDetector, NoopTranslator,
};
use agrivoice_tools::registry::default_registry;

use crate::orchestrator::TurnOrchestrator;

/// Wire everything up from settings
pub fn build_orchestrator(settings: &Settings) -> Result<TurnOrchestrator> {
    // Providers in fixed priority order: self-hosted first, strict-limit last
    let ollama = OllamaBackend::new(OllamaProviderConfig {
        endpoint: settings.providers.ollama.endpoint.clone(),
        model: settings.providers.ollama.model.clone(),
        ..Default::default()
    })?;
    let groq = GroqBackend::new(GroqProviderConfig {
        api_key: settings.providers.groq.api_key.clone(),
        model: settings.providers.groq.model.clone(),
        ..Default::default()
    })?;
    let gemini = GeminiBackend::new(GeminiProviderConfig {
        api_key: settings.providers.gemini.api_key.clone(),
        model: settings.providers.gemini.model.clone(),
        ..Default::default()
    })?;
    let backends: Vec<Arc<dyn ChatBackend>> =
        vec![Arc::new(ollama), Arc::new(groq), Arc::new(gemini)];

    let directory = Arc::new(ProviderDirectory::new(Duration::from_secs(
        settings.providers.health_ttl_secs,
    )));
    let router = ChatRouter::new(backends, directory);

    let detector: Arc<dyn LanguageDetector> = {
        let cloud: Option<Arc<dyn CloudDetectApi>> = if settings.detection.cloud_enabled {
            match settings.detection.api_key.as_deref() {
                Some(key) => Some(Arc::new(GoogleTextApi::new(key)?)),
                None => None,
            }
        } else {
            None
        };
        Arc::new(HybridDetector::new(cloud))
    };

    let translator: Arc<dyn Translator> = match settings
        .translation
        .enabled
        .then_some(settings.translation.api_key.as_deref())
        .flatten()
    {
        Some(key) => Arc::new(CloudTranslator::new(Arc::new(GoogleTextApi::new(key)?))),
        None => {
            tracing::info!("translation disabled, using pass-through translator");
            Arc::new(NoopTranslator)
        }
    };

    let (stt, tts) = match settings
        .speech
        .enabled
        .then_some(settings.speech.api_key.as_deref())
        .flatten()
    {
        Some(key) => {
            let mut config = GeminiSpeechConfig::new(key);
            config.stt_model = settings.speech.stt_model.clone();
            config.tts_model = settings.speech.tts_model.clone();
            let client = Arc::new(GeminiSpeechClient::new(config)?);
            (
                Some(Arc::new(SpeechTranscriber::new(client.clone())) as Arc<dyn SpeechToText>),
                Some(Arc::new(SpeechSynthesizer::new(client)) as Arc<dyn TextToSpeech>),
            )
        }
        None => {
            tracing::info!("speech disabled, turns are text-only");
            (None, None)
        }
    };

    Ok(TurnOrchestrator::new(
        router,
        detector,
        translator,
        Arc::new(default_registry()),
    )
    .with_speech(stt, tts)
    .with_generation(settings.agent.temperature, settings.agent.max_tokens))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_from_default_settings() {
        let settings = Settings::default();
        assert!(build_orchestrator(&settings).is_ok());
    }
}
