//! The turn state machine

use std::sync::Arc;

use agrivoice_core::{
    AudioPayload, ChatMessage, ChatOptions, ConversationHistory, ConversationMessage, Language,
    LanguageDetector, SpeechToText, TextToSpeech, ToolUsage, Translator,
};
use agrivoice_llm::ChatRouter;
use agrivoice_tools::{ScopedDispatcher, ToolRegistry, TriggerLexicon};

use crate::prompt;
use crate::turn::{TurnRequest, TurnResponse};

/// How much of the generated text the locale-correction probe looks at
const DETECT_PROBE_CHARS: usize = 200;

/// The conversation turn orchestrator.
///
/// Stages run strictly in sequence per turn; the only terminal states are
/// the input-resolution short circuit and the completed response. No method
/// here returns an error — failures degrade (apology text, missing audio,
/// untranslated reply) instead of propagating.
pub struct TurnOrchestrator {
    router: ChatRouter,
    detector: Arc<dyn LanguageDetector>,
    translator: Arc<dyn Translator>,
    registry: Arc<ToolRegistry>,
    lexicon: TriggerLexicon,
    stt: Option<Arc<dyn SpeechToText>>,
    tts: Option<Arc<dyn TextToSpeech>>,
    temperature: f32,
    max_tokens: usize,
    /// Offer function declarations to providers that can call tools natively
    native_tools: bool,
}

impl TurnOrchestrator {
    pub fn new(
        router: ChatRouter,
        detector: Arc<dyn LanguageDetector>,
        translator: Arc<dyn Translator>,
        registry: Arc<ToolRegistry>,
    ) -> Self {
        Self {
            router,
            detector,
            translator,
            registry,
            lexicon: TriggerLexicon::new(),
            stt: None,
            tts: None,
            temperature: 0.7,
            max_tokens: 300,
            native_tools: true,
        }
    }

    pub fn with_speech(
        mut self,
        stt: Option<Arc<dyn SpeechToText>>,
        tts: Option<Arc<dyn TextToSpeech>>,
    ) -> Self {
        self.stt = stt;
        self.tts = tts;
        self
    }

    pub fn with_generation(mut self, temperature: f32, max_tokens: usize) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_native_tools(mut self, enabled: bool) -> Self {
        self.native_tools = enabled;
        self
    }

    /// Run one conversation turn. Infallible by contract: the worst outcome
    /// is an unchanged history or a localized apology with no audio.
    pub async fn execute(&self, request: TurnRequest) -> TurnResponse {
        let TurnRequest {
            audio,
            text,
            language,
            mut history,
            user_context,
        } = request;
        let ctx = user_context.unwrap_or_default();

        // INPUT_RESOLUTION / LANGUAGE_RESOLUTION
        let (user_text, detected) = match &audio {
            Some(audio) => {
                let Some(text) = self.resolve_audio(audio).await else {
                    tracing::info!("unusable audio input, returning history unchanged");
                    return TurnResponse::unchanged(history, language);
                };
                let detected = self.detector.detect(&text).await;
                (text, detected)
            }
            None => {
                let text = text.unwrap_or_default();
                if text.trim().is_empty() {
                    return TurnResponse::unchanged(history, language);
                }
                // Only override the requested language when the detector
                // disagrees with it and is confident of a non-default
                // script; short Latin text stays as requested.
                let detected = self.detector.detect(&text).await;
                let resolved = if detected != language && !detected.is_default() {
                    detected
                } else {
                    language
                };
                (text, resolved)
            }
        };

        tracing::debug!(language = %detected, chars = user_text.len(), "turn input resolved");

        // HISTORY_APPEND (dedup-guarded)
        history.push_user_deduped(user_text.clone());

        // Fixed greeting shortcut: no generation, no tools
        if is_greeting(&user_text) {
            let reply = if history.has_assistant_message() {
                agrivoice_config::regreeting(detected)
            } else {
                agrivoice_config::greeting(detected)
            };
            return self.finalize(history, reply.to_string(), Vec::new(), detected).await;
        }

        // CONTEXT_AUGMENTATION: deterministic keyword triggers
        let mut tools_used = Vec::new();
        let mut usage_records = Vec::new();
        let mut tool_blocks = Vec::new();
        for trigger in self.lexicon.scan(&user_text, &ctx) {
            let Some(output) = self
                .registry
                .execute(&trigger.tool, trigger.args.clone(), &ctx)
                .await
            else {
                continue;
            };
            tracing::info!(tool = %trigger.tool, degraded = output.degraded, "tool triggered");
            tool_blocks.push(format!("{} result: {}", trigger.tool, output.to_context_block()));
            tools_used.push(trigger.tool.clone());
            usage_records.push(ToolUsage::new(trigger.tool, trigger.args).with_result(output.value));
        }

        // GENERATION
        let options = ChatOptions {
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            system_prompt: Some(prompt::system_prompt(detected, &ctx, &tool_blocks)),
            preferred_provider: None,
        };
        let messages: Vec<ChatMessage> = history
            .messages()
            .iter()
            .map(ChatMessage::from_conversation)
            .collect();
        let definitions = if self.native_tools {
            self.registry.definitions()
        } else {
            Vec::new()
        };
        let dispatcher = ScopedDispatcher::new(&self.registry, &ctx);

        let reply = match self
            .router
            .chat_with_tools(&messages, &options, &definitions, &dispatcher)
            .await
        {
            Ok(routed) => {
                tracing::info!(provider = %routed.provider, "generation served");
                for usage in routed.tool_usage {
                    tools_used.push(usage.tool.clone());
                    usage_records.push(usage);
                }
                routed.text
            }
            Err(e) => {
                // The only caller-visible failure shape: a localized apology
                tracing::error!(error = %e, "generation exhausted, answering with apology");
                agrivoice_config::apology(detected).to_string()
            }
        };

        // LOCALE_CORRECTION
        let reply = self.correct_locale(reply, detected).await;

        let mut response = self.finalize(history, reply, usage_records, detected).await;
        response.tools_used = tools_used;
        response
    }

    /// Transcribe audio; `None` when the turn cannot continue
    async fn resolve_audio(&self, audio: &AudioPayload) -> Option<String> {
        let stt = match &self.stt {
            Some(stt) => stt,
            None => {
                tracing::warn!("audio input but no transcription capability configured");
                return None;
            }
        };
        match stt.transcribe(audio).await {
            Ok(text) if !text.trim().is_empty() => Some(text),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(error = %e, "transcription failed");
                None
            }
        }
    }

    /// Translate the reply back into the target language when the provider
    /// answered in the default language anyway. Fail-open.
    async fn correct_locale(&self, reply: String, target: Language) -> String {
        if target.is_default() {
            return reply;
        }
        let probe: String = reply.chars().take(DETECT_PROBE_CHARS).collect();
        if self.detector.detect(&probe).await.is_default() {
            tracing::debug!(target = %target, "correcting reply locale");
            self.translator
                .translate(&reply, target, Some(Language::default()))
                .await
        } else {
            reply
        }
    }

    /// HISTORY_FINALIZE + SPEECH_SYNTHESIS + RETURN
    async fn finalize(
        &self,
        mut history: ConversationHistory,
        reply: String,
        usage_records: Vec<ToolUsage>,
        detected: Language,
    ) -> TurnResponse {
        history.push(ConversationMessage::assistant_with_tools(
            reply.clone(),
            usage_records,
        ));

        let audio = match &self.tts {
            Some(tts) => tts.synthesize(&reply, detected).await,
            None => None,
        };
        if audio.is_none() {
            tracing::debug!("turn completes text-only");
        }

        TurnResponse {
            history,
            audio,
            detected_language: detected,
            tools_used: Vec::new(),
        }
    }
}

/// Normalized greeting check for the fixed-greeting shortcut
fn is_greeting(text: &str) -> bool {
    let normalized: String = text
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_ascii_punctuation())
        .collect();
    agrivoice_config::GREETING_WORDS.contains(&normalized.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn greeting_detection_normalizes() {
        assert!(is_greeting("hi"));
        assert!(is_greeting("  Hii! "));
        assert!(is_greeting("Hello"));
        assert!(is_greeting("नमस्ते"));
        assert!(is_greeting("ನಮಸ್ಕಾರ"));
        assert!(!is_greeting("hi, what is the tomato price"));
        assert!(!is_greeting("high yield seeds"));
    }
}
