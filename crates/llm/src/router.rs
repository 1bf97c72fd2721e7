//! Failover chat router
//!
//! Builds an attempt order starting from the directory's selection (or the
//! caller's preferred provider), then the remaining providers in priority
//! order. Every failure logs and moves on; only after the whole order is
//! exhausted does the last, most constrained provider get a bounded retry
//! before an aggregated error goes up. The orchestrator converts that error
//! into a localized apology — it never propagates further.

use std::sync::Arc;

use agrivoice_core::{
    ChatBackend, ChatMessage, ChatOptions, ChatOutcome, ProviderError, ProviderId, RetryPolicy,
    ToolDefinition, ToolDispatcher, ToolUsage,
};

use crate::directory::ProviderDirectory;

/// A completed generation with the provider that served it
#[derive(Debug, Clone)]
pub struct RoutedResponse {
    pub text: String,
    pub provider: ProviderId,
    pub tool_usage: Vec<ToolUsage>,
}

/// Dispatcher used when no tools are offered to the provider
struct NoTools;

#[async_trait::async_trait]
impl ToolDispatcher for NoTools {
    async fn dispatch(&self, _name: &str, _args: serde_json::Value) -> Option<agrivoice_core::ToolOutput> {
        None
    }
}

/// Failover router over the fixed provider priority order
pub struct ChatRouter {
    backends: Vec<Arc<dyn ChatBackend>>,
    directory: Arc<ProviderDirectory>,
    last_resort_policy: RetryPolicy,
}

impl ChatRouter {
    /// `backends` must already be in priority order (most preferred first)
    pub fn new(backends: Vec<Arc<dyn ChatBackend>>, directory: Arc<ProviderDirectory>) -> Self {
        Self {
            backends,
            directory,
            last_resort_policy: RetryPolicy::last_resort(),
        }
    }

    pub fn with_last_resort_policy(mut self, policy: RetryPolicy) -> Self {
        self.last_resort_policy = policy;
        self
    }

    pub fn directory(&self) -> &Arc<ProviderDirectory> {
        &self.directory
    }

    /// Plain chat completion with failover
    pub async fn chat(
        &self,
        messages: &[ChatMessage],
        options: &ChatOptions,
    ) -> Result<RoutedResponse, ProviderError> {
        self.chat_with_tools(messages, options, &[], &NoTools).await
    }

    /// Chat completion with failover, offering native tool calling to
    /// backends that support it (the rest fall back to plain chat).
    pub async fn chat_with_tools(
        &self,
        messages: &[ChatMessage],
        options: &ChatOptions,
        tools: &[ToolDefinition],
        dispatcher: &dyn ToolDispatcher,
    ) -> Result<RoutedResponse, ProviderError> {
        let order = self.attempt_order(options).await;

        let mut last_error: Option<ProviderError> = None;
        for backend in &order {
            match self.attempt(backend.as_ref(), messages, options, tools, dispatcher).await {
                Ok(outcome) => {
                    tracing::info!(provider = %backend.id(), "chat served");
                    return Ok(RoutedResponse {
                        text: outcome.text,
                        provider: backend.id(),
                        tool_usage: outcome.tool_usage,
                    });
                }
                Err(e) => {
                    tracing::warn!(provider = %backend.id(), error = %e, "provider failed, trying next");
                    last_error = Some(e);
                }
            }
        }

        // Whole order exhausted. The most constrained provider gets one
        // bounded retry tier for transient failures before we give up.
        let Some(last_resort) = self.backends.last() else {
            return Err(ProviderError::Exhausted("no providers configured".into()));
        };

        let should_retry = last_error.as_ref().map(|e| e.is_transient()).unwrap_or(false);
        if should_retry {
            tracing::warn!(provider = %last_resort.id(), "all providers failed, retrying last resort");
            let result = self
                .last_resort_policy
                .run(ProviderError::is_transient, |attempt| {
                    tracing::debug!(provider = %last_resort.id(), attempt, "last-resort attempt");
                    self.attempt(last_resort.as_ref(), messages, options, tools, dispatcher)
                })
                .await;
            match result {
                Ok(outcome) => {
                    return Ok(RoutedResponse {
                        text: outcome.text,
                        provider: last_resort.id(),
                        tool_usage: outcome.tool_usage,
                    });
                }
                Err(e) => last_error = Some(e),
            }
        }

        let reason = last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "no providers attempted".to_string());
        tracing::error!(%reason, "all chat providers exhausted");
        Err(ProviderError::Exhausted(reason))
    }

    async fn attempt(
        &self,
        backend: &dyn ChatBackend,
        messages: &[ChatMessage],
        options: &ChatOptions,
        tools: &[ToolDefinition],
        dispatcher: &dyn ToolDispatcher,
    ) -> Result<ChatOutcome, ProviderError> {
        if !tools.is_empty() && backend.supports_native_tools() {
            backend.chat_with_tools(messages, options, tools, dispatcher).await
        } else {
            backend.chat(messages, options).await.map(ChatOutcome::text_only)
        }
    }

    /// Selected/preferred provider first, then the rest in priority order
    async fn attempt_order(&self, options: &ChatOptions) -> Vec<Arc<dyn ChatBackend>> {
        let lead = match options.preferred_provider {
            Some(preferred) => Some(preferred),
            None => self.directory.select(&self.backends).await,
        };

        let mut order: Vec<Arc<dyn ChatBackend>> = Vec::with_capacity(self.backends.len());
        if let Some(lead) = lead {
            if let Some(backend) = self.backends.iter().find(|b| b.id() == lead) {
                order.push(backend.clone());
            }
        }
        for backend in &self.backends {
            if order.iter().all(|b| b.id() != backend.id()) {
                order.push(backend.clone());
            }
        }
        order
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    enum Behavior {
        Succeed(&'static str),
        FailTransient,
        FailPermanent,
    }

    struct ScriptedBackend {
        id: ProviderId,
        available: bool,
        behavior: Behavior,
        calls: AtomicU32,
    }

    impl ScriptedBackend {
        fn new(id: ProviderId, available: bool, behavior: Behavior) -> Arc<Self> {
            Arc::new(Self {
                id,
                available,
                behavior,
                calls: AtomicU32::new(0),
            })
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ChatBackend for ScriptedBackend {
        fn id(&self) -> ProviderId {
            self.id
        }

        async fn is_available(&self) -> bool {
            self.available
        }

        async fn chat(
            &self,
            _messages: &[ChatMessage],
            _options: &ChatOptions,
        ) -> Result<String, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.behavior {
                Behavior::Succeed(text) => Ok(text.to_string()),
                Behavior::FailTransient => Err(ProviderError::Network("503".into())),
                Behavior::FailPermanent => Err(ProviderError::Auth("denied".into())),
            }
        }
    }

    fn router(backends: Vec<Arc<ScriptedBackend>>) -> ChatRouter {
        let backends: Vec<Arc<dyn ChatBackend>> =
            backends.into_iter().map(|b| b as Arc<dyn ChatBackend>).collect();
        ChatRouter::new(backends, Arc::new(ProviderDirectory::with_default_ttl()))
            .with_last_resort_policy(RetryPolicy::new(2, Duration::from_millis(10), 2))
    }

    #[tokio::test]
    async fn failover_reaches_second_provider() {
        let ollama = ScriptedBackend::new(ProviderId::Ollama, true, Behavior::FailTransient);
        let groq = ScriptedBackend::new(ProviderId::Groq, true, Behavior::Succeed("from groq"));
        let router = router(vec![ollama.clone(), groq.clone()]);

        let response = router
            .chat(&[ChatMessage::user("hi")], &ChatOptions::default())
            .await
            .unwrap();
        assert_eq!(response.provider, ProviderId::Groq);
        assert_eq!(response.text, "from groq");
        assert_eq!(ollama.calls(), 1);
    }

    #[tokio::test]
    async fn unavailable_selection_skips_to_next() {
        let ollama = ScriptedBackend::new(ProviderId::Ollama, false, Behavior::FailTransient);
        let groq = ScriptedBackend::new(ProviderId::Groq, true, Behavior::Succeed("ok"));
        let router = router(vec![ollama.clone(), groq.clone()]);

        let response = router
            .chat(&[ChatMessage::user("hi")], &ChatOptions::default())
            .await
            .unwrap();
        // Directory leads with Groq, but Ollama is still in the fallback order
        assert_eq!(response.provider, ProviderId::Groq);
        assert_eq!(ollama.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn exhaustion_retries_only_last_provider() {
        let ollama = ScriptedBackend::new(ProviderId::Ollama, true, Behavior::FailTransient);
        let groq = ScriptedBackend::new(ProviderId::Groq, true, Behavior::FailTransient);
        let gemini = ScriptedBackend::new(ProviderId::Gemini, true, Behavior::FailTransient);
        let router = router(vec![ollama.clone(), groq.clone(), gemini.clone()]);

        let err = router
            .chat(&[ChatMessage::user("hi")], &ChatOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Exhausted(_)));
        assert_eq!(ollama.calls(), 1);
        assert_eq!(groq.calls(), 1);
        // One pass + two last-resort retries
        assert_eq!(gemini.calls(), 3);
    }

    #[tokio::test]
    async fn permanent_failure_skips_last_resort_retry() {
        let ollama = ScriptedBackend::new(ProviderId::Ollama, true, Behavior::FailTransient);
        let gemini = ScriptedBackend::new(ProviderId::Gemini, true, Behavior::FailPermanent);
        let router = router(vec![ollama.clone(), gemini.clone()]);

        let err = router
            .chat(&[ChatMessage::user("hi")], &ChatOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Exhausted(_)));
        // No retry tier after a permanent error
        assert_eq!(gemini.calls(), 1);
    }

    #[tokio::test]
    async fn preferred_provider_leads_order() {
        let ollama = ScriptedBackend::new(ProviderId::Ollama, true, Behavior::Succeed("ollama"));
        let gemini = ScriptedBackend::new(ProviderId::Gemini, true, Behavior::Succeed("gemini"));
        let router = router(vec![ollama.clone(), gemini.clone()]);

        let options = ChatOptions {
            preferred_provider: Some(ProviderId::Gemini),
            ..Default::default()
        };
        let response = router.chat(&[ChatMessage::user("hi")], &options).await.unwrap();
        assert_eq!(response.provider, ProviderId::Gemini);
        assert_eq!(ollama.calls(), 0);
    }
}
