//! Groq backend — cloud, free tier with high limits, second in priority

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use agrivoice_core::{
    ChatBackend, ChatMessage, ChatOptions, ChatRole, ProviderError, ProviderId, Result,
};

use super::{classify_status, classify_transport, http_client};

/// Groq configuration (OpenAI-compatible API)
#[derive(Debug, Clone)]
pub struct GroqProviderConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub endpoint: String,
    pub timeout: Duration,
}

impl Default for GroqProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "llama-3.3-70b-versatile".to_string(),
            endpoint: "https://api.groq.com/openai/v1".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Groq chat backend
pub struct GroqBackend {
    client: Client,
    config: GroqProviderConfig,
}

#[derive(Serialize)]
struct GroqChatRequest<'a> {
    model: &'a str,
    messages: Vec<GroqMessage<'a>>,
    temperature: f32,
    max_tokens: usize,
}

#[derive(Serialize)]
struct GroqMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct GroqChatResponse {
    choices: Vec<GroqChoice>,
}

#[derive(Deserialize)]
struct GroqChoice {
    message: GroqResponseMessage,
}

#[derive(Deserialize)]
struct GroqResponseMessage {
    content: Option<String>,
}

impl GroqBackend {
    pub fn new(config: GroqProviderConfig) -> Result<Self> {
        let client = http_client(config.timeout)?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl ChatBackend for GroqBackend {
    fn id(&self) -> ProviderId {
        ProviderId::Groq
    }

    /// Availability is configuration, not a network probe: a key either is
    /// or is not present.
    async fn is_available(&self) -> bool {
        self.config.api_key.is_some()
    }

    async fn chat(
        &self,
        messages: &[ChatMessage],
        options: &ChatOptions,
    ) -> std::result::Result<String, ProviderError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| ProviderError::Auth("GROQ_API_KEY not set".into()))?;

        let mut wire = Vec::with_capacity(messages.len() + 1);
        if let Some(system) = options.system_prompt.as_deref() {
            wire.push(GroqMessage {
                role: "system",
                content: system,
            });
        }
        for message in messages {
            wire.push(GroqMessage {
                role: match message.role {
                    ChatRole::System => "system",
                    ChatRole::User => "user",
                    ChatRole::Assistant => "assistant",
                },
                content: &message.content,
            });
        }

        let request = GroqChatRequest {
            model: &self.config.model,
            messages: wire,
            temperature: options.temperature,
            max_tokens: options.max_tokens,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.endpoint))
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(classify_transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status, body));
        }

        let parsed: GroqChatResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|text| !text.is_empty())
            .ok_or_else(|| ProviderError::InvalidResponse("empty completion".into()))
    }
}
