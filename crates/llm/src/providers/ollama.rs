//! Ollama backend — self-hosted, unlimited, first in priority order

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use agrivoice_core::{
    ChatBackend, ChatMessage, ChatOptions, ChatRole, ProviderError, ProviderId, Result,
};

use super::{classify_status, classify_transport, http_client};

/// Ollama configuration
#[derive(Debug, Clone)]
pub struct OllamaProviderConfig {
    pub endpoint: String,
    pub model: String,
    pub timeout: Duration,
    /// Liveness probes must answer fast or the provider is treated as down
    pub probe_timeout: Duration,
}

impl Default for OllamaProviderConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:11434".to_string(),
            model: "llama3.2".to_string(),
            timeout: Duration::from_secs(30),
            probe_timeout: Duration::from_secs(2),
        }
    }
}

/// Self-hosted Ollama chat backend
pub struct OllamaBackend {
    client: Client,
    config: OllamaProviderConfig,
}

#[derive(Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: Vec<OllamaMessage<'a>>,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: i32,
}

#[derive(Deserialize)]
struct OllamaChatResponse {
    message: OllamaResponseMessage,
}

#[derive(Deserialize)]
struct OllamaResponseMessage {
    content: String,
}

impl OllamaBackend {
    pub fn new(config: OllamaProviderConfig) -> Result<Self> {
        let client = http_client(config.timeout)?;
        Ok(Self { client, config })
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/api{}", self.config.endpoint, path)
    }

    fn wire_messages<'a>(
        messages: &'a [ChatMessage],
        options: &'a ChatOptions,
    ) -> Vec<OllamaMessage<'a>> {
        let mut wire = Vec::with_capacity(messages.len() + 1);
        if let Some(system) = options.system_prompt.as_deref() {
            wire.push(OllamaMessage {
                role: "system",
                content: system,
            });
        }
        for message in messages {
            wire.push(OllamaMessage {
                role: match message.role {
                    ChatRole::System => "system",
                    ChatRole::User => "user",
                    ChatRole::Assistant => "assistant",
                },
                content: &message.content,
            });
        }
        wire
    }
}

#[async_trait]
impl ChatBackend for OllamaBackend {
    fn id(&self) -> ProviderId {
        ProviderId::Ollama
    }

    /// A fast tags listing doubles as the liveness probe
    async fn is_available(&self) -> bool {
        let result = self
            .client
            .get(self.api_url("/tags"))
            .timeout(self.config.probe_timeout)
            .send()
            .await;
        matches!(result, Ok(response) if response.status().is_success())
    }

    async fn chat(
        &self,
        messages: &[ChatMessage],
        options: &ChatOptions,
    ) -> std::result::Result<String, ProviderError> {
        let request = OllamaChatRequest {
            model: &self.config.model,
            messages: Self::wire_messages(messages, options),
            stream: false,
            options: OllamaOptions {
                temperature: options.temperature,
                num_predict: options.max_tokens as i32,
            },
        };

        let response = self
            .client
            .post(self.api_url("/chat"))
            .json(&request)
            .send()
            .await
            .map_err(classify_transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status, body));
        }

        let parsed: OllamaChatResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;
        Ok(parsed.message.content)
    }
}
