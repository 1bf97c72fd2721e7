//! Chat provider trait and wire types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::conversation::{ConversationMessage, Role, ToolUsage};
use crate::error::ProviderError;
use crate::traits::tool::{ToolDefinition, ToolDispatcher};

/// The closed set of chat providers, in priority order: self-hosted and
/// unlimited first, strict-limit cloud last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    /// Self-hosted, unlimited
    Ollama,
    /// Cloud, high free limits
    Groq,
    /// Cloud, strict limits — last resort
    Gemini,
}

impl ProviderId {
    /// Fixed priority order used for probing and failover
    pub fn priority_order() -> [ProviderId; 3] {
        [ProviderId::Ollama, ProviderId::Groq, ProviderId::Gemini]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::Ollama => "ollama",
            ProviderId::Groq => "groq",
            ProviderId::Gemini => "gemini",
        }
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Role of a chat message on the provider wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// A message in provider wire format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }

    /// Convert a conversation message into wire format
    pub fn from_conversation(message: &ConversationMessage) -> Self {
        match message.role {
            Role::User => Self::user(message.content.clone()),
            Role::Assistant => Self::assistant(message.content.clone()),
        }
    }
}

/// Generation options passed through to providers
#[derive(Debug, Clone)]
pub struct ChatOptions {
    pub temperature: f32,
    pub max_tokens: usize,
    pub system_prompt: Option<String>,
    /// Attempted first when set; the router still falls back past it
    pub preferred_provider: Option<ProviderId>,
}

impl Default for ChatOptions {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 300,
            system_prompt: None,
            preferred_provider: None,
        }
    }
}

impl ChatOptions {
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// Result of a generation call, including any tools the model invoked itself
#[derive(Debug, Clone)]
pub struct ChatOutcome {
    pub text: String,
    pub tool_usage: Vec<ToolUsage>,
}

impl ChatOutcome {
    pub fn text_only(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tool_usage: Vec::new(),
        }
    }
}

/// One interchangeable chat-completion provider.
///
/// Implementations map their transport failures onto [`ProviderError`] so
/// the router can tell transient from permanent without knowing the wire.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Which provider this backend is
    fn id(&self) -> ProviderId;

    /// Cheap liveness probe used by the provider directory
    async fn is_available(&self) -> bool;

    /// Single chat completion
    async fn chat(
        &self,
        messages: &[ChatMessage],
        options: &ChatOptions,
    ) -> Result<String, ProviderError>;

    /// Whether the provider can select and invoke tools natively during
    /// generation (strategy (b)); most low-cost providers cannot.
    fn supports_native_tools(&self) -> bool {
        false
    }

    /// Chat with native tool calling. The default simply ignores the tool
    /// definitions, so callers can use this unconditionally.
    async fn chat_with_tools(
        &self,
        messages: &[ChatMessage],
        options: &ChatOptions,
        _tools: &[ToolDefinition],
        _dispatcher: &dyn ToolDispatcher,
    ) -> Result<ChatOutcome, ProviderError> {
        self.chat(messages, options).await.map(ChatOutcome::text_only)
    }
}
