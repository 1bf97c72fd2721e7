//! Conversation history types
//!
//! The history is caller-supplied per turn and extended by at most one user
//! and one assistant message. Messages are immutable once created; the only
//! mutation the history offers is append, guarded by the dedup invariant.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Role of a message author
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Record of one tool invocation attached to an assistant message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolUsage {
    /// Tool name as registered
    pub tool: String,
    /// Arguments the tool was called with
    #[serde(default)]
    pub args: Value,
    /// Tool result, if any was captured
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
}

impl ToolUsage {
    pub fn new(tool: impl Into<String>, args: Value) -> Self {
        Self {
            tool: tool.into(),
            args,
            result: None,
        }
    }

    pub fn with_result(mut self, result: Value) -> Self {
        self.result = Some(result);
        self
    }
}

/// A single message in the conversation. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolUsage>,
    pub timestamp: DateTime<Utc>,
}

impl ConversationMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            tool_calls: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            tool_calls: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    pub fn assistant_with_tools(content: impl Into<String>, tool_calls: Vec<ToolUsage>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            tool_calls,
            timestamp: Utc::now(),
        }
    }

    pub fn word_count(&self) -> usize {
        self.content.split_whitespace().count()
    }

    /// Rough token estimate for budget checks. Indic scripts pack fewer
    /// graphemes per token than Latin text, so count grapheme clusters and
    /// scale by script.
    pub fn estimated_tokens(&self) -> usize {
        use unicode_segmentation::UnicodeSegmentation;

        let graphemes = self.content.graphemes(true).count();
        let indic = self
            .content
            .chars()
            .filter(|c| matches!(*c as u32, 0x0900..=0x097F | 0x0C80..=0x0CFF))
            .count();

        if indic > graphemes / 3 {
            graphemes.max(1) / 2
        } else {
            graphemes.max(1) / 4
        }
    }
}

/// Normalized form used by the dedup guard: trimmed and case-folded.
fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Ordered, append-only sequence of conversation messages
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationHistory {
    messages: Vec<ConversationMessage>,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_messages(messages: Vec<ConversationMessage>) -> Self {
        Self { messages }
    }

    pub fn messages(&self) -> &[ConversationMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&ConversationMessage> {
        self.messages.last()
    }

    /// Whether any assistant message exists yet (used by the greeting shortcut)
    pub fn has_assistant_message(&self) -> bool {
        self.messages.iter().any(|m| m.role == Role::Assistant)
    }

    /// Append a message unconditionally
    pub fn push(&mut self, message: ConversationMessage) {
        self.messages.push(message);
    }

    /// Append a user message unless the last message is already a user
    /// message with identical normalized content. Guards against client
    /// retries and races producing duplicate turns.
    ///
    /// Returns `true` if the message was appended.
    pub fn push_user_deduped(&mut self, content: impl Into<String>) -> bool {
        let content = content.into();
        if let Some(last) = self.messages.last() {
            if last.role == Role::User && normalize(&last.content) == normalize(&content) {
                tracing::debug!("duplicate user message suppressed");
                return false;
            }
        }
        self.messages.push(ConversationMessage::user(content));
        true
    }
}

impl From<Vec<ConversationMessage>> for ConversationHistory {
    fn from(messages: Vec<ConversationMessage>) -> Self {
        Self::from_messages(messages)
    }
}
