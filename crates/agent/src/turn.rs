//! Turn request and response types

use serde::{Deserialize, Serialize};

use agrivoice_core::{AudioPayload, ConversationHistory, Language, UserContext};

/// One turn's input. History is caller-supplied and authoritative; the
/// orchestrator holds no session state of its own.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TurnRequest {
    /// Voice input; takes precedence over `text` when both are present
    #[serde(default)]
    pub audio: Option<AudioPayload>,
    /// Text input
    #[serde(default)]
    pub text: Option<String>,
    /// The language the caller asked for
    #[serde(default)]
    pub language: Language,
    /// Full conversation so far
    #[serde(default)]
    pub history: ConversationHistory,
    /// Location hints for tool calls
    #[serde(default)]
    pub user_context: Option<UserContext>,
}

impl TurnRequest {
    pub fn text_turn(text: impl Into<String>, language: Language) -> Self {
        Self {
            text: Some(text.into()),
            language,
            ..Default::default()
        }
    }

    pub fn with_history(mut self, history: ConversationHistory) -> Self {
        self.history = history;
        self
    }

    pub fn with_user_context(mut self, ctx: UserContext) -> Self {
        self.user_context = Some(ctx);
        self
    }
}

/// One turn's output. At most one user and one assistant message were
/// appended to the input history.
#[derive(Debug, Clone, Serialize)]
pub struct TurnResponse {
    pub history: ConversationHistory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<AudioPayload>,
    pub detected_language: Language,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools_used: Vec<String>,
}

impl TurnResponse {
    /// The unchanged-history short circuit (input-resolution failure)
    pub(crate) fn unchanged(history: ConversationHistory, language: Language) -> Self {
        Self {
            history,
            audio: None,
            detected_language: language,
            tools_used: Vec::new(),
        }
    }
}
