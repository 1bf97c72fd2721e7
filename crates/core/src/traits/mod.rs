//! Trait seams for pluggable backends
//!
//! Chat:
//!   - ChatBackend: one interchangeable chat-completion provider
//! Speech:
//!   - SpeechToText / TextToSpeech: the speech I/O boundary
//! Text:
//!   - Translator: fail-open translation
//!   - LanguageDetector: closed-set language identification
//! Tools:
//!   - Tool: a named, contract-bound domain capability
//!   - ToolDispatcher: name-keyed tool invocation for model-initiated calls

mod chat;
mod speech;
mod text;
mod tool;

pub use chat::{ChatBackend, ChatMessage, ChatOptions, ChatOutcome, ChatRole, ProviderId};
pub use speech::{SpeechToText, TextToSpeech};
pub use text::{LanguageDetector, Translator};
pub use tool::{
    ParameterKind, Tool, ToolDefinition, ToolDispatcher, ToolOutput, ToolParameter, ToolSchema,
};
