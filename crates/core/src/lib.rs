//! Core traits and types for the AgriVoice turn orchestrator
//!
//! This crate provides the foundational types used across all other crates:
//! - Trait seams for pluggable backends (chat providers, STT, TTS, translation, tools)
//! - Conversation history with the append-only/dedup invariant
//! - Language definitions for the three supported languages
//! - Self-describing audio payloads
//! - The shared retry policy
//! - Error types

pub mod audio;
pub mod context;
pub mod conversation;
pub mod error;
pub mod language;
pub mod retry;
pub mod traits;

pub use audio::AudioPayload;
pub use context::UserContext;
pub use conversation::{ConversationHistory, ConversationMessage, Role, ToolUsage};
pub use error::{Error, ProviderError, Result, SynthesisError};
pub use language::Language;
pub use retry::RetryPolicy;

pub use traits::{
    ChatBackend, ChatMessage, ChatOptions, ChatOutcome, ChatRole, LanguageDetector, ProviderId,
    SpeechToText, TextToSpeech, Tool, ToolDefinition, ToolDispatcher, ToolOutput, ToolParameter,
    ToolSchema, Translator,
};
