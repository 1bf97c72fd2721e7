//! Chat provider backends and failover routing
//!
//! Three interchangeable providers in fixed priority order — self-hosted
//! Ollama, high-limit Groq, strict-limit Gemini — behind a liveness
//! directory with a short-lived cache and a router that walks the order on
//! failure. Only the last, most constrained provider is retried before the
//! router gives up.

pub mod directory;
pub mod providers;
pub mod router;

pub use directory::{ProviderDirectory, ProviderHealth};
pub use providers::{
    GeminiBackend, GeminiProviderConfig, GroqBackend, GroqProviderConfig, OllamaBackend,
    OllamaProviderConfig,
};
pub use router::{ChatRouter, RoutedResponse};
