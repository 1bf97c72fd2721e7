//! Settings and language assets
//!
//! Configuration is layered the usual way: `config/default.toml` (optional),
//! an explicit file, then `AGRIVOICE_*` environment variables. Secrets come
//! from their conventional env vars (`GROQ_API_KEY`, `GEMINI_API_KEY`) when
//! not set explicitly.

mod phrases;
mod settings;

pub use phrases::{apology, farewell, greeting, regreeting, voice_name, GREETING_WORDS};
pub use settings::{
    AgentConfig, ConfigError, DetectionConfig, GeminiConfig, GroqConfig, OllamaConfig,
    ProvidersConfig, RuntimeEnvironment, Settings, SpeechConfig, TranslationConfig,
};
