//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration loading/validation errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Runtime environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    #[default]
    Development,
    Staging,
    Production,
}

impl RuntimeEnvironment {
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: RuntimeEnvironment,

    /// Chat provider configuration
    #[serde(default)]
    pub providers: ProvidersConfig,

    /// Language detection configuration
    #[serde(default)]
    pub detection: DetectionConfig,

    /// Translation configuration
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Speech I/O configuration
    #[serde(default)]
    pub speech: SpeechConfig,

    /// Turn orchestrator configuration
    #[serde(default)]
    pub agent: AgentConfig,
}

impl Settings {
    /// Load settings from the default file (optional), an explicit file
    /// (optional), and `AGRIVOICE_*` environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder =
            Config::builder().add_source(File::with_name("config/default").required(false));
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        let config = builder
            .add_source(Environment::with_prefix("AGRIVOICE").separator("__"))
            .build()?;
        let settings: Settings = config.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Sanity checks that should fail fast at composition time
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.agent.temperature) {
            return Err(ConfigError::Invalid(format!(
                "agent.temperature must be in [0, 2], got {}",
                self.agent.temperature
            )));
        }
        if self.agent.max_tokens == 0 {
            return Err(ConfigError::Invalid("agent.max_tokens must be > 0".into()));
        }
        if self.providers.ollama.endpoint.is_empty() {
            return Err(ConfigError::Invalid("providers.ollama.endpoint is empty".into()));
        }
        Ok(())
    }
}

/// Chat provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub ollama: OllamaConfig,
    #[serde(default)]
    pub groq: GroqConfig,
    #[serde(default)]
    pub gemini: GeminiConfig,
    /// Seconds the provider-directory selection stays cached
    #[serde(default = "default_health_ttl_secs")]
    pub health_ttl_secs: u64,
}

fn default_health_ttl_secs() -> u64 {
    60
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            ollama: OllamaConfig::default(),
            groq: GroqConfig::default(),
            gemini: GeminiConfig::default(),
            health_ttl_secs: default_health_ttl_secs(),
        }
    }
}

/// Self-hosted Ollama provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    #[serde(default = "default_ollama_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_ollama_model")]
    pub model: String,
}

fn default_ollama_endpoint() -> String {
    std::env::var("OLLAMA_URL").unwrap_or_else(|_| "http://localhost:11434".to_string())
}

fn default_ollama_model() -> String {
    std::env::var("OLLAMA_MODEL").unwrap_or_else(|_| "llama3.2".to_string())
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            endpoint: default_ollama_endpoint(),
            model: default_ollama_model(),
        }
    }
}

/// Groq cloud provider (high free limits)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroqConfig {
    /// Falls back to `GROQ_API_KEY`
    #[serde(default = "default_groq_key")]
    pub api_key: Option<String>,
    #[serde(default = "default_groq_model")]
    pub model: String,
}

fn default_groq_key() -> Option<String> {
    std::env::var("GROQ_API_KEY").ok()
}

fn default_groq_model() -> String {
    "llama-3.3-70b-versatile".to_string()
}

impl Default for GroqConfig {
    fn default() -> Self {
        Self {
            api_key: default_groq_key(),
            model: default_groq_model(),
        }
    }
}

/// Gemini cloud provider (strict limits, last resort; also serves speech)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// Falls back to `GEMINI_API_KEY`
    #[serde(default = "default_gemini_key")]
    pub api_key: Option<String>,
    #[serde(default = "default_gemini_model")]
    pub model: String,
}

fn default_gemini_key() -> Option<String> {
    std::env::var("GEMINI_API_KEY").ok()
}

fn default_gemini_model() -> String {
    "gemini-2.5-flash".to_string()
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: default_gemini_key(),
            model: default_gemini_model(),
        }
    }
}

/// Cloud language detection (the local script heuristic needs no config)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Whether the cloud detector may be consulted at all
    #[serde(default = "default_true")]
    pub cloud_enabled: bool,
    /// Falls back to `GOOGLE_CLOUD_API_KEY`, then `GEMINI_API_KEY`
    #[serde(default = "default_google_key")]
    pub api_key: Option<String>,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            cloud_enabled: true,
            api_key: default_google_key(),
        }
    }
}

/// Translation service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Falls back to `GOOGLE_CLOUD_API_KEY`, then `GEMINI_API_KEY`
    #[serde(default = "default_google_key")]
    pub api_key: Option<String>,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: default_google_key(),
        }
    }
}

fn default_google_key() -> Option<String> {
    std::env::var("GOOGLE_CLOUD_API_KEY")
        .ok()
        .or_else(|| std::env::var("GEMINI_API_KEY").ok())
}

fn default_true() -> bool {
    true
}

/// Speech I/O configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Falls back to `GEMINI_API_KEY`
    #[serde(default = "default_gemini_key")]
    pub api_key: Option<String>,
    #[serde(default = "default_stt_model")]
    pub stt_model: String,
    #[serde(default = "default_tts_model")]
    pub tts_model: String,
}

fn default_stt_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_tts_model() -> String {
    "gemini-2.5-flash-preview-tts".to_string()
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: default_gemini_key(),
            stt_model: default_stt_model(),
            tts_model: default_tts_model(),
        }
    }
}

/// Turn orchestrator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Kept small: responses are spoken
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> usize {
    300
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}
