//! Supported languages
//!
//! The assistant speaks exactly three languages. English is the default:
//! ambiguous or empty input always resolves to it.

use serde::{Deserialize, Serialize};

/// Languages supported across chat, detection, translation and speech
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// English (Latin script) — the default language
    #[default]
    #[serde(rename = "en")]
    English,
    /// Hindi (Devanagari script)
    #[serde(rename = "hi")]
    Hindi,
    /// Kannada (Kannada script)
    #[serde(rename = "kn")]
    Kannada,
}

impl Language {
    /// ISO 639-1 code, also used on the wire
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Hindi => "hi",
            Language::Kannada => "kn",
        }
    }

    /// Human-readable name (used in system prompts)
    pub fn name(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Hindi => "Hindi",
            Language::Kannada => "Kannada",
        }
    }

    /// Parse an ISO code, mapping anything unrecognized to `None`
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "en" => Some(Language::English),
            "hi" => Some(Language::Hindi),
            "kn" => Some(Language::Kannada),
            _ => None,
        }
    }

    pub fn is_default(&self) -> bool {
        matches!(self, Language::English)
    }

    /// All supported languages in declaration order
    pub fn all() -> [Language; 3] {
        [Language::English, Language::Hindi, Language::Kannada]
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_round_trip() {
        for lang in Language::all() {
            assert_eq!(Language::from_code(lang.code()), Some(lang));
        }
        assert_eq!(Language::from_code("ta"), None);
    }

    #[test]
    fn default_is_english() {
        assert_eq!(Language::default(), Language::English);
        assert!(Language::English.is_default());
        assert!(!Language::Kannada.is_default());
    }
}
