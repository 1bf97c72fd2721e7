//! Language detection: local script heuristic with guarded cloud fallback

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;

use agrivoice_core::{Language, LanguageDetector};

/// Fraction of meaningful characters a script must exceed to win
const SCRIPT_THRESHOLD: f64 = 0.30;

/// Errors from the cloud detection call
#[derive(Debug, Error)]
pub enum DetectError {
    /// API disabled, key rejected, or quota permanently exhausted —
    /// trips the breaker
    #[error("detection permission/quota failure: {0}")]
    Permission(String),
    /// Anything else; falls back to the local result for this call only
    #[error("transient detection failure: {0}")]
    Transient(String),
}

/// Cloud language identification, mapped into raw ISO codes
#[async_trait]
pub trait CloudDetectApi: Send + Sync {
    async fn detect_code(&self, text: &str) -> Result<String, DetectError>;
}

/// Zero-latency detector based on Unicode block ranges.
///
/// Hindi uses Devanagari (U+0900..U+097F) and Kannada its own block
/// (U+0C80..U+0CFF), so both are visually and numerically distinct from
/// Latin text and the heuristic is reliable for them. Latin-script text is
/// where ambiguity lives.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptDetector;

impl ScriptDetector {
    pub fn new() -> Self {
        Self
    }

    /// Classify by script fractions; anything ambiguous is English.
    pub fn detect(&self, text: &str) -> Language {
        let mut hindi = 0usize;
        let mut kannada = 0usize;
        let mut total = 0usize;

        for ch in text.chars() {
            if ch.is_whitespace() || ch.is_ascii_punctuation() {
                continue;
            }
            total += 1;
            match ch as u32 {
                0x0900..=0x097F => hindi += 1,
                0x0C80..=0x0CFF => kannada += 1,
                _ => {}
            }
        }

        if total == 0 {
            return Language::English;
        }

        let hindi_pct = hindi as f64 / total as f64;
        let kannada_pct = kannada as f64 / total as f64;

        if kannada_pct > SCRIPT_THRESHOLD && kannada_pct >= hindi_pct {
            Language::Kannada
        } else if hindi_pct > SCRIPT_THRESHOLD && hindi_pct > kannada_pct {
            Language::Hindi
        } else {
            Language::English
        }
    }
}

/// Script heuristic first, cloud fallback second.
///
/// A local Hindi/Kannada hit is trusted outright. The cloud is consulted
/// only for Latin-ambiguous text, and only while the breaker is closed:
/// a permission/quota failure latches it open for the rest of the process.
pub struct HybridDetector {
    local: ScriptDetector,
    cloud: Option<Arc<dyn CloudDetectApi>>,
    cloud_disabled: AtomicBool,
}

impl HybridDetector {
    pub fn new(cloud: Option<Arc<dyn CloudDetectApi>>) -> Self {
        Self {
            local: ScriptDetector::new(),
            cloud,
            cloud_disabled: AtomicBool::new(false),
        }
    }

    /// Local-only detector (cloud never consulted)
    pub fn local_only() -> Self {
        Self::new(None)
    }

    /// Whether the breaker has tripped
    pub fn cloud_disabled(&self) -> bool {
        self.cloud_disabled.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl LanguageDetector for HybridDetector {
    async fn detect(&self, text: &str) -> Language {
        let local = self.local.detect(text);
        if !local.is_default() {
            tracing::debug!(language = %local, "language detected locally");
            return local;
        }

        let Some(cloud) = &self.cloud else {
            return local;
        };
        if self.cloud_disabled.load(Ordering::Relaxed) {
            return local;
        }

        match cloud.detect_code(text).await {
            Ok(code) => Language::from_code(&code).unwrap_or(Language::English),
            Err(DetectError::Permission(reason)) => {
                // One-way latch: never consult the cloud again this process
                tracing::warn!(%reason, "cloud detection disabled for process lifetime");
                self.cloud_disabled.store(true, Ordering::Relaxed);
                local
            }
            Err(DetectError::Transient(reason)) => {
                tracing::debug!(%reason, "cloud detection failed, using local result");
                local
            }
        }
    }
}
