//! Text processing traits: translation and language identification

use async_trait::async_trait;

use crate::language::Language;

/// Best-effort text translation.
///
/// Fail-open is part of the contract and of the signature: there is no
/// error channel. Implementations return the input unchanged when the
/// source equals the target or when anything goes wrong.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, target: Language, source: Option<Language>) -> String;

    /// Batched variant with the same contract, one upstream call.
    async fn translate_batch(
        &self,
        texts: &[String],
        target: Language,
        source: Option<Language>,
    ) -> Vec<String> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.translate(text, target, source).await);
        }
        out
    }
}

/// Closed-set language identification.
///
/// Infallible by contract: anything unrecognizable resolves to the default
/// language.
#[async_trait]
pub trait LanguageDetector: Send + Sync {
    async fn detect(&self, text: &str) -> Language;
}
