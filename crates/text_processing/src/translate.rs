//! Fail-open translation

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use agrivoice_core::{Language, Translator};

/// Errors from the raw translation call. Callers above the [`Translator`]
/// boundary never see these.
#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("network error: {0}")]
    Network(String),
    #[error("translation rejected: {0}")]
    Api(String),
    #[error("malformed translation response: {0}")]
    InvalidResponse(String),
}

/// Raw batch translation in ISO codes
#[async_trait]
pub trait TranslateApi: Send + Sync {
    async fn translate_batch(
        &self,
        texts: &[String],
        target: &str,
        source: Option<&str>,
    ) -> Result<Vec<String>, TranslateError>;
}

/// [`Translator`] over a cloud translation API.
///
/// The fail-open contract lives here: a no-op when source equals target,
/// and the original text on any upstream failure.
pub struct CloudTranslator {
    api: Arc<dyn TranslateApi>,
}

impl CloudTranslator {
    pub fn new(api: Arc<dyn TranslateApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Translator for CloudTranslator {
    async fn translate(&self, text: &str, target: Language, source: Option<Language>) -> String {
        if source == Some(target) || text.trim().is_empty() {
            return text.to_string();
        }

        let texts = [text.to_string()];
        match self
            .api
            .translate_batch(&texts, target.code(), source.map(|l| l.code()))
            .await
        {
            Ok(mut translated) if !translated.is_empty() => translated.remove(0),
            Ok(_) => {
                tracing::warn!("translation returned no candidates, keeping original");
                text.to_string()
            }
            Err(e) => {
                tracing::warn!(error = %e, "translation failed, keeping original");
                text.to_string()
            }
        }
    }

    async fn translate_batch(
        &self,
        texts: &[String],
        target: Language,
        source: Option<Language>,
    ) -> Vec<String> {
        if texts.is_empty() || source == Some(target) {
            return texts.to_vec();
        }
        match self
            .api
            .translate_batch(texts, target.code(), source.map(|l| l.code()))
            .await
        {
            Ok(translated) if translated.len() == texts.len() => translated,
            Ok(translated) => {
                tracing::warn!(
                    expected = texts.len(),
                    got = translated.len(),
                    "batch translation count mismatch, keeping originals"
                );
                texts.to_vec()
            }
            Err(e) => {
                tracing::warn!(error = %e, "batch translation failed, keeping originals");
                texts.to_vec()
            }
        }
    }
}

/// Pass-through translator for disabled configurations
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTranslator;

#[async_trait]
impl Translator for NoopTranslator {
    async fn translate(&self, text: &str, _target: Language, _source: Option<Language>) -> String {
        text.to_string()
    }

    async fn translate_batch(
        &self,
        texts: &[String],
        _target: Language,
        _source: Option<Language>,
    ) -> Vec<String> {
        texts.to_vec()
    }
}
