//! Google Cloud Translation v2 client
//!
//! One HTTP client serves both the detector and the translator; the two
//! trait impls only differ in how they classify failures.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use crate::detect::{CloudDetectApi, DetectError};
use crate::translate::{TranslateApi, TranslateError};

const API_BASE: &str = "https://translation.googleapis.com/language/translate/v2";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Shared client for the v2 detect/translate endpoints
pub struct GoogleTextApi {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GoogleTextApi {
    pub fn new(api_key: impl Into<String>) -> agrivoice_core::Result<Self> {
        Self::with_base_url(api_key, API_BASE)
    }

    /// Override the endpoint (tests, proxies)
    pub fn with_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> agrivoice_core::Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| agrivoice_core::Error::Config(format!("http client: {e}")))?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into(),
        })
    }
}

#[derive(Deserialize)]
struct DetectResponse {
    data: DetectData,
}

#[derive(Deserialize)]
struct DetectData {
    detections: Vec<Vec<Detection>>,
}

#[derive(Deserialize)]
struct Detection {
    language: String,
}

#[derive(Deserialize)]
struct TranslateResponse {
    data: TranslateData,
}

#[derive(Deserialize)]
struct TranslateData {
    translations: Vec<Translation>,
}

#[derive(Deserialize)]
struct Translation {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

#[async_trait]
impl CloudDetectApi for GoogleTextApi {
    async fn detect_code(&self, text: &str) -> Result<String, DetectError> {
        let url = format!("{}/detect?key={}", self.base_url, self.api_key);
        let response = self
            .client
            .post(&url)
            .json(&json!({ "q": text }))
            .send()
            .await
            .map_err(|e| DetectError::Transient(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // 403 means the API is disabled or quota is permanently gone
            if status == reqwest::StatusCode::FORBIDDEN {
                return Err(DetectError::Permission(format!("{status}: {body}")));
            }
            return Err(DetectError::Transient(format!("{status}: {body}")));
        }

        let parsed: DetectResponse = response
            .json()
            .await
            .map_err(|e| DetectError::Transient(e.to_string()))?;
        parsed
            .data
            .detections
            .first()
            .and_then(|group| group.first())
            .map(|d| d.language.clone())
            .ok_or_else(|| DetectError::Transient("empty detection result".into()))
    }
}

#[async_trait]
impl TranslateApi for GoogleTextApi {
    async fn translate_batch(
        &self,
        texts: &[String],
        target: &str,
        source: Option<&str>,
    ) -> Result<Vec<String>, TranslateError> {
        let url = format!("{}?key={}", self.base_url, self.api_key);
        let mut body = json!({ "q": texts, "target": target, "format": "text" });
        if let Some(source) = source {
            body["source"] = json!(source);
        }

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| TranslateError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TranslateError::Api(format!("{status}: {body}")));
        }

        let parsed: TranslateResponse = response
            .json()
            .await
            .map_err(|e| TranslateError::InvalidResponse(e.to_string()))?;
        Ok(parsed
            .data
            .translations
            .into_iter()
            .map(|t| t.translated_text)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_shapes_deserialize() {
        let detect: DetectResponse = serde_json::from_value(json!({
            "data": { "detections": [[{ "language": "hi", "confidence": 0.98 }]] }
        }))
        .unwrap();
        assert_eq!(detect.data.detections[0][0].language, "hi");

        let translate: TranslateResponse = serde_json::from_value(json!({
            "data": { "translations": [{ "translatedText": "नमस्ते" }] }
        }))
        .unwrap();
        assert_eq!(translate.data.translations[0].translated_text, "नमस्ते");
    }
}
