//! Language detection and translation
//!
//! Client for a LibreTranslate-compatible service (`/detect`, `/translate`).

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::error::TranslationError;

/// Identifies the language of a text as an ISO 639-1 code
#[async_trait]
pub trait LanguageDetector: Send + Sync {
    async fn detect(&self, text: &str) -> Result<String, TranslationError>;
}

/// Translates text into a target language, auto-detecting the source
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, target_language: &str) -> Result<String, TranslationError>;
}

#[derive(Deserialize)]
struct Detection {
    language: String,
    #[serde(default)]
    confidence: f32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranslateResponse {
    translated_text: String,
}

/// LibreTranslate HTTP client
pub struct LibreTranslateClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl LibreTranslateClient {
    pub fn new(base_url: &str, api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    async fn post<T: for<'de> Deserialize<'de>>(
        &self,
        endpoint: &str,
        mut body: serde_json::Value,
    ) -> Result<T, TranslationError> {
        if let Some(key) = &self.api_key {
            body["api_key"] = serde_json::Value::String(key.clone());
        }

        let response = self
            .client
            .post(format!("{}/{}", self.base_url, endpoint))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(TranslationError::Status { status, body });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl LanguageDetector for LibreTranslateClient {
    async fn detect(&self, text: &str) -> Result<String, TranslationError> {
        let detections: Vec<Detection> = self.post("detect", serde_json::json!({ "q": text })).await?;

        // Highest confidence first
        detections
            .into_iter()
            .max_by(|a, b| a.confidence.total_cmp(&b.confidence))
            .map(|d| d.language.to_lowercase())
            .ok_or(TranslationError::Undetected)
    }
}

#[async_trait]
impl Translator for LibreTranslateClient {
    async fn translate(&self, text: &str, target_language: &str) -> Result<String, TranslationError> {
        let response: TranslateResponse = self
            .post(
                "translate",
                serde_json::json!({
                    "q": text,
                    "source": "auto",
                    "target": target_language,
                    "format": "text",
                }),
            )
            .await?;
        Ok(response.translated_text)
    }
}
