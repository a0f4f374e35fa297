//! Speech synthesis
//!
//! Talks to an OpenAI-compatible `/v1/audio/speech` endpoint. Edge-TTS
//! bridges expose the same shape, so neural voice names such as
//! `es-AR-TomasNeural` pass straight through.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use super::error::SynthesisError;

/// Returns raw MP3 bytes for a text and voice
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str, voice: &str) -> Result<Vec<u8>, SynthesisError>;
}

#[derive(Serialize)]
struct SpeechBody<'a> {
    model: &'a str,
    input: &'a str,
    voice: &'a str,
    response_format: &'static str,
}

/// HTTP speech engine client
pub struct HttpSpeechSynthesizer {
    client: Client,
    url: String,
    api_key: Option<String>,
    model: String,
}

impl HttpSpeechSynthesizer {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
            api_key: None,
            model: "tts-1".to_string(),
        }
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

#[async_trait]
impl SpeechSynthesizer for HttpSpeechSynthesizer {
    async fn synthesize(&self, text: &str, voice: &str) -> Result<Vec<u8>, SynthesisError> {
        let body = SpeechBody {
            model: &self.model,
            input: text,
            voice,
            response_format: "mp3",
        };

        tracing::debug!(voice = %voice, chars = text.chars().count(), "Requesting speech");

        let mut request = self.client.post(&self.url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(SynthesisError::Status { status, body });
        }

        let audio = response.bytes().await?;
        if audio.is_empty() {
            return Err(SynthesisError::EmptyAudio);
        }
        Ok(audio.to_vec())
    }
}
