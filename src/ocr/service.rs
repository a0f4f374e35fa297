//! Optical fallback service
//!
//! Owns the recognition engine for the process lifetime. The engine is
//! built lazily on the first text-poor page, at most once, even when
//! several ingestion tasks reach that point together. A failed build is
//! not remembered, so the next page tries again.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::OnceCell;

use super::{
    provider::{OllamaEngine, RecognitionEngine, TesseractEngine},
    types::{OcrError, OcrProvider},
};
use crate::document::PageBitmap;

/// OCR service configuration
#[derive(Debug, Clone)]
pub struct OcrServiceConfig {
    /// Engine to build
    pub provider: OcrProvider,
    /// Language hints (ISO 639-1)
    pub languages: Vec<String>,
    /// Tesseract binary
    pub tesseract_cmd: String,
    /// Ollama base URL
    pub ollama_url: String,
    /// Ollama vision model name
    pub ollama_model: String,
    /// Per-call recognition timeout
    pub timeout_secs: u64,
}

impl Default for OcrServiceConfig {
    fn default() -> Self {
        Self {
            provider: OcrProvider::Tesseract,
            languages: vec!["es".into(), "en".into(), "pt".into(), "fr".into()],
            tesseract_cmd: "tesseract".to_string(),
            ollama_url: "http://localhost:11434".to_string(),
            ollama_model: "llava".to_string(),
            timeout_secs: 120,
        }
    }
}

/// Builds the recognition engine on first use
#[async_trait]
pub trait EngineFactory: Send + Sync {
    async fn build(&self) -> Result<Arc<dyn RecognitionEngine>, OcrError>;
}

/// Factory driven by [`OcrServiceConfig`]
pub struct ConfiguredEngineFactory {
    config: OcrServiceConfig,
}

impl ConfiguredEngineFactory {
    pub fn new(config: OcrServiceConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl EngineFactory for ConfiguredEngineFactory {
    async fn build(&self) -> Result<Arc<dyn RecognitionEngine>, OcrError> {
        tracing::info!(provider = ?self.config.provider, "Initializing OCR engine");

        let engine: Arc<dyn RecognitionEngine> = match self.config.provider {
            OcrProvider::Tesseract => Arc::new(
                TesseractEngine::initialize(&self.config.tesseract_cmd, &self.config.languages)
                    .await?,
            ),
            OcrProvider::Ollama => Arc::new(
                OllamaEngine::initialize(&self.config.ollama_url, &self.config.ollama_model)
                    .await?,
            ),
        };

        Ok(engine)
    }
}

/// Optical fallback for text-poor pages
pub struct OpticalFallback {
    engine: OnceCell<Arc<dyn RecognitionEngine>>,
    factory: Arc<dyn EngineFactory>,
    languages: Vec<String>,
    timeout: Duration,
}

impl OpticalFallback {
    /// Create the fallback from configuration. Nothing is initialized yet.
    pub fn new(config: OcrServiceConfig) -> Self {
        let languages = config.languages.clone();
        let timeout = Duration::from_secs(config.timeout_secs);
        Self::with_factory(Arc::new(ConfiguredEngineFactory::new(config)), languages, timeout)
    }

    /// Create the fallback with a custom engine factory
    pub fn with_factory(
        factory: Arc<dyn EngineFactory>,
        languages: Vec<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            engine: OnceCell::new(),
            factory,
            languages,
            timeout,
        }
    }

    /// Configured language hints
    pub fn languages(&self) -> &[String] {
        &self.languages
    }

    /// Whether the engine has been built
    pub fn is_initialized(&self) -> bool {
        self.engine.initialized()
    }

    /// Get the shared engine, building it on first use
    pub async fn engine(&self) -> Result<Arc<dyn RecognitionEngine>, OcrError> {
        self.engine
            .get_or_try_init(|| self.factory.build())
            .await
            .cloned()
    }

    /// Recognize text on a page bitmap
    ///
    /// Returns the detected fragments joined with single spaces, or an empty
    /// string on any failure.
    pub async fn recognize(&self, bitmap: &PageBitmap, language_hints: &[String]) -> String {
        match self.try_recognize(bitmap, language_hints).await {
            Ok(fragments) => fragments.join(" "),
            Err(e) => {
                tracing::warn!("OCR degraded to empty text: {}", e);
                String::new()
            }
        }
    }

    async fn try_recognize(
        &self,
        bitmap: &PageBitmap,
        language_hints: &[String],
    ) -> Result<Vec<String>, OcrError> {
        if bitmap.is_empty() {
            return Err(OcrError::ProcessingError("empty bitmap".to_string()));
        }

        let engine = self.engine().await?;

        tokio::time::timeout(self.timeout, engine.recognize(&bitmap.data, language_hints))
            .await
            .map_err(|_| OcrError::Timeout(self.timeout.as_secs()))?
    }
}
