//! Document summaries
//!
//! Summaries come from an external model and are cached on the document and
//! in the library, so each document is summarized at most once.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::library::LibraryStore;
use crate::registry::DocumentRegistry;

/// Returned instead of a summary when there is too little text
pub const NOT_ENOUGH_TEXT: &str =
    "El documento no tiene suficiente texto para generar un resumen.";

const MIN_SUMMARY_CHARS: usize = 50;

#[derive(Debug, thiserror::Error)]
pub enum SummaryError {
    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("Summarizer request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Summarizer returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Summarizer timed out after {0} seconds")]
    Timeout(u64),
}

/// Condenses text into a few sentences
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, text: &str, sentence_count: usize) -> Result<String, SummaryError>;
}

/// Summarizer backed by an Ollama text model
pub struct OllamaSummarizer {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl OllamaSummarizer {
    pub fn new(base_url: &str, model: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }
}

#[async_trait]
impl Summarizer for OllamaSummarizer {
    async fn summarize(&self, text: &str, sentence_count: usize) -> Result<String, SummaryError> {
        let prompt = format!(
            "Summarize the following text in at most {} sentences, in the same language as the text. \
             Return only the summary.\n\n{}",
            sentence_count, text
        );

        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&serde_json::json!({
                "model": self.model,
                "prompt": prompt,
                "stream": false
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(SummaryError::Status { status, body });
        }

        let result: serde_json::Value = response.json().await?;
        Ok(result["response"].as_str().unwrap_or("").trim().to_string())
    }
}

pub struct SummaryService {
    registry: DocumentRegistry,
    library: LibraryStore,
    summarizer: Arc<dyn Summarizer>,
    sentences: usize,
    timeout: Duration,
}

impl SummaryService {
    pub fn new(
        registry: DocumentRegistry,
        library: LibraryStore,
        summarizer: Arc<dyn Summarizer>,
        sentences: usize,
        timeout: Duration,
    ) -> Self {
        Self {
            registry,
            library,
            summarizer,
            sentences,
            timeout,
        }
    }

    /// Cached summary, computing it on first request
    pub async fn summary(&self, doc_id: &str) -> Result<String, SummaryError> {
        let doc = self
            .registry
            .get(doc_id)
            .await
            .ok_or_else(|| SummaryError::NotFound(doc_id.to_string()))?;

        if let Some(summary) = doc.summary.filter(|s| !s.is_empty()) {
            return Ok(summary);
        }

        let full_text = doc
            .pages
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        if full_text.trim().chars().count() < MIN_SUMMARY_CHARS {
            return Ok(NOT_ENOUGH_TEXT.to_string());
        }

        let summary = tokio::time::timeout(
            self.timeout,
            self.summarizer.summarize(&full_text, self.sentences),
        )
        .await
        .map_err(|_| SummaryError::Timeout(self.timeout.as_secs()))??;

        self.registry.set_summary(doc_id, &summary).await;
        if let Err(e) = self.library.set_summary(doc_id, &summary).await {
            tracing::error!(doc_id = %doc_id, "Failed to persist summary: {}", e);
        }

        Ok(summary)
    }
}
