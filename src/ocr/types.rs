//! OCR Types

use serde::{Deserialize, Serialize};

/// OCR provider type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OcrProvider {
    /// Tesseract CLI (local)
    #[default]
    Tesseract,
    /// Ollama vision model (local LLM)
    Ollama,
}

impl OcrProvider {
    /// Parse a provider name from configuration
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "tesseract" => Some(Self::Tesseract),
            "ollama" => Some(Self::Ollama),
            _ => None,
        }
    }
}

/// OCR error types
///
/// None of these ever reach the ingestion pipeline: the optical fallback
/// degrades every failure to an empty page.
#[derive(Debug, thiserror::Error)]
pub enum OcrError {
    #[error("OCR provider not available: {0}")]
    ProviderNotAvailable(String),

    #[error("OCR engine initialization failed: {0}")]
    InitializationFailed(String),

    #[error("OCR processing failed: {0}")]
    ProcessingError(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("OCR timed out after {0} seconds")]
    Timeout(u64),
}

/// Map an ISO 639-1 language hint to a Tesseract traineddata name
pub fn tesseract_language(hint: &str) -> Option<&'static str> {
    match hint.trim().to_lowercase().as_str() {
        "es" => Some("spa"),
        "en" => Some("eng"),
        "pt" => Some("por"),
        "fr" => Some("fra"),
        "it" => Some("ita"),
        "de" => Some("deu"),
        _ => None,
    }
}
