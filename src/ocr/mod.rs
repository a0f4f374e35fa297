//! OCR Module
//!
//! Optical fallback for scanned or image-only PDF pages.
//!
//! Supports two engines:
//! - Tesseract (local CLI, default)
//! - Ollama vision models (local LLM)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use lectern_server::ocr::{OcrServiceConfig, OpticalFallback};
//!
//! let ocr = OpticalFallback::new(OcrServiceConfig::default());
//!
//! // First call builds the engine; later calls reuse it.
//! let text = ocr.recognize(&bitmap, ocr.languages()).await;
//! ```

mod provider;
mod service;
mod types;

pub use provider::{OllamaEngine, RecognitionEngine, TesseractEngine};
pub use service::{ConfiguredEngineFactory, EngineFactory, OcrServiceConfig, OpticalFallback};
pub use types::{tesseract_language, OcrError, OcrProvider};

#[cfg(test)]
pub(crate) use provider::MockEngine;
