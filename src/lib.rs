//! Lectern Server Library
//!
//! PDF read-aloud backend: page text extraction with OCR fallback, a
//! document registry backed by a JSON library file, and a translation-aware
//! narration cache. The server binary is in main.rs.
//!
//! # Modules
//!
//! - `document`: Page source abstraction
//! - `formats`: MuPDF-backed PDF page source
//! - `ocr`: Optical fallback for text-poor pages
//! - `ingest`: Ingestion pipeline and page normalizer
//! - `registry`: In-memory document index
//! - `library`: Durable library file
//! - `narration`: Voice resolution and audio cache
//! - `summary`: Cached document summaries

pub mod config;
pub mod document;
pub mod error;
pub mod formats;
pub mod ingest;
pub mod library;
pub mod narration;
pub mod ocr;
pub mod registry;
pub mod routes;
pub mod state;
pub mod summary;

mod mupdf;

use axum::Router;

pub use config::Config;
pub use state::AppState;

/// Build the application router
pub fn app(state: AppState) -> Router {
    routes::router().with_state(state)
}
