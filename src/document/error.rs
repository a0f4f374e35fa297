//! Document error types
//!
//! Errors raised while opening a source document, extracting page text,
//! or rasterizing a page for optical recognition.

use thiserror::Error;

/// Source document error type
#[derive(Debug, Error)]
pub enum DocumentError {
    /// Page index outside the document
    #[error("Page not found: index {0}")]
    PageNotFound(usize),

    /// Document could not be opened or parsed at all
    #[error("Failed to open document: {0}")]
    OpenFailed(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// MuPDF context error
    #[error("MuPDF context error: {0}")]
    ContextError(String),

    /// Text extraction error
    #[error("Text extraction error: {0}")]
    TextExtractionError(String),

    /// Failed to rasterize a page
    #[error("Render error: {0}")]
    RenderError(String),

    /// Image encoding error
    #[error("Image error: {0}")]
    ImageError(String),
}

/// Result type alias for document operations
pub type Result<T> = std::result::Result<T, DocumentError>;

/// Alias for Result (used by format implementations)
pub type DocumentResult<T> = Result<T>;

impl From<mupdf::Error> for DocumentError {
    fn from(err: mupdf::Error) -> Self {
        DocumentError::ContextError(err.to_string())
    }
}
