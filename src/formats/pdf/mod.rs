//! PDF format implementation
//!
//! - [`PdfDocumentHandler`]: implements `PageSource` (text extraction and
//!   rasterization for OCR)
//! - [`PdfOpener`]: implements `SourceOpener` for uploaded files
//!
//! Both use [`SafeDocument`](crate::mupdf::SafeDocument) for thread-safe access.

mod parser;
mod renderer;

pub use parser::{PdfDocumentHandler, PdfOpener};
