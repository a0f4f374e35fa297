//! Source document abstraction
//!
//! Ingestion only needs two things from an uploaded file: the embedded text
//! of each page and, for text-poor pages, a raster image to hand to the
//! optical recognition engine. Both sit behind [`PageSource`], opened through
//! a [`SourceOpener`] so the pipeline can be driven by MuPDF in production and
//! by scripted pages in tests.
//!
//! ```text
//!   SourceOpener::open(path) ──► PageSource
//!                                   │
//!                 ┌─────────────────┴─────────────────┐
//!                 ▼                                   ▼
//!        extract_text(index)              render_page(index, scale)
//!        (Text Extractor)                 (rasterizer for OCR)
//! ```

mod error;
mod traits;
mod types;

#[cfg(test)]
pub(crate) mod mock;

pub use error::{DocumentError, DocumentResult, Result};
pub use traits::{PageSource, SourceOpener};
pub use types::{DocumentFormat, PageBitmap};
