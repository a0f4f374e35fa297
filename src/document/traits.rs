//! Document traits
//!
//! The two capabilities ingestion needs from a source document: embedded
//! text per page and a rasterized page for optical recognition.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use super::error::Result;
use super::types::PageBitmap;

/// An opened source document
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Number of pages
    fn page_count(&self) -> usize;

    /// Extract embedded text from a page (0-indexed)
    async fn extract_text(&self, page_index: usize) -> Result<String>;

    /// Rasterize a page (0-indexed) to a PNG bitmap
    async fn render_page(&self, page_index: usize, scale: f32) -> Result<PageBitmap>;
}

/// Opens source documents from the upload directory
#[async_trait]
pub trait SourceOpener: Send + Sync {
    /// Open a document; failure here is fatal to the ingestion run
    async fn open(&self, path: &Path, id: &str) -> Result<Arc<dyn PageSource>>;
}
