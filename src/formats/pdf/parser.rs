//! PDF PageSource implementation
//!
//! Uses MuPDF via `SafeDocument`. All MuPDF work is CPU-bound and runs on
//! the blocking pool.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use crate::document::{
    DocumentError, DocumentResult, PageBitmap, PageSource, SourceOpener,
};
use crate::mupdf::SafeDocument;

use super::renderer::render_png;

/// PDF implementation of PageSource
pub struct PdfDocumentHandler {
    /// Thread-safe MuPDF document wrapper
    pub(super) doc: Arc<SafeDocument>,
}

impl PdfDocumentHandler {
    /// Open a PDF from a file path
    pub fn from_path<P: AsRef<Path>>(path: P, id: String) -> DocumentResult<Self> {
        let doc = SafeDocument::open(path, id)?;
        Ok(Self { doc: Arc::new(doc) })
    }

    fn validate_page_index(&self, page_index: usize) -> DocumentResult<()> {
        if page_index >= self.doc.page_count() {
            return Err(DocumentError::PageNotFound(page_index));
        }
        Ok(())
    }
}

#[async_trait]
impl PageSource for PdfDocumentHandler {
    fn page_count(&self) -> usize {
        self.doc.page_count()
    }

    async fn extract_text(&self, page_index: usize) -> DocumentResult<String> {
        self.validate_page_index(page_index)?;
        let doc = self.doc.clone();

        tokio::task::spawn_blocking(move || {
            doc.with_doc(|mupdf_doc| {
                let page = mupdf_doc.load_page(page_index as i32)?;
                page.to_text().map_err(|e| {
                    DocumentError::TextExtractionError(format!(
                        "page {} of {}: {}",
                        page_index + 1,
                        doc.id(),
                        e
                    ))
                })
            })
        })
        .await
        .map_err(|e| DocumentError::TextExtractionError(format!("Task join error: {}", e)))?
    }

    async fn render_page(&self, page_index: usize, scale: f32) -> DocumentResult<PageBitmap> {
        self.validate_page_index(page_index)?;
        let doc = self.doc.clone();

        tokio::task::spawn_blocking(move || render_png(&doc, page_index, scale))
            .await
            .map_err(|e| DocumentError::RenderError(format!("Task join error: {}", e)))?
    }
}

/// Opens uploaded PDFs with MuPDF
#[derive(Debug, Clone, Default)]
pub struct PdfOpener;

#[async_trait]
impl SourceOpener for PdfOpener {
    async fn open(&self, path: &Path, id: &str) -> DocumentResult<Arc<dyn PageSource>> {
        let path = path.to_path_buf();
        let id = id.to_string();

        let handler = tokio::task::spawn_blocking(move || PdfDocumentHandler::from_path(path, id))
            .await
            .map_err(|e| DocumentError::OpenFailed(format!("Task join error: {}", e)))??;

        tracing::debug!(
            doc_id = %handler.doc.id(),
            format = handler.doc.format().mime_type(),
            pages = handler.page_count(),
            "Opened PDF"
        );

        Ok(Arc::new(handler))
    }
}
