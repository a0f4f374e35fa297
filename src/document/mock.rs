//! In-memory page sources for tests

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use super::{DocumentError, DocumentResult, PageBitmap, PageSource, SourceOpener};

/// One scripted page
#[derive(Debug, Clone, Default)]
pub struct MockPage {
    pub text: String,
    pub extract_fails: bool,
    pub render_fails: bool,
}

impl MockPage {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn image_only() -> Self {
        Self::default()
    }
}

/// Page source backed by scripted pages. Rendered bitmaps carry
/// `page-{index}` as their bytes so mock engines can tell pages apart.
pub struct MockSource {
    pages: Vec<MockPage>,
    pub extract_calls: AtomicUsize,
    pub render_calls: AtomicUsize,
}

impl MockSource {
    pub fn new(pages: Vec<MockPage>) -> Self {
        Self {
            pages,
            extract_calls: AtomicUsize::new(0),
            render_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl PageSource for MockSource {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    async fn extract_text(&self, page_index: usize) -> DocumentResult<String> {
        self.extract_calls.fetch_add(1, Ordering::SeqCst);
        let page = self
            .pages
            .get(page_index)
            .ok_or(DocumentError::PageNotFound(page_index))?;
        if page.extract_fails {
            return Err(DocumentError::TextExtractionError(format!(
                "scripted failure on page {}",
                page_index
            )));
        }
        Ok(page.text.clone())
    }

    async fn render_page(&self, page_index: usize, _scale: f32) -> DocumentResult<PageBitmap> {
        self.render_calls.fetch_add(1, Ordering::SeqCst);
        let page = self
            .pages
            .get(page_index)
            .ok_or(DocumentError::PageNotFound(page_index))?;
        if page.render_fails {
            return Err(DocumentError::RenderError("scripted render failure".into()));
        }
        Ok(PageBitmap {
            data: format!("page-{}", page_index).into_bytes(),
            width: 100,
            height: 100,
        })
    }
}

/// Opener that always hands out the same source, or always fails
pub struct MockOpener {
    source: Option<Arc<MockSource>>,
}

impl MockOpener {
    pub fn with_source(source: Arc<MockSource>) -> Self {
        Self {
            source: Some(source),
        }
    }

    pub fn failing() -> Self {
        Self { source: None }
    }
}

#[async_trait]
impl SourceOpener for MockOpener {
    async fn open(&self, path: &Path, _id: &str) -> DocumentResult<Arc<dyn PageSource>> {
        match &self.source {
            Some(source) => Ok(source.clone()),
            None => Err(DocumentError::OpenFailed(format!(
                "cannot open {}",
                path.display()
            ))),
        }
    }
}
