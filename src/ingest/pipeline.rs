//! Ingestion Pipeline
//!
//! Turns an uploaded PDF into narration-ready page texts:
//!
//! ```text
//!   open ──► for each page:
//!              extract_text ──► text-poor? ──yes──► render ──► OCR
//!                    │                                         │
//!                    └───────────────no──────────┬─────────────┘
//!                                                ▼
//!                                           normalize
//!          ──► Registry (ready) ──► Library upsert
//! ```
//!
//! Any open or extraction failure marks the document `error` and leaves the
//! library untouched. OCR problems never fail a run; they yield an empty page.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::task::JoinHandle;

use super::normalize::{is_text_poor, normalize_text};
use crate::document::{DocumentError, SourceOpener};
use crate::library::{LibraryEntry, LibraryStore};
use crate::ocr::OpticalFallback;
use crate::registry::{DocumentRegistry, Page};

/// Ingestion tuning
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Trimmed character count below which a page goes to OCR
    pub min_text_chars: usize,
    /// Rasterization scale for OCR
    pub render_scale: f32,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            min_text_chars: 50,
            render_scale: 1.0,
        }
    }
}

/// Ingestion errors
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("Failed to open document: {0}")]
    Open(#[source] DocumentError),

    #[error("Failed to extract text from page {page}: {source}")]
    Extraction {
        page: u32,
        #[source]
        source: DocumentError,
    },
}

/// Background ingestion of uploaded documents
#[derive(Clone)]
pub struct IngestionPipeline {
    inner: Arc<IngestionPipelineInner>,
}

struct IngestionPipelineInner {
    opener: Arc<dyn SourceOpener>,
    ocr: Arc<OpticalFallback>,
    registry: DocumentRegistry,
    library: LibraryStore,
    config: IngestConfig,
}

impl IngestionPipeline {
    pub fn new(
        opener: Arc<dyn SourceOpener>,
        ocr: Arc<OpticalFallback>,
        registry: DocumentRegistry,
        library: LibraryStore,
        config: IngestConfig,
    ) -> Self {
        Self {
            inner: Arc::new(IngestionPipelineInner {
                opener,
                ocr,
                registry,
                library,
                config,
            }),
        }
    }

    /// Run ingestion on a background task
    pub fn spawn(&self, document_id: String, source_path: PathBuf) -> JoinHandle<()> {
        let pipeline = self.clone();
        tokio::spawn(async move {
            // Errors are already recorded on the document
            let _ = pipeline.ingest(&document_id, &source_path).await;
        })
    }

    /// Ingest a document and publish the result. Returns the page count.
    pub async fn ingest(&self, document_id: &str, source_path: &Path) -> Result<usize, IngestError> {
        tracing::info!(doc_id = %document_id, path = %source_path.display(), "Starting ingestion");

        let pages = match self.extract_pages(document_id, source_path).await {
            Ok(pages) => pages,
            Err(e) => {
                tracing::error!(doc_id = %document_id, "Ingestion failed: {}", e);
                self.inner.registry.mark_failed(document_id, e.to_string()).await;
                return Err(e);
            }
        };

        let page_count = pages.len();
        let published = self
            .inner
            .registry
            .publish_pages(document_id, pages.clone())
            .await;
        if !published {
            tracing::warn!(doc_id = %document_id, "Document removed during ingestion, not persisting");
            return Ok(page_count);
        }

        self.persist(document_id, source_path, pages).await;

        tracing::info!(doc_id = %document_id, pages = page_count, "Ingestion complete");
        Ok(page_count)
    }

    /// Extract, fall back and normalize every page in order
    pub async fn extract_pages(
        &self,
        document_id: &str,
        source_path: &Path,
    ) -> Result<Vec<Page>, IngestError> {
        let source = self
            .inner
            .opener
            .open(source_path, document_id)
            .await
            .map_err(IngestError::Open)?;

        let total = source.page_count();
        let mut pages = Vec::with_capacity(total);

        for index in 0..total {
            let number = (index + 1) as u32;
            let extracted = source
                .extract_text(index)
                .await
                .map_err(|e| IngestError::Extraction {
                    page: number,
                    source: e,
                })?;

            let text = if is_text_poor(&extracted, self.inner.config.min_text_chars) {
                tracing::debug!(doc_id = %document_id, page = number, "Page is text-poor, running OCR");
                match source.render_page(index, self.inner.config.render_scale).await {
                    Ok(bitmap) => {
                        let recognized = self
                            .inner
                            .ocr
                            .recognize(&bitmap, self.inner.ocr.languages())
                            .await;
                        tracing::info!(
                            doc_id = %document_id,
                            page = number,
                            chars = recognized.chars().count(),
                            "OCR finished"
                        );
                        recognized
                    }
                    Err(e) => {
                        tracing::warn!(doc_id = %document_id, page = number, "Render for OCR failed: {}", e);
                        String::new()
                    }
                }
            } else {
                extracted
            };

            pages.push(Page {
                page: number,
                text: normalize_text(&text),
            });
        }

        Ok(pages)
    }

    async fn persist(&self, document_id: &str, source_path: &Path, pages: Vec<Page>) {
        let filename = self
            .inner
            .registry
            .get(document_id)
            .await
            .map(|d| d.filename)
            .unwrap_or_default();

        let mut entry = LibraryEntry::new(
            document_id,
            filename,
            source_path.to_string_lossy(),
            pages.len(),
        );
        entry.last_page = Some(1);
        entry.pages = Some(pages);

        // The registry stays authoritative if this fails
        if let Err(e) = self.inner.library.upsert(entry).await {
            tracing::error!(doc_id = %document_id, "Failed to persist library entry: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::mock::{MockOpener, MockPage, MockSource};
    use crate::ocr::{EngineFactory, MockEngine, OcrError, RecognitionEngine};
    use crate::registry::{DocumentStatus, PageLookup};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tempfile::TempDir;

    struct FixedFactory {
        engine: Arc<MockEngine>,
        builds: AtomicUsize,
    }

    #[async_trait]
    impl EngineFactory for FixedFactory {
        async fn build(&self) -> Result<Arc<dyn RecognitionEngine>, OcrError> {
            self.builds.fetch_add(1, Ordering::SeqCst);
            Ok(self.engine.clone())
        }
    }

    struct Harness {
        _dir: TempDir,
        pipeline: IngestionPipeline,
        registry: DocumentRegistry,
        library: LibraryStore,
        source: Arc<MockSource>,
        factory: Arc<FixedFactory>,
    }

    const LONG_TEXT: &str =
        "Había una vez, en un lugar de la Mancha, un hidalgo que leía libros de caballerías.";

    fn harness(pages: Vec<MockPage>, engine: MockEngine, opener_fails: bool) -> Harness {
        let dir = TempDir::new().unwrap();
        let source = Arc::new(MockSource::new(pages));
        let opener: Arc<dyn SourceOpener> = if opener_fails {
            Arc::new(MockOpener::failing())
        } else {
            Arc::new(MockOpener::with_source(source.clone()))
        };
        let factory = Arc::new(FixedFactory {
            engine: Arc::new(engine),
            builds: AtomicUsize::new(0),
        });
        let ocr = Arc::new(OpticalFallback::with_factory(
            factory.clone(),
            vec!["es".into(), "en".into()],
            Duration::from_secs(5),
        ));
        let registry = DocumentRegistry::new();
        let library = LibraryStore::new(dir.path().join("library.json"));
        let pipeline = IngestionPipeline::new(
            opener,
            ocr,
            registry.clone(),
            library.clone(),
            IngestConfig::default(),
        );

        Harness {
            _dir: dir,
            pipeline,
            registry,
            library,
            source,
            factory,
        }
    }

    async fn admit(h: &Harness) -> PathBuf {
        let path = PathBuf::from("uploads/doc.pdf");
        h.registry.create("doc", "libro.pdf", path.clone()).await;
        path
    }

    #[tokio::test]
    async fn test_mixed_document() {
        let h = harness(
            vec![
                MockPage::text(format!("  {}\n\n{}  ", LONG_TEXT, LONG_TEXT)),
                MockPage::image_only(),
                MockPage::text(LONG_TEXT),
            ],
            MockEngine::new().respond(b"page-1", &["Texto", "escaneado"]),
            false,
        );
        let path = admit(&h).await;

        assert_eq!(h.pipeline.ingest("doc", &path).await.unwrap(), 3);

        let pages = h.registry.pages("doc").await.unwrap();
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[0].text, format!("{} {}", LONG_TEXT, LONG_TEXT));
        assert_eq!(pages[1].text, "Texto escaneado");
        assert_eq!(pages[2].text, LONG_TEXT);
        assert_eq!(
            pages.iter().map(|p| p.page).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );

        // Only the image page was rasterized
        assert_eq!(h.source.render_calls.load(Ordering::SeqCst), 1);

        let status = h.registry.status("doc").await.unwrap();
        assert_eq!(status.status, DocumentStatus::Ready);
        assert_eq!(status.total_pages, 3);

        let entries = h.library.list_all().await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].filename, "libro.pdf");
        assert_eq!(entries[0].total_pages, 3);
        assert_eq!(entries[0].last_page, Some(1));
        assert_eq!(entries[0].pages.as_ref().unwrap(), &pages);
    }

    #[tokio::test]
    async fn test_one_text_page_two_scanned_pages() {
        let rich = "x".repeat(200);
        let h = harness(
            vec![
                MockPage::text(rich.clone()),
                MockPage::image_only(),
                MockPage::image_only(),
            ],
            // Page 2 is recognized, page 3 yields nothing
            MockEngine::new().respond(b"page-1", &["segunda"]),
            false,
        );
        let path = admit(&h).await;
        assert_eq!(
            h.registry.status("doc").await.unwrap().status,
            DocumentStatus::Processing
        );

        h.pipeline.ingest("doc", &path).await.unwrap();

        let status = h.registry.status("doc").await.unwrap();
        assert_eq!(status.status, DocumentStatus::Ready);
        assert_eq!(status.total_pages, 3);
        assert_eq!(h.registry.page_text("doc", 1).await, PageLookup::Found(rich));
        assert_eq!(h.registry.page_text("doc", 2).await, PageLookup::Found("segunda".into()));
        assert_eq!(h.registry.page_text("doc", 3).await, PageLookup::Found(String::new()));
    }

    #[tokio::test]
    async fn test_short_text_is_replaced_by_ocr() {
        let h = harness(
            vec![MockPage::text("12")],
            MockEngine::new().respond(b"page-0", &["Página", "completa"]),
            false,
        );
        let path = admit(&h).await;

        h.pipeline.ingest("doc", &path).await.unwrap();
        assert_eq!(
            h.registry.page_text("doc", 1).await,
            PageLookup::Found("Página completa".into())
        );
    }

    #[tokio::test]
    async fn test_ocr_failure_yields_empty_page() {
        let h = harness(
            vec![MockPage::text("corto"), MockPage::text(LONG_TEXT)],
            MockEngine::failing(),
            false,
        );
        let path = admit(&h).await;

        assert_eq!(h.pipeline.ingest("doc", &path).await.unwrap(), 2);
        assert_eq!(h.registry.page_text("doc", 1).await, PageLookup::Found(String::new()));
        assert_eq!(h.registry.page_text("doc", 2).await, PageLookup::Found(LONG_TEXT.into()));
    }

    #[tokio::test]
    async fn test_render_failure_yields_empty_page() {
        let mut page = MockPage::image_only();
        page.render_fails = true;
        let h = harness(vec![page], MockEngine::new(), false);
        let path = admit(&h).await;

        h.pipeline.ingest("doc", &path).await.unwrap();
        assert_eq!(h.registry.page_text("doc", 1).await, PageLookup::Found(String::new()));
    }

    #[tokio::test]
    async fn test_engine_built_once_across_pages() {
        let h = harness(
            vec![MockPage::image_only(), MockPage::image_only(), MockPage::image_only()],
            MockEngine::new(),
            false,
        );
        let path = admit(&h).await;

        h.pipeline.ingest("doc", &path).await.unwrap();
        assert_eq!(h.factory.builds.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_text_rich_document_never_touches_ocr() {
        let h = harness(
            vec![MockPage::text(LONG_TEXT), MockPage::text(LONG_TEXT)],
            MockEngine::new(),
            false,
        );
        let path = admit(&h).await;

        h.pipeline.ingest("doc", &path).await.unwrap();
        assert_eq!(h.factory.builds.load(Ordering::SeqCst), 0);
        assert_eq!(h.source.render_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_open_failure_marks_error_and_skips_library() {
        let h = harness(vec![], MockEngine::new(), true);
        let path = admit(&h).await;

        let result = h.pipeline.ingest("doc", &path).await;
        assert!(matches!(result, Err(IngestError::Open(_))));

        let status = h.registry.status("doc").await.unwrap();
        assert_eq!(status.status, DocumentStatus::Error);
        assert!(status.error.is_some());
        assert!(h.registry.pages("doc").await.unwrap().is_empty());
        assert!(h.library.list_all().await.is_empty());
    }

    #[tokio::test]
    async fn test_extraction_failure_marks_error() {
        let mut broken = MockPage::text(LONG_TEXT);
        broken.extract_fails = true;
        let h = harness(vec![MockPage::text(LONG_TEXT), broken], MockEngine::new(), false);
        let path = admit(&h).await;

        let result = h.pipeline.ingest("doc", &path).await;
        assert!(matches!(result, Err(IngestError::Extraction { page: 2, .. })));
        assert_eq!(
            h.registry.status("doc").await.unwrap().status,
            DocumentStatus::Error
        );
        assert!(h.library.list_all().await.is_empty());
    }

    #[tokio::test]
    async fn test_empty_document_is_ready_with_no_pages() {
        let h = harness(vec![], MockEngine::new(), false);
        let path = admit(&h).await;

        assert_eq!(h.pipeline.ingest("doc", &path).await.unwrap(), 0);
        let status = h.registry.status("doc").await.unwrap();
        assert_eq!(status.status, DocumentStatus::Ready);
        assert_eq!(status.total_pages, 0);
    }

    #[tokio::test]
    async fn test_spawned_ingestion_completes() {
        let h = harness(vec![MockPage::text(LONG_TEXT)], MockEngine::new(), false);
        let path = admit(&h).await;

        h.pipeline.spawn("doc".into(), path).await.unwrap();
        assert_eq!(
            h.registry.status("doc").await.unwrap().status,
            DocumentStatus::Ready
        );
    }
}
