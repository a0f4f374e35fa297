//! Application state management

use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::formats::pdf::PdfOpener;
use crate::ingest::{IngestConfig, IngestionPipeline};
use crate::library::LibraryStore;
use crate::narration::{HttpSpeechSynthesizer, LibreTranslateClient, NarrationCache, VoiceResolver};
use crate::ocr::OpticalFallback;
use crate::registry::DocumentRegistry;
use crate::summary::{OllamaSummarizer, SummaryService};

/// Error type for state initialization
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("Failed to prepare directory {path}: {source}")]
    Directory {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// The services behind the HTTP layer
pub struct Services {
    pub registry: DocumentRegistry,
    pub library: LibraryStore,
    pub pipeline: IngestionPipeline,
    pub narration: NarrationCache,
    pub summary: SummaryService,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    services: Services,
}

impl AppState {
    /// Create the application state from configuration
    ///
    /// Prepares the storage directories and restores the registry from the
    /// library file. The OCR engine is not started here; it comes up on the
    /// first text-poor page.
    pub async fn new(config: Config) -> Result<Self, StateError> {
        for dir in [&config.storage.upload_dir, &config.storage.audio_dir] {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|source| StateError::Directory {
                    path: dir.display().to_string(),
                    source,
                })?;
        }

        let library = LibraryStore::new(config.storage.library_file.clone());
        let registry = DocumentRegistry::from_library(library.list_all().await);

        let ocr = Arc::new(OpticalFallback::new(config.ocr_service()));
        let pipeline = IngestionPipeline::new(
            Arc::new(PdfOpener),
            ocr,
            registry.clone(),
            library.clone(),
            IngestConfig {
                min_text_chars: config.ocr.min_text_chars,
                render_scale: config.ocr.render_scale,
            },
        );

        let translation = Arc::new(LibreTranslateClient::new(
            &config.translation.url,
            config.translation.api_key.clone(),
        ));
        let resolver = VoiceResolver::new(
            translation.clone(),
            translation,
            Duration::from_secs(config.translation.timeout_secs),
        );
        let synthesizer = HttpSpeechSynthesizer::new(config.speech.url.clone())
            .with_api_key(config.speech.api_key.clone())
            .with_model(config.speech.model.clone());
        let narration = NarrationCache::new(
            config.storage.audio_dir.clone(),
            resolver,
            Arc::new(synthesizer),
            Duration::from_secs(config.speech.timeout_secs),
        );

        let summary = SummaryService::new(
            registry.clone(),
            library.clone(),
            Arc::new(OllamaSummarizer::new(&config.ocr.ollama_url, &config.summary.model)),
            config.summary.sentences,
            Duration::from_secs(config.summary.timeout_secs),
        );

        Ok(Self::from_services(
            config,
            Services {
                registry,
                library,
                pipeline,
                narration,
                summary,
            },
        ))
    }

    /// Assemble state from already-built services
    pub fn from_services(config: Config, services: Services) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, services }),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get the document registry
    pub fn registry(&self) -> &DocumentRegistry {
        &self.inner.services.registry
    }

    /// Get the library store
    pub fn library(&self) -> &LibraryStore {
        &self.inner.services.library
    }

    /// Get the ingestion pipeline
    pub fn pipeline(&self) -> &IngestionPipeline {
        &self.inner.services.pipeline
    }

    /// Get the narration cache
    pub fn narration(&self) -> &NarrationCache {
        &self.inner.services.narration
    }

    /// Get the summary service
    pub fn summary(&self) -> &SummaryService {
        &self.inner.services.summary
    }
}
