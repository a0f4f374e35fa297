//! Route modules for Lectern Server

pub mod audio;
pub mod documents;
pub mod health;
pub mod library;
pub mod voices;

use axum::Router;

use crate::state::AppState;

/// All routes, without middleware
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(documents::router())
        .merge(audio::router())
        .merge(library::router())
        .merge(voices::router())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tempfile::TempDir;
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::document::mock::{MockOpener, MockPage, MockSource};
    use crate::ingest::{IngestConfig, IngestionPipeline};
    use crate::library::{LibraryEntry, LibraryStore};
    use crate::narration::{EchoSynthesizer, NarrationCache, ScriptedTranslation, VoiceResolver};
    use crate::ocr::{OcrServiceConfig, OpticalFallback};
    use crate::registry::{DocumentRegistry, Page};
    use crate::state::Services;
    use crate::summary::{Summarizer, SummaryError, SummaryService};

    const LONG_TEXT: &str =
        "Había una vez, en un lugar de la Mancha, un hidalgo que leía libros de caballerías.";

    struct Truncating;

    #[async_trait]
    impl Summarizer for Truncating {
        async fn summarize(&self, text: &str, _n: usize) -> Result<String, SummaryError> {
            Ok(text.chars().take(20).collect())
        }
    }

    fn test_state(dir: &TempDir, pages: Vec<MockPage>) -> AppState {
        let mut config = Config::default();
        config.storage.upload_dir = dir.path().join("uploads");
        config.storage.audio_dir = dir.path().join("audio");
        config.storage.library_file = dir.path().join("library.json");
        std::fs::create_dir_all(&config.storage.upload_dir).unwrap();

        let library = LibraryStore::new(config.storage.library_file.clone());
        let registry = DocumentRegistry::new();
        let pipeline = IngestionPipeline::new(
            Arc::new(MockOpener::with_source(Arc::new(MockSource::new(pages)))),
            Arc::new(OpticalFallback::new(OcrServiceConfig::default())),
            registry.clone(),
            library.clone(),
            IngestConfig::default(),
        );

        let script = Arc::new(ScriptedTranslation::new("es", "Once upon a time"));
        let resolver = VoiceResolver::new(script.clone(), script, Duration::from_secs(1));
        let narration = NarrationCache::new(
            config.storage.audio_dir.clone(),
            resolver,
            Arc::new(EchoSynthesizer::default()),
            Duration::from_secs(2),
        );
        let summary = SummaryService::new(
            registry.clone(),
            library.clone(),
            Arc::new(Truncating),
            5,
            Duration::from_secs(2),
        );

        AppState::from_services(
            config,
            Services {
                registry,
                library,
                pipeline,
                narration,
                summary,
            },
        )
    }

    async fn ready_document(state: &AppState, id: &str) {
        state
            .registry()
            .create(id, &format!("{}.pdf", id), state.config().storage.upload_dir.join(format!("{}.pdf", id)))
            .await;
        state
            .registry()
            .publish_pages(
                id,
                vec![Page {
                    page: 1,
                    text: LONG_TEXT.to_string(),
                }],
            )
            .await;
    }

    async fn send(state: &AppState, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = router()
            .with_state(state.clone())
            .oneshot(request)
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, body.to_vec())
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, json: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap()
    }

    fn upload(filename: &str, contents: &[u8]) -> Request<Body> {
        let mut body = Vec::new();
        body.extend_from_slice(b"--XBOUNDARY\r\n");
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n",
                filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/pdf\r\n\r\n");
        body.extend_from_slice(contents);
        body.extend_from_slice(b"\r\n--XBOUNDARY--\r\n");

        Request::builder()
            .method("POST")
            .uri("/upload")
            .header(header::CONTENT_TYPE, "multipart/form-data; boundary=XBOUNDARY")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir, vec![]);

        let (status, body) = send(&state, get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "healthy");
    }

    #[tokio::test]
    async fn test_unknown_document_is_404() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir, vec![]);

        for request in [
            get("/document/nope/status"),
            get("/document/nope/pages"),
            get("/audio/nope/1"),
            post_json("/document/nope/progress", serde_json::json!({ "page": 2 })),
            post_json("/document/nope/summary", serde_json::json!({})),
            Request::builder()
                .method("DELETE")
                .uri("/library/nope")
                .body(Body::empty())
                .unwrap(),
        ] {
            let (status, body) = send(&state, request).await;
            assert_eq!(status, StatusCode::NOT_FOUND);
            let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
            assert_eq!(json["error"], "not_found");
        }
    }

    #[tokio::test]
    async fn test_upload_ingests_and_deduplicates() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir, vec![MockPage::text(LONG_TEXT), MockPage::text(LONG_TEXT)]);

        let (status, body) = send(&state, upload("libro.pdf", b"%PDF-1.7 body")).await;
        assert_eq!(status, StatusCode::OK);
        let first: documents::UploadResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(first.filename, "libro.pdf");

        let stored = state
            .config()
            .storage
            .upload_dir
            .join(format!("{}.pdf", first.doc_id));
        assert_eq!(std::fs::read(stored).unwrap(), b"%PDF-1.7 body");

        // Wait for the background ingestion
        let mut ready = false;
        for _ in 0..100 {
            let (_, body) = send(&state, get(&format!("/document/{}/status", first.doc_id))).await;
            let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
            // The library entry lands just after the registry flips to ready
            if json["status"] == "ready" && !state.library().list_all().await.is_empty() {
                assert_eq!(json["total_pages"], 2);
                ready = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(ready);

        let (_, body) = send(&state, upload("libro.pdf", b"%PDF-1.7 other")).await;
        let second: documents::UploadResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(second.doc_id, first.doc_id);

        let (_, body) = send(&state, get("/library")).await;
        let entries: Vec<LibraryEntry> = serde_json::from_slice(&body).unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn test_reupload_replaces_failed_document() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir, vec![MockPage::text(LONG_TEXT)]);

        let stale = state.config().storage.upload_dir.join("roto.pdf");
        std::fs::write(&stale, b"%PDF-broken").unwrap();
        state.registry().create("roto", "roto.pdf", stale.clone()).await;
        state.registry().mark_failed("roto", "cannot open").await;

        let (status, body) = send(&state, upload("roto.pdf", b"%PDF-1.7 fixed")).await;
        assert_eq!(status, StatusCode::OK);
        let retry: documents::UploadResponse = serde_json::from_slice(&body).unwrap();
        assert_ne!(retry.doc_id, "roto");
        assert_eq!(retry.status, crate::registry::DocumentStatus::Processing);

        assert!(state.registry().status("roto").await.is_none());
        assert!(!stale.exists());

        let mut ready = false;
        for _ in 0..100 {
            let status = state.registry().status(&retry.doc_id).await.unwrap();
            if status.status == crate::registry::DocumentStatus::Ready {
                ready = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(ready);
    }

    #[tokio::test]
    async fn test_audio_rejects_malformed_page() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir, vec![]);
        ready_document(&state, "d1").await;

        for uri in ["/audio/d1/abc", "/audio/d1/-1"] {
            let (status, body) = send(&state, get(uri)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
            assert_eq!(json["error"], "bad_request");
        }
    }

    #[tokio::test]
    async fn test_upload_rejects_non_pdf() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir, vec![]);

        let (status, _) = send(&state, upload("notas.txt", b"just text")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(state.registry().status("anything").await.is_none());
    }

    #[tokio::test]
    async fn test_audio_is_served_and_cached() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir, vec![]);
        ready_document(&state, "d1").await;

        let response = router()
            .with_state(state.clone())
            .oneshot(get("/audio/d1/1?voice=es-MX-JorgeNeural"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "audio/mpeg");
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], format!("es-MX-JorgeNeural:{}", LONG_TEXT).as_bytes());

        let (status, body) = send(&state, get("/audio/d1/1?voice=es-AR-TomasNeural&translate=true")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"en-US-GuyNeural:Once upon a time");

        let (status, _) = send(&state, get("/audio/d1/2")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_progress_persists() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir, vec![]);
        ready_document(&state, "d1").await;
        state
            .library()
            .upsert(LibraryEntry::new("d1", "d1.pdf", "uploads/d1.pdf", 1))
            .await
            .unwrap();

        let (status, body) = send(
            &state,
            post_json("/document/d1/progress", serde_json::json!({ "page": 4 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["page"], 4);

        assert_eq!(state.registry().status("d1").await.unwrap().last_page, 4);
        assert_eq!(state.library().list_all().await[0].last_page, Some(4));
    }

    #[tokio::test]
    async fn test_summary_endpoint() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir, vec![]);
        ready_document(&state, "d1").await;

        let (status, body) = send(&state, post_json("/document/d1/summary", serde_json::json!({}))).await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["summary"], LONG_TEXT.chars().take(20).collect::<String>());
    }

    #[tokio::test]
    async fn test_delete_removes_everywhere() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir, vec![]);
        ready_document(&state, "d1").await;
        state
            .library()
            .upsert(LibraryEntry::new("d1", "d1.pdf", "uploads/d1.pdf", 1))
            .await
            .unwrap();
        let upload_path = state.config().storage.upload_dir.join("d1.pdf");
        std::fs::write(&upload_path, b"%PDF").unwrap();

        let request = Request::builder()
            .method("DELETE")
            .uri("/library/d1")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(&state, request).await;
        assert_eq!(status, StatusCode::OK);

        assert!(state.library().list_all().await.is_empty());
        assert!(state.registry().status("d1").await.is_none());
        assert!(!upload_path.exists());
    }

    #[tokio::test]
    async fn test_delete_clears_failed_document() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir, vec![]);
        let upload_path = state.config().storage.upload_dir.join("d1.pdf");
        std::fs::write(&upload_path, b"%PDF-broken").unwrap();
        state.registry().create("d1", "roto.pdf", upload_path.clone()).await;
        state.registry().mark_failed("d1", "cannot open").await;

        let request = Request::builder()
            .method("DELETE")
            .uri("/library/d1")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(&state, request).await;
        assert_eq!(status, StatusCode::OK);

        assert!(state.registry().status("d1").await.is_none());
        assert!(!upload_path.exists());
    }

    #[tokio::test]
    async fn test_voices() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir, vec![]);

        let (status, body) = send(&state, get("/voices")).await;
        assert_eq!(status, StatusCode::OK);
        let json: Vec<serde_json::Value> = serde_json::from_slice(&body).unwrap();
        assert_eq!(json.len(), crate::narration::VOICES.len());
        assert_eq!(json[0]["ShortName"], "es-AR-TomasNeural");
    }
}
