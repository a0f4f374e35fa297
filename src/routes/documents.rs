//! Document endpoints
//!
//! - `POST /upload`: admit a PDF and start ingestion in the background
//! - `GET /document/:id/status`
//! - `GET /document/:id/pages`
//! - `POST /document/:id/progress`
//! - `POST /document/:id/summary`

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::document::DocumentFormat;
use crate::error::{AppError, Result};
use crate::registry::{Admission, DocumentStatus, Page, StatusSnapshot};
use crate::state::AppState;

/// Upload response
#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub doc_id: String,
    pub status: DocumentStatus,
    pub filename: String,
}

#[derive(Debug, Deserialize)]
pub struct ProgressRequest {
    pub page: u32,
}

#[derive(Debug, Serialize)]
pub struct ProgressResponse {
    pub status: &'static str,
    pub page: u32,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub summary: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/upload", post(upload_document))
        .route("/document/:id/status", get(get_status))
        .route("/document/:id/pages", get(get_pages))
        .route("/document/:id/progress", post(update_progress))
        .route("/document/:id/summary", post(get_summary))
        // Allow up to 200MB uploads for large documents
        .layer(DefaultBodyLimit::max(200 * 1024 * 1024))
}

async fn upload_document(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to read upload: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field
            .file_name()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "document.pdf".to_string());

        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read file data: {}", e)))?;

        tracing::debug!(filename = %filename, bytes = data.len(), "Received upload");

        if DocumentFormat::from_magic_bytes(&data) != Some(DocumentFormat::Pdf) {
            return Err(AppError::BadRequest(
                "Unsupported document format. Only PDF is supported.".to_string(),
            ));
        }

        let upload_dir = state.config().storage.upload_dir.clone();
        let admission = state
            .registry()
            .admit(&filename, |id| {
                upload_dir.join(format!("{}.{}", id, DocumentFormat::Pdf.extension()))
            })
            .await;

        let (doc_id, path) = match admission {
            Admission::Existing { id, status } => {
                tracing::info!(doc_id = %id, filename = %filename, "File already uploaded");
                return Ok(Json(UploadResponse {
                    doc_id: id,
                    status,
                    filename,
                }));
            }
            Admission::Created { id, path, replaced } => {
                if let Some(stale) = replaced {
                    if let Err(e) = tokio::fs::remove_file(&stale).await {
                        tracing::debug!(path = %stale.display(), "Stale upload not removed: {}", e);
                    }
                }
                (id, path)
            }
        };

        if let Err(e) = tokio::fs::write(&path, &data).await {
            state.registry().remove(&doc_id).await;
            return Err(AppError::Io(e));
        }

        state.pipeline().spawn(doc_id.clone(), path);

        return Ok(Json(UploadResponse {
            doc_id,
            status: DocumentStatus::Processing,
            filename,
        }));
    }

    Err(AppError::BadRequest("No file field in upload".to_string()))
}

async fn get_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StatusSnapshot>> {
    state
        .registry()
        .status(&id)
        .await
        .map(Json)
        .ok_or_else(|| document_not_found(&id))
}

async fn get_pages(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Page>>> {
    state
        .registry()
        .pages(&id)
        .await
        .map(Json)
        .ok_or_else(|| document_not_found(&id))
}

async fn update_progress(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<ProgressRequest>,
) -> Result<Json<ProgressResponse>> {
    if !state.registry().set_progress(&id, request.page).await {
        return Err(document_not_found(&id));
    }

    // Documents still processing have no library entry yet
    if let Err(e) = state.library().update_progress(&id, request.page).await {
        tracing::error!(doc_id = %id, "Failed to persist progress: {}", e);
    }

    Ok(Json(ProgressResponse {
        status: "success",
        page: request.page,
    }))
}

async fn get_summary(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SummaryResponse>> {
    let summary = state.summary().summary(&id).await?;
    Ok(Json(SummaryResponse { summary }))
}

pub(crate) fn document_not_found(id: &str) -> AppError {
    AppError::NotFound(format!("Document not found: {}", id))
}
