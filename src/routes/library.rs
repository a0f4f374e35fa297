//! Library endpoints

use axum::{
    extract::{Path, State},
    routing::{delete, get},
    Json, Router,
};
use serde::Serialize;

use crate::document::DocumentFormat;
use crate::error::{AppError, Result};
use crate::library::LibraryEntry;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub status: &'static str,
    pub message: &'static str,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/library", get(list_library))
        .route("/library/:id", delete(delete_entry))
}

async fn list_library(State(state): State<AppState>) -> Json<Vec<LibraryEntry>> {
    Json(state.library().list_all().await)
}

/// Remove a document from the library, the registry and the upload directory
async fn delete_entry(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>> {
    let path = match state.registry().get(&id).await {
        Some(doc) => doc.path,
        None => state
            .config()
            .storage
            .upload_dir
            .join(format!("{}.{}", id, DocumentFormat::Pdf.extension())),
    };

    // Failed and in-flight documents exist only in the registry
    let in_library = state.library().delete(&id).await?;
    let in_registry = state.registry().remove(&id).await;
    if !in_library && !in_registry {
        return Err(AppError::NotFound(format!("Book not found: {}", id)));
    }

    match tokio::fs::remove_file(&path).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        // The entry is gone either way
        Err(e) => tracing::warn!(path = %path.display(), "Failed to remove upload: {}", e),
    }

    tracing::info!(doc_id = %id, "Document deleted");

    Ok(Json(DeleteResponse {
        status: "success",
        message: "Book deleted",
    }))
}
