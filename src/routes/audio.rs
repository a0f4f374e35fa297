//! Narration endpoint

use axum::{
    body::Body,
    extract::{rejection::PathRejection, Path, Query, State},
    http::header,
    response::Response,
    routing::get,
    Router,
};
use serde::Deserialize;

use super::documents::document_not_found;
use crate::error::{AppError, Result};
use crate::registry::PageLookup;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AudioQuery {
    pub voice: Option<String>,
    #[serde(default)]
    pub translate: bool,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/audio/:id/:page", get(get_audio))
}

async fn get_audio(
    State(state): State<AppState>,
    path: std::result::Result<Path<(String, u32)>, PathRejection>,
    Query(query): Query<AudioQuery>,
) -> Result<Response> {
    let Path((id, page)) = path.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let text = match state.registry().page_text(&id, page).await {
        PageLookup::Found(text) => text,
        PageLookup::UnknownDocument => return Err(document_not_found(&id)),
        PageLookup::UnknownPage => {
            return Err(AppError::NotFound(format!("Page {} not found in {}", page, id)))
        }
    };

    let voice = query
        .voice
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| state.config().speech.default_voice.clone());

    let artifact = state
        .narration()
        .get_or_synthesize(&id, page, &text, &voice, query.translate)
        .await?;

    let audio = tokio::fs::read(&artifact.path).await?;

    Response::builder()
        .header(header::CONTENT_TYPE, "audio/mpeg")
        .header(header::CACHE_CONTROL, "public, max-age=86400")
        .header(
            header::CONTENT_DISPOSITION,
            format!("inline; filename=\"{}\"", artifact.key.file_name()),
        )
        .body(Body::from(audio))
        .map_err(|e| AppError::Internal(format!("Failed to build response: {}", e)))
}
