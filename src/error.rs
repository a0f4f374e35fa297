//! Error types for the Lectern server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::library::LibraryError;
use crate::narration::NarrationError;
use crate::summary::SummaryError;

/// Application-wide result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Narration error: {0}")]
    Narration(#[from] NarrationError),

    #[error("Library error: {0}")]
    Library(#[from] LibraryError),

    #[error("Summary error: {0}")]
    Summary(SummaryError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<SummaryError> for AppError {
    fn from(e: SummaryError) -> Self {
        match e {
            SummaryError::NotFound(id) => AppError::NotFound(format!("Document not found: {}", id)),
            other => AppError::Summary(other),
        }
    }
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone()),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg.clone())
            }
            AppError::Narration(e) => {
                tracing::error!("Narration error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "synthesis_error", e.to_string())
            }
            AppError::Library(e) => {
                tracing::error!("Library error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "persistence_error", e.to_string())
            }
            AppError::Summary(e) => {
                tracing::error!("Summary error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "summary_error", e.to_string())
            }
            AppError::Io(e) => {
                tracing::error!("IO error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "io_error", e.to_string())
            }
        };

        let body = Json(ErrorResponse {
            error: error_type.to_string(),
            message,
        });

        (status, body).into_response()
    }
}
