//! Voice catalog endpoint

use axum::{routing::get, Json, Router};

use crate::narration::{Voice, VOICES};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/voices", get(list_voices))
}

async fn list_voices() -> Json<&'static [Voice]> {
    Json(VOICES)
}
