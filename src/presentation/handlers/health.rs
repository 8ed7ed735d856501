use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use crate::application::ports::{AudioNormalizer, RecipeGenerator, SpeechToText};
use crate::presentation::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub speech_to_text: bool,
    pub gemini: bool,
    pub database: bool,
}

/// Reports configuration presence only, not live connectivity.
pub async fn health_handler<N, S, G>(State(state): State<AppState<N, S, G>>) -> impl IntoResponse
where
    N: AudioNormalizer + 'static,
    S: SpeechToText + 'static,
    G: RecipeGenerator + 'static,
{
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            speech_to_text: state.settings.google_speech_api_key.is_some(),
            gemini: state.settings.gemini_api_key.is_some(),
            database: state.settings.database_url.is_some(),
        }),
    )
}
