use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use serde::Serialize;

use crate::application::ports::{AudioNormalizer, RecipeGenerator, SpeechToText};
use crate::presentation::auth::AuthUser;
use crate::presentation::handlers::ErrorResponse;
use crate::presentation::state::AppState;

#[derive(Serialize)]
pub struct CreditsResponse {
    pub credits: i64,
}

#[tracing::instrument(skip_all, fields(user_id = %user.user_id))]
pub async fn get_credits_handler<N, S, G>(
    State(state): State<AppState<N, S, G>>,
    Extension(user): Extension<AuthUser>,
) -> Response
where
    N: AudioNormalizer + 'static,
    S: SpeechToText + 'static,
    G: RecipeGenerator + 'static,
{
    let Some(gate) = &state.credit_gate else {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse {
                error: "Database not configured".to_string(),
            }),
        )
            .into_response();
    };

    match gate.balance(&user.user_id).await {
        Ok(credits) => (StatusCode::OK, Json(CreditsResponse { credits })).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to read credit balance");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Could not read credit balance. Please try again.".to_string(),
                }),
            )
                .into_response()
        }
    }
}
