use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use serde_json::json;

use crate::application::ports::{AudioNormalizer, RecipeGenerator, SpeechToText};
use crate::domain::{PricingPackage, PRICING_PACKAGES, RECIPE_GENERATION_COST};
use crate::presentation::state::AppState;

#[derive(Serialize)]
pub struct PricingResponse {
    pub recipe_cost: i64,
    pub packages: Vec<PricingPackage>,
}

pub async fn pricing_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(PricingResponse {
            recipe_cost: RECIPE_GENERATION_COST,
            packages: PRICING_PACKAGES.to_vec(),
        }),
    )
}

/// Public payment keys only; secrets never leave the server.
pub async fn payments_config_handler<N, S, G>(
    State(state): State<AppState<N, S, G>>,
) -> impl IntoResponse
where
    N: AudioNormalizer + 'static,
    S: SpeechToText + 'static,
    G: RecipeGenerator + 'static,
{
    (
        StatusCode::OK,
        Json(json!({
            "stripePublicKey": state.settings.stripe.public_key.clone().unwrap_or_default(),
            "razorpayKeyId": state.settings.razorpay.key_id.clone().unwrap_or_default(),
        })),
    )
}
