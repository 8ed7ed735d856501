use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::json;

use crate::application::ports::{
    AudioNormalizer, ChargeVerification, PaymentError, RecipeGenerator, SpeechToText,
};
use crate::application::services::CreditGate;
use crate::domain::{find_package, PricingPackage};
use crate::presentation::auth::AuthUser;
use crate::presentation::handlers::ErrorResponse;
use crate::presentation::state::AppState;

#[derive(Deserialize)]
pub struct CreateChargeRequest {
    #[serde(rename = "packageId")]
    pub package_id: String,
}

#[derive(Deserialize)]
pub struct VerifyPaymentRequest {
    pub provider: String,
    pub package_id: String,
    pub payment_intent_id: Option<String>,
    pub razorpay_payment_id: Option<String>,
    pub razorpay_order_id: Option<String>,
    pub razorpay_signature: Option<String>,
}

#[derive(Deserialize)]
pub struct SimulatePurchaseRequest {
    pub credits: i64,
}

fn bad_request(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
        .into_response()
}

fn gateway_unavailable(provider: &str) -> Response {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(ErrorResponse {
            error: format!("Payment provider '{}' is not configured", provider),
        }),
    )
        .into_response()
}

fn resolve_package(package_id: &str) -> Result<&'static PricingPackage, Response> {
    find_package(package_id).ok_or_else(|| bad_request("Unknown pricing package"))
}

#[tracing::instrument(skip_all, fields(user_id = %user.user_id))]
pub async fn create_payment_intent_handler<N, S, G>(
    State(state): State<AppState<N, S, G>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<CreateChargeRequest>,
) -> Response
where
    N: AudioNormalizer + 'static,
    S: SpeechToText + 'static,
    G: RecipeGenerator + 'static,
{
    let package = match resolve_package(&request.package_id) {
        Ok(p) => p,
        Err(response) => return response,
    };

    let Some(gateway) = state.payments.select("stripe") else {
        return gateway_unavailable("stripe");
    };

    match gateway.create_charge(package).await {
        Ok(intent) => (
            StatusCode::OK,
            Json(json!({
                "clientSecret": intent.client_secret,
                "amount": intent.amount_minor,
                "currency": intent.currency,
            })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to create Stripe payment intent");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Could not start the payment. Please try again.".to_string(),
                }),
            )
                .into_response()
        }
    }
}

#[tracing::instrument(skip_all, fields(user_id = %user.user_id))]
pub async fn create_razorpay_order_handler<N, S, G>(
    State(state): State<AppState<N, S, G>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<CreateChargeRequest>,
) -> Response
where
    N: AudioNormalizer + 'static,
    S: SpeechToText + 'static,
    G: RecipeGenerator + 'static,
{
    let package = match resolve_package(&request.package_id) {
        Ok(p) => p,
        Err(response) => return response,
    };

    let Some(gateway) = state.payments.select("razorpay") else {
        return gateway_unavailable("razorpay");
    };

    match gateway.create_charge(package).await {
        Ok(order) => (
            StatusCode::OK,
            Json(json!({
                "id": order.id,
                "amount": order.amount_minor,
                "currency": order.currency,
            })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to create Razorpay order");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Could not start the payment. Please try again.".to_string(),
                }),
            )
                .into_response()
        }
    }
}

fn verification_fields(request: &VerifyPaymentRequest) -> Result<ChargeVerification, Response> {
    match request.provider.as_str() {
        "razorpay" => {
            let payment_id = request
                .razorpay_payment_id
                .clone()
                .ok_or_else(|| bad_request("Missing razorpay_payment_id"))?;
            Ok(ChargeVerification {
                payment_id,
                order_id: request.razorpay_order_id.clone(),
                signature: request.razorpay_signature.clone(),
            })
        }
        "stripe" => {
            let payment_id = request
                .payment_intent_id
                .clone()
                .ok_or_else(|| bad_request("Missing payment_intent_id"))?;
            Ok(ChargeVerification {
                payment_id,
                order_id: None,
                signature: None,
            })
        }
        other => Err(bad_request(&format!("Unknown payment provider '{}'", other))),
    }
}

async fn credit_purchase(
    gate: &Arc<CreditGate>,
    user: &AuthUser,
    package: &PricingPackage,
) -> Response {
    match gate.grant(&user.user_id, package.credits).await {
        Ok(new_balance) => {
            tracing::info!(
                user_id = %user.user_id,
                credits = package.credits,
                new_balance,
                "Credits purchased"
            );
            (
                StatusCode::OK,
                Json(json!({ "success": true, "new_balance": new_balance })),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Verified payment but failed to add credits");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Payment verified but crediting failed. Please contact support."
                        .to_string(),
                }),
            )
                .into_response()
        }
    }
}

#[tracing::instrument(skip_all, fields(user_id = %user.user_id, provider = %request.provider))]
pub async fn verify_payment_handler<N, S, G>(
    State(state): State<AppState<N, S, G>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<VerifyPaymentRequest>,
) -> Response
where
    N: AudioNormalizer + 'static,
    S: SpeechToText + 'static,
    G: RecipeGenerator + 'static,
{
    let package = match resolve_package(&request.package_id) {
        Ok(p) => p,
        Err(response) => return response,
    };

    let Some(gateway) = state.payments.select(&request.provider) else {
        return gateway_unavailable(&request.provider);
    };

    let Some(gate) = &state.credit_gate else {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse {
                error: "Database not configured".to_string(),
            }),
        )
            .into_response();
    };

    let verification = match verification_fields(&request) {
        Ok(v) => v,
        Err(response) => return response,
    };

    match gateway.verify_charge(&verification).await {
        Ok(()) => credit_purchase(gate, &user, package).await,
        Err(PaymentError::InvalidRequest(reason)) => bad_request(&reason),
        Err(e) => {
            tracing::warn!(error = %e, "Payment verification rejected");
            (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "success": false,
                    "error": "Payment verification failed",
                })),
            )
                .into_response()
        }
    }
}

/// Development-only purchase path, registered outside production.
#[tracing::instrument(skip_all, fields(user_id = %user.user_id))]
pub async fn simulate_purchase_handler<N, S, G>(
    State(state): State<AppState<N, S, G>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<SimulatePurchaseRequest>,
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

    if request.credits <= 0 {
        return bad_request("Credits must be positive");
    }

    match gate.grant(&user.user_id, request.credits).await {
        Ok(new_balance) => (
            StatusCode::OK,
            Json(json!({ "success": true, "new_balance": new_balance })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Simulated purchase failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Could not add credits. Please try again.".to_string(),
                }),
            )
                .into_response()
        }
    }
}
