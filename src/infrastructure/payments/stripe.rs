use async_trait::async_trait;
use serde::Deserialize;

use crate::application::ports::{ChargeIntent, ChargeVerification, PaymentError, PaymentGateway};
use crate::domain::PricingPackage;

const DEFAULT_BASE_URL: &str = "https://api.stripe.com";

/// Stripe PaymentIntents, used for USD purchases. Verification retrieves
/// the intent and requires status `succeeded`.
pub struct StripeGateway {
    client: reqwest::Client,
    secret_key: String,
    base_url: String,
}

impl StripeGateway {
    pub fn new(secret_key: String) -> Self {
        Self::with_base_url(secret_key, DEFAULT_BASE_URL.to_string())
    }

    pub fn with_base_url(secret_key: String, base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            secret_key,
            base_url,
        }
    }
}

#[derive(Deserialize)]
struct PaymentIntentResponse {
    id: String,
    client_secret: Option<String>,
    amount: u64,
    currency: String,
    status: String,
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    fn provider(&self) -> &'static str {
        "stripe"
    }

    async fn create_charge(
        &self,
        package: &PricingPackage,
    ) -> Result<ChargeIntent, PaymentError> {
        let amount_cents = (package.price_usd * 100.0).round() as u64;

        tracing::debug!(package = package.id, amount_cents, "Creating Stripe payment intent");

        let response = self
            .client
            .post(format!("{}/v1/payment_intents", self.base_url))
            .basic_auth(&self.secret_key, Some(""))
            .form(&[
                ("amount", amount_cents.to_string()),
                ("currency", "usd".to_string()),
                ("metadata[package_id]", package.id.to_string()),
            ])
            .send()
            .await
            .map_err(|e| PaymentError::ApiRequestFailed(format!("request: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PaymentError::ApiRequestFailed(format!(
                "status {}: {}",
                status, body
            )));
        }

        let intent: PaymentIntentResponse = response
            .json()
            .await
            .map_err(|e| PaymentError::ApiRequestFailed(format!("parse response: {}", e)))?;

        Ok(ChargeIntent {
            id: intent.id,
            client_secret: intent.client_secret,
            amount_minor: intent.amount,
            currency: intent.currency,
        })
    }

    async fn verify_charge(
        &self,
        verification: &ChargeVerification,
    ) -> Result<(), PaymentError> {
        if verification.payment_id.is_empty() {
            return Err(PaymentError::InvalidRequest(
                "missing payment intent id".to_string(),
            ));
        }

        let response = self
            .client
            .get(format!(
                "{}/v1/payment_intents/{}",
                self.base_url, verification.payment_id
            ))
            .basic_auth(&self.secret_key, Some(""))
            .send()
            .await
            .map_err(|e| PaymentError::ApiRequestFailed(format!("request: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(PaymentError::VerificationFailed(format!(
                "payment intent lookup returned status {}",
                status
            )));
        }

        let intent: PaymentIntentResponse = response
            .json()
            .await
            .map_err(|e| PaymentError::ApiRequestFailed(format!("parse response: {}", e)))?;

        if intent.status != "succeeded" {
            return Err(PaymentError::VerificationFailed(format!(
                "payment intent status is '{}'",
                intent.status
            )));
        }

        Ok(())
    }
}
