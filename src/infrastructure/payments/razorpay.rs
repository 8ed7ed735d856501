use async_trait::async_trait;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use serde_json::json;
use sha2::Sha256;

use crate::application::ports::{ChargeIntent, ChargeVerification, PaymentError, PaymentGateway};
use crate::domain::PricingPackage;

const DEFAULT_BASE_URL: &str = "https://api.razorpay.com";

type HmacSha256 = Hmac<Sha256>;

/// Razorpay orders, used for INR purchases. Verification recomputes the
/// HMAC-SHA256 signature of `order_id|payment_id` with the key secret.
pub struct RazorpayGateway {
    client: reqwest::Client,
    key_id: String,
    key_secret: String,
    base_url: String,
}

impl RazorpayGateway {
    pub fn new(key_id: String, key_secret: String) -> Self {
        Self::with_base_url(key_id, key_secret, DEFAULT_BASE_URL.to_string())
    }

    pub fn with_base_url(key_id: String, key_secret: String, base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            key_id,
            key_secret,
            base_url,
        }
    }
}

#[derive(Deserialize)]
struct OrderResponse {
    id: String,
    amount: u64,
    currency: String,
}

#[async_trait]
impl PaymentGateway for RazorpayGateway {
    fn provider(&self) -> &'static str {
        "razorpay"
    }

    async fn create_charge(
        &self,
        package: &PricingPackage,
    ) -> Result<ChargeIntent, PaymentError> {
        let amount_paise = u64::from(package.price_inr) * 100;

        tracing::debug!(package = package.id, amount_paise, "Creating Razorpay order");

        let response = self
            .client
            .post(format!("{}/v1/orders", self.base_url))
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&json!({
                "amount": amount_paise,
                "currency": "INR",
                "receipt": format!("pkg_{}", package.id),
            }))
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

        let order: OrderResponse = response
            .json()
            .await
            .map_err(|e| PaymentError::ApiRequestFailed(format!("parse response: {}", e)))?;

        Ok(ChargeIntent {
            id: order.id,
            client_secret: None,
            amount_minor: order.amount,
            currency: order.currency,
        })
    }

    async fn verify_charge(
        &self,
        verification: &ChargeVerification,
    ) -> Result<(), PaymentError> {
        let order_id = verification
            .order_id
            .as_deref()
            .ok_or_else(|| PaymentError::InvalidRequest("missing order id".to_string()))?;
        let signature = verification
            .signature
            .as_deref()
            .ok_or_else(|| PaymentError::InvalidRequest("missing signature".to_string()))?;

        let signature_bytes = hex::decode(signature)
            .map_err(|_| PaymentError::VerificationFailed("malformed signature".to_string()))?;

        let mut mac = HmacSha256::new_from_slice(self.key_secret.as_bytes())
            .map_err(|e| PaymentError::VerificationFailed(format!("hmac init: {}", e)))?;
        mac.update(format!("{}|{}", order_id, verification.payment_id).as_bytes());

        mac.verify_slice(&signature_bytes)
            .map_err(|_| PaymentError::VerificationFailed("signature mismatch".to_string()))
    }
}
