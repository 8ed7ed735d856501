use async_trait::async_trait;

use crate::domain::PricingPackage;

/// A created-but-unpaid charge, in the provider's own terms.
#[derive(Debug, Clone, PartialEq)]
pub struct ChargeIntent {
    /// Provider-side id (Stripe payment intent id, Razorpay order id).
    pub id: String,
    /// Present for providers whose client flow needs one (Stripe).
    pub client_secret: Option<String>,
    /// Amount in the currency's minor unit (cents, paise).
    pub amount_minor: u64,
    pub currency: String,
}

/// Fields the client reports back after the provider-side payment flow.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChargeVerification {
    pub payment_id: String,
    pub order_id: Option<String>,
    pub signature: Option<String>,
}

/// One payment processor. Implementations are selected per request by the
/// `provider` field of the verify call.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    fn provider(&self) -> &'static str;

    async fn create_charge(&self, package: &PricingPackage)
        -> Result<ChargeIntent, PaymentError>;

    /// Checks the provider-specific signature/status. Crediting only
    /// happens after this returns `Ok`.
    async fn verify_charge(&self, verification: &ChargeVerification)
        -> Result<(), PaymentError>;
}

#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("api request failed: {0}")]
    ApiRequestFailed(String),
    #[error("payment verification failed: {0}")]
    VerificationFailed(String),
    #[error("invalid payment request: {0}")]
    InvalidRequest(String),
}
