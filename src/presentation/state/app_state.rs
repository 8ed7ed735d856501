use std::sync::Arc;

use crate::application::ports::{
    AudioNormalizer, PaymentGateway, RecipeGenerator, RecipeRepository, SpeechToText,
};
use crate::application::services::{CreditGate, RecipePipeline};
use crate::presentation::config::Settings;

/// The configured payment processors, selected per request by provider
/// name. Either may be absent when its keys are not configured.
#[derive(Clone, Default)]
pub struct PaymentGateways {
    pub stripe: Option<Arc<dyn PaymentGateway>>,
    pub razorpay: Option<Arc<dyn PaymentGateway>>,
}

impl PaymentGateways {
    pub fn select(&self, provider: &str) -> Option<&Arc<dyn PaymentGateway>> {
        match provider {
            "stripe" => self.stripe.as_ref(),
            "razorpay" => self.razorpay.as_ref(),
            _ => None,
        }
    }
}

pub struct AppState<N, S, G>
where
    N: AudioNormalizer,
    S: SpeechToText,
    G: RecipeGenerator,
{
    pub pipeline: Arc<RecipePipeline<N, S, G>>,
    pub repository: Option<Arc<dyn RecipeRepository>>,
    pub credit_gate: Option<Arc<CreditGate>>,
    pub payments: PaymentGateways,
    pub settings: Settings,
}

impl<N, S, G> Clone for AppState<N, S, G>
where
    N: AudioNormalizer,
    S: SpeechToText,
    G: RecipeGenerator,
{
    fn clone(&self) -> Self {
        Self {
            pipeline: Arc::clone(&self.pipeline),
            repository: self.repository.clone(),
            credit_gate: self.credit_gate.clone(),
            payments: self.payments.clone(),
            settings: self.settings.clone(),
        }
    }
}
