use std::sync::Arc;

use crate::application::ports::{
    AudioNormalizeError, AudioNormalizer, LedgerError, RateLimiter, RecipeGenerator,
    RecipeRepository, SpeechToText,
};
use crate::application::services::{
    CreditGate, CreditGateError, ExtractionError, RecipeExtractor, TranscribeError,
    TranscriptionService,
};
use crate::domain::{Recipe, UserId};

/// Everything the caller gets back from one successful pipeline run.
#[derive(Debug, Clone)]
pub struct ProcessedRecipe {
    pub recipe: Recipe,
    /// Balance after deduction; absent when the deduction was refused or
    /// no ledger is configured.
    pub credits_remaining: Option<i64>,
}

/// The one fixed pipeline: rate limit, credit pre-check, normalize,
/// transcribe, extract, deduct (best-effort), save (best-effort).
pub struct RecipePipeline<N, S, G>
where
    N: AudioNormalizer,
    S: SpeechToText,
    G: RecipeGenerator,
{
    transcription: TranscriptionService<N, S>,
    extractor: RecipeExtractor<G>,
    credit_gate: Option<Arc<CreditGate>>,
    rate_limiter: Arc<dyn RateLimiter>,
    repository: Option<Arc<dyn RecipeRepository>>,
}

impl<N, S, G> RecipePipeline<N, S, G>
where
    N: AudioNormalizer,
    S: SpeechToText,
    G: RecipeGenerator,
{
    pub fn new(
        transcription: TranscriptionService<N, S>,
        extractor: RecipeExtractor<G>,
        credit_gate: Option<Arc<CreditGate>>,
        rate_limiter: Arc<dyn RateLimiter>,
        repository: Option<Arc<dyn RecipeRepository>>,
    ) -> Self {
        Self {
            transcription,
            extractor,
            credit_gate,
            rate_limiter,
            repository,
        }
    }

    #[tracing::instrument(skip(self, data), fields(user_id = %user, filename = %filename, bytes = data.len()))]
    pub async fn process(
        &self,
        user: &UserId,
        filename: &str,
        data: &[u8],
        language: &str,
        output_language: &str,
    ) -> Result<ProcessedRecipe, PipelineError> {
        if !self.rate_limiter.admit(user.as_str()) {
            return Err(PipelineError::RateLimited);
        }

        if let Some(gate) = &self.credit_gate {
            gate.pre_check(user).await.map_err(|e| match e {
                CreditGateError::Insufficient {
                    current_balance,
                    required,
                } => PipelineError::InsufficientCredits {
                    current_balance,
                    required,
                },
                CreditGateError::Ledger(e) => PipelineError::Ledger(e),
            })?;
        }

        let transcript = self
            .transcription
            .transcribe(filename, data, language)
            .await
            .map_err(|e| match e {
                TranscribeError::Audio(AudioNormalizeError::EmptyAudio) => {
                    PipelineError::EmptyAudio
                }
                other => PipelineError::Transcription(other),
            })?
            .ok_or(PipelineError::NoSpeechDetected)?;

        let draft = self
            .extractor
            .extract(&transcript, output_language)
            .await
            .map_err(PipelineError::Extraction)?;

        let credits_remaining = match &self.credit_gate {
            Some(gate) => gate.settle(user).await,
            None => None,
        };

        let recipe = Recipe::new(user.clone(), draft, Some(transcript));

        if let Some(repository) = &self.repository {
            match repository.create(&recipe).await {
                Ok(()) => {
                    tracing::info!(recipe_id = %recipe.id.as_uuid(), "Recipe saved");
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to save generated recipe; returning it unsaved");
                }
            }
        }

        Ok(ProcessedRecipe {
            recipe,
            credits_remaining,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("too many requests")]
    RateLimited,
    #[error("insufficient credits: {current_balance} available, {required} required")]
    InsufficientCredits { current_balance: i64, required: i64 },
    #[error("audio file is empty")]
    EmptyAudio,
    #[error("no speech detected in the audio")]
    NoSpeechDetected,
    #[error(transparent)]
    Transcription(TranscribeError),
    #[error(transparent)]
    Extraction(ExtractionError),
    #[error(transparent)]
    Ledger(LedgerError),
}
