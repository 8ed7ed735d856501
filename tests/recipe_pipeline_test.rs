use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use ladle::application::ports::{
    AudioEncoding, AudioNormalizeError, AudioNormalizer, CreditLedger, GenerationConfig,
    GenerationOutcome, GeneratorError, LedgerError, NormalizedAudio, RateLimiter,
    RecipeGenerator, RecipeRepository, RecipeUpdate, RecognitionRequest, RecognizedSegment,
    RepositoryError, SpeechToText, SpeechToTextError,
};
use ladle::application::services::{
    CreditGate, PipelineError, RecipeExtractor, RecipePipeline, TranscriptionService,
};
use ladle::domain::{Recipe, RecipeId, UserId};
use ladle::infrastructure::rate_limit::FixedWindowLimiter;

const RECIPE_JSON: &str = r#"{"recipe_name": "Dal", "instructions": ["Simmer lentils"]}"#;

struct PassthroughNormalizer;

#[async_trait]
impl AudioNormalizer for PassthroughNormalizer {
    async fn normalize(
        &self,
        _filename: &str,
        data: &[u8],
    ) -> Result<NormalizedAudio, AudioNormalizeError> {
        if data.is_empty() {
            return Err(AudioNormalizeError::EmptyAudio);
        }
        Ok(NormalizedAudio {
            content: data.to_vec(),
            encoding: AudioEncoding::Linear16,
            sample_rate_hertz: 16_000,
            channel_count: Some(1),
        })
    }
}

struct CountingSpeech {
    transcript: Option<String>,
    calls: AtomicUsize,
}

impl CountingSpeech {
    fn new(transcript: Option<&str>) -> Self {
        Self {
            transcript: transcript.map(String::from),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl SpeechToText for CountingSpeech {
    async fn recognize(
        &self,
        _request: &RecognitionRequest,
    ) -> Result<Vec<RecognizedSegment>, SpeechToTextError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .transcript
            .iter()
            .map(|t| RecognizedSegment {
                transcript: t.clone(),
            })
            .collect())
    }
}

struct JsonGenerator;

#[async_trait]
impl RecipeGenerator for JsonGenerator {
    async fn generate(
        &self,
        _prompt: &str,
        _config: &GenerationConfig,
    ) -> Result<GenerationOutcome, GeneratorError> {
        Ok(GenerationOutcome::Text(RECIPE_JSON.to_string()))
    }
}

/// Pre-check passes, but the deduction itself always errors.
struct FlakyLedger;

#[async_trait]
impl CreditLedger for FlakyLedger {
    async fn balance(&self, _user: &UserId) -> Result<Option<i64>, LedgerError> {
        Ok(Some(100))
    }

    async fn deduct(&self, _user: &UserId, _amount: i64) -> Result<Option<i64>, LedgerError> {
        Err(LedgerError::QueryFailed("connection reset".to_string()))
    }

    async fn add(&self, _user: &UserId, amount: i64) -> Result<i64, LedgerError> {
        Ok(amount)
    }
}

/// Pre-check passes, but a concurrent spend drained the balance before the
/// deduction committed.
struct RacedLedger;

#[async_trait]
impl CreditLedger for RacedLedger {
    async fn balance(&self, _user: &UserId) -> Result<Option<i64>, LedgerError> {
        Ok(Some(100))
    }

    async fn deduct(&self, _user: &UserId, _amount: i64) -> Result<Option<i64>, LedgerError> {
        Ok(None)
    }

    async fn add(&self, _user: &UserId, amount: i64) -> Result<i64, LedgerError> {
        Ok(amount)
    }
}

struct EmptyLedger;

#[async_trait]
impl CreditLedger for EmptyLedger {
    async fn balance(&self, _user: &UserId) -> Result<Option<i64>, LedgerError> {
        Ok(None)
    }

    async fn deduct(&self, _user: &UserId, amount: i64) -> Result<Option<i64>, LedgerError> {
        Ok(Some(10 - amount))
    }

    async fn add(&self, _user: &UserId, amount: i64) -> Result<i64, LedgerError> {
        Ok(amount)
    }
}

struct BrokenRepository;

#[async_trait]
impl RecipeRepository for BrokenRepository {
    async fn create(&self, _recipe: &Recipe) -> Result<(), RepositoryError> {
        Err(RepositoryError::QueryFailed("disk full".to_string()))
    }

    async fn list(
        &self,
        _user: &UserId,
        _search: Option<&str>,
    ) -> Result<Vec<Recipe>, RepositoryError> {
        Ok(vec![])
    }

    async fn get(&self, _user: &UserId, _id: RecipeId) -> Result<Option<Recipe>, RepositoryError> {
        Ok(None)
    }

    async fn update(
        &self,
        _user: &UserId,
        _id: RecipeId,
        _update: &RecipeUpdate,
    ) -> Result<Option<Recipe>, RepositoryError> {
        Ok(None)
    }

    async fn delete(&self, _user: &UserId, _id: RecipeId) -> Result<bool, RepositoryError> {
        Ok(false)
    }
}

fn pipeline_with(
    speech: Arc<CountingSpeech>,
    ledger: Arc<dyn CreditLedger>,
    repository: Option<Arc<dyn RecipeRepository>>,
) -> RecipePipeline<PassthroughNormalizer, CountingSpeech, JsonGenerator> {
    let gate = Arc::new(CreditGate::new(ledger, 5, 10));
    RecipePipeline::new(
        TranscriptionService::new(Arc::new(PassthroughNormalizer), speech),
        RecipeExtractor::new(Arc::new(JsonGenerator)),
        Some(gate),
        Arc::new(FixedWindowLimiter::new(Duration::from_secs(60), 100)),
        repository,
    )
}

#[tokio::test]
async fn given_failing_deduction_when_processing_then_recipe_is_still_delivered() {
    let speech = Arc::new(CountingSpeech::new(Some("simmer the lentils")));
    let pipeline = pipeline_with(Arc::clone(&speech), Arc::new(FlakyLedger), None);

    let processed = pipeline
        .process(&UserId::new("user-a"), "clip.wav", b"audio", "en-US", "English")
        .await
        .unwrap();

    assert_eq!(processed.recipe.recipe_name, "Dal");
    assert_eq!(processed.credits_remaining, None);
}

#[tokio::test]
async fn given_raced_deduction_when_processing_then_recipe_is_still_delivered() {
    let speech = Arc::new(CountingSpeech::new(Some("simmer the lentils")));
    let pipeline = pipeline_with(Arc::clone(&speech), Arc::new(RacedLedger), None);

    let processed = pipeline
        .process(&UserId::new("user-a"), "clip.wav", b"audio", "en-US", "English")
        .await
        .unwrap();

    assert_eq!(processed.recipe.recipe_name, "Dal");
    assert_eq!(processed.credits_remaining, None);
}

#[tokio::test]
async fn given_failing_save_when_processing_then_recipe_is_still_delivered() {
    let speech = Arc::new(CountingSpeech::new(Some("simmer the lentils")));
    let pipeline = pipeline_with(
        Arc::clone(&speech),
        Arc::new(EmptyLedger),
        Some(Arc::new(BrokenRepository)),
    );

    let processed = pipeline
        .process(&UserId::new("user-a"), "clip.wav", b"audio", "en-US", "English")
        .await
        .unwrap();

    assert_eq!(processed.recipe.recipe_name, "Dal");
    assert_eq!(processed.credits_remaining, Some(5));
}

#[tokio::test]
async fn given_user_without_balance_row_when_processing_then_default_balance_is_assumed() {
    let speech = Arc::new(CountingSpeech::new(Some("simmer the lentils")));
    let pipeline = pipeline_with(Arc::clone(&speech), Arc::new(EmptyLedger), None);

    let processed = pipeline
        .process(&UserId::new("new-user"), "clip.wav", b"audio", "en-US", "English")
        .await
        .unwrap();

    assert_eq!(processed.credits_remaining, Some(5));
}

#[tokio::test]
async fn given_empty_upload_when_processing_then_fails_before_any_provider_call() {
    let speech = Arc::new(CountingSpeech::new(Some("simmer the lentils")));
    let pipeline = pipeline_with(Arc::clone(&speech), Arc::new(EmptyLedger), None);

    let result = pipeline
        .process(&UserId::new("user-a"), "clip.wav", b"", "en-US", "English")
        .await;

    assert!(matches!(result, Err(PipelineError::EmptyAudio)));
    assert_eq!(speech.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn given_no_speech_when_processing_then_no_speech_error() {
    let speech = Arc::new(CountingSpeech::new(None));
    let pipeline = pipeline_with(Arc::clone(&speech), Arc::new(EmptyLedger), None);

    let result = pipeline
        .process(&UserId::new("user-a"), "clip.wav", b"audio", "en-US", "English")
        .await;

    assert!(matches!(result, Err(PipelineError::NoSpeechDetected)));
}

#[tokio::test]
async fn given_rejecting_limiter_when_processing_then_rate_limited_before_credit_check() {
    struct DenyAll;
    impl RateLimiter for DenyAll {
        fn admit(&self, _key: &str) -> bool {
            false
        }
    }

    let speech = Arc::new(CountingSpeech::new(Some("simmer the lentils")));
    let gate = Arc::new(CreditGate::new(Arc::new(EmptyLedger), 5, 10));
    let pipeline = RecipePipeline::new(
        TranscriptionService::new(Arc::new(PassthroughNormalizer), Arc::clone(&speech)),
        RecipeExtractor::new(Arc::new(JsonGenerator)),
        Some(gate),
        Arc::new(DenyAll),
        None,
    );

    let result = pipeline
        .process(&UserId::new("user-a"), "clip.wav", b"audio", "en-US", "English")
        .await;

    assert!(matches!(result, Err(PipelineError::RateLimited)));
    assert_eq!(speech.calls.load(Ordering::SeqCst), 0);
}
