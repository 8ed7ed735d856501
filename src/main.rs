use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;

use ladle::application::ports::{CreditLedger, RecipeRepository};
use ladle::application::services::{
    CreditGate, RecipeExtractor, RecipePipeline, TranscriptionService,
};
use ladle::infrastructure::audio::TieredAudioNormalizer;
use ladle::infrastructure::llm::GeminiClient;
use ladle::infrastructure::observability::{init_tracing, TracingConfig};
use ladle::infrastructure::payments::{RazorpayGateway, StripeGateway};
use ladle::infrastructure::persistence::{create_pool, PgCreditLedger, PgRecipeRepository};
use ladle::infrastructure::rate_limit::FixedWindowLimiter;
use ladle::infrastructure::speech::GoogleSpeechClient;
use ladle::presentation::{create_router, AppState, JwtVerifier, PaymentGateways, Settings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::from_env();

    init_tracing(
        TracingConfig {
            environment: settings.environment.to_string(),
            ..TracingConfig::default()
        },
        settings.port,
    );

    if settings.google_speech_api_key.is_none() {
        tracing::warn!("GOOGLE_SPEECH_API_KEY not set; transcription will fail");
    }
    if settings.gemini_api_key.is_none() {
        tracing::warn!("GEMINI_API_KEY not set; recipe extraction will fail");
    }
    if settings.jwt_secret.is_none() {
        tracing::warn!("JWT_SECRET not set; authenticated endpoints will reject all requests");
    }

    let normalizer = Arc::new(TieredAudioNormalizer);
    let speech = Arc::new(GoogleSpeechClient::new(
        settings.google_speech_api_key.clone().unwrap_or_default(),
    ));
    let generator = Arc::new(GeminiClient::new(
        settings.gemini_api_key.clone().unwrap_or_default(),
        settings.gemini_model.clone(),
    ));

    let mut repository: Option<Arc<dyn RecipeRepository>> = None;
    let mut credit_gate: Option<Arc<CreditGate>> = None;

    match &settings.database_url {
        Some(url) => match create_pool(url, 10).await {
            Ok(pool) => {
                tracing::info!("Running database migrations");
                sqlx::migrate!().run(&pool).await?;

                repository = Some(Arc::new(PgRecipeRepository::new(pool.clone())));
                let ledger: Arc<dyn CreditLedger> = Arc::new(PgCreditLedger::new(pool));
                credit_gate = Some(Arc::new(CreditGate::new(
                    ledger,
                    settings.credits.recipe_cost,
                    settings.credits.default_new_user_credits,
                )));
            }
            Err(e) => {
                tracing::warn!(error = %e, "Database unavailable; recipes and credits disabled");
            }
        },
        None => {
            tracing::warn!("DATABASE_URL not set; recipes and credits disabled");
        }
    }

    let rate_limiter = Arc::new(FixedWindowLimiter::new(
        Duration::from_secs(settings.rate_limit.window_secs),
        settings.rate_limit.max_requests,
    ));

    let pipeline = Arc::new(RecipePipeline::new(
        TranscriptionService::new(Arc::clone(&normalizer), Arc::clone(&speech)),
        RecipeExtractor::new(Arc::clone(&generator)),
        credit_gate.clone(),
        rate_limiter,
        repository.clone(),
    ));

    let mut payments = PaymentGateways::default();
    if let Some(secret_key) = &settings.stripe.secret_key {
        payments.stripe = Some(Arc::new(StripeGateway::new(secret_key.clone())));
    }
    if let (Some(key_id), Some(key_secret)) =
        (&settings.razorpay.key_id, &settings.razorpay.key_secret)
    {
        payments.razorpay = Some(Arc::new(RazorpayGateway::new(
            key_id.clone(),
            key_secret.clone(),
        )));
    }

    let verifier = JwtVerifier::new(settings.jwt_secret.clone());

    let state = AppState {
        pipeline,
        repository,
        credit_gate,
        payments,
        settings: settings.clone(),
    };

    let router = create_router(state, verifier);

    let addr: SocketAddr = format!("{}:{}", settings.host, settings.port).parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
