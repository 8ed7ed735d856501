use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use ladle::application::ports::{
    AudioEncoding, AudioNormalizeError, AudioNormalizer, CreditLedger, GenerationConfig,
    GenerationOutcome, GeneratorError, LedgerError, NormalizedAudio, RecipeRepository,
    RecipeUpdate, RecognitionRequest, RecognizedSegment, RepositoryError, SpeechToText,
    SpeechToTextError,
};
use ladle::application::services::{
    CreditGate, RecipeExtractor, RecipePipeline, TranscriptionService,
};
use ladle::domain::{Recipe, RecipeDraft, RecipeId, UserId};
use ladle::infrastructure::rate_limit::FixedWindowLimiter;
use ladle::presentation::config::{
    CreditSettings, Environment, RateLimitSettings, RazorpaySettings, Settings, StripeSettings,
};
use ladle::presentation::{create_router, AppState, JwtVerifier, PaymentGateways};

const TEST_SECRET: &str = "test-jwt-secret-at-least-32-bytes!!";
const TEST_TRANSCRIPT: &str = "boil two cups of water and add the tea leaves";
const VALID_RECIPE_JSON: &str = r#"{
    "recipe_name": "Masala Chai",
    "author": "",
    "description": "Spiced Indian tea",
    "prep_time": "",
    "cook_time": "10 minutes",
    "yield": "",
    "ingredients": ["2 cups water", "2 teaspoons tea leaves"],
    "instructions": ["Boil the water", "Add tea leaves and simmer"],
    "tips": []
}"#;

// ---------------------------------------------------------------------------
// Mock ports
// ---------------------------------------------------------------------------

struct MockNormalizer;

#[async_trait]
impl AudioNormalizer for MockNormalizer {
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

struct MockSpeech {
    transcript: Option<String>,
    calls: AtomicUsize,
}

impl MockSpeech {
    fn new(transcript: Option<&str>) -> Self {
        Self {
            transcript: transcript.map(String::from),
            calls: AtomicUsize::new(0),
        }
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SpeechToText for MockSpeech {
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

struct MockGenerator {
    response: String,
}

#[async_trait]
impl ladle::application::ports::RecipeGenerator for MockGenerator {
    async fn generate(
        &self,
        _prompt: &str,
        _config: &GenerationConfig,
    ) -> Result<GenerationOutcome, GeneratorError> {
        Ok(GenerationOutcome::Text(self.response.clone()))
    }
}

struct MockLedger {
    balance: Mutex<i64>,
}

impl MockLedger {
    fn new(balance: i64) -> Self {
        Self {
            balance: Mutex::new(balance),
        }
    }
}

#[async_trait]
impl CreditLedger for MockLedger {
    async fn balance(&self, _user: &UserId) -> Result<Option<i64>, LedgerError> {
        Ok(Some(*self.balance.lock().unwrap()))
    }

    async fn deduct(&self, _user: &UserId, amount: i64) -> Result<Option<i64>, LedgerError> {
        let mut balance = self.balance.lock().unwrap();
        if *balance < amount {
            return Ok(None);
        }
        *balance -= amount;
        Ok(Some(*balance))
    }

    async fn add(&self, _user: &UserId, amount: i64) -> Result<i64, LedgerError> {
        let mut balance = self.balance.lock().unwrap();
        *balance += amount;
        Ok(*balance)
    }
}

#[derive(Default)]
struct MockRepository {
    recipes: Mutex<Vec<Recipe>>,
}

#[async_trait]
impl RecipeRepository for MockRepository {
    async fn create(&self, recipe: &Recipe) -> Result<(), RepositoryError> {
        self.recipes.lock().unwrap().push(recipe.clone());
        Ok(())
    }

    async fn list(
        &self,
        user: &UserId,
        search: Option<&str>,
    ) -> Result<Vec<Recipe>, RepositoryError> {
        let needle = search.map(str::to_lowercase);
        Ok(self
            .recipes
            .lock()
            .unwrap()
            .iter()
            .filter(|r| &r.user_id == user)
            .filter(|r| match &needle {
                Some(n) => {
                    r.recipe_name.to_lowercase().contains(n)
                        || r.author.to_lowercase().contains(n)
                        || r.description.to_lowercase().contains(n)
                }
                None => true,
            })
            .cloned()
            .collect())
    }

    async fn get(&self, user: &UserId, id: RecipeId) -> Result<Option<Recipe>, RepositoryError> {
        Ok(self
            .recipes
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == id && &r.user_id == user)
            .cloned())
    }

    async fn update(
        &self,
        user: &UserId,
        id: RecipeId,
        update: &RecipeUpdate,
    ) -> Result<Option<Recipe>, RepositoryError> {
        let mut recipes = self.recipes.lock().unwrap();
        let Some(recipe) = recipes
            .iter_mut()
            .find(|r| r.id == id && &r.user_id == user)
        else {
            return Ok(None);
        };
        if let Some(name) = &update.recipe_name {
            recipe.recipe_name = name.clone();
        }
        if let Some(description) = &update.description {
            recipe.description = description.clone();
        }
        Ok(Some(recipe.clone()))
    }

    async fn delete(&self, user: &UserId, id: RecipeId) -> Result<bool, RepositoryError> {
        let mut recipes = self.recipes.lock().unwrap();
        let before = recipes.len();
        recipes.retain(|r| !(r.id == id && &r.user_id == user));
        Ok(recipes.len() != before)
    }
}

// ---------------------------------------------------------------------------
// Test harness
// ---------------------------------------------------------------------------

fn test_settings() -> Settings {
    Settings {
        environment: Environment::Test,
        host: "127.0.0.1".to_string(),
        port: 0,
        database_url: None,
        google_speech_api_key: None,
        gemini_api_key: None,
        gemini_model: "gemini-2.5-flash".to_string(),
        jwt_secret: Some(TEST_SECRET.to_string()),
        stripe: StripeSettings {
            public_key: None,
            secret_key: None,
        },
        razorpay: RazorpaySettings {
            key_id: None,
            key_secret: None,
        },
        rate_limit: RateLimitSettings {
            window_secs: 60,
            max_requests: 5,
        },
        credits: CreditSettings {
            recipe_cost: 5,
            default_new_user_credits: 10,
        },
    }
}

struct TestApp {
    router: axum::Router,
    speech: Arc<MockSpeech>,
    repository: Arc<MockRepository>,
}

fn build_app(balance: i64, transcript: Option<&str>, generator_json: &str) -> TestApp {
    let normalizer = Arc::new(MockNormalizer);
    let speech = Arc::new(MockSpeech::new(transcript));
    let generator = Arc::new(MockGenerator {
        response: generator_json.to_string(),
    });
    let repository = Arc::new(MockRepository::default());
    let ledger: Arc<dyn CreditLedger> = Arc::new(MockLedger::new(balance));
    let credit_gate = Arc::new(CreditGate::new(ledger, 5, 10));
    let rate_limiter = Arc::new(FixedWindowLimiter::new(Duration::from_secs(60), 5));

    let pipeline = Arc::new(RecipePipeline::new(
        TranscriptionService::new(Arc::clone(&normalizer), Arc::clone(&speech)),
        RecipeExtractor::new(Arc::clone(&generator)),
        Some(Arc::clone(&credit_gate)),
        rate_limiter,
        Some(Arc::clone(&repository) as Arc<dyn RecipeRepository>),
    ));

    let state = AppState {
        pipeline,
        repository: Some(Arc::clone(&repository) as Arc<dyn RecipeRepository>),
        credit_gate: Some(credit_gate),
        payments: PaymentGateways::default(),
        settings: test_settings(),
    };

    let router = create_router(state, JwtVerifier::new(Some(TEST_SECRET.to_string())));

    TestApp {
        router,
        speech,
        repository,
    }
}

#[derive(serde::Serialize)]
struct TestClaims {
    sub: String,
    exp: usize,
    aud: String,
}

fn token_for(user: &str) -> String {
    let claims = TestClaims {
        sub: user.to_string(),
        exp: (chrono::Utc::now().timestamp() + 3600) as usize,
        aud: "authenticated".to_string(),
    };
    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .unwrap()
}

const BOUNDARY: &str = "test-boundary-7f3a9c";

fn multipart_upload(audio: &[u8], language: &str, output_language: Option<&str>) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"audio\"; \
             filename=\"recipe-audio.wav\"\r\nContent-Type: audio/wav\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(audio);
    body.extend_from_slice(b"\r\n");
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"language\"\r\n\r\n{language}\r\n"
        )
        .as_bytes(),
    );
    if let Some(output) = output_language {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"output_language\"\r\n\r\n{output}\r\n"
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn process_recipe_request(token: &str, body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/process-recipe")
        .header("authorization", format!("Bearer {}", token))
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Health and public config
// ---------------------------------------------------------------------------

#[tokio::test]
async fn given_running_server_when_health_check_then_reports_config_presence() {
    let app = build_app(10, Some(TEST_TRANSCRIPT), VALID_RECIPE_JSON);

    let response = app
        .router
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["speech_to_text"], false);
    assert_eq!(json["gemini"], false);
    assert_eq!(json["database"], false);
}

#[tokio::test]
async fn given_no_auth_when_fetching_pricing_then_returns_catalog() {
    let app = build_app(10, Some(TEST_TRANSCRIPT), VALID_RECIPE_JSON);

    let response = app
        .router
        .oneshot(
            Request::builder()
                .uri("/api/config/pricing")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["recipe_cost"], 5);
    assert_eq!(json["packages"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn given_no_auth_when_fetching_payment_config_then_returns_public_keys_only() {
    let app = build_app(10, Some(TEST_TRANSCRIPT), VALID_RECIPE_JSON);

    let response = app
        .router
        .oneshot(
            Request::builder()
                .uri("/api/config/payments")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert!(json.get("stripePublicKey").is_some());
    assert!(json.get("razorpayKeyId").is_some());
    assert!(json.get("stripeSecretKey").is_none());
}

// ---------------------------------------------------------------------------
// Authentication
// ---------------------------------------------------------------------------

#[tokio::test]
async fn given_missing_token_when_processing_recipe_then_returns_unauthorized() {
    let app = build_app(10, Some(TEST_TRANSCRIPT), VALID_RECIPE_JSON);
    let body = multipart_upload(b"fake-audio", "en-US", None);

    let response = app
        .router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/process-recipe")
                .header(
                    "content-type",
                    format!("multipart/form-data; boundary={BOUNDARY}"),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn given_garbage_token_when_listing_recipes_then_returns_unauthorized() {
    let app = build_app(10, Some(TEST_TRANSCRIPT), VALID_RECIPE_JSON);

    let response = app
        .router
        .oneshot(
            Request::builder()
                .uri("/api/recipes")
                .header("authorization", "Bearer not-a-jwt")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// The pipeline endpoint
// ---------------------------------------------------------------------------

#[tokio::test]
async fn given_valid_upload_when_processing_recipe_then_returns_recipe_with_defaults() {
    let app = build_app(10, Some(TEST_TRANSCRIPT), VALID_RECIPE_JSON);
    let body = multipart_upload(b"fake-audio", "en-US", Some("English"));

    let response = app
        .router
        .oneshot(process_recipe_request(&token_for("user-a"), body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["recipe_name"], "Masala Chai");
    assert_eq!(json["author"], "Home Chef");
    assert_eq!(json["prep_time"], "15 minutes");
    assert_eq!(json["yield"], "Serves 4");
    assert_eq!(json["cook_time"], "10 minutes");
    assert_eq!(json["transcription"], TEST_TRANSCRIPT);
    assert_eq!(json["credits_remaining"], 5);
}

#[tokio::test]
async fn given_valid_upload_when_processing_recipe_then_recipe_is_persisted() {
    let app = build_app(10, Some(TEST_TRANSCRIPT), VALID_RECIPE_JSON);
    let body = multipart_upload(b"fake-audio", "en-US", None);

    let response = app
        .router
        .clone()
        .oneshot(process_recipe_request(&token_for("user-a"), body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let saved = app
        .repository
        .list(&UserId::new("user-a"), None)
        .await
        .unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].recipe_name, "Masala Chai");
}

#[tokio::test]
async fn given_low_balance_when_processing_recipe_then_402_and_no_provider_calls() {
    let app = build_app(3, Some(TEST_TRANSCRIPT), VALID_RECIPE_JSON);
    let body = multipart_upload(b"fake-audio", "en-US", None);

    let response = app
        .router
        .oneshot(process_recipe_request(&token_for("user-a"), body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);
    let json = json_body(response).await;
    assert_eq!(json["code"], "INSUFFICIENT_CREDITS");
    assert_eq!(json["current_balance"], 3);
    assert_eq!(json["required"], 5);
    assert_eq!(app.speech.call_count(), 0);
}

#[tokio::test]
async fn given_no_audio_field_when_processing_recipe_then_returns_bad_request() {
    let app = build_app(10, Some(TEST_TRANSCRIPT), VALID_RECIPE_JSON);

    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"language\"\r\n\r\nen-US\r\n--{BOUNDARY}--\r\n"
        )
        .as_bytes(),
    );

    let response = app
        .router
        .oneshot(process_recipe_request(&token_for("user-a"), body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn given_silent_audio_when_processing_recipe_then_returns_actionable_error() {
    let app = build_app(10, None, VALID_RECIPE_JSON);
    let body = multipart_upload(b"fake-audio", "en-US", None);

    let response = app
        .router
        .oneshot(process_recipe_request(&token_for("user-a"), body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    let message = json["error"].as_str().unwrap();
    assert!(message.contains("clear speech"));
}

#[tokio::test]
async fn given_unparseable_generation_when_processing_recipe_then_returns_degraded_recipe() {
    let app = build_app(10, Some(TEST_TRANSCRIPT), "this is not json at all {{{");
    let body = multipart_upload(b"fake-audio", "en-US", None);

    let response = app
        .router
        .oneshot(process_recipe_request(&token_for("user-a"), body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["recipe_name"], "Recipe from Audio");
    assert_eq!(json["instructions"][0], TEST_TRANSCRIPT);
}

#[tokio::test]
async fn given_six_rapid_requests_when_processing_recipes_then_sixth_is_rate_limited() {
    let app = build_app(1_000, Some(TEST_TRANSCRIPT), VALID_RECIPE_JSON);
    let token = token_for("user-a");

    for _ in 0..5 {
        let body = multipart_upload(b"fake-audio", "en-US", None);
        let response = app
            .router
            .clone()
            .oneshot(process_recipe_request(&token, body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let body = multipart_upload(b"fake-audio", "en-US", None);
    let response = app
        .router
        .clone()
        .oneshot(process_recipe_request(&token, body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let json = json_body(response).await;
    assert_eq!(json["code"], "RATE_LIMITED");
}

// ---------------------------------------------------------------------------
// Recipe CRUD and ownership
// ---------------------------------------------------------------------------

fn stored_recipe(user: &str, name: &str) -> Recipe {
    Recipe::new(
        UserId::new(user),
        RecipeDraft {
            recipe_name: name.to_string(),
            author: "Home Chef".to_string(),
            description: "test".to_string(),
            prep_time: "15 minutes".to_string(),
            cook_time: "30 minutes".to_string(),
            yield_: "Serves 4".to_string(),
            ingredients: vec!["1 cup flour".to_string()],
            instructions: vec!["Mix".to_string()],
            tips: vec![],
        },
        None,
    )
}

#[tokio::test]
async fn given_manual_recipe_when_creating_then_returns_created() {
    let app = build_app(10, Some(TEST_TRANSCRIPT), VALID_RECIPE_JSON);

    let response = app
        .router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/recipes")
                .header("authorization", format!("Bearer {}", token_for("user-a")))
                .header("content-type", "application/json")
                .body(Body::from(
                    r#"{"recipe_name": "Pancakes", "ingredients": ["2 eggs"], "instructions": ["Whisk"]}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = json_body(response).await;
    assert_eq!(json["recipe_name"], "Pancakes");
}

#[tokio::test]
async fn given_foreign_recipe_when_fetching_then_returns_not_found() {
    let app = build_app(10, Some(TEST_TRANSCRIPT), VALID_RECIPE_JSON);
    let recipe = stored_recipe("user-a", "Secret Cake");
    let recipe_id = recipe.id.as_uuid();
    app.repository.create(&recipe).await.unwrap();

    let response = app
        .router
        .oneshot(
            Request::builder()
                .uri(format!("/api/recipes/{}", recipe_id))
                .header("authorization", format!("Bearer {}", token_for("user-b")))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn given_foreign_recipe_when_deleting_then_returns_not_found_and_row_survives() {
    let app = build_app(10, Some(TEST_TRANSCRIPT), VALID_RECIPE_JSON);
    let recipe = stored_recipe("user-a", "Secret Cake");
    let recipe_id = recipe.id.as_uuid();
    app.repository.create(&recipe).await.unwrap();

    let response = app
        .router
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/recipes/{}", recipe_id))
                .header("authorization", format!("Bearer {}", token_for("user-b")))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let still_there = app
        .repository
        .list(&UserId::new("user-a"), None)
        .await
        .unwrap();
    assert_eq!(still_there.len(), 1);
}

#[tokio::test]
async fn given_foreign_recipe_when_updating_then_returns_not_found() {
    let app = build_app(10, Some(TEST_TRANSCRIPT), VALID_RECIPE_JSON);
    let recipe = stored_recipe("user-a", "Secret Cake");
    let recipe_id = recipe.id.as_uuid();
    app.repository.create(&recipe).await.unwrap();

    let response = app
        .router
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri(format!("/api/recipes/{}", recipe_id))
                .header("authorization", format!("Bearer {}", token_for("user-b")))
                .header("content-type", "application/json")
                .body(Body::from(r#"{"recipe_name": "Stolen Cake"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn given_search_query_when_listing_recipes_then_filters_by_name() {
    let app = build_app(10, Some(TEST_TRANSCRIPT), VALID_RECIPE_JSON);
    app.repository
        .create(&stored_recipe("user-a", "Masala Chai"))
        .await
        .unwrap();
    app.repository
        .create(&stored_recipe("user-a", "Pancakes"))
        .await
        .unwrap();

    let response = app
        .router
        .oneshot(
            Request::builder()
                .uri("/api/recipes?search=chai")
                .header("authorization", format!("Bearer {}", token_for("user-a")))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["count"], 1);
    assert_eq!(json["recipes"][0]["recipe_name"], "Masala Chai");
}

// ---------------------------------------------------------------------------
// Credits endpoint
// ---------------------------------------------------------------------------

#[tokio::test]
async fn given_authenticated_user_when_fetching_credits_then_returns_balance() {
    let app = build_app(42, Some(TEST_TRANSCRIPT), VALID_RECIPE_JSON);

    let response = app
        .router
        .oneshot(
            Request::builder()
                .uri("/api/user/credits")
                .header("authorization", format!("Bearer {}", token_for("user-a")))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["credits"], 42);
}

#[tokio::test]
async fn given_unknown_payment_provider_when_verifying_then_returns_unavailable() {
    let app = build_app(10, Some(TEST_TRANSCRIPT), VALID_RECIPE_JSON);

    let response = app
        .router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/verify-payment")
                .header("authorization", format!("Bearer {}", token_for("user-a")))
                .header("content-type", "application/json")
                .body(Body::from(
                    r#"{"provider": "stripe", "package_id": "standard", "payment_intent_id": "pi_123"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    // No gateways configured in the test app.
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn given_test_environment_when_simulating_purchase_then_credits_are_added() {
    let app = build_app(10, Some(TEST_TRANSCRIPT), VALID_RECIPE_JSON);

    let response = app
        .router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/simulate-buy-credits")
                .header("authorization", format!("Bearer {}", token_for("user-a")))
                .header("content-type", "application/json")
                .body(Body::from(r#"{"credits": 50}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["new_balance"], 60);
}
