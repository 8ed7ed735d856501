use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::application::ports::{AudioNormalizer, RecipeGenerator, SpeechToText};
use crate::infrastructure::observability::request_id_middleware;
use crate::presentation::auth::{auth_middleware, JwtVerifier};
use crate::presentation::config::Environment;
use crate::presentation::handlers::{
    create_payment_intent_handler, create_razorpay_order_handler, create_recipe_handler,
    delete_recipe_handler, get_credits_handler, get_recipe_handler, health_handler,
    list_recipes_handler, payments_config_handler, pricing_handler, process_recipe_handler,
    simulate_purchase_handler, update_recipe_handler, verify_payment_handler,
};
use crate::presentation::state::AppState;

pub fn create_router<N, S, G>(state: AppState<N, S, G>, verifier: JwtVerifier) -> Router
where
    N: AudioNormalizer + 'static,
    S: SpeechToText + 'static,
    G: RecipeGenerator + 'static,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    let mut protected = Router::new()
        .route("/api/process-recipe", post(process_recipe_handler::<N, S, G>))
        .route(
            "/api/recipes",
            get(list_recipes_handler::<N, S, G>).post(create_recipe_handler::<N, S, G>),
        )
        .route(
            "/api/recipes/{recipe_id}",
            get(get_recipe_handler::<N, S, G>)
                .put(update_recipe_handler::<N, S, G>)
                .delete(delete_recipe_handler::<N, S, G>),
        )
        .route("/api/user/credits", get(get_credits_handler::<N, S, G>))
        .route(
            "/api/create-payment-intent",
            post(create_payment_intent_handler::<N, S, G>),
        )
        .route(
            "/api/create-razorpay-order",
            post(create_razorpay_order_handler::<N, S, G>),
        )
        .route("/api/verify-payment", post(verify_payment_handler::<N, S, G>));

    if state.settings.environment != Environment::Prod {
        protected = protected.route(
            "/api/simulate-buy-credits",
            post(simulate_purchase_handler::<N, S, G>),
        );
    }

    let protected = protected.layer(middleware::from_fn_with_state(verifier, auth_middleware));

    let public = Router::new()
        .route("/api/health", get(health_handler::<N, S, G>))
        .route("/api/config/pricing", get(pricing_handler))
        .route("/api/config/payments", get(payments_config_handler::<N, S, G>));

    public
        .merge(protected)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(trace_layer)
        .layer(cors)
        .with_state(state)
}
