use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::ports::{
    AudioNormalizer, RecipeGenerator, RecipeRepository, RecipeUpdate, SpeechToText,
};
use crate::domain::{Recipe, RecipeDraft, RecipeId};
use crate::presentation::auth::AuthUser;
use crate::presentation::handlers::ErrorResponse;
use crate::presentation::state::AppState;

#[derive(Deserialize)]
pub struct ListParams {
    pub search: Option<String>,
}

#[derive(Serialize)]
pub struct RecipeListResponse {
    pub recipes: Vec<Recipe>,
    pub count: usize,
}

/// Manual recipe edits arrive as a full recipe body; absent fields are
/// left untouched.
#[derive(Deserialize)]
pub struct UpdateRecipeRequest {
    pub recipe_name: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
    pub prep_time: Option<String>,
    pub cook_time: Option<String>,
    #[serde(rename = "yield")]
    pub yield_: Option<String>,
    pub ingredients: Option<Vec<String>>,
    pub instructions: Option<Vec<String>>,
    pub tips: Option<Vec<String>>,
}

fn repository_or_unavailable<N, S, G>(
    state: &AppState<N, S, G>,
) -> Result<Arc<dyn RecipeRepository>, Response>
where
    N: AudioNormalizer,
    S: SpeechToText,
    G: RecipeGenerator,
{
    state.repository.clone().ok_or_else(|| {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse {
                error: "Database not configured".to_string(),
            }),
        )
            .into_response()
    })
}

fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: "Recipe not found".to_string(),
        }),
    )
        .into_response()
}

fn internal_error(e: impl std::fmt::Display) -> Response {
    tracing::error!(error = %e, "Recipe store query failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: "Could not access recipes. Please try again.".to_string(),
        }),
    )
        .into_response()
}

#[tracing::instrument(skip_all, fields(user_id = %user.user_id))]
pub async fn list_recipes_handler<N, S, G>(
    State(state): State<AppState<N, S, G>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<ListParams>,
) -> Response
where
    N: AudioNormalizer + 'static,
    S: SpeechToText + 'static,
    G: RecipeGenerator + 'static,
{
    let repository = match repository_or_unavailable(&state) {
        Ok(r) => r,
        Err(response) => return response,
    };

    match repository.list(&user.user_id, params.search.as_deref()).await {
        Ok(recipes) => {
            let count = recipes.len();
            (StatusCode::OK, Json(RecipeListResponse { recipes, count })).into_response()
        }
        Err(e) => internal_error(e),
    }
}

#[tracing::instrument(skip_all, fields(user_id = %user.user_id, recipe_id = %recipe_id))]
pub async fn get_recipe_handler<N, S, G>(
    State(state): State<AppState<N, S, G>>,
    Extension(user): Extension<AuthUser>,
    Path(recipe_id): Path<Uuid>,
) -> Response
where
    N: AudioNormalizer + 'static,
    S: SpeechToText + 'static,
    G: RecipeGenerator + 'static,
{
    let repository = match repository_or_unavailable(&state) {
        Ok(r) => r,
        Err(response) => return response,
    };

    match repository
        .get(&user.user_id, RecipeId::from_uuid(recipe_id))
        .await
    {
        Ok(Some(recipe)) => (StatusCode::OK, Json(recipe)).into_response(),
        Ok(None) => not_found(),
        Err(e) => internal_error(e),
    }
}

#[tracing::instrument(skip_all, fields(user_id = %user.user_id))]
pub async fn create_recipe_handler<N, S, G>(
    State(state): State<AppState<N, S, G>>,
    Extension(user): Extension<AuthUser>,
    Json(mut draft): Json<RecipeDraft>,
) -> Response
where
    N: AudioNormalizer + 'static,
    S: SpeechToText + 'static,
    G: RecipeGenerator + 'static,
{
    let repository = match repository_or_unavailable(&state) {
        Ok(r) => r,
        Err(response) => return response,
    };

    if draft.recipe_name.trim().is_empty() {
        draft.recipe_name = "Untitled Recipe".to_string();
    }

    let recipe = Recipe::new(user.user_id.clone(), draft, None);

    match repository.create(&recipe).await {
        Ok(()) => {
            tracing::info!(recipe_id = %recipe.id.as_uuid(), "Recipe created");
            (StatusCode::CREATED, Json(recipe)).into_response()
        }
        Err(e) => internal_error(e),
    }
}

#[tracing::instrument(skip_all, fields(user_id = %user.user_id, recipe_id = %recipe_id))]
pub async fn update_recipe_handler<N, S, G>(
    State(state): State<AppState<N, S, G>>,
    Extension(user): Extension<AuthUser>,
    Path(recipe_id): Path<Uuid>,
    Json(request): Json<UpdateRecipeRequest>,
) -> Response
where
    N: AudioNormalizer + 'static,
    S: SpeechToText + 'static,
    G: RecipeGenerator + 'static,
{
    let repository = match repository_or_unavailable(&state) {
        Ok(r) => r,
        Err(response) => return response,
    };

    let update = RecipeUpdate {
        recipe_name: request.recipe_name,
        author: request.author,
        description: request.description,
        prep_time: request.prep_time,
        cook_time: request.cook_time,
        yield_: request.yield_,
        ingredients: request.ingredients,
        instructions: request.instructions,
        tips: request.tips,
    };

    match repository
        .update(&user.user_id, RecipeId::from_uuid(recipe_id), &update)
        .await
    {
        Ok(Some(recipe)) => (StatusCode::OK, Json(recipe)).into_response(),
        Ok(None) => not_found(),
        Err(e) => internal_error(e),
    }
}

#[tracing::instrument(skip_all, fields(user_id = %user.user_id, recipe_id = %recipe_id))]
pub async fn delete_recipe_handler<N, S, G>(
    State(state): State<AppState<N, S, G>>,
    Extension(user): Extension<AuthUser>,
    Path(recipe_id): Path<Uuid>,
) -> Response
where
    N: AudioNormalizer + 'static,
    S: SpeechToText + 'static,
    G: RecipeGenerator + 'static,
{
    let repository = match repository_or_unavailable(&state) {
        Ok(r) => r,
        Err(response) => return response,
    };

    match repository
        .delete(&user.user_id, RecipeId::from_uuid(recipe_id))
        .await
    {
        Ok(true) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "message": "Recipe deleted successfully",
                "id": recipe_id,
            })),
        )
            .into_response(),
        Ok(false) => not_found(),
        Err(e) => internal_error(e),
    }
}
