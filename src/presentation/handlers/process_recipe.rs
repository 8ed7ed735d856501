use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use serde::Serialize;
use serde_json::json;

use crate::application::ports::{AudioNormalizer, RecipeGenerator, SpeechToText};
use crate::application::services::{ExtractionError, PipelineError, ProcessedRecipe};
use crate::domain::Recipe;
use crate::infrastructure::observability::sanitize_transcript;
use crate::presentation::auth::AuthUser;
use crate::presentation::handlers::ErrorResponse;
use crate::presentation::state::AppState;

const NO_SPEECH_MESSAGE: &str = "Failed to transcribe audio. Please ensure:\n\
    • Audio contains clear speech\n\
    • Recording is not too quiet\n\
    • There is minimal background noise\n\
    • Audio duration is at least 1 second";

const TOO_COMPLEX_MESSAGE: &str = "The recipe is taking too long to process. \
    Please try with a shorter recipe or simplify your description.";

#[derive(Serialize)]
struct ProcessRecipeResponse {
    #[serde(flatten)]
    recipe: Recipe,
    #[serde(skip_serializing_if = "Option::is_none")]
    credits_remaining: Option<i64>,
}

struct UploadForm {
    filename: String,
    data: Vec<u8>,
    language: String,
    output_language: Option<String>,
}

async fn read_form(multipart: &mut Multipart) -> Result<Option<UploadForm>, String> {
    let mut audio: Option<(String, Vec<u8>)> = None;
    let mut language = "en-US".to_string();
    let mut output_language = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| format!("Failed to read multipart: {}", e))?
    {
        match field.name() {
            Some("audio") => {
                let filename = field.file_name().unwrap_or("recipe-audio.webm").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| format!("Failed to read file: {}", e))?;
                audio = Some((filename, data.to_vec()));
            }
            Some("language") => {
                language = field.text().await.map_err(|e| e.to_string())?;
            }
            Some("output_language") => {
                output_language = Some(field.text().await.map_err(|e| e.to_string())?);
            }
            _ => {}
        }
    }

    Ok(audio.map(|(filename, data)| UploadForm {
        filename,
        data,
        language,
        output_language,
    }))
}

#[tracing::instrument(skip_all, fields(user_id = %user.user_id))]
pub async fn process_recipe_handler<N, S, G>(
    State(state): State<AppState<N, S, G>>,
    Extension(user): Extension<AuthUser>,
    mut multipart: Multipart,
) -> Response
where
    N: AudioNormalizer + 'static,
    S: SpeechToText + 'static,
    G: RecipeGenerator + 'static,
{
    let form = match read_form(&mut multipart).await {
        Ok(Some(form)) => form,
        Ok(None) => {
            tracing::warn!("Recipe request with no audio file");
            return error_response(StatusCode::BAD_REQUEST, "No audio file provided");
        }
        Err(message) => {
            tracing::error!(error = %message, "Failed to read multipart upload");
            return error_response(StatusCode::BAD_REQUEST, &message);
        }
    };

    let output_language = form
        .output_language
        .clone()
        .unwrap_or_else(|| form.language.clone());

    let result = state
        .pipeline
        .process(
            &user.user_id,
            &form.filename,
            &form.data,
            &form.language,
            &output_language,
        )
        .await;

    match result {
        Ok(ProcessedRecipe {
            recipe,
            credits_remaining,
        }) => {
            tracing::info!(
                recipe_name = %recipe.recipe_name,
                transcript = %recipe
                    .transcription
                    .as_deref()
                    .map(sanitize_transcript)
                    .unwrap_or_default(),
                "Recipe processed"
            );
            (
                StatusCode::OK,
                Json(ProcessRecipeResponse {
                    recipe,
                    credits_remaining,
                }),
            )
                .into_response()
        }
        Err(e) => pipeline_error_response(e),
    }
}

fn pipeline_error_response(error: PipelineError) -> Response {
    match &error {
        PipelineError::RateLimited => (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({
                "error": "Too many requests. Please wait a minute and try again.",
                "code": "RATE_LIMITED",
            })),
        )
            .into_response(),
        PipelineError::InsufficientCredits {
            current_balance,
            required,
        } => (
            StatusCode::PAYMENT_REQUIRED,
            Json(json!({
                "error": "Insufficient credits. Please purchase more credits to continue.",
                "code": "INSUFFICIENT_CREDITS",
                "current_balance": current_balance,
                "required": required,
            })),
        )
            .into_response(),
        PipelineError::EmptyAudio => {
            error_response(StatusCode::BAD_REQUEST, "Audio file is empty")
        }
        PipelineError::NoSpeechDetected => {
            error_response(StatusCode::BAD_REQUEST, NO_SPEECH_MESSAGE)
        }
        PipelineError::Transcription(e) => {
            tracing::error!(error = %e, "Transcription failed");
            error_response(StatusCode::BAD_REQUEST, NO_SPEECH_MESSAGE)
        }
        PipelineError::Extraction(e) => {
            tracing::error!(error = %e, "Recipe extraction failed");
            let message = match e {
                ExtractionError::TooComplex => TOO_COMPLEX_MESSAGE.to_string(),
                ExtractionError::SafetyBlocked(_) => {
                    "The recipe was flagged by safety filters. Please rephrase and try again."
                        .to_string()
                }
                ExtractionError::Truncated => {
                    "The recipe is too long to process. Please try a shorter description."
                        .to_string()
                }
                ExtractionError::NoCandidate(reason) => {
                    format!("Recipe extraction failed: {}", reason)
                }
                ExtractionError::Generator(_) => {
                    "Recipe extraction failed. Please try again.".to_string()
                }
            };
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &message)
        }
        PipelineError::Ledger(e) => {
            tracing::error!(error = %e, "Credit ledger unavailable");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Could not check credit balance. Please try again.",
            )
        }
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
        .into_response()
}
