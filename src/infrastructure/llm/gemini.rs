use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::application::ports::{
    GenerationConfig, GenerationOutcome, GeneratorError, RecipeGenerator,
};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Google Gemini over the REST `generateContent` endpoint.
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self::with_base_url(api_key, model, DEFAULT_BASE_URL.to_string())
    }

    pub fn with_base_url(api_key: String, model: String, base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model,
            base_url,
        }
    }
}

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfigBody,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfigBody {
    temperature: f32,
    top_p: f32,
    top_k: u32,
    max_output_tokens: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

fn candidate_text(candidate: &Candidate) -> Option<String> {
    let text = candidate
        .content
        .as_ref()?
        .parts
        .iter()
        .filter_map(|p| p.text.as_deref())
        .collect::<String>();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

#[async_trait]
impl RecipeGenerator for GeminiClient {
    async fn generate(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<GenerationOutcome, GeneratorError> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfigBody {
                temperature: config.temperature,
                top_p: config.top_p,
                top_k: config.top_k,
                max_output_tokens: config.max_output_tokens,
            },
        };

        tracing::debug!(model = %self.model, prompt_chars = prompt.len(), "Calling Gemini generateContent");

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| GeneratorError::ApiRequestFailed {
                status: None,
                message: format!("request: {}", e),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(GeneratorError::ApiRequestFailed {
                status: Some(status.as_u16()),
                message: body,
            });
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| GeneratorError::InvalidResponse(format!("parse response: {}", e)))?;

        let Some(candidate) = parsed.candidates.first() else {
            // No candidates at all usually means the prompt itself was blocked.
            let outcome = match parsed.prompt_feedback.and_then(|f| f.block_reason) {
                Some(reason) => GenerationOutcome::SafetyBlocked { reason },
                None => GenerationOutcome::NoCandidate {
                    reason: "provider returned no candidates".to_string(),
                },
            };
            return Ok(outcome);
        };

        let outcome = match candidate.finish_reason.as_deref() {
            Some("SAFETY") => GenerationOutcome::SafetyBlocked {
                reason: "candidate blocked by safety filters".to_string(),
            },
            Some("MAX_TOKENS") => GenerationOutcome::Truncated {
                partial: candidate_text(candidate),
            },
            _ => match candidate_text(candidate) {
                Some(text) => GenerationOutcome::Text(text),
                None => GenerationOutcome::NoCandidate {
                    reason: candidate
                        .finish_reason
                        .clone()
                        .unwrap_or_else(|| "empty candidate".to_string()),
                },
            },
        };

        Ok(outcome)
    }
}
