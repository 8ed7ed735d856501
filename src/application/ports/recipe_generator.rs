use async_trait::async_trait;

/// Sampling parameters for one generation call.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationConfig {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: 0.95,
            top_k: 40,
            max_output_tokens: 2048,
        }
    }
}

/// Non-nominal provider outcomes the extractor must handle distinctly.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationOutcome {
    Text(String),
    SafetyBlocked { reason: String },
    Truncated { partial: Option<String> },
    NoCandidate { reason: String },
}

#[async_trait]
pub trait RecipeGenerator: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<GenerationOutcome, GeneratorError>;
}

#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    #[error("api request failed{}: {message}", status.map(|s| format!(" (status {})", s)).unwrap_or_default())]
    ApiRequestFailed {
        status: Option<u16>,
        message: String,
    },
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}
