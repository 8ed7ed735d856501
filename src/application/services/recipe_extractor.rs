use std::sync::Arc;
use std::time::Duration;

use crate::application::ports::{
    GenerationConfig, GenerationOutcome, GeneratorError, RecipeGenerator,
};
use crate::domain::{
    RecipeDraft, DEFAULT_AUTHOR, DEFAULT_COOK_TIME, DEFAULT_PREP_TIME, DEFAULT_YIELD,
};

const GENERATION_TIMEOUT: Duration = Duration::from_secs(60);

/// Turns a transcript into a structured recipe draft via one bounded
/// generation call, with response repair and default filling.
pub struct RecipeExtractor<G>
where
    G: RecipeGenerator,
{
    generator: Arc<G>,
    config: GenerationConfig,
    timeout: Duration,
}

impl<G> RecipeExtractor<G>
where
    G: RecipeGenerator,
{
    pub fn new(generator: Arc<G>) -> Self {
        Self {
            generator,
            config: GenerationConfig::default(),
            timeout: GENERATION_TIMEOUT,
        }
    }

    pub fn with_timeout(generator: Arc<G>, timeout: Duration) -> Self {
        Self {
            generator,
            config: GenerationConfig::default(),
            timeout,
        }
    }

    #[tracing::instrument(skip(self, transcript), fields(transcript_chars = transcript.len(), output_language = %output_language))]
    pub async fn extract(
        &self,
        transcript: &str,
        output_language: &str,
    ) -> Result<RecipeDraft, ExtractionError> {
        let prompt = build_prompt(transcript, output_language);

        let outcome =
            match tokio::time::timeout(self.timeout, self.generator.generate(&prompt, &self.config))
                .await
            {
                Ok(result) => result.map_err(|e| match e {
                    GeneratorError::ApiRequestFailed {
                        status: Some(status),
                        ..
                    } if status >= 500 => ExtractionError::TooComplex,
                    other => ExtractionError::Generator(other),
                })?,
                Err(_) => return Err(ExtractionError::TooComplex),
            };

        let text = match outcome {
            GenerationOutcome::Text(text) => text,
            GenerationOutcome::SafetyBlocked { reason } => {
                return Err(ExtractionError::SafetyBlocked(reason));
            }
            GenerationOutcome::Truncated {
                partial: Some(partial),
            } if !partial.trim().is_empty() => {
                tracing::warn!("Generation hit the output token cap, salvaging partial text");
                partial
            }
            GenerationOutcome::Truncated { .. } => return Err(ExtractionError::Truncated),
            GenerationOutcome::NoCandidate { reason } => {
                return Err(ExtractionError::NoCandidate(reason));
            }
        };

        let cleaned = clean_response_text(&text);

        let draft = match parse_recipe(cleaned) {
            Ok(draft) => draft,
            Err(e) => {
                tracing::error!(error = %e, "Unparseable generation output, returning degraded recipe");
                return Ok(degraded_draft(transcript));
            }
        };

        Ok(fill_defaults(draft))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("generation took too long; the recipe may be too complex")]
    TooComplex,
    #[error("generation was flagged by safety filters: {0}")]
    SafetyBlocked(String),
    #[error("generation was cut off before any usable output")]
    Truncated,
    #[error("no usable generation candidate: {0}")]
    NoCandidate(String),
    #[error("generation provider: {0}")]
    Generator(GeneratorError),
}

/// The single prompt sent per extraction. Field values are translated into
/// `output_language`; JSON keys stay fixed.
pub fn build_prompt(transcript: &str, output_language: &str) -> String {
    format!(
        r#"You are a recipe extraction expert. Analyze the following transcription of someone describing a recipe and extract structured recipe information.

Transcription:
{transcript}

Please extract and return the recipe information in the following JSON format:
{{
    "recipe_name": "Name of the recipe",
    "author": "Author name if mentioned, otherwise 'Home Chef'",
    "description": "Brief description of the dish",
    "prep_time": "preparation time (e.g., '15 minutes'). If not mentioned, estimate based on recipe complexity",
    "cook_time": "cooking/baking time (e.g., '30 minutes'). If not mentioned, estimate based on the cooking method",
    "yield": "number of servings or people (e.g., '4 servings', 'Serves 6'). If not mentioned, estimate based on ingredient quantities",
    "ingredients": [
        "quantity measurement ingredient (e.g., '2 cups (240g) all-purpose flour')"
    ],
    "instructions": [
        "Detailed step 1",
        "Detailed step 2"
    ],
    "tips": [
        "Helpful tip if any mentioned"
    ]
}}

Important guidelines:
- Write every field value in {output_language}. Keep the JSON keys exactly as given above; translate only the values.
- ALWAYS provide prep_time, cook_time, and yield. If not explicitly mentioned, make reasonable estimates based on the recipe
- Extract all ingredients with quantities in format: "quantity measurement ingredient (metric equivalent if applicable)"
- Break down instructions into clear, detailed steps
- Include any cooking tips, variations, or notes mentioned in the tips array
- If author is not mentioned, use "Home Chef" as default
- Ensure the recipe_name is descriptive and appetizing
- For yield, always specify how many people/servings. Calculate the approximate number if not explicitly mentioned.
- For cook_time, include the actual cooking/baking time on heat/in oven. Calculate the approximate time if not explicitly mentioned.
- For prep_time, include time for chopping, mixing, marinating, etc. Calculate approximate time if not explicitly mentioned.

Return ONLY the JSON object, no additional text."#
    )
}

/// Strips a wrapping code fence and slices to the outermost JSON object when
/// the model surrounded it with prose.
pub fn clean_response_text(text: &str) -> &str {
    let mut cleaned = text.trim();

    if let Some(rest) = cleaned.strip_prefix("```json") {
        cleaned = rest;
    } else if let Some(rest) = cleaned.strip_prefix("```") {
        cleaned = rest;
    }
    if let Some(rest) = cleaned.strip_suffix("```") {
        cleaned = rest;
    }
    cleaned = cleaned.trim();

    if let (Some(start), Some(end)) = (cleaned.find('{'), cleaned.rfind('}')) {
        if end > start {
            cleaned = &cleaned[start..=end];
        }
    }

    cleaned
}

/// Strict parse, then exactly one lenient retry. A lenient failure
/// propagates the original strict error.
pub fn parse_recipe(text: &str) -> Result<RecipeDraft, serde_json::Error> {
    match parse_recipe_strict(text) {
        Ok(draft) => Ok(draft),
        Err(original) => parse_recipe_lenient(text).map_err(|_| original),
    }
}

pub fn parse_recipe_strict(text: &str) -> Result<RecipeDraft, serde_json::Error> {
    serde_json::from_str(text)
}

/// Strips trailing commas before `}`/`]` outside string literals, then
/// parses strictly.
pub fn parse_recipe_lenient(text: &str) -> Result<RecipeDraft, serde_json::Error> {
    parse_recipe_strict(&strip_trailing_commas(text))
}

fn strip_trailing_commas(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;

    for c in text.chars() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            out.push(c);
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            '}' | ']' => {
                // Drop a comma that directly precedes the closer.
                let kept_len = out.trim_end().len();
                if out[..kept_len].ends_with(',') {
                    out.remove(kept_len - 1);
                }
                out.push(c);
            }
            _ => out.push(c),
        }
    }

    out
}

/// Guarantees the recipe invariant: timing, yield and author are never
/// empty in a returned draft.
pub fn fill_defaults(mut draft: RecipeDraft) -> RecipeDraft {
    if draft.prep_time.trim().is_empty() {
        draft.prep_time = DEFAULT_PREP_TIME.to_string();
    }
    if draft.cook_time.trim().is_empty() {
        draft.cook_time = DEFAULT_COOK_TIME.to_string();
    }
    if draft.yield_.trim().is_empty() {
        draft.yield_ = DEFAULT_YIELD.to_string();
    }
    if draft.author.trim().is_empty() {
        draft.author = DEFAULT_AUTHOR.to_string();
    }
    draft
}

/// Terminal fallback when the generation output cannot be parsed at all:
/// the transcript itself becomes the instructions so the caller still gets
/// something usable.
pub fn degraded_draft(transcript: &str) -> RecipeDraft {
    RecipeDraft {
        recipe_name: "Recipe from Audio".to_string(),
        author: DEFAULT_AUTHOR.to_string(),
        description: "Could not extract structured recipe data. Please try again.".to_string(),
        prep_time: DEFAULT_PREP_TIME.to_string(),
        cook_time: DEFAULT_COOK_TIME.to_string(),
        yield_: DEFAULT_YIELD.to_string(),
        ingredients: Vec::new(),
        instructions: vec![transcript.to_string()],
        tips: vec![
            "The AI had trouble parsing the recipe. You can edit this manually.".to_string(),
        ],
    }
}
