mod credit_gate;
mod recipe_extractor;
mod recipe_pipeline;
mod transcription_service;

pub use credit_gate::{CreditGate, CreditGateError};
pub use recipe_extractor::{
    build_prompt, clean_response_text, degraded_draft, fill_defaults, parse_recipe,
    parse_recipe_lenient, parse_recipe_strict, ExtractionError, RecipeExtractor,
};
pub use recipe_pipeline::{PipelineError, ProcessedRecipe, RecipePipeline};
pub use transcription_service::{TranscribeError, TranscriptionService};
