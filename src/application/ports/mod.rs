mod audio_normalizer;
mod credit_ledger;
mod payment_gateway;
mod rate_limiter;
mod recipe_generator;
mod recipe_repository;
mod speech_to_text;

pub use audio_normalizer::{AudioEncoding, AudioNormalizeError, AudioNormalizer, NormalizedAudio};
pub use credit_ledger::{CreditLedger, LedgerError};
pub use payment_gateway::{ChargeIntent, ChargeVerification, PaymentError, PaymentGateway};
pub use rate_limiter::RateLimiter;
pub use recipe_generator::{GenerationConfig, GenerationOutcome, GeneratorError, RecipeGenerator};
pub use recipe_repository::{RecipeRepository, RecipeUpdate, RepositoryError};
pub use speech_to_text::{RecognitionRequest, RecognizedSegment, SpeechToText, SpeechToTextError};
