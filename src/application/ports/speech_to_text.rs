use async_trait::async_trait;

use super::AudioEncoding;

/// One recognition request: normalized audio plus the spoken language.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognitionRequest {
    pub content: Vec<u8>,
    pub encoding: AudioEncoding,
    pub sample_rate_hertz: u32,
    pub language_code: String,
    pub channel_count: Option<u32>,
}

/// Top alternative of one result segment.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognizedSegment {
    pub transcript: String,
}

#[async_trait]
pub trait SpeechToText: Send + Sync {
    /// Returns zero segments when the provider detected no speech.
    async fn recognize(
        &self,
        request: &RecognitionRequest,
    ) -> Result<Vec<RecognizedSegment>, SpeechToTextError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SpeechToTextError {
    #[error("api request failed: {0}")]
    ApiRequestFailed(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}
