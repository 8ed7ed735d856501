use std::sync::Arc;

use crate::application::ports::{
    AudioNormalizeError, AudioNormalizer, RecognitionRequest, SpeechToText, SpeechToTextError,
};

/// Adapts an uploaded audio blob into one speech-provider call and flattens
/// the multi-segment result into a single transcript.
pub struct TranscriptionService<N, S>
where
    N: AudioNormalizer,
    S: SpeechToText,
{
    normalizer: Arc<N>,
    speech: Arc<S>,
}

impl<N, S> TranscriptionService<N, S>
where
    N: AudioNormalizer,
    S: SpeechToText,
{
    pub fn new(normalizer: Arc<N>, speech: Arc<S>) -> Self {
        Self { normalizer, speech }
    }

    /// `Ok(None)` means the provider returned no speech. The caller decides
    /// how to surface that to the user.
    #[tracing::instrument(skip(self, data), fields(filename = %filename, bytes = data.len()))]
    pub async fn transcribe(
        &self,
        filename: &str,
        data: &[u8],
        language_code: &str,
    ) -> Result<Option<String>, TranscribeError> {
        let normalized = self.normalizer.normalize(filename, data).await?;

        tracing::debug!(
            encoding = normalized.encoding.as_str(),
            sample_rate = normalized.sample_rate_hertz,
            bytes = normalized.content.len(),
            "Audio normalized for recognition"
        );

        let request = RecognitionRequest {
            content: normalized.content,
            encoding: normalized.encoding,
            sample_rate_hertz: normalized.sample_rate_hertz,
            language_code: language_code.to_string(),
            channel_count: normalized.channel_count,
        };

        let segments = self.speech.recognize(&request).await?;

        let transcript = segments
            .iter()
            .map(|s| s.transcript.as_str())
            .collect::<Vec<_>>()
            .join(" ")
            .trim()
            .to_string();

        if transcript.is_empty() {
            tracing::info!("No transcription results returned from the speech provider");
            return Ok(None);
        }

        tracing::info!(chars = transcript.len(), "Transcription completed");
        Ok(Some(transcript))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TranscribeError {
    #[error(transparent)]
    Audio(#[from] AudioNormalizeError),
    #[error("speech provider: {0}")]
    Speech(#[from] SpeechToTextError),
}
