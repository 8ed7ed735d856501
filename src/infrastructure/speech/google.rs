use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::application::ports::{
    RecognitionRequest, RecognizedSegment, SpeechToText, SpeechToTextError,
};

const DEFAULT_BASE_URL: &str = "https://speech.googleapis.com/v1";

/// Google Cloud Speech-to-Text over the REST `speech:recognize` endpoint.
pub struct GoogleSpeechClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GoogleSpeechClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL.to_string())
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RecognizeBody {
    config: RecognitionConfigBody,
    audio: RecognitionAudioBody,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RecognitionConfigBody {
    encoding: &'static str,
    sample_rate_hertz: u32,
    language_code: String,
    enable_automatic_punctuation: bool,
    model: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    audio_channel_count: Option<u32>,
}

#[derive(Serialize)]
struct RecognitionAudioBody {
    content: String,
}

#[derive(Deserialize)]
struct RecognizeResponse {
    #[serde(default)]
    results: Vec<RecognitionResult>,
}

#[derive(Deserialize)]
struct RecognitionResult {
    #[serde(default)]
    alternatives: Vec<RecognitionAlternative>,
}

#[derive(Deserialize)]
struct RecognitionAlternative {
    #[serde(default)]
    transcript: String,
}

#[async_trait]
impl SpeechToText for GoogleSpeechClient {
    async fn recognize(
        &self,
        request: &RecognitionRequest,
    ) -> Result<Vec<RecognizedSegment>, SpeechToTextError> {
        let url = format!("{}/speech:recognize?key={}", self.base_url, self.api_key);

        let body = RecognizeBody {
            config: RecognitionConfigBody {
                encoding: request.encoding.as_str(),
                sample_rate_hertz: request.sample_rate_hertz,
                language_code: request.language_code.clone(),
                enable_automatic_punctuation: true,
                model: "default",
                audio_channel_count: request.channel_count,
            },
            audio: RecognitionAudioBody {
                content: base64::engine::general_purpose::STANDARD.encode(&request.content),
            },
        };

        tracing::debug!(
            encoding = request.encoding.as_str(),
            sample_rate = request.sample_rate_hertz,
            language = %request.language_code,
            "Sending audio to Google Speech-to-Text"
        );

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| SpeechToTextError::ApiRequestFailed(format!("request: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(SpeechToTextError::ApiRequestFailed(format!(
                "status {}: {}",
                status, body
            )));
        }

        let parsed: RecognizeResponse = response
            .json()
            .await
            .map_err(|e| SpeechToTextError::InvalidResponse(format!("parse response: {}", e)))?;

        let segments = parsed
            .results
            .into_iter()
            .filter_map(|r| r.alternatives.into_iter().next())
            .map(|a| RecognizedSegment {
                transcript: a.transcript,
            })
            .collect::<Vec<_>>();

        tracing::info!(segments = segments.len(), "Speech recognition completed");

        Ok(segments)
    }
}
