use async_trait::async_trait;

/// Wire encodings the speech provider accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioEncoding {
    Linear16,
    WebmOpus,
    Mp3,
    Flac,
}

impl AudioEncoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Linear16 => "LINEAR16",
            Self::WebmOpus => "WEBM_OPUS",
            Self::Mp3 => "MP3",
            Self::Flac => "FLAC",
        }
    }
}

/// Provider-ready audio: either re-encoded PCM16 mono 16kHz WAV, or the raw
/// upload plus a best-guess config when decoding was impossible.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedAudio {
    pub content: Vec<u8>,
    pub encoding: AudioEncoding,
    pub sample_rate_hertz: u32,
    pub channel_count: Option<u32>,
}

#[async_trait]
pub trait AudioNormalizer: Send + Sync {
    async fn normalize(
        &self,
        filename: &str,
        data: &[u8],
    ) -> Result<NormalizedAudio, AudioNormalizeError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AudioNormalizeError {
    #[error("audio file is empty")]
    EmptyAudio,
}
