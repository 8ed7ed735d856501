use std::borrow::Cow;
use std::path::Path;

use async_trait::async_trait;

use crate::application::ports::{
    AudioEncoding, AudioNormalizeError, AudioNormalizer, NormalizedAudio,
};

use super::decoder::{self, DecodeError, TARGET_SAMPLE_RATE};
use super::{ffmpeg, wav};

/// Three-tier normalization: ffmpeg transcode for webm/opus, in-process
/// decode + resample + PCM16 WAV re-encode, and finally the raw bytes with
/// an extension-derived provider config. Uploaded formats are browser-
/// dependent, so no single decode path is trusted; a decode error never
/// aborts the pipeline.
pub struct TieredAudioNormalizer;

#[async_trait]
impl AudioNormalizer for TieredAudioNormalizer {
    async fn normalize(
        &self,
        filename: &str,
        data: &[u8],
    ) -> Result<NormalizedAudio, AudioNormalizeError> {
        if data.is_empty() {
            return Err(AudioNormalizeError::EmptyAudio);
        }

        let extension = extension_of(filename);
        let mut working: Cow<'_, [u8]> = Cow::Borrowed(data);
        let mut working_ext = extension.as_str();

        if matches!(working_ext, "webm" | "opus") {
            if let Some(converted) = ffmpeg::transcode_to_wav(filename, data).await {
                working = Cow::Owned(converted);
                working_ext = "wav";
            }
        }

        match decoder::decode_to_mono_16k(&working, working_ext) {
            Ok(samples) => Ok(NormalizedAudio {
                content: wav::encode_pcm16_wav(&samples, TARGET_SAMPLE_RATE),
                encoding: AudioEncoding::Linear16,
                sample_rate_hertz: TARGET_SAMPLE_RATE,
                channel_count: Some(1),
            }),
            Err(DecodeError::Empty) => Err(AudioNormalizeError::EmptyAudio),
            Err(DecodeError::Failed(reason)) => {
                tracing::warn!(
                    error = %reason,
                    extension = working_ext,
                    "Audio conversion failed, sending raw bytes with extension-derived config"
                );
                Ok(raw_fallback(working.into_owned(), working_ext))
            }
        }
    }
}

/// Tier three: pass the bytes through untouched and guess the provider
/// config from the file extension alone.
fn raw_fallback(content: Vec<u8>, extension: &str) -> NormalizedAudio {
    let (encoding, sample_rate_hertz) = match extension {
        "webm" | "opus" => (AudioEncoding::WebmOpus, 48_000),
        "mp3" => (AudioEncoding::Mp3, 44_100),
        "flac" => (AudioEncoding::Flac, 44_100),
        _ => (AudioEncoding::Linear16, 16_000),
    };

    NormalizedAudio {
        content,
        encoding,
        sample_rate_hertz,
        channel_count: None,
    }
}

fn extension_of(filename: &str) -> String {
    Path::new(filename)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}
