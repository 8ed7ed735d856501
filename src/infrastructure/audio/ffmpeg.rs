use std::path::{Path, PathBuf};

use tokio::process::Command;

/// Transcodes a webm/opus upload to mono 16kHz PCM16 WAV via the external
/// `ffmpeg` binary. Returns `None` when the tool is missing or exits
/// non-zero, letting the caller fall through to in-process decoding.
///
/// Temp paths are derived from the uploaded filename; concurrent uploads
/// sharing a filename can collide (known hazard, inherited from the
/// deployment this replaces).
pub(super) async fn transcode_to_wav(filename: &str, data: &[u8]) -> Option<Vec<u8>> {
    let input_path = temp_path(filename);
    let output_path = converted_path(&input_path);

    if let Err(e) = tokio::fs::write(&input_path, data).await {
        tracing::warn!(error = %e, "Failed to stage upload for ffmpeg conversion");
        return None;
    }

    let result = run_ffmpeg(&input_path, &output_path).await;

    let wav = match result {
        Ok(true) => match tokio::fs::read(&output_path).await {
            Ok(bytes) => {
                tracing::debug!(bytes = bytes.len(), "ffmpeg conversion succeeded");
                Some(bytes)
            }
            Err(e) => {
                tracing::warn!(error = %e, "ffmpeg output missing");
                None
            }
        },
        Ok(false) => None,
        Err(e) => {
            tracing::debug!(error = %e, "ffmpeg not available, falling back to in-process decode");
            None
        }
    };

    // Remove temp files on success and error paths alike.
    let _ = tokio::fs::remove_file(&input_path).await;
    let _ = tokio::fs::remove_file(&output_path).await;

    wav
}

async fn run_ffmpeg(input: &Path, output: &Path) -> std::io::Result<bool> {
    let result = Command::new("ffmpeg")
        .arg("-y")
        .arg("-i")
        .arg(input)
        .args(["-acodec", "pcm_s16le", "-ar", "16000", "-ac", "1"])
        .arg(output)
        .output()
        .await?;

    if !result.status.success() {
        let stderr = String::from_utf8_lossy(&result.stderr);
        tracing::warn!(
            status = %result.status,
            stderr = %stderr.trim(),
            "ffmpeg conversion failed"
        );
        return Ok(false);
    }

    Ok(true)
}

fn temp_path(filename: &str) -> PathBuf {
    // Strip any client-supplied directory components.
    let name = Path::new(filename)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "audio".to_string());
    std::env::temp_dir().join(format!("upload_{}", name))
}

fn converted_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());
    input.with_file_name(format!("{}_converted.wav", stem))
}
