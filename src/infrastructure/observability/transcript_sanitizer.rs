const MAX_VISIBLE_LENGTH: usize = 100;

/// Truncates transcript text for log lines. Transcripts are user speech;
/// full content belongs in the response, not the logs.
pub fn sanitize_transcript(text: &str) -> String {
    let trimmed = text.trim();

    if trimmed.is_empty() {
        return String::from("[EMPTY]");
    }

    if trimmed.chars().count() <= MAX_VISIBLE_LENGTH {
        return trimmed.to_string();
    }

    let visible: String = trimmed.chars().take(MAX_VISIBLE_LENGTH).collect();
    format!("{}... ({} chars total)", visible, trimmed.chars().count())
}
