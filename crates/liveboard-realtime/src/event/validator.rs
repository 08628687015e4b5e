//! Frame and message-text validation rules.

use liveboard_core::error::AppError;

/// Rejects empty or oversized frames before they are parsed.
pub fn validate_frame(raw: &str, max_bytes: usize) -> Result<(), AppError> {
    if raw.len() > max_bytes {
        return Err(AppError::validation(format!(
            "Frame exceeds maximum size of {max_bytes} bytes"
        )));
    }

    if raw.trim().is_empty() {
        return Err(AppError::validation("Empty frame"));
    }

    Ok(())
}

/// Trims message text and checks it is non-empty and at most
/// `max_chars` characters long.
pub fn validate_text(text: &str, max_chars: usize) -> Result<String, AppError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation("Message text must not be empty"));
    }

    if trimmed.chars().count() > max_chars {
        return Err(AppError::validation(format!(
            "Message text exceeds {max_chars} characters"
        )));
    }

    Ok(trimmed.to_string())
}
