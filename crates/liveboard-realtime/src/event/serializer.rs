//! Conversion between text frames and events.

use liveboard_core::error::AppError;

use super::types::{ClientEvent, ServerEvent};
use super::validator::validate_frame;

/// Parses an inbound frame. Oversized or malformed frames are validation
/// errors.
pub fn decode_client_event(raw: &str, max_bytes: usize) -> Result<ClientEvent, AppError> {
    validate_frame(raw, max_bytes)?;
    serde_json::from_str(raw).map_err(|e| AppError::validation(format!("Malformed event: {e}")))
}

/// Renders an outbound event as a text frame.
pub fn encode_server_event(event: &ServerEvent) -> Result<String, AppError> {
    serde_json::to_string(event).map_err(AppError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use liveboard_core::error::ErrorKind;

    #[test]
    fn test_malformed_frame_is_validation_error() {
        let err = decode_client_event("{\"event\":\"dance\"}", 1024).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);

        let err = decode_client_event("not json", 1024).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[test]
    fn test_oversized_frame_is_rejected_before_parsing() {
        let raw = format!(
            "{{\"event\":\"send_message\",\"data\":{{\"text\":\"{}\"}}}}",
            "a".repeat(100)
        );
        assert!(decode_client_event(&raw, 1024).is_ok());
        let err = decode_client_event(&raw, 64).unwrap_err();
        assert!(err.message.contains("maximum size"));
    }

    #[test]
    fn test_encode_unit_payload() {
        let frame = encode_server_event(&ServerEvent::UserCount(2)).expect("encode");
        assert_eq!(frame, "{\"event\":\"user_count\",\"data\":2}");
    }
}
