use portico_core::ErrorKind;
use serde_json::Value;

use crate::error::PmsError;

/// Unwrap the backend's `{success, data, message}` envelope.
///
/// Bare payloads (no `success` field) pass through untouched. A `success:
/// false` body becomes a `Backend` error carrying the extracted message.
pub(crate) fn unwrap_envelope(body: Value) -> Result<Value, PmsError> {
    match body.get("success").and_then(|s| s.as_bool()) {
        Some(true) => Ok(body.get("data").cloned().unwrap_or(body)),
        Some(false) => {
            let message = extract_error_message(&body)
                .unwrap_or_else(|| "The reservation system reported an error.".to_string());
            Err(PmsError::new(ErrorKind::Backend, message).with_code(extract_error_code(&body)))
        }
        None => Ok(body),
    }
}

/// Pull a human-readable message out of an error body.
///
/// Priority: `details.message`, then `details.messages[]` joined, then
/// `message`, then `error`.
pub(crate) fn extract_error_message(body: &Value) -> Option<String> {
    if let Some(message) = body
        .get("details")
        .and_then(|d| d.get("message"))
        .and_then(|m| m.as_str())
    {
        return Some(message.to_string());
    }

    if let Some(messages) = body
        .get("details")
        .and_then(|d| d.get("messages"))
        .and_then(|m| m.as_array())
    {
        let joined = messages
            .iter()
            .filter_map(|m| m.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        if !joined.is_empty() {
            return Some(joined);
        }
    }

    body.get("message")
        .and_then(|m| m.as_str())
        .or_else(|| body.get("error").and_then(|e| e.as_str()))
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

pub(crate) fn extract_error_code(body: &Value) -> Option<String> {
    body.get("code")
        .or_else(|| body.get("details").and_then(|d| d.get("code")))
        .and_then(|c| c.as_str())
        .map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_unwrapping() {
        let wrapped = json!({ "success": true, "data": { "id": "R-1" } });
        assert_eq!(unwrap_envelope(wrapped).unwrap()["id"], "R-1");

        let bare = json!({ "id": "R-2" });
        assert_eq!(unwrap_envelope(bare).unwrap()["id"], "R-2");

        let failed = json!({ "success": false, "message": "boom" });
        let err = unwrap_envelope(failed).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Backend);
        assert_eq!(err.message, "boom");
    }

    #[test]
    fn test_message_extraction_priority() {
        let body = json!({
            "details": { "message": "first", "messages": ["second"] },
            "message": "third",
            "error": "fourth"
        });
        assert_eq!(extract_error_message(&body).as_deref(), Some("first"));

        let body = json!({ "details": { "messages": ["a", "b"] }, "message": "third" });
        assert_eq!(extract_error_message(&body).as_deref(), Some("a; b"));

        let body = json!({ "message": "third", "error": "fourth" });
        assert_eq!(extract_error_message(&body).as_deref(), Some("third"));

        let body = json!({ "error": "fourth" });
        assert_eq!(extract_error_message(&body).as_deref(), Some("fourth"));

        assert_eq!(extract_error_message(&json!({})), None);
    }
}
