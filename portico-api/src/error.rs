use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use portico_core::ErrorKind;
use portico_flow::FlowError;
use portico_pms::PmsError;
use serde_json::{json, Value};

/// API-boundary error. Maps structured kinds onto the wire contract the
/// shell navigates by: `{ error, kind, redirect?, fields? }`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Flow(#[from] FlowError),
    #[error("Flow session not found")]
    SessionNotFound,
    /// No property selection anywhere in the fallback chain.
    #[error("No property is configured for this kiosk")]
    PropertyNotConfigured,
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl From<PmsError> for AppError {
    fn from(e: PmsError) -> Self {
        Self::Flow(FlowError::Pms(e))
    }
}

impl From<portico_store::StoreError> for AppError {
    fn from(e: portico_store::StoreError) -> Self {
        Self::Anyhow(e.into())
    }
}

fn body(error: &str, kind: &str) -> Value {
    json!({ "error": error, "kind": kind })
}

fn pms_response(e: &PmsError) -> (StatusCode, Value) {
    match e.kind {
        ErrorKind::NotFound => (StatusCode::NOT_FOUND, body(&e.message, "not_found")),
        ErrorKind::Auth => (StatusCode::UNAUTHORIZED, body(&e.message, "auth")),
        ErrorKind::Validation => (StatusCode::UNPROCESSABLE_ENTITY, body(&e.message, "validation")),
        ErrorKind::PropertyContext => {
            let mut b = body(&e.message, "property_context");
            b["redirect"] = json!("property-selection");
            (StatusCode::CONFLICT, b)
        }
        ErrorKind::Network => (
            StatusCode::BAD_GATEWAY,
            body(&e.message, "network"),
        ),
        ErrorKind::Backend | ErrorKind::Hardware(_) | ErrorKind::Unknown => {
            (StatusCode::BAD_GATEWAY, body(&e.message, "backend"))
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, payload) = match self {
            AppError::Flow(FlowError::MissingContext(field)) => {
                let mut b = body(
                    &format!("Missing context: {field}. Restart the flow."),
                    "missing_context",
                );
                b["redirect"] = json!("flow-entry");
                (StatusCode::CONFLICT, b)
            }
            AppError::Flow(FlowError::InvalidTransition { .. })
            | AppError::Flow(FlowError::WrongState { .. }) => (
                StatusCode::CONFLICT,
                body("This step is not available in the current flow state.", "invalid_state"),
            ),
            AppError::Flow(FlowError::Validation { fields }) => {
                let mut b = body("Validation failed", "validation");
                b["fields"] = json!(fields);
                (StatusCode::UNPROCESSABLE_ENTITY, b)
            }
            AppError::Flow(FlowError::CapabilityDisabled(flow)) => (
                StatusCode::FORBIDDEN,
                body(
                    &format!("The {flow} flow is not enabled on this kiosk."),
                    "capability_disabled",
                ),
            ),
            AppError::Flow(FlowError::PaymentTimeout) => (
                StatusCode::BAD_GATEWAY,
                body("Payment was not completed in time.", "payment_timeout"),
            ),
            AppError::Flow(FlowError::PaymentFailed(message)) => (
                StatusCode::BAD_GATEWAY,
                body(&format!("Payment failed: {message}"), "payment_failed"),
            ),
            AppError::Flow(FlowError::Pms(e)) => pms_response(&e),
            AppError::Flow(FlowError::Core(e)) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                body(&e.to_string(), "validation"),
            ),
            AppError::SessionNotFound => (
                StatusCode::NOT_FOUND,
                body("Flow session not found.", "session_not_found"),
            ),
            AppError::PropertyNotConfigured => {
                let mut b = body(
                    "No property is configured for this kiosk.",
                    "property_context",
                );
                b["redirect"] = json!("property-selection");
                (StatusCode::CONFLICT, b)
            }
            AppError::Anyhow(err) => {
                tracing::error!("Internal Server Error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    body("Internal Server Error", "internal"),
                )
            }
        };

        (status, Json(payload)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_context_redirects_to_flow_entry() {
        let response =
            AppError::Flow(FlowError::MissingContext("reservation")).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_property_errors_redirect_to_selection() {
        let response = AppError::PropertyNotConfigured.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let e = PmsError::new(ErrorKind::PropertyContext, "Invalid property ID");
        let (status, payload) = pms_response(&e);
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(payload["redirect"], "property-selection");
    }

    #[test]
    fn test_validation_carries_field_map() {
        let mut fields = std::collections::BTreeMap::new();
        fields.insert("email".to_string(), "Email is required".to_string());
        let response = AppError::Flow(FlowError::Validation { fields }).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_display_delegates_to_the_flow_error() {
        let err: AppError = FlowError::MissingContext("reservation").into();
        assert_eq!(err.to_string(), "Missing context: reservation");
    }

    #[test]
    fn test_not_found_maps_to_404() {
        let e = PmsError::not_found("no reservation");
        let (status, _) = pms_response(&e);
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
