use serde::{Deserialize, Serialize};

use crate::error::HardwareKind;

/// Logical card credentials returned by the PMS lock integration. The
/// default value stands in when a flow completes without issuing a card.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CardCredentials {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_no: Option<String>,
    /// Hex payload the encoder writes to the physical card.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hotel_info: Option<String>,
    /// Raw issuance response for fields the kiosk does not model.
    #[serde(default)]
    pub raw: serde_json::Value,
}

impl CardCredentials {
    pub fn from_response(raw: serde_json::Value) -> Self {
        let get = |key: &str| {
            raw.get(key)
                .and_then(|v| v.as_str())
                .map(|s| s.to_string())
        };
        Self {
            card_no: get("cardNo"),
            card_data: get("cardData"),
            hotel_info: get("hotelInfo"),
            raw,
        }
    }

    /// Without encoder payload there is nothing to hand to the hardware.
    pub fn has_encoder_payload(&self) -> bool {
        self.card_data.as_deref().is_some_and(|d| !d.is_empty())
    }
}

/// Result of the physical encoding/dispensing attempt.
///
/// A failed outcome never voids the reservation; flows proceed to
/// completion and surface the failure as a warning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HardwareOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoded_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<HardwareKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl HardwareOutcome {
    pub fn succeeded(card_id: Option<String>, card_type: Option<String>, encoded_at: Option<String>) -> Self {
        Self {
            success: true,
            card_id,
            card_type,
            encoded_at,
            error_kind: None,
            error_message: None,
        }
    }

    pub fn failed(kind: HardwareKind, message: impl Into<String>) -> Self {
        Self {
            success: false,
            card_id: None,
            card_type: None,
            encoded_at: None,
            error_kind: Some(kind),
            error_message: Some(message.into()),
        }
    }

    /// Issuance never reached the hardware; `message` becomes the
    /// completion warning verbatim.
    pub fn skipped(message: impl Into<String>) -> Self {
        Self {
            success: false,
            card_id: None,
            card_type: None,
            encoded_at: None,
            error_kind: None,
            error_message: Some(message.into()),
        }
    }

    /// Warning text for the completion screen, when the attempt failed.
    pub fn warning(&self) -> Option<String> {
        if self.success {
            return None;
        }
        match self.error_kind {
            Some(kind) => Some(kind.user_message().to_string()),
            None => Some(
                self.error_message
                    .clone()
                    .unwrap_or_else(|| HardwareKind::Unknown.user_message().to_string()),
            ),
        }
    }
}

/// Full card-issuance result: credentials plus the optional hardware leg.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardIssuance {
    pub credentials: CardCredentials,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hardware: Option<HardwareOutcome>,
}

impl CardIssuance {
    pub fn hardware_warning(&self) -> Option<String> {
        self.hardware.as_ref().and_then(|h| h.warning())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_credentials_from_response() {
        let creds = CardCredentials::from_response(json!({
            "cardNo": "42",
            "cardData": "A1B2C3",
            "hotelInfo": "H-INFO"
        }));
        assert_eq!(creds.card_no.as_deref(), Some("42"));
        assert!(creds.has_encoder_payload());

        let empty = CardCredentials::from_response(json!({ "cardNo": "42" }));
        assert!(!empty.has_encoder_payload());
    }

    #[test]
    fn test_failed_outcome_surfaces_warning() {
        let issuance = CardIssuance {
            credentials: CardCredentials::from_response(json!({ "cardData": "A1" })),
            hardware: Some(HardwareOutcome::failed(
                HardwareKind::Dispenser,
                "tray jammed",
            )),
        };
        let warning = issuance.hardware_warning().unwrap();
        assert!(warning.contains("dispenser"));
    }

    #[test]
    fn test_skipped_outcome_carries_its_message() {
        let outcome = HardwareOutcome::skipped("Collect your card at the front desk.");
        assert_eq!(
            outcome.warning().as_deref(),
            Some("Collect your card at the front desk.")
        );
    }

    #[test]
    fn test_successful_outcome_has_no_warning() {
        let outcome = HardwareOutcome::succeeded(Some("C-1".into()), None, None);
        assert!(outcome.warning().is_none());
    }
}
