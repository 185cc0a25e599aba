use serde::{Deserialize, Serialize};

/// Request context every kiosk-namespace PMS call needs.
///
/// Written once at kiosk setup and resolved through the property store's
/// fallback chain; services receive it explicitly instead of reading
/// ambient storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyContext {
    pub property_id: String,
    pub organization_id: String,
    /// External id the availability backend knows the property by.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_property_id: Option<String>,
}

impl PropertyContext {
    pub fn new(property_id: impl Into<String>, organization_id: impl Into<String>) -> Self {
        Self {
            property_id: property_id.into(),
            organization_id: organization_id.into(),
            external_property_id: None,
        }
    }

    /// Path prefix for kiosk-namespace endpoints.
    pub fn kiosk_path(&self, suffix: &str) -> String {
        format!(
            "/api/kiosk/v1/organizations/{}/properties/{}{}",
            self.organization_id, self.property_id, suffix
        )
    }
}

/// Which flows this kiosk is allowed to run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub check_in: bool,
    pub reservations: bool,
    pub card_issuance: bool,
    pub lost_card: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            check_in: true,
            reservations: true,
            card_issuance: true,
            lost_card: true,
        }
    }
}
