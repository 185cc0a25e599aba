use portico_shared::pii::Masked;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use validator::Validate;

/// Guest-entered form fields. Validated before submission; treated as
/// read-only context for every step after.
///
/// Flow contexts carry this struct and end up in log lines, so `Debug`
/// masks the contact and document fields.
#[derive(Clone, Serialize, Deserialize, Validate, Default)]
#[serde(rename_all = "camelCase")]
pub struct GuestDetails {
    #[validate(length(min = 2, max = 50, message = "First name must be 2-50 characters"))]
    pub first_name: String,
    #[validate(length(min = 2, max = 50, message = "Last name must be 2-50 characters"))]
    pub last_name: String,
    #[validate(email(message = "Please enter a valid email address"))]
    #[validate(length(min = 1, max = 100, message = "Email is required"))]
    pub email: String,
    #[validate(length(min = 10, max = 20, message = "Phone number must be 10-20 characters"))]
    pub phone: String,
    #[validate(length(min = 1, max = 50, message = "Country is required"))]
    pub country: String,
    #[validate(length(min = 1, max = 120, message = "Street address is required"))]
    pub address_street: String,
    #[validate(length(min = 1, max = 80, message = "City is required"))]
    pub address_city: String,
    #[validate(length(min = 1, max = 20, message = "ZIP/Postal code is required"))]
    pub address_postal: String,

    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub document_type: Option<String>,
    #[serde(default)]
    pub document_number: Option<String>,
    #[serde(default)]
    pub nationality_country_code: Option<String>,
    #[serde(default)]
    pub birth_date: Option<String>,
    #[serde(default)]
    pub birth_place: Option<String>,
    #[serde(default)]
    pub travel_purpose: Option<String>,
    #[serde(default)]
    pub guest_comment: Option<String>,
}

impl fmt::Debug for GuestDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuestDetails")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("email", &Masked(&self.email))
            .field("phone", &Masked(&self.phone))
            .field("country", &self.country)
            .field("document_type", &self.document_type)
            .field("document_number", &self.document_number.as_ref().map(Masked))
            .field("nationality_country_code", &self.nationality_country_code)
            .field("travel_purpose", &self.travel_purpose)
            .finish_non_exhaustive()
    }
}

impl GuestDetails {
    /// Validate and return a field-keyed error map; empty map means valid.
    pub fn validation_errors(&self) -> BTreeMap<String, String> {
        let mut errors = BTreeMap::new();
        if let Err(report) = self.validate() {
            for (field, field_errors) in report.field_errors() {
                if let Some(e) = field_errors.first() {
                    let message = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{} is invalid", field));
                    errors.insert(field.to_string(), message);
                }
            }
        }
        errors
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Case-insensitive last-name match shared by check-in and lost-card
/// validation.
pub fn last_name_matches(entered: &str, on_reservation: Option<&str>) -> bool {
    let entered = entered.trim().to_lowercase();
    match on_reservation {
        Some(name) if !entered.is_empty() => name.trim().to_lowercase() == entered,
        _ => false,
    }
}
