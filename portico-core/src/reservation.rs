use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use portico_shared::money::Money;
use portico_shared::pii::Masked;

/// Kiosk-facing view of a PMS reservation, transformed once at validation
/// and carried through the rest of the flow. `Debug` masks the guest's
/// contact fields.
#[derive(Clone, Serialize, Deserialize)]
pub struct ReservationSummary {
    pub reservation_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking_id: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub arrival: String,
    pub departure: String,
    pub adults: u32,
    pub total: Money,
    pub balance: f64,
    pub status: String,
    pub room_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_number: Option<String>,
    pub property_id: String,
}

impl fmt::Debug for ReservationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReservationSummary")
            .field("reservation_id", &self.reservation_id)
            .field("booking_id", &self.booking_id)
            .field("last_name", &self.last_name)
            .field("email", &Masked(&self.email))
            .field("phone", &Masked(&self.phone))
            .field("arrival", &self.arrival)
            .field("departure", &self.departure)
            .field("status", &self.status)
            .field("property_id", &self.property_id)
            .finish_non_exhaustive()
    }
}

impl ReservationSummary {
    /// Transform the raw PMS reservation payload.
    pub fn from_pms(raw: &Value, fallback_property_id: &str) -> Option<Self> {
        let id = raw.get("id").and_then(|v| v.as_str())?;
        let guest = raw.get("primaryGuest").cloned().unwrap_or_default();
        let total = raw.get("totalGrossAmount").cloned().unwrap_or_default();
        let unit_group = raw.get("unitGroup").cloned().unwrap_or_default();

        Some(Self {
            reservation_id: id.to_string(),
            booking_id: raw
                .get("bookingId")
                .and_then(|v| v.as_str())
                .map(|s| s.to_string()),
            first_name: str_field(&guest, "firstName"),
            last_name: str_field(&guest, "lastName"),
            email: str_field(&guest, "email"),
            phone: str_field(&guest, "phone"),
            arrival: str_field(raw, "arrival"),
            departure: str_field(raw, "departure"),
            adults: raw
                .get("numberOfAdults")
                .and_then(|v| v.as_u64())
                .unwrap_or(1) as u32,
            total: Money::new(
                total.get("amount").and_then(|v| v.as_f64()).unwrap_or(0.0),
                total
                    .get("currency")
                    .and_then(|v| v.as_str())
                    .unwrap_or("EUR"),
            ),
            balance: raw
                .get("balance")
                .and_then(|b| b.get("amount"))
                .and_then(|v| v.as_f64())
                .unwrap_or(0.0),
            status: str_field(raw, "status"),
            room_type: unit_group
                .get("name")
                .and_then(|v| v.as_str())
                .unwrap_or("Standard Room")
                .to_string(),
            room_number: None,
            property_id: raw
                .get("property")
                .and_then(|p| p.get("id"))
                .and_then(|v| v.as_str())
                .unwrap_or(fallback_property_id)
                .to_string(),
        })
    }
}

fn str_field(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string()
}

/// Extract the reservation id from a booking-creation response.
///
/// The booking endpoint's response shape varies by code path, so the id is
/// looked up through an ordered list of known locations. `None` means the
/// booking is treated as pending, not as an error. A future schema'd
/// backend version deletes exactly this function.
pub fn extract_reservation_id(response: &Value) -> Option<String> {
    let data = response.get("data").unwrap_or(response);

    let candidates: [Option<&Value>; 9] = [
        data.get("booking")
            .and_then(|b| b.get("reservationIds"))
            .and_then(|r| r.get(0))
            .and_then(|r| r.get("id")),
        data.get("booking").and_then(|b| b.get("id")),
        data.get("reservations")
            .and_then(|r| r.get(0))
            .and_then(|r| r.get("id")),
        data.get("data")
            .and_then(|d| d.get("reservations"))
            .and_then(|r| r.get(0))
            .and_then(|r| r.get("id")),
        data.get("reservation").and_then(|r| r.get("id")),
        data.get("data")
            .and_then(|d| d.get("reservation"))
            .and_then(|r| r.get("id")),
        data.get("id"),
        data.get("reservationId"),
        data.get("bookingId"),
    ];

    candidates
        .iter()
        .flatten()
        .find_map(|v| v.as_str())
        .map(|s| s.to_string())
}

/// The parent booking id, when the response distinguishes it from the
/// reservation id.
pub fn extract_booking_id(response: &Value) -> Option<String> {
    let data = response.get("data").unwrap_or(response);
    data.get("booking")
        .and_then(|b| b.get("id"))
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .or_else(|| extract_reservation_id(response))
}

/// Assigned room unit from the booking response, when present.
pub fn extract_assigned_unit(response: &Value) -> Option<String> {
    let data = response.get("data").unwrap_or(response);
    data.get("assignedRoom")
        .and_then(|r| r.get("timeSlices"))
        .and_then(|t| t.get(0))
        .and_then(|t| t.get("unit"))
        .and_then(|u| u.get("name"))
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}
