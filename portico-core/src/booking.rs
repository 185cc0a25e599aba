use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::guest::GuestDetails;
use crate::offer::{RoomOffer, SearchCriteria};
use crate::CoreError;

/// Channel code for the booking, inferred from the rate plan unless the
/// offer pins one.
pub fn determine_channel_code(rate_plan_id: &str, offer: &Value) -> String {
    if let Some(code) = offer.get("channelCode").and_then(|c| c.as_str()) {
        return code.to_string();
    }
    if rate_plan_id.to_uppercase().contains("OTA") {
        return "BookingCom".to_string();
    }
    "Direct".to_string()
}

/// Guarantee type: prepaid/non-refundable/OTA rate plans require
/// prepayment, everything else holds a credit card.
pub fn determine_guarantee_type(rate_plan_id: &str, offer: &Value) -> String {
    if let Some(g) = offer.get("guaranteeType").and_then(|g| g.as_str()) {
        return g.to_string();
    }
    if let Some(g) = offer
        .get("ratePlan")
        .and_then(|r| r.get("guaranteeType"))
        .and_then(|g| g.as_str())
    {
        return g.to_string();
    }

    let upper = rate_plan_id.to_uppercase();
    const PREPAYMENT_KEYWORDS: [&str; 5] = ["PREPAY", "PREPAID", "NONREF", "NON-REF", "OTA"];
    if PREPAYMENT_KEYWORDS.iter().any(|k| upper.contains(k)) {
        return "Prepayment".to_string();
    }
    "CreditCard".to_string()
}

/// One time slice per night, carrying the rate plan, unit group, and the
/// per-night share of the total.
pub fn build_time_slices(
    rate_plan_id: &str,
    unit_group_id: &str,
    nights: i64,
    total_amount: Option<(f64, &str)>,
) -> Vec<Value> {
    let per_night = total_amount.map(|(amount, currency)| (amount / nights as f64, currency));

    (0..nights)
        .map(|_| {
            let mut slice = json!({
                "ratePlanId": rate_plan_id,
                "unitGroupId": unit_group_id,
            });
            if let Some((amount, currency)) = per_night {
                slice["totalAmount"] = json!({ "amount": amount, "currency": currency });
            }
            slice
        })
        .collect()
}

fn build_primary_guest(guest: &GuestDetails) -> Value {
    let mut primary = json!({
        "title": guest.title.as_deref().unwrap_or("Mr"),
        "gender": guest.gender.as_deref().unwrap_or("Male"),
        "firstName": guest.first_name,
        "lastName": guest.last_name,
        "email": guest.email,
        "phone": guest.phone,
        "address": {
            "addressLine1": guest.address_street,
            "postalCode": guest.address_postal,
            "city": guest.address_city,
            "countryCode": guest.country,
        },
    });

    if let (Some(doc_type), Some(doc_number)) = (&guest.document_type, &guest.document_number) {
        primary["identificationDocument"] = json!({ "type": doc_type, "number": doc_number });
    }
    if let Some(nationality) = &guest.nationality_country_code {
        primary["nationalityCountryCode"] = json!(nationality);
    }
    if let Some(birth_date) = &guest.birth_date {
        primary["birthDate"] = json!(birth_date);
    }
    if let Some(birth_place) = &guest.birth_place {
        primary["birthPlace"] = json!(birth_place);
    }

    primary
}

/// The request body for booking creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingPayload(pub Value);

/// Assemble the booking-creation payload from the flow context.
pub fn build_booking_payload(
    criteria: &SearchCriteria,
    guest: &GuestDetails,
    room: &RoomOffer,
) -> Result<BookingPayload, CoreError> {
    let nights = criteria.nights()?;
    let offer = &room.offer_data;

    let total = offer
        .get("totalGrossAmount")
        .and_then(|t| t.get("amount"))
        .and_then(|a| a.as_f64())
        .filter(|a| *a > 0.0)
        .map(|a| {
            let currency = offer
                .get("totalGrossAmount")
                .and_then(|t| t.get("currency"))
                .and_then(|c| c.as_str())
                .unwrap_or(room.currency.as_str());
            (a, currency)
        });

    let reservation = json!({
        "arrival": criteria.check_in.format("%Y-%m-%d").to_string(),
        "departure": criteria.check_out.format("%Y-%m-%d").to_string(),
        "adults": criteria.adults,
        "guestComment": guest.guest_comment.as_deref().unwrap_or(""),
        "channelCode": determine_channel_code(&room.rate_plan_id, offer),
        "primaryGuest": build_primary_guest(guest),
        "guaranteeType": determine_guarantee_type(&room.rate_plan_id, offer),
        "travelPurpose": guest.travel_purpose.as_deref().unwrap_or("Business"),
        "timeSlices": build_time_slices(&room.rate_plan_id, &room.unit_group_id, nights, total),
    });

    Ok(BookingPayload(json!({ "reservations": [reservation] })))
}

/// Operator-facing message for a failed booking, from the backend's error
/// code or HTTP status.
pub fn booking_error_message(status: Option<u16>, code: Option<&str>, raw: &str) -> String {
    if let Some(code) = code {
        let by_code = match code {
            "ROOM_NOT_AVAILABLE" | "ROOM_UNAVAILABLE" => {
                Some("The selected room is no longer available. Please choose another room.")
            }
            "INVALID_DATE_RANGE" | "INVALID_DATES" => {
                Some("Invalid check-in or check-out date. Please select valid dates.")
            }
            "GUEST_VALIDATION_FAILED" | "INVALID_GUEST_DATA" => {
                Some("Invalid guest information. Please check all required fields.")
            }
            "RATE_PLAN_NOT_FOUND" | "INVALID_RATE_PLAN" => {
                Some("The selected rate plan is no longer available.")
            }
            "PAYMENT_REQUIRED" | "PAYMENT_FAILED" => Some(
                "Payment processing failed. Please try again or use a different payment method.",
            ),
            "PROPERTY_NOT_FOUND" => Some("Property not found. Please select a valid property."),
            _ => None,
        };
        if let Some(message) = by_code {
            return message.to_string();
        }
    }

    match status {
        Some(401) => "Authentication failed. Please try again.".to_string(),
        Some(403) => "You do not have permission to create this booking.".to_string(),
        Some(404) => "The requested resource was not found.".to_string(),
        Some(409) => "This booking conflicts with an existing reservation.".to_string(),
        Some(429) => "Too many requests. Please wait a moment and try again.".to_string(),
        Some(500) => "Server error. Please try again later.".to_string(),
        Some(502) | Some(503) => {
            "Service temporarily unavailable. Please try again later.".to_string()
        }
        _ if !raw.is_empty() => raw.to_string(),
        _ => "Failed to create booking. Please try again.".to_string(),
    }
}

/// Whether a booking failure means the room sold out underneath the guest.
pub fn is_availability_error(message: &str) -> bool {
    let lower = message.to_lowercase();
    ["fully booked", "not available", "unit group"]
        .iter()
        .any(|k| lower.contains(k))
}
