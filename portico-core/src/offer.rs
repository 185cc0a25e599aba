use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::CoreError;

/// What the guest asked for at room search. Immutable once created;
/// re-entered only through an explicit new search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchCriteria {
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub adults: u32,
}

impl SearchCriteria {
    pub fn nights(&self) -> Result<i64, CoreError> {
        let nights = (self.check_out - self.check_in).num_days();
        if nights <= 0 {
            return Err(CoreError::DateRangeError(
                "departure must be after arrival".to_string(),
            ));
        }
        Ok(nights)
    }
}

/// A priced room + rate-plan combination from the availability search.
///
/// The raw offer JSON is carried alongside the display fields and never
/// mutated; the booking payload reads ids and amounts back out of it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomOffer {
    pub unit_group_id: String,
    pub rate_plan_id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub max_guests: u32,
    pub currency: String,
    pub price_per_night: f64,
    pub total_price: f64,
    pub available_units: u32,
    /// The untransformed offer payload, kept for pricing and booking.
    pub offer_data: serde_json::Value,
}

impl RoomOffer {
    /// Build display offers from the raw availability response.
    ///
    /// Per-night price is averaged over time slices when present, else the
    /// gross total is used as-is.
    pub fn from_availability(raw: &serde_json::Value) -> Vec<RoomOffer> {
        let offers = raw
            .get("offers")
            .and_then(|o| o.as_array())
            .cloned()
            .unwrap_or_default();

        offers
            .iter()
            .filter_map(|offer| {
                let unit_group = offer.get("unitGroup").cloned().unwrap_or_default();
                let rate_plan = offer.get("ratePlan").cloned().unwrap_or_default();
                let total = offer.get("totalGrossAmount").cloned().unwrap_or_default();

                let unit_group_id = string_or(&unit_group, &["id", "code"])?;
                let rate_plan_id = string_or(&rate_plan, &["id", "code"])?;

                let total_amount = total.get("amount").and_then(|a| a.as_f64()).unwrap_or(0.0);
                let slices = offer
                    .get("timeSlices")
                    .and_then(|t| t.as_array())
                    .cloned()
                    .unwrap_or_default();
                let price_per_night = if slices.is_empty() {
                    total_amount
                } else {
                    let sum: f64 = slices.iter().map(slice_gross).sum();
                    sum / slices.len() as f64
                };

                Some(RoomOffer {
                    unit_group_id,
                    rate_plan_id,
                    name: string_or(&unit_group, &["name", "code"])
                        .unwrap_or_else(|| "Room".to_string()),
                    description: unit_group
                        .get("description")
                        .and_then(|d| d.as_str())
                        .unwrap_or("")
                        .to_string(),
                    max_guests: unit_group
                        .get("maxPersons")
                        .and_then(|m| m.as_u64())
                        .unwrap_or(2) as u32,
                    currency: total
                        .get("currency")
                        .and_then(|c| c.as_str())
                        .unwrap_or("EUR")
                        .to_string(),
                    price_per_night: (price_per_night * 100.0).round() / 100.0,
                    total_price: total_amount,
                    available_units: offer
                        .get("availableUnits")
                        .and_then(|u| u.as_u64())
                        .unwrap_or(0) as u32,
                    offer_data: offer.clone(),
                })
            })
            .collect()
    }
}

/// Gross amount of a single time slice, whichever field the backend used.
pub(crate) fn slice_gross(slice: &serde_json::Value) -> f64 {
    slice
        .get("totalGrossAmount")
        .and_then(|t| t.get("amount"))
        .and_then(|a| a.as_f64())
        .or_else(|| {
            slice
                .get("baseAmount")
                .and_then(|b| b.get("grossAmount"))
                .and_then(|a| a.as_f64())
        })
        .unwrap_or(0.0)
}

fn string_or(value: &serde_json::Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|k| value.get(*k).and_then(|v| v.as_str()))
        .map(|s| s.to_string())
}
