use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::offer::{slice_gross, RoomOffer};
use crate::CoreError;
use portico_shared::money::round_cents;

/// Kiosk pricing knobs, loaded from configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Estimated tax share of the gross amount when the offer carries no
    /// net total.
    pub estimated_tax_rate: f64,
    /// Fixed per-stay fees added on the fallback path (city fee etc.).
    pub fixed_fees: f64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            estimated_tax_rate: 0.10,
            fixed_fees: 0.0,
        }
    }
}

/// Pricing breakdown shown on the booking summary screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomPricing {
    pub price_per_night: f64,
    pub nights: i64,
    pub subtotal: f64,
    pub taxes: f64,
    pub fees: f64,
    pub total: f64,
    pub currency: String,
}

pub fn calculate_nights(check_in: NaiveDate, check_out: NaiveDate) -> Result<i64, CoreError> {
    let nights = (check_out - check_in).num_days();
    if nights <= 0 {
        return Err(CoreError::DateRangeError(
            "departure must be after arrival".to_string(),
        ));
    }
    Ok(nights)
}

/// Price a stay from the offer payload.
///
/// Preferred path: gross/net totals straight from the offer, per-night
/// price averaged over time slices. Fallback path (no offer amounts):
/// per-night price times nights plus estimated taxes and fixed fees.
pub fn calculate_room_pricing(
    room: &RoomOffer,
    check_in: NaiveDate,
    check_out: NaiveDate,
    config: &PricingConfig,
) -> Result<RoomPricing, CoreError> {
    let nights = calculate_nights(check_in, check_out)?;
    let offer = &room.offer_data;

    let gross = offer
        .get("totalGrossAmount")
        .and_then(|t| t.get("amount"))
        .and_then(|a| a.as_f64());

    if let Some(gross_total) = gross {
        let net_total = offer
            .get("totalNetAmount")
            .and_then(|t| t.get("amount"))
            .and_then(|a| a.as_f64())
            .unwrap_or(0.0);

        let slices = offer
            .get("timeSlices")
            .and_then(|t| t.as_array())
            .cloned()
            .unwrap_or_default();
        let price_per_night = if slices.is_empty() {
            gross_total / nights as f64
        } else {
            slices.iter().map(slice_gross).sum::<f64>() / slices.len() as f64
        };

        let subtotal = if net_total > 0.0 {
            net_total
        } else {
            gross_total * (1.0 - config.estimated_tax_rate)
        };
        let taxes = gross_total - subtotal;

        let currency = offer
            .get("totalGrossAmount")
            .and_then(|t| t.get("currency"))
            .and_then(|c| c.as_str())
            .unwrap_or(&room.currency);

        return Ok(RoomPricing {
            price_per_night: round_cents(price_per_night),
            nights,
            subtotal: round_cents(subtotal),
            taxes: round_cents(taxes),
            fees: 0.0,
            total: round_cents(gross_total),
            currency: currency.to_string(),
        });
    }

    // No offer amounts: derive everything from the display price.
    let subtotal = room.price_per_night * nights as f64;
    let taxes = subtotal * config.estimated_tax_rate;
    let total = subtotal + taxes + config.fixed_fees;

    Ok(RoomPricing {
        price_per_night: round_cents(room.price_per_night),
        nights,
        subtotal: round_cents(subtotal),
        taxes: round_cents(taxes),
        fees: round_cents(config.fixed_fees),
        total: round_cents(total),
        currency: room.currency.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn room_without_offer_amounts(per_night: f64) -> RoomOffer {
        RoomOffer {
            unit_group_id: "UG-1".to_string(),
            rate_plan_id: "RP-1".to_string(),
            name: "Standard".to_string(),
            description: String::new(),
            max_guests: 2,
            currency: "EUR".to_string(),
            price_per_night: per_night,
            total_price: 0.0,
            available_units: 1,
            offer_data: json!({}),
        }
    }

    #[test]
    fn test_fallback_round_trip() {
        // N nights at P per night: nights == N, subtotal == P*N,
        // total == subtotal + taxes + fees.
        let config = PricingConfig {
            estimated_tax_rate: 0.10,
            fixed_fees: 5.0,
        };
        let room = room_without_offer_amounts(120.0);
        let pricing =
            calculate_room_pricing(&room, date(2026, 9, 1), date(2026, 9, 4), &config).unwrap();

        assert_eq!(pricing.nights, 3);
        assert!((pricing.subtotal - 360.0).abs() < 1e-9);
        assert!((pricing.total - (pricing.subtotal + pricing.taxes + pricing.fees)).abs() < 0.01);
    }

    #[test]
    fn test_offer_based_pricing_uses_gross_and_net() {
        let mut room = room_without_offer_amounts(0.0);
        room.offer_data = json!({
            "totalGrossAmount": { "amount": 330.0, "currency": "EUR" },
            "totalNetAmount": { "amount": 300.0 },
            "timeSlices": [
                { "totalGrossAmount": { "amount": 110.0 } },
                { "totalGrossAmount": { "amount": 110.0 } },
                { "totalGrossAmount": { "amount": 110.0 } }
            ]
        });

        let pricing = calculate_room_pricing(
            &room,
            date(2026, 9, 1),
            date(2026, 9, 4),
            &PricingConfig::default(),
        )
        .unwrap();

        assert_eq!(pricing.nights, 3);
        assert_eq!(pricing.price_per_night, 110.0);
        assert_eq!(pricing.subtotal, 300.0);
        assert_eq!(pricing.taxes, 30.0);
        assert_eq!(pricing.total, 330.0);
        assert_eq!(pricing.currency, "EUR");
    }

    #[test]
    fn test_same_day_stay_is_rejected() {
        let room = room_without_offer_amounts(100.0);
        let result = calculate_room_pricing(
            &room,
            date(2026, 9, 1),
            date(2026, 9, 1),
            &PricingConfig::default(),
        );
        assert!(result.is_err());
    }
}
