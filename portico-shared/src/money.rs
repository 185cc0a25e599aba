use serde::{Deserialize, Serialize};

/// A monetary amount as the PMS reports it: a float plus an ISO currency code.
///
/// The PMS is the system of record for all amounts; we only display and
/// compare them, so float precision is acceptable here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Money {
    pub amount: f64,
    pub currency: String,
}

impl Money {
    pub fn new(amount: f64, currency: impl Into<String>) -> Self {
        Self {
            amount,
            currency: currency.into(),
        }
    }

    pub fn zero(currency: impl Into<String>) -> Self {
        Self::new(0.0, currency)
    }

    /// Round to two decimal places for display and comparisons.
    pub fn rounded(&self) -> f64 {
        (self.amount * 100.0).round() / 100.0
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero("EUR")
    }
}

/// Round a raw amount to cents.
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}
