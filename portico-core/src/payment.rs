use serde::{Deserialize, Serialize};

use portico_shared::money::round_cents;

/// Payment state as the PMS reports it. Derived fresh on every payment
/// step from the reservation balance or the status endpoint, never cached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentStatus {
    pub status: String,
    pub amount: f64,
    pub currency: String,
    pub balance: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
}

impl PaymentStatus {
    /// Only `completed` and `paid` count as settled; every other string
    /// (including absent) does not.
    pub fn is_completed(&self) -> bool {
        is_payment_completed(Some(&self.status))
    }

    /// Derive status from a reservation summary: a non-positive balance
    /// means the folio is settled.
    pub fn from_balance(
        balance: f64,
        total: f64,
        currency: &str,
        transaction_id: Option<String>,
    ) -> Self {
        let status = if balance <= 0.0 { "paid" } else { "pending" };
        Self {
            status: status.to_string(),
            amount: round_cents(if total > 0.0 { total } else { balance.abs() }),
            currency: currency.to_string(),
            balance: round_cents(balance),
            transaction_id,
        }
    }
}

pub fn is_payment_completed(status: Option<&str>) -> bool {
    matches!(status, Some("completed") | Some("paid"))
}
