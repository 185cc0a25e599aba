use portico_core::context::PropertyContext;
use portico_core::payment::PaymentStatus;
use portico_shared::money::round_cents;
use serde_json::{json, Value};

use crate::client::PmsHttpClient;
use crate::error::PmsResult;

pub async fn process(
    http: &PmsHttpClient,
    ctx: &PropertyContext,
    reservation_id: &str,
    amount: f64,
    currency: &str,
) -> PmsResult<Value> {
    let path = ctx.kiosk_path(&format!("/reservations/{reservation_id}/payments"));
    let body = json!({ "amount": round_cents(amount), "currency": currency });
    http.post(&path, Some(&body), Some(ctx), Some("payment")).await
}

/// Hand the charge to the physical payment terminal; settlement is then
/// observed through [`status`] polling.
pub async fn by_terminal(
    http: &PmsHttpClient,
    ctx: &PropertyContext,
    reservation_id: &str,
    amount: f64,
    currency: &str,
) -> PmsResult<Value> {
    let path = ctx.kiosk_path(&format!("/reservations/{reservation_id}/payments/terminal"));
    let body = json!({ "amount": round_cents(amount), "currency": currency });
    http.post(&path, Some(&body), Some(ctx), Some("terminal-payment"))
        .await
}

pub async fn status(
    http: &PmsHttpClient,
    ctx: &PropertyContext,
    reservation_id: &str,
) -> PmsResult<PaymentStatus> {
    let path = ctx.kiosk_path(&format!("/reservations/{reservation_id}/payments/status"));
    let data = http.get(&path, Some(ctx)).await?;
    Ok(parse_status(&data))
}

pub async fn history(
    http: &PmsHttpClient,
    ctx: &PropertyContext,
    reservation_id: &str,
) -> PmsResult<Value> {
    let path = ctx.kiosk_path(&format!("/reservations/{reservation_id}/payments/history"));
    http.get(&path, Some(ctx)).await
}

pub async fn refund(
    http: &PmsHttpClient,
    ctx: &PropertyContext,
    reservation_id: &str,
    transaction_id: &str,
) -> PmsResult<Value> {
    let path = ctx.kiosk_path(&format!("/reservations/{reservation_id}/payments/refund"));
    let body = json!({ "transactionId": transaction_id });
    http.post(&path, Some(&body), Some(ctx), Some("refund")).await
}

/// Tolerant parse of the status payload; missing fields degrade to a
/// pending zero-amount status rather than an error.
fn parse_status(data: &Value) -> PaymentStatus {
    PaymentStatus {
        status: data
            .get("status")
            .and_then(|s| s.as_str())
            .unwrap_or("pending")
            .to_string(),
        amount: data.get("amount").and_then(|a| a.as_f64()).unwrap_or(0.0),
        currency: data
            .get("currency")
            .and_then(|c| c.as_str())
            .unwrap_or("EUR")
            .to_string(),
        balance: data.get("balance").and_then(|b| b.as_f64()).unwrap_or(0.0),
        transaction_id: data
            .get("transactionId")
            .and_then(|t| t.as_str())
            .map(|s| s.to_string()),
    }
}
