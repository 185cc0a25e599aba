use portico_core::card::CardCredentials;
use portico_core::context::PropertyContext;
use serde_json::Value;

use crate::client::PmsHttpClient;
use crate::error::PmsResult;

/// Confirm the reservation is eligible for a replacement card.
pub async fn validate(
    http: &PmsHttpClient,
    ctx: &PropertyContext,
    reservation_id: &str,
) -> PmsResult<Value> {
    let path = ctx.kiosk_path(&format!("/reservations/{reservation_id}/validate-lost-card"));
    http.post(&path, None, Some(ctx), Some("validate-lost-card"))
        .await
}

/// Issue replacement credentials; the old card is voided server-side.
pub async fn issue(
    http: &PmsHttpClient,
    ctx: &PropertyContext,
    reservation_id: &str,
) -> PmsResult<CardCredentials> {
    let path = ctx.kiosk_path(&format!("/reservations/{reservation_id}/issue-lost-card"));
    let data = http
        .post(&path, None, Some(ctx), Some("issue-lost-card"))
        .await?;
    Ok(CardCredentials::from_response(data))
}
