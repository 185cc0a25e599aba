use portico_core::card::CardCredentials;
use portico_core::context::PropertyContext;

use crate::client::PmsHttpClient;
use crate::error::PmsResult;

/// Request logical card credentials for a reservation. The physical
/// encoding is a separate hardware step.
pub async fn issue(
    http: &PmsHttpClient,
    ctx: &PropertyContext,
    reservation_id: &str,
) -> PmsResult<CardCredentials> {
    let path = ctx.kiosk_path(&format!("/reservations/{reservation_id}/issue-card"));
    let data = http.post(&path, None, Some(ctx), Some("issue-card")).await?;
    Ok(CardCredentials::from_response(data))
}
