use portico_core::context::{Capabilities, PropertyContext};
use serde_json::Value;

use crate::client::PmsHttpClient;
use crate::error::PmsResult;

/// List an organization's properties. Public endpoint, sent without auth.
pub async fn list(http: &PmsHttpClient, organization_id: &str) -> PmsResult<Value> {
    let path = format!("/api/kiosk/v1/organizations/{organization_id}/properties");
    http.get_public(&path).await
}

/// Which flows the backend allows this kiosk to run. Missing flags default
/// to enabled.
pub async fn capabilities(
    http: &PmsHttpClient,
    ctx: &PropertyContext,
) -> PmsResult<Capabilities> {
    let data = http.get(&ctx.kiosk_path("/capabilities"), Some(ctx)).await?;

    let flag = |key: &str| data.get(key).and_then(|v| v.as_bool()).unwrap_or(true);
    Ok(Capabilities {
        check_in: flag("checkIn"),
        reservations: flag("reservations"),
        card_issuance: flag("cardIssuance"),
        lost_card: flag("lostCard"),
    })
}
