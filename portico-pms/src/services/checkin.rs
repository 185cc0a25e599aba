use portico_core::context::PropertyContext;
use serde_json::Value;

use crate::client::PmsHttpClient;
use crate::error::PmsResult;

pub async fn perform(
    http: &PmsHttpClient,
    ctx: &PropertyContext,
    reservation_id: &str,
) -> PmsResult<Value> {
    let path = ctx.kiosk_path(&format!("/reservations/{reservation_id}/checkin"));
    http.post(&path, None, Some(ctx), Some("checkin")).await
}
