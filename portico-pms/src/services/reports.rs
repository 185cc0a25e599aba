use portico_core::context::PropertyContext;
use serde_json::Value;

use crate::client::PmsHttpClient;
use crate::error::PmsResult;

/// Forward a UI error-page event to the backend for operator visibility.
/// Callers treat this as fire-and-forget.
pub async fn send(
    http: &PmsHttpClient,
    ctx: &PropertyContext,
    report: &Value,
) -> PmsResult<()> {
    let path = ctx.kiosk_path("/errors/report");
    http.post(&path, Some(report), Some(ctx), None).await?;
    Ok(())
}
