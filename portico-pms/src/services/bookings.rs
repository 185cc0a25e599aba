use portico_core::booking::booking_error_message;
use portico_core::context::PropertyContext;
use serde_json::Value;

use crate::client::PmsHttpClient;
use crate::error::{PmsError, PmsResult};

/// Create a booking. Backend rejections are rewritten into the
/// operator-facing message table before the flow sees them.
pub async fn create(
    http: &PmsHttpClient,
    ctx: &PropertyContext,
    payload: &Value,
) -> PmsResult<Value> {
    let path = ctx.kiosk_path("/bookings");

    match http.post(&path, Some(payload), Some(ctx), Some("booking")).await {
        Ok(data) => Ok(data),
        Err(e) if e.is_network() => Err(e),
        Err(e) => {
            let message = booking_error_message(e.status, e.code.as_deref(), &e.message);
            Err(PmsError {
                message,
                ..e
            })
        }
    }
}
