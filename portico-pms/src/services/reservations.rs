use portico_core::context::PropertyContext;
use portico_core::reservation::ReservationSummary;

use crate::client::PmsHttpClient;
use crate::error::{PmsError, PmsResult};

pub async fn get_by_id(
    http: &PmsHttpClient,
    ctx: &PropertyContext,
    reservation_id: &str,
) -> PmsResult<ReservationSummary> {
    let path = ctx.kiosk_path(&format!("/reservations/{reservation_id}"));
    let data = http.get(&path, Some(ctx)).await?;

    ReservationSummary::from_pms(&data, &ctx.property_id)
        .ok_or_else(|| PmsError::not_found("No reservation found matching the provided details."))
}
