use portico_core::context::PropertyContext;
use portico_core::offer::{RoomOffer, SearchCriteria};

use crate::client::PmsHttpClient;
use crate::error::PmsResult;

/// Search availability and transform the raw offers.
///
/// The availability backend addresses the property by its external id when
/// the kiosk has one configured.
pub async fn search(
    http: &PmsHttpClient,
    ctx: &PropertyContext,
    criteria: &SearchCriteria,
) -> PmsResult<Vec<RoomOffer>> {
    let property_ref = ctx
        .external_property_id
        .as_deref()
        .unwrap_or(&ctx.property_id);

    let path = format!(
        "{}?arrival={}&departure={}&adults={}&propertyId={}",
        ctx.kiosk_path("/offers"),
        criteria.check_in.format("%Y-%m-%d"),
        criteria.check_out.format("%Y-%m-%d"),
        criteria.adults,
        property_ref,
    );

    let data = http.get(&path, Some(ctx)).await?;
    Ok(RoomOffer::from_availability(&data))
}
