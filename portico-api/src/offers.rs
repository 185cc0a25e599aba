use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};

use portico_core::offer::SearchCriteria;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct OfferQuery {
    pub arrival: NaiveDate,
    pub departure: NaiveDate,
    pub adults: u32,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/offers", get(search))
}

/// Stateless availability search, used by the shell's browse screen
/// before any flow session exists.
async fn search(
    State(state): State<AppState>,
    Query(query): Query<OfferQuery>,
) -> Result<Json<Value>, AppError> {
    let ctx = state.property_context()?;
    let criteria = SearchCriteria {
        check_in: query.arrival,
        check_out: query.departure,
        adults: query.adults,
    };
    criteria.nights().map_err(portico_flow::FlowError::Core)?;

    let offers = state.services.pms.search_offers(&ctx, &criteria).await?;
    Ok(Json(json!({ "offers": offers })))
}
