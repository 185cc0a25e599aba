use axum::{
    extract::{Path, State},
    routing::post,
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use portico_core::guest::GuestDetails;
use portico_core::offer::SearchCriteria;
use portico_flow::ReservationFlow;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub adults: u32,
}

#[derive(Debug, Deserialize)]
pub struct SelectRequest {
    pub unit_group_id: String,
    pub rate_plan_id: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/flows/reservation", post(start))
        .route(
            "/api/flows/reservation/{id}",
            axum::routing::get(status).delete(abandon),
        )
        .route("/api/flows/reservation/{id}/search", post(search))
        .route("/api/flows/reservation/{id}/select", post(select))
        .route("/api/flows/reservation/{id}/guest", post(guest))
        .route("/api/flows/reservation/{id}/book", post(book))
        .route("/api/flows/reservation/{id}/pay", post(pay))
        .route("/api/flows/reservation/{id}/card", post(card))
        .route("/api/flows/reservation/{id}/finish", post(finish))
}

async fn start(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let property = state.property_context()?;
    let flow = ReservationFlow::start(property, &state.capabilities())?;
    let flow_state = flow.state;
    let session_id = state.sessions.reservation_insert(flow).await;

    tracing::info!(%session_id, "reservation flow started");
    Ok(Json(json!({ "session_id": session_id, "state": flow_state })))
}

async fn status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let session = state.sessions.reservation_get(&id).await?;
    let flow = session.lock().await;
    Ok(Json(json!({
        "session_id": flow.id,
        "state": flow.state,
        "dispense_stage": flow.dispense_stage,
        "pricing": flow.ctx.pricing,
    })))
}

async fn abandon(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    if let Some(session) = state.sessions.reservation_remove(&id).await {
        session.lock().await.fail();
    }
    Ok(Json(json!({ "abandoned": true })))
}

async fn search(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<Value>, AppError> {
    let session = state.sessions.reservation_get(&id).await?;
    let mut flow = session.lock().await;
    let offers = flow
        .search(
            &state.services,
            SearchCriteria {
                check_in: request.check_in,
                check_out: request.check_out,
                adults: request.adults,
            },
        )
        .await?;
    Ok(Json(json!({ "state": flow.state, "offers": offers })))
}

async fn select(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SelectRequest>,
) -> Result<Json<Value>, AppError> {
    let session = state.sessions.reservation_get(&id).await?;
    let mut flow = session.lock().await;
    let pricing = flow.select_room(&state.services, &request.unit_group_id, &request.rate_plan_id)?;
    Ok(Json(json!({ "state": flow.state, "pricing": pricing })))
}

async fn guest(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(details): Json<GuestDetails>,
) -> Result<Json<Value>, AppError> {
    let session = state.sessions.reservation_get(&id).await?;
    let mut flow = session.lock().await;
    flow.capture_guest(details)?;
    Ok(Json(json!({ "state": flow.state })))
}

async fn book(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let session = state.sessions.reservation_get(&id).await?;
    let mut flow = session.lock().await;
    let booking = flow.book(&state.services).await?;
    Ok(Json(json!({ "state": flow.state, "booking": booking })))
}

async fn pay(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let session = state.sessions.reservation_get(&id).await?;
    let mut flow = session.lock().await;
    let status = flow.pay(&state.services).await?;
    Ok(Json(json!({ "state": flow.state, "payment": status })))
}

async fn card(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let session = state.sessions.reservation_get(&id).await?;
    let mut flow = session.lock().await;
    let issuance = flow.issue_card(&state.services).await?;
    Ok(Json(json!({
        "state": flow.state,
        "card_no": issuance.credentials.card_no,
        "warning": issuance.hardware_warning(),
    })))
}

async fn finish(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let session = state.sessions.reservation_get(&id).await?;
    let completion = {
        let mut flow = session.lock().await;
        flow.finish()?
    };
    state.sessions.reservation_remove(&id).await;
    Ok(Json(json!({ "completion": completion })))
}
