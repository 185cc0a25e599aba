use axum::{
    extract::{Path, State},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use portico_flow::CheckInFlow;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    pub reservation_id: String,
    pub last_name: String,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: Uuid,
    pub state: portico_flow::CheckInState,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/flows/checkin", post(start))
        .route("/api/flows/checkin/{id}", axum::routing::get(status).delete(abandon))
        .route("/api/flows/checkin/{id}/validate", post(validate))
        .route("/api/flows/checkin/{id}/payment-check", post(payment_check))
        .route("/api/flows/checkin/{id}/pay", post(pay))
        .route("/api/flows/checkin/{id}/check-in", post(check_in))
        .route("/api/flows/checkin/{id}/card", post(card))
        .route("/api/flows/checkin/{id}/finish", post(finish))
}

async fn start(State(state): State<AppState>) -> Result<Json<SessionResponse>, AppError> {
    let property = state.property_context()?;
    let flow = CheckInFlow::start(property, &state.capabilities())?;
    let flow_state = flow.state;
    let session_id = state.sessions.checkin_insert(flow).await;

    tracing::info!(%session_id, "check-in flow started");
    Ok(Json(SessionResponse {
        session_id,
        state: flow_state,
    }))
}

async fn status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let session = state.sessions.checkin_get(&id).await?;
    let flow = session.lock().await;
    Ok(Json(json!({
        "session_id": flow.id,
        "state": flow.state,
        "dispense_stage": flow.dispense_stage,
    })))
}

async fn abandon(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    if let Some(session) = state.sessions.checkin_remove(&id).await {
        session.lock().await.fail();
    }
    Ok(Json(json!({ "abandoned": true })))
}

async fn validate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ValidateRequest>,
) -> Result<Json<Value>, AppError> {
    let session = state.sessions.checkin_get(&id).await?;
    let mut flow = session.lock().await;
    let summary = flow
        .validate(&state.services, &request.reservation_id, &request.last_name)
        .await?;
    Ok(Json(json!({ "state": flow.state, "reservation": summary })))
}

async fn payment_check(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let session = state.sessions.checkin_get(&id).await?;
    let mut flow = session.lock().await;
    let status = flow.check_payment()?;
    Ok(Json(json!({ "state": flow.state, "payment": status })))
}

async fn pay(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let session = state.sessions.checkin_get(&id).await?;
    let mut flow = session.lock().await;
    let status = flow.pay_by_terminal(&state.services).await?;
    Ok(Json(json!({ "state": flow.state, "payment": status })))
}

async fn check_in(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let session = state.sessions.checkin_get(&id).await?;
    let mut flow = session.lock().await;
    let room = flow.complete_check_in(&state.services).await?;
    Ok(Json(json!({ "state": flow.state, "room_number": room })))
}

async fn card(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let session = state.sessions.checkin_get(&id).await?;
    let mut flow = session.lock().await;
    let issuance = flow.issue_card(&state.services).await?;
    // Hardware failure rides along as a warning, not an error status.
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
    let session = state.sessions.checkin_get(&id).await?;
    let completion = {
        let mut flow = session.lock().await;
        flow.finish()?
    };
    state.sessions.checkin_remove(&id).await;
    Ok(Json(json!({ "completion": completion })))
}
