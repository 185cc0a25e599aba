use axum::{
    extract::{Path, State},
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use portico_flow::LostCardFlow;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    pub reservation_id: String,
    pub last_name: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/flows/lost-card", post(start))
        .route(
            "/api/flows/lost-card/{id}",
            axum::routing::get(status).delete(abandon),
        )
        .route("/api/flows/lost-card/{id}/validate", post(validate))
        .route("/api/flows/lost-card/{id}/regenerate", post(regenerate))
        .route("/api/flows/lost-card/{id}/finish", post(finish))
}

async fn start(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let property = state.property_context()?;
    let flow = LostCardFlow::start(property, &state.capabilities())?;
    let flow_state = flow.state;
    let session_id = state.sessions.lostcard_insert(flow).await;

    tracing::info!(%session_id, "lost-card flow started");
    Ok(Json(json!({ "session_id": session_id, "state": flow_state })))
}

async fn status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let session = state.sessions.lostcard_get(&id).await?;
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
    if let Some(session) = state.sessions.lostcard_remove(&id).await {
        session.lock().await.fail();
    }
    Ok(Json(json!({ "abandoned": true })))
}

async fn validate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ValidateRequest>,
) -> Result<Json<Value>, AppError> {
    let session = state.sessions.lostcard_get(&id).await?;
    let mut flow = session.lock().await;
    let summary = flow
        .validate_guest(&state.services, &request.reservation_id, &request.last_name)
        .await?;
    Ok(Json(json!({ "state": flow.state, "reservation": summary })))
}

async fn regenerate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let session = state.sessions.lostcard_get(&id).await?;
    let mut flow = session.lock().await;
    let issuance = flow.regenerate(&state.services).await?;
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
    let session = state.sessions.lostcard_get(&id).await?;
    let completion = {
        let mut flow = session.lock().await;
        flow.finish()?
    };
    state.sessions.lostcard_remove(&id).await;
    Ok(Json(json!({ "completion": completion })))
}
