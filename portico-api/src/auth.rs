use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub token: String,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/auth/token", post(set_token).delete(clear_token))
}

/// Provision the PMS bearer token: persisted for restarts and pushed into
/// the live client.
async fn set_token(
    State(state): State<AppState>,
    Json(request): Json<TokenRequest>,
) -> Result<Json<Value>, AppError> {
    state.auth_store.set(&request.token)?;
    if let Some(http) = &state.http {
        http.set_token(&request.token).await;
    }
    Ok(Json(json!({ "stored": true })))
}

async fn clear_token(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    state.auth_store.clear()?;
    if let Some(http) = &state.http {
        http.clear_token().await;
    }
    Ok(Json(json!({ "stored": false })))
}
