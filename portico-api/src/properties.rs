use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use portico_core::context::Capabilities;
use portico_store::property::PropertyConfig;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SelectRequest {
    pub property_id: String,
    pub organization_id: String,
    pub external_property_id: Option<String>,
    pub kiosk_id: Option<String>,
    pub selected_property: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct LanguageRequest {
    pub language: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/properties", get(list))
        .route("/api/properties/select", post(select))
        .route("/api/properties/capabilities", get(capabilities))
        .route("/api/language", get(language).post(set_language))
}

async fn list(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let organization_id = state
        .property_store
        .resolve_organization(&state.default_organization_id);
    let properties = state.services.pms.list_properties(&organization_id).await?;
    Ok(Json(json!({ "organization_id": organization_id, "properties": properties })))
}

/// Persist the kiosk's property selection, then refresh its capability
/// flags from the backend. The refresh is best-effort; a stale set is
/// better than a blocked setup.
async fn select(
    State(state): State<AppState>,
    Json(request): Json<SelectRequest>,
) -> Result<Json<Value>, AppError> {
    let mut config = PropertyConfig {
        property_id: request.property_id,
        organization_id: request.organization_id,
        kiosk_id: request.kiosk_id,
        external_property_id: request.external_property_id,
        capabilities: Capabilities::default(),
        selected_property: request.selected_property,
    };
    state.property_store.save(&config)?;

    match state.services.pms.capabilities(&config.context()).await {
        Ok(caps) => {
            config.capabilities = caps;
            state.property_store.save(&config)?;
        }
        Err(e) => {
            tracing::warn!(error = %e, "capability refresh failed, keeping defaults");
        }
    }

    Ok(Json(json!({ "selected": true, "capabilities": config.capabilities })))
}

async fn capabilities(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let ctx = state.property_context()?;
    let caps = match state.services.pms.capabilities(&ctx).await {
        Ok(caps) => caps,
        Err(e) => {
            tracing::warn!(error = %e, "capability lookup failed, using stored flags");
            state.capabilities()
        }
    };
    Ok(Json(json!({ "capabilities": caps })))
}

async fn language(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "language": state.language_store.get() }))
}

async fn set_language(
    State(state): State<AppState>,
    Json(request): Json<LanguageRequest>,
) -> Result<Json<Value>, AppError> {
    let accepted = state.language_store.set(&request.language)?;
    Ok(Json(json!({
        "accepted": accepted,
        "language": state.language_store.get(),
    })))
}
