use axum::{extract::State, routing::post, Json, Router};
use serde_json::{json, Value};

use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/reports/error", post(report))
}

/// Forward a UI error-page event to the PMS. Best-effort by contract:
/// reporting failures are logged and swallowed, the shell always gets an
/// acknowledgement.
async fn report(State(state): State<AppState>, Json(event): Json<Value>) -> Json<Value> {
    let Ok(ctx) = state.property_context() else {
        tracing::debug!("error report dropped, no property context");
        return Json(json!({ "forwarded": false }));
    };

    match state.services.pms.report_client_error(&ctx, &event).await {
        Ok(()) => Json(json!({ "forwarded": true })),
        Err(e) => {
            tracing::warn!(error = %e, "error report forwarding failed");
            Json(json!({ "forwarded": false }))
        }
    }
}
