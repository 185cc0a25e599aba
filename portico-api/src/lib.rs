use axum::{http::Method, routing::get, Json, Router};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod auth;
pub mod checkin;
pub mod error;
pub mod lostcard;
pub mod offers;
pub mod properties;
pub mod reports;
pub mod reservation;
pub mod state;

pub use error::AppError;
pub use state::{AppState, Sessions};

pub fn app(state: AppState) -> Router {
    // The kiosk shell runs on a different local origin
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            axum::http::header::USER_AGENT,
        ]);

    Router::new()
        .route("/health", get(health))
        .merge(auth::routes())
        .merge(properties::routes())
        .merge(offers::routes())
        .merge(checkin::routes())
        .merge(reservation::routes())
        .merge(lostcard::routes())
        .merge(reports::routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
