use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use portico_api::{app, AppState, Sessions};
use portico_core::context::Capabilities;
use portico_flow::{FlowRules, FlowServices, PollConfig};
use portico_hardware::MockHardware;
use portico_pms::MockPms;
use portico_store::property::PropertyConfig;
use portico_store::{AuthStore, LanguageStore, PropertyStore};

fn test_state(dir: &TempDir) -> AppState {
    let rules = FlowRules {
        payment_poll: PollConfig {
            interval: Duration::from_millis(1),
            timeout: Duration::from_millis(500),
        },
        dispense_stage_delay: Duration::ZERO,
        ..FlowRules::default()
    };

    AppState {
        services: Arc::new(FlowServices {
            pms: Arc::new(MockPms::new()),
            hardware: Arc::new(MockHardware::new()),
            rules,
        }),
        property_store: Arc::new(PropertyStore::new(dir.path())),
        language_store: Arc::new(LanguageStore::new(dir.path())),
        auth_store: Arc::new(AuthStore::new(dir.path())),
        sessions: Arc::new(Sessions::default()),
        default_organization_id: "ORG-TEST".to_string(),
        http: None,
    }
}

fn configure_property(state: &AppState) {
    state
        .property_store
        .save(&PropertyConfig {
            property_id: "PROP-1".to_string(),
            organization_id: "ORG-TEST".to_string(),
            kiosk_id: Some("KIOSK-1".to_string()),
            external_property_id: None,
            capabilities: Capabilities::default(),
            selected_property: None,
        })
        .unwrap();
}

fn request(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    match body {
        Some(body) => builder.body(Body::from(body.to_string())).unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(state: &AppState, req: Request<Body>) -> (StatusCode, Value) {
    let response = app(state.clone()).oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

#[tokio::test]
async fn test_health() {
    let dir = TempDir::new().unwrap();
    let state = test_state(&dir);

    let (status, body) = send(&state, request(Method::GET, "/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_flow_start_requires_property_selection() {
    let dir = TempDir::new().unwrap();
    let state = test_state(&dir);

    let (status, body) = send(&state, request(Method::POST, "/api/flows/checkin", None)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["redirect"], "property-selection");
}

#[tokio::test]
async fn test_checkin_flow_over_http() {
    let dir = TempDir::new().unwrap();
    let state = test_state(&dir);
    configure_property(&state);

    let (status, body) = send(&state, request(Method::POST, "/api/flows/checkin", None)).await;
    assert_eq!(status, StatusCode::OK);
    let session_id = body["session_id"].as_str().unwrap().to_string();
    assert_eq!(body["state"], "STARTED");

    let (status, body) = send(
        &state,
        request(
            Method::POST,
            &format!("/api/flows/checkin/{session_id}/validate"),
            Some(json!({ "reservation_id": "R-100", "last_name": "Morgan" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reservation"]["last_name"], "Morgan");

    let (status, body) = send(
        &state,
        request(
            Method::POST,
            &format!("/api/flows/checkin/{session_id}/payment-check"),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "AWAITING_PAYMENT");

    let (status, body) = send(
        &state,
        request(
            Method::POST,
            &format!("/api/flows/checkin/{session_id}/pay"),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "PAID");

    let (status, body) = send(
        &state,
        request(
            Method::POST,
            &format!("/api/flows/checkin/{session_id}/check-in"),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["room_number"], "204");

    let (status, body) = send(
        &state,
        request(
            Method::POST,
            &format!("/api/flows/checkin/{session_id}/card"),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "CARD_ISSUED");
    assert!(body["warning"].is_null());

    let (status, body) = send(
        &state,
        request(
            Method::POST,
            &format!("/api/flows/checkin/{session_id}/finish"),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["completion"]["room_number"], "204");

    // The session is gone after completion.
    let (status, _) = send(
        &state,
        request(Method::GET, &format!("/api/flows/checkin/{session_id}"), None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_steps_out_of_order_return_conflict() {
    let dir = TempDir::new().unwrap();
    let state = test_state(&dir);
    configure_property(&state);

    let (_, body) = send(&state, request(Method::POST, "/api/flows/checkin", None)).await;
    let session_id = body["session_id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &state,
        request(
            Method::POST,
            &format!("/api/flows/checkin/{session_id}/card"),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["kind"], "invalid_state");
}

#[tokio::test]
async fn test_unknown_session_is_not_found() {
    let dir = TempDir::new().unwrap();
    let state = test_state(&dir);
    configure_property(&state);

    let (status, _) = send(
        &state,
        request(
            Method::POST,
            &format!("/api/flows/checkin/{}/validate", uuid::Uuid::new_v4()),
            Some(json!({ "reservation_id": "R-100", "last_name": "Morgan" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_lost_card_flow_over_http() {
    let dir = TempDir::new().unwrap();
    let state = test_state(&dir);
    configure_property(&state);

    let (status, body) = send(&state, request(Method::POST, "/api/flows/lost-card", None)).await;
    assert_eq!(status, StatusCode::OK);
    let session_id = body["session_id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &state,
        request(
            Method::POST,
            &format!("/api/flows/lost-card/{session_id}/validate"),
            Some(json!({ "reservation_id": "R-100", "last_name": "Morgan" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &state,
        request(
            Method::POST,
            &format!("/api/flows/lost-card/{session_id}/regenerate"),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "REGENERATED");

    let (status, _) = send(
        &state,
        request(
            Method::POST,
            &format!("/api/flows/lost-card/{session_id}/finish"),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_language_endpoints() {
    let dir = TempDir::new().unwrap();
    let state = test_state(&dir);

    let (status, body) = send(&state, request(Method::GET, "/api/language", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["language"], "en");

    let (status, body) = send(
        &state,
        request(Method::POST, "/api/language", Some(json!({ "language": "de" }))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["accepted"], true);
    assert_eq!(body["language"], "de");

    let (_, body) = send(
        &state,
        request(Method::POST, "/api/language", Some(json!({ "language": "xx" }))),
    )
    .await;
    assert_eq!(body["accepted"], false);
    assert_eq!(body["language"], "de");
}

#[tokio::test]
async fn test_capability_gating_over_http() {
    let dir = TempDir::new().unwrap();
    let state = test_state(&dir);
    state
        .property_store
        .save(&PropertyConfig {
            property_id: "PROP-1".to_string(),
            organization_id: "ORG-TEST".to_string(),
            kiosk_id: None,
            external_property_id: None,
            capabilities: Capabilities {
                lost_card: false,
                ..Capabilities::default()
            },
            selected_property: None,
        })
        .unwrap();

    let (status, _) = send(&state, request(Method::POST, "/api/flows/lost-card", None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
