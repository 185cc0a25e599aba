use std::time::Duration;

use portico_core::context::PropertyContext;
use portico_core::ErrorKind;
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::envelope::{extract_error_code, extract_error_message, unwrap_envelope};
use crate::error::{PmsError, PmsResult};

/// HTTP client for the PMS backend.
///
/// Injects the bearer token and, on kiosk-namespace calls, the property
/// context headers plus an idempotency key on state-changing requests.
/// Never retries; every failure is normalized into a [`PmsError`] with a
/// structured kind before it leaves this module.
pub struct PmsHttpClient {
    client: Client,
    base_url: String,
    token: RwLock<Option<String>>,
    on_unauthorized: Option<Box<dyn Fn() + Send + Sync>>,
}

impl PmsHttpClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> PmsResult<Self> {
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            PmsError::new(ErrorKind::Unknown, format!("failed to build HTTP client: {e}"))
        })?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: RwLock::new(None),
            on_unauthorized: None,
        })
    }

    /// Hook run whenever a 401 clears the token, so the composition root
    /// can drop the persisted copy too.
    pub fn with_unauthorized_hook(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_unauthorized = Some(Box::new(hook));
        self
    }

    pub async fn set_token(&self, token: impl Into<String>) {
        *self.token.write().await = Some(token.into());
    }

    pub async fn clear_token(&self) {
        *self.token.write().await = None;
        if let Some(hook) = &self.on_unauthorized {
            hook();
        }
    }

    pub async fn token(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    pub async fn get(&self, path: &str, ctx: Option<&PropertyContext>) -> PmsResult<Value> {
        self.execute(Method::GET, path, None, ctx, None, true).await
    }

    /// GET without auth headers, for the public property-listing endpoints.
    pub async fn get_public(&self, path: &str) -> PmsResult<Value> {
        self.execute(Method::GET, path, None, None, None, false).await
    }

    /// POST with an operation-prefixed idempotency key when one is given.
    pub async fn post(
        &self,
        path: &str,
        body: Option<&Value>,
        ctx: Option<&PropertyContext>,
        idempotency_prefix: Option<&str>,
    ) -> PmsResult<Value> {
        self.execute(Method::POST, path, body, ctx, idempotency_prefix, true)
            .await
    }

    async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        ctx: Option<&PropertyContext>,
        idempotency_prefix: Option<&str>,
        with_auth: bool,
    ) -> PmsResult<Value> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.client.request(method.clone(), &url);

        if with_auth {
            if let Some(token) = self.token().await {
                request = request.header(reqwest::header::AUTHORIZATION, format!("Bearer {token}"));
            }
        }

        if let Some(ctx) = ctx {
            request = request
                .header("X-Property-ID", &ctx.property_id)
                .header("X-Organization-ID", &ctx.organization_id);
        }

        if let Some(prefix) = idempotency_prefix {
            request = request.header("X-Idempotency-Key", format!("{prefix}-{}", Uuid::new_v4()));
        }

        if let Some(body) = body {
            request = request.json(body);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(%method, path, error = %e, "PMS request failed without a response");
                return Err(PmsError::network());
            }
        };

        self.handle_response(response).await
    }

    async fn handle_response(&self, response: reqwest::Response) -> PmsResult<Value> {
        let status = response.status();

        if status.is_success() {
            let text = response.text().await.map_err(|_| PmsError::network())?;
            if text.is_empty() {
                return Ok(Value::Null);
            }
            let body: Value = serde_json::from_str(&text).map_err(|e| {
                PmsError::new(ErrorKind::Backend, format!("malformed response body: {e}"))
            })?;
            return unwrap_envelope(body);
        }

        let body: Value = response.json().await.unwrap_or(Value::Null);
        let message = extract_error_message(&body);
        let code = extract_error_code(&body);

        let error = match status {
            StatusCode::UNAUTHORIZED => {
                // Stale token; drop it so the next call re-authenticates.
                self.clear_token().await;
                PmsError::new(
                    ErrorKind::Auth,
                    message.unwrap_or_else(|| "Authentication failed. Please try again.".to_string()),
                )
            }
            StatusCode::BAD_REQUEST | StatusCode::FORBIDDEN => {
                let message = message.unwrap_or_else(|| "Request rejected.".to_string());
                if mentions_property_context(&message) {
                    PmsError::new(ErrorKind::PropertyContext, message)
                } else if status == StatusCode::BAD_REQUEST {
                    PmsError::new(ErrorKind::Validation, message)
                } else {
                    PmsError::new(ErrorKind::Backend, message)
                }
            }
            StatusCode::NOT_FOUND => PmsError::not_found(
                message.unwrap_or_else(|| "The requested resource was not found.".to_string()),
            ),
            _ => PmsError::new(
                ErrorKind::Backend,
                message.unwrap_or_else(|| format!("The reservation system returned {status}.")),
            ),
        };

        Err(error.with_status(status.as_u16()).with_code(code))
    }
}

/// A 400/403 whose message names the property or organization means the
/// kiosk's property context is wrong, not the guest's input.
fn mentions_property_context(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("property") || lower.contains("organization")
}
