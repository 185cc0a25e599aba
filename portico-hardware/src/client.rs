use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use portico_core::card::{CardCredentials, HardwareOutcome};
use portico_core::HardwareKind;
use reqwest::Client;
use serde_json::{json, Value};

use crate::error::{HardwareError, HardwareResult};

/// Trait over the card dispenser so flows can run against a fake in tests.
#[async_trait]
pub trait CardHardware: Send + Sync {
    async fn health(&self) -> HardwareResult<()>;

    /// Encode and dispense a physical card. Errors carry a structured kind;
    /// callers convert them into warnings, never aborts.
    async fn issue_card(&self, credentials: &CardCredentials) -> HardwareResult<HardwareOutcome>;
}

/// HTTP client for the card dispenser simulation service.
pub struct HardwareClient {
    client: Client,
    base_url: String,
}

impl HardwareClient {
    /// The dispenser is slow; its calls get a generous timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> HardwareResult<Self> {
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            HardwareError::new(
                HardwareKind::Unknown,
                format!("failed to build hardware client: {e}"),
            )
        })?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn map_send_error(e: reqwest::Error) -> HardwareError {
        if e.is_timeout() {
            HardwareError::new(
                HardwareKind::Timeout,
                "card dispenser did not respond in time",
            )
        } else if e.is_connect() {
            HardwareError::new(
                HardwareKind::Connection,
                "unable to connect to the card dispenser",
            )
        } else {
            HardwareError::new(HardwareKind::Unknown, e.to_string())
        }
    }
}

#[async_trait]
impl CardHardware for HardwareClient {
    async fn health(&self) -> HardwareResult<()> {
        let url = format!("{}/health", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(Self::map_send_error)?;

        if !response.status().is_success() {
            return Err(HardwareError::new(
                HardwareKind::Connection,
                format!("dispenser health check returned {}", response.status()),
            ));
        }
        Ok(())
    }

    async fn issue_card(&self, credentials: &CardCredentials) -> HardwareResult<HardwareOutcome> {
        let url = format!("{}/api/card/issue", self.base_url);
        let body = json!({
            "cardData": credentials.card_data,
            "hotelInfo": credentials.hotel_info,
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(Self::map_send_error)?;

        let status = response.status();
        let payload: Value = response.json().await.unwrap_or(Value::Null);

        let success_flag = payload.get("success").and_then(|s| s.as_bool());
        let reported_error = payload
            .get("error")
            .and_then(|e| e.as_str())
            .or_else(|| match success_flag {
                Some(false) => payload.get("message").and_then(|m| m.as_str()),
                _ => None,
            });

        if let Some(message) = reported_error {
            return Err(HardwareError::classify(message));
        }
        if !status.is_success() {
            return Err(HardwareError::classify(format!(
                "dispenser returned {status}"
            )));
        }

        tracing::info!(card_id = ?payload.get("cardId"), "card dispensed");
        Ok(HardwareOutcome::succeeded(
            payload
                .get("cardId")
                .and_then(|v| v.as_str())
                .map(|s| s.to_string()),
            payload
                .get("cardType")
                .and_then(|v| v.as_str())
                .map(|s| s.to_string()),
            Some(Utc::now().to_rfc3339()),
        ))
    }
}

/// In-process stand-in for demo kiosks with no dispenser attached.
pub struct MockHardware {
    pub fail_with: Option<HardwareKind>,
}

impl MockHardware {
    pub fn new() -> Self {
        Self { fail_with: None }
    }

    pub fn failing(kind: HardwareKind) -> Self {
        Self {
            fail_with: Some(kind),
        }
    }
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CardHardware for MockHardware {
    async fn health(&self) -> HardwareResult<()> {
        Ok(())
    }

    async fn issue_card(&self, _credentials: &CardCredentials) -> HardwareResult<HardwareOutcome> {
        if let Some(kind) = self.fail_with {
            return Err(HardwareError::new(kind, "simulated hardware failure"));
        }
        Ok(HardwareOutcome::succeeded(
            Some("MOCK-CARD-1".to_string()),
            Some("RFID".to_string()),
            Some(Utc::now().to_rfc3339()),
        ))
    }
}
