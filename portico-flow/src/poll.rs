use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

/// Bounded polling parameters: fixed interval, hard wall-clock timeout.
#[derive(Debug, Clone, Copy)]
pub struct PollConfig {
    pub interval: Duration,
    pub timeout: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome<T> {
    Completed(T),
    /// The bound was reached with no terminal status; no further polls
    /// were issued after it.
    TimedOut,
    /// The check rejected; polling stopped immediately.
    Failed(String),
}

/// Poll `check` at a fixed interval until it yields a value, fails, or the
/// timeout elapses. The first poll happens one interval in, matching the
/// terminal's settlement latency.
pub async fn poll_until<T, E, F, Fut>(config: &PollConfig, mut check: F) -> PollOutcome<T>
where
    E: Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>, E>>,
{
    let deadline = Instant::now() + config.timeout;

    loop {
        let next_poll = Instant::now() + config.interval;
        if next_poll > deadline {
            tokio::time::sleep_until(deadline).await;
            return PollOutcome::TimedOut;
        }
        tokio::time::sleep_until(next_poll).await;

        match check().await {
            Ok(Some(value)) => return PollOutcome::Completed(value),
            Ok(None) => {}
            Err(e) => return PollOutcome::Failed(e.to_string()),
        }
    }
}

/// Kick off a terminal payment and poll its status to settlement.
///
/// Timeout and rejection both stop polling and surface as flow errors;
/// the caller marks the flow failed.
pub(crate) async fn settle_by_terminal(
    services: &crate::FlowServices,
    property: &portico_core::context::PropertyContext,
    reservation_id: &str,
    amount: f64,
    currency: &str,
) -> Result<portico_core::payment::PaymentStatus, crate::FlowError> {
    services
        .pms
        .payment_by_terminal(property, reservation_id, amount, currency)
        .await?;

    let pms = services.pms.clone();
    let outcome = poll_until(&services.rules.payment_poll, || {
        let pms = pms.clone();
        let property = property.clone();
        let reservation_id = reservation_id.to_string();
        async move {
            let status = pms.payment_status(&property, &reservation_id).await?;
            Ok::<_, portico_pms::PmsError>(status.is_completed().then_some(status))
        }
    })
    .await;

    match outcome {
        PollOutcome::Completed(status) => Ok(status),
        PollOutcome::TimedOut => Err(crate::FlowError::PaymentTimeout),
        PollOutcome::Failed(message) => Err(crate::FlowError::PaymentFailed(message)),
    }
}
