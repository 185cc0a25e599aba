use portico_core::card::CardIssuance;
use portico_core::context::{Capabilities, PropertyContext};
use portico_core::reservation::ReservationSummary;
use portico_core::ErrorKind;
use serde::Serialize;
use uuid::Uuid;

use crate::context::LostCardContext;
use crate::dispense::{issue_and_dispense, DispenseStage};
use crate::machine::LostCardState;
use crate::{FlowError, FlowServices};

/// Replacement attempts after the first failure. Not-found failures are
/// never retried; the reservation will not appear on a retry.
const MAX_REGENERATION_RETRIES: u32 = 2;

/// One guest's walk through the lost-card wizard.
pub struct LostCardFlow {
    pub id: Uuid,
    pub state: LostCardState,
    pub ctx: LostCardContext,
    pub dispense_stage: Option<DispenseStage>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LostCardCompletion {
    pub reservation: ReservationSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl LostCardFlow {
    pub fn start(
        property: PropertyContext,
        capabilities: &Capabilities,
    ) -> Result<Self, FlowError> {
        if !capabilities.lost_card {
            return Err(FlowError::CapabilityDisabled("lost-card"));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            state: LostCardState::Started,
            ctx: LostCardContext::new(property),
            dispense_stage: None,
        })
    }

    /// Look up the reservation, match the last name, and confirm it is
    /// eligible for a replacement card.
    pub async fn validate_guest(
        &mut self,
        services: &FlowServices,
        reservation_id: &str,
        last_name: &str,
    ) -> Result<ReservationSummary, FlowError> {
        self.require(LostCardState::Started, "validate_guest")?;

        let summary = services
            .pms
            .validate_reservation(&self.ctx.property, reservation_id, last_name)
            .await?;
        services
            .pms
            .validate_lost_card(&self.ctx.property, &summary.reservation_id)
            .await?;

        self.ctx.reservation = Some(summary.clone());
        self.state.advance(LostCardState::GuestValidated)?;
        Ok(summary)
    }

    /// Void the old card server-side, issue replacement credentials, and
    /// encode a new physical card.
    pub async fn regenerate(&mut self, services: &FlowServices) -> Result<CardIssuance, FlowError> {
        self.require(LostCardState::GuestValidated, "regenerate")?;

        let reservation_id = self.ctx.reservation()?.reservation_id.clone();

        let mut attempt = 0;
        let issuance = loop {
            let stage = &mut self.dispense_stage;
            match issue_and_dispense(
                services,
                &self.ctx.property,
                &reservation_id,
                true,
                |s| *stage = Some(s),
            )
            .await
            {
                Ok(result) => break result,
                Err(FlowError::Pms(e)) if e.kind == ErrorKind::NotFound => {
                    self.state.advance(LostCardState::Failed)?;
                    return Err(FlowError::Pms(e));
                }
                Err(e) if attempt < MAX_REGENERATION_RETRIES => {
                    attempt += 1;
                    tracing::warn!(flow = %self.id, attempt, error = %e, "card regeneration failed, retrying");
                }
                Err(e) => {
                    self.state.advance(LostCardState::Failed)?;
                    return Err(e);
                }
            }
        };

        let (credentials, outcome) = issuance;
        self.ctx.credentials = Some(credentials.clone());
        self.ctx.hardware = Some(outcome.clone());
        self.state.advance(LostCardState::Regenerated)?;

        Ok(CardIssuance {
            credentials,
            hardware: Some(outcome),
        })
    }

    pub fn finish(&mut self) -> Result<LostCardCompletion, FlowError> {
        self.require(LostCardState::Regenerated, "finish")?;

        let completion = LostCardCompletion {
            reservation: self.ctx.reservation()?.clone(),
            warning: self.ctx.hardware.as_ref().and_then(|h| h.warning()),
        };
        self.state.advance(LostCardState::Completed)?;
        Ok(completion)
    }

    pub fn fail(&mut self) {
        if self.state.can_transition(LostCardState::Failed) {
            let _ = self.state.advance(LostCardState::Failed);
        }
    }

    fn require(&self, expected: LostCardState, step: &'static str) -> Result<(), FlowError> {
        if self.state != expected {
            return Err(FlowError::WrongState {
                state: format!("{:?}", self.state),
                step,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FlowRules;
    use async_trait::async_trait;
    use portico_hardware::MockHardware;
    use portico_pms::{MockPms, PmsApi, PmsError, PmsResult};
    use serde_json::Value;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    /// Delegates to the mock but fails lost-card issuance a configurable
    /// number of times first.
    struct FlakyLostCard {
        inner: MockPms,
        failures: AtomicU32,
        kind: ErrorKind,
    }

    impl FlakyLostCard {
        fn new(failures: u32, kind: ErrorKind) -> Self {
            Self {
                inner: MockPms::new(),
                failures: AtomicU32::new(failures),
                kind,
            }
        }
    }

    #[async_trait]
    impl PmsApi for FlakyLostCard {
        async fn get_reservation(
            &self,
            ctx: &PropertyContext,
            id: &str,
        ) -> PmsResult<ReservationSummary> {
            self.inner.get_reservation(ctx, id).await
        }
        async fn search_offers(
            &self,
            ctx: &PropertyContext,
            criteria: &portico_core::offer::SearchCriteria,
        ) -> PmsResult<Vec<portico_core::offer::RoomOffer>> {
            self.inner.search_offers(ctx, criteria).await
        }
        async fn create_booking(&self, ctx: &PropertyContext, p: &Value) -> PmsResult<Value> {
            self.inner.create_booking(ctx, p).await
        }
        async fn perform_check_in(&self, ctx: &PropertyContext, id: &str) -> PmsResult<Value> {
            self.inner.perform_check_in(ctx, id).await
        }
        async fn process_payment(
            &self,
            ctx: &PropertyContext,
            id: &str,
            a: f64,
            c: &str,
        ) -> PmsResult<Value> {
            self.inner.process_payment(ctx, id, a, c).await
        }
        async fn payment_by_terminal(
            &self,
            ctx: &PropertyContext,
            id: &str,
            a: f64,
            c: &str,
        ) -> PmsResult<Value> {
            self.inner.payment_by_terminal(ctx, id, a, c).await
        }
        async fn payment_status(
            &self,
            ctx: &PropertyContext,
            id: &str,
        ) -> PmsResult<portico_core::payment::PaymentStatus> {
            self.inner.payment_status(ctx, id).await
        }
        async fn payment_history(&self, ctx: &PropertyContext, id: &str) -> PmsResult<Value> {
            self.inner.payment_history(ctx, id).await
        }
        async fn refund_payment(
            &self,
            ctx: &PropertyContext,
            id: &str,
            t: &str,
        ) -> PmsResult<Value> {
            self.inner.refund_payment(ctx, id, t).await
        }
        async fn issue_card(
            &self,
            ctx: &PropertyContext,
            id: &str,
        ) -> PmsResult<portico_core::card::CardCredentials> {
            self.inner.issue_card(ctx, id).await
        }
        async fn validate_lost_card(&self, ctx: &PropertyContext, id: &str) -> PmsResult<Value> {
            self.inner.validate_lost_card(ctx, id).await
        }
        async fn issue_lost_card(
            &self,
            ctx: &PropertyContext,
            id: &str,
        ) -> PmsResult<portico_core::card::CardCredentials> {
            if self.failures.load(Ordering::SeqCst) > 0 {
                self.failures.fetch_sub(1, Ordering::SeqCst);
                return Err(PmsError::new(self.kind, "lost-card issuance failed"));
            }
            self.inner.issue_lost_card(ctx, id).await
        }
        async fn list_properties(&self, org: &str) -> PmsResult<Value> {
            self.inner.list_properties(org).await
        }
        async fn capabilities(
            &self,
            ctx: &PropertyContext,
        ) -> PmsResult<portico_core::context::Capabilities> {
            self.inner.capabilities(ctx).await
        }
        async fn report_client_error(&self, ctx: &PropertyContext, r: &Value) -> PmsResult<()> {
            self.inner.report_client_error(ctx, r).await
        }
    }

    fn services_with(pms: Arc<dyn PmsApi>) -> FlowServices {
        FlowServices {
            pms,
            hardware: Arc::new(MockHardware::new()),
            rules: FlowRules {
                dispense_stage_delay: Duration::ZERO,
                ..FlowRules::default()
            },
        }
    }

    fn start_flow() -> LostCardFlow {
        LostCardFlow::start(
            PropertyContext::new("PROP1", "ORG1"),
            &Capabilities::default(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_full_walkthrough() {
        let services = services_with(Arc::new(MockPms::new()));
        let mut flow = start_flow();

        flow.validate_guest(&services, "R-100", "Morgan").await.unwrap();
        let issuance = flow.regenerate(&services).await.unwrap();
        assert!(issuance.credentials.has_encoder_payload());

        let completion = flow.finish().unwrap();
        assert!(completion.warning.is_none());
        assert_eq!(flow.state, LostCardState::Completed);
    }

    #[tokio::test]
    async fn test_regeneration_retries_transient_failures() {
        let services = services_with(Arc::new(FlakyLostCard::new(2, ErrorKind::Backend)));
        let mut flow = start_flow();

        flow.validate_guest(&services, "R-100", "Morgan").await.unwrap();
        // Two failures, then success on the third attempt.
        assert!(flow.regenerate(&services).await.is_ok());
    }

    #[tokio::test]
    async fn test_regeneration_gives_up_after_max_retries() {
        let services = services_with(Arc::new(FlakyLostCard::new(3, ErrorKind::Backend)));
        let mut flow = start_flow();

        flow.validate_guest(&services, "R-100", "Morgan").await.unwrap();
        assert!(flow.regenerate(&services).await.is_err());
        assert_eq!(flow.state, LostCardState::Failed);
    }

    #[tokio::test]
    async fn test_not_found_is_never_retried() {
        let flaky = Arc::new(FlakyLostCard::new(1, ErrorKind::NotFound));
        let services = services_with(flaky.clone());
        let mut flow = start_flow();

        flow.validate_guest(&services, "R-100", "Morgan").await.unwrap();
        assert!(flow.regenerate(&services).await.is_err());
        // The single scripted failure was consumed without a retry.
        assert_eq!(flaky.failures.load(Ordering::SeqCst), 0);
        assert_eq!(flow.state, LostCardState::Failed);
    }
}
