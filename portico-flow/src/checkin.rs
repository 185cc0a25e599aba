use portico_core::card::CardIssuance;
use portico_core::context::{Capabilities, PropertyContext};
use portico_core::payment::PaymentStatus;
use portico_core::reservation::{extract_assigned_unit, ReservationSummary};
use serde::Serialize;
use uuid::Uuid;

use crate::context::CheckInContext;
use crate::dispense::{issue_and_dispense, DispenseStage};
use crate::machine::CheckInState;
use crate::poll::settle_by_terminal;
use crate::{FlowError, FlowServices};

/// One guest's walk through the check-in wizard.
pub struct CheckInFlow {
    pub id: Uuid,
    pub state: CheckInState,
    pub ctx: CheckInContext,
    pub dispense_stage: Option<DispenseStage>,
    cards_enabled: bool,
}

/// Payload for the completion screen.
#[derive(Debug, Clone, Serialize)]
pub struct CheckInCompletion {
    pub reservation: ReservationSummary,
    pub room_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl CheckInFlow {
    pub fn start(
        property: PropertyContext,
        capabilities: &Capabilities,
    ) -> Result<Self, FlowError> {
        if !capabilities.check_in {
            return Err(FlowError::CapabilityDisabled("check-in"));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            state: CheckInState::Started,
            ctx: CheckInContext::new(property),
            dispense_stage: None,
            cards_enabled: capabilities.card_issuance,
        })
    }

    /// Look up the reservation and confirm the guest's last name.
    pub async fn validate(
        &mut self,
        services: &FlowServices,
        reservation_id: &str,
        last_name: &str,
    ) -> Result<ReservationSummary, FlowError> {
        self.require(CheckInState::Started, "validate")?;

        let summary = services
            .pms
            .validate_reservation(&self.ctx.property, reservation_id, last_name)
            .await?;

        tracing::info!(flow = %self.id, reservation_id = %summary.reservation_id, "reservation validated");
        self.ctx.reservation = Some(summary.clone());
        self.state.advance(CheckInState::Validated)?;
        Ok(summary)
    }

    /// Derive payment status from the folio balance. A settled folio skips
    /// the terminal entirely.
    pub fn check_payment(&mut self) -> Result<PaymentStatus, FlowError> {
        self.require(CheckInState::Validated, "check_payment")?;

        let reservation = self.ctx.reservation()?;
        let status = PaymentStatus::from_balance(
            reservation.balance,
            reservation.total.amount,
            &reservation.total.currency,
            None,
        );

        self.ctx.payment = Some(status.clone());
        self.state.advance(CheckInState::PaymentChecked)?;
        if status.is_completed() {
            self.state.advance(CheckInState::Paid)?;
        } else {
            self.state.advance(CheckInState::AwaitingPayment)?;
        }
        Ok(status)
    }

    /// Charge the open balance on the payment terminal and poll until the
    /// backend reports settlement.
    pub async fn pay_by_terminal(
        &mut self,
        services: &FlowServices,
    ) -> Result<PaymentStatus, FlowError> {
        self.require(CheckInState::AwaitingPayment, "pay_by_terminal")?;

        let reservation = self.ctx.reservation()?.clone();
        let result = settle_by_terminal(
            services,
            &self.ctx.property,
            &reservation.reservation_id,
            reservation.balance,
            &reservation.total.currency,
        )
        .await;

        match result {
            Ok(status) => {
                self.ctx.payment = Some(status.clone());
                self.state.advance(CheckInState::Paid)?;
                Ok(status)
            }
            Err(e) => {
                self.state.advance(CheckInState::Failed)?;
                Err(e)
            }
        }
    }

    pub async fn complete_check_in(
        &mut self,
        services: &FlowServices,
    ) -> Result<Option<String>, FlowError> {
        self.require(CheckInState::Paid, "complete_check_in")?;

        let reservation_id = self.ctx.reservation()?.reservation_id.clone();
        let response = services
            .pms
            .perform_check_in(&self.ctx.property, &reservation_id)
            .await?;

        self.ctx.assigned_room = extract_assigned_unit(&response);
        if let (Some(room), Some(reservation)) =
            (&self.ctx.assigned_room, self.ctx.reservation.as_mut())
        {
            reservation.room_number = Some(room.clone());
        }

        self.state.advance(CheckInState::CheckedIn)?;
        Ok(self.ctx.assigned_room.clone())
    }

    /// Issue logical credentials and run the dispenser. Hardware failure
    /// is folded into the issuance as a warning, never an abort. With the
    /// card-issuance capability off the step is skipped, the guest is sent
    /// to the front desk instead.
    pub async fn issue_card(&mut self, services: &FlowServices) -> Result<CardIssuance, FlowError> {
        self.require(CheckInState::CheckedIn, "issue_card")?;

        if !self.cards_enabled {
            tracing::warn!(flow = %self.id, "card issuance disabled, skipping dispense");
            let outcome = portico_core::card::HardwareOutcome::skipped(
                crate::dispense::CARDS_DISABLED_NOTICE,
            );
            self.ctx.hardware = Some(outcome.clone());
            self.state.advance(CheckInState::CardIssued)?;
            return Ok(CardIssuance {
                credentials: Default::default(),
                hardware: Some(outcome),
            });
        }

        let reservation_id = self.ctx.reservation()?.reservation_id.clone();
        let stage = &mut self.dispense_stage;
        let (credentials, outcome) = issue_and_dispense(
            services,
            &self.ctx.property,
            &reservation_id,
            false,
            |s| *stage = Some(s),
        )
        .await?;

        self.ctx.credentials = Some(credentials.clone());
        self.ctx.hardware = Some(outcome.clone());
        self.state.advance(CheckInState::CardIssued)?;

        Ok(CardIssuance {
            credentials,
            hardware: Some(outcome),
        })
    }

    pub fn finish(&mut self) -> Result<CheckInCompletion, FlowError> {
        self.require(CheckInState::CardIssued, "finish")?;

        let completion = CheckInCompletion {
            reservation: self.ctx.reservation()?.clone(),
            room_number: self.ctx.assigned_room.clone(),
            warning: self.ctx.hardware.as_ref().and_then(|h| h.warning()),
        };
        self.state.advance(CheckInState::Completed)?;
        Ok(completion)
    }

    pub fn fail(&mut self) {
        if self.state.can_transition(CheckInState::Failed) {
            let _ = self.state.advance(CheckInState::Failed);
        }
    }

    fn require(&self, expected: CheckInState, step: &'static str) -> Result<(), FlowError> {
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
    use portico_core::HardwareKind;
    use portico_hardware::MockHardware;
    use portico_pms::MockPms;
    use std::sync::Arc;
    use std::time::Duration;

    fn services() -> FlowServices {
        FlowServices {
            pms: Arc::new(MockPms::new()),
            hardware: Arc::new(MockHardware::new()),
            rules: FlowRules {
                dispense_stage_delay: Duration::ZERO,
                ..FlowRules::default()
            },
        }
    }

    fn start_flow() -> CheckInFlow {
        CheckInFlow::start(
            PropertyContext::new("PROP1", "ORG1"),
            &Capabilities::default(),
        )
        .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_walkthrough_with_open_balance() {
        let services = services();
        let mut flow = start_flow();

        // Mock reservation carries an open balance, so payment is awaited.
        flow.validate(&services, "R-100", "Morgan").await.unwrap();
        let status = flow.check_payment().unwrap();
        assert!(!status.is_completed());
        assert_eq!(flow.state, CheckInState::AwaitingPayment);

        let status = flow.pay_by_terminal(&services).await.unwrap();
        assert!(status.is_completed());
        assert_eq!(flow.state, CheckInState::Paid);

        let room = flow.complete_check_in(&services).await.unwrap();
        assert_eq!(room.as_deref(), Some("204"));

        let issuance = flow.issue_card(&services).await.unwrap();
        assert!(issuance.hardware.unwrap().success);

        let completion = flow.finish().unwrap();
        assert!(completion.warning.is_none());
        assert_eq!(completion.room_number.as_deref(), Some("204"));
        assert_eq!(flow.state, CheckInState::Completed);
    }

    #[tokio::test]
    async fn test_wrong_last_name_rejected() {
        let services = services();
        let mut flow = start_flow();

        let err = flow.validate(&services, "R-100", "Smith").await.unwrap_err();
        assert!(matches!(err, FlowError::Pms(_)));
        assert_eq!(flow.state, CheckInState::Started);
    }

    #[tokio::test]
    async fn test_steps_out_of_order_rejected() {
        let services = services();
        let mut flow = start_flow();

        assert!(matches!(
            flow.issue_card(&services).await.unwrap_err(),
            FlowError::WrongState { .. }
        ));
        assert!(matches!(
            flow.check_payment().unwrap_err(),
            FlowError::WrongState { .. }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_hardware_failure_surfaces_as_warning() {
        let services = FlowServices {
            hardware: Arc::new(MockHardware::failing(HardwareKind::Dispenser)),
            ..services()
        };
        let mut flow = start_flow();

        flow.validate(&services, "R-100", "Morgan").await.unwrap();
        flow.check_payment().unwrap();
        flow.pay_by_terminal(&services).await.unwrap();
        flow.complete_check_in(&services).await.unwrap();

        let issuance = flow.issue_card(&services).await.unwrap();
        assert!(!issuance.hardware.as_ref().unwrap().success);

        // Flow still completes; the failure is a warning.
        let completion = flow.finish().unwrap();
        assert!(completion.warning.unwrap().contains("dispenser"));
        assert_eq!(flow.state, CheckInState::Completed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disabled_card_issuance_skips_the_hardware() {
        // Failing hardware proves the dispenser is never reached.
        let services = FlowServices {
            hardware: Arc::new(MockHardware::failing(HardwareKind::Connection)),
            ..services()
        };
        let capabilities = Capabilities {
            card_issuance: false,
            ..Capabilities::default()
        };
        let mut flow =
            CheckInFlow::start(PropertyContext::new("PROP1", "ORG1"), &capabilities).unwrap();

        flow.validate(&services, "R-100", "Morgan").await.unwrap();
        flow.check_payment().unwrap();
        flow.pay_by_terminal(&services).await.unwrap();
        flow.complete_check_in(&services).await.unwrap();

        let issuance = flow.issue_card(&services).await.unwrap();
        assert!(!issuance.hardware.as_ref().unwrap().success);

        let completion = flow.finish().unwrap();
        assert!(completion.warning.unwrap().contains("front desk"));
        assert_eq!(flow.state, CheckInState::Completed);
    }

    #[test]
    fn test_capability_gating() {
        let capabilities = Capabilities {
            check_in: false,
            ..Capabilities::default()
        };
        let result = CheckInFlow::start(PropertyContext::new("PROP1", "ORG1"), &capabilities);
        assert!(matches!(result, Err(FlowError::CapabilityDisabled(_))));
    }
}
