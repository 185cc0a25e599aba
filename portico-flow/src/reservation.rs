use portico_core::booking::build_booking_payload;
use portico_core::card::CardIssuance;
use portico_core::context::{Capabilities, PropertyContext};
use portico_core::offer::{RoomOffer, SearchCriteria};
use portico_core::payment::PaymentStatus;
use portico_core::pricing::{calculate_room_pricing, RoomPricing};
use portico_core::reservation::{extract_booking_id, extract_reservation_id};
use portico_pms::PmsError;
use portico_shared::pii::mask_email;
use serde::Serialize;
use uuid::Uuid;

use crate::context::ReservationContext;
use crate::dispense::{issue_and_dispense, DispenseStage};
use crate::machine::ReservationState;
use crate::poll::settle_by_terminal;
use crate::{FlowError, FlowServices};

/// One guest's walk through the new-reservation wizard.
pub struct ReservationFlow {
    pub id: Uuid,
    pub state: ReservationState,
    pub ctx: ReservationContext,
    pub dispense_stage: Option<DispenseStage>,
    cards_enabled: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct BookingResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reservation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking_id: Option<String>,
    /// No id could be extracted; the booking may still materialize
    /// backend-side.
    pub pending: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReservationCompletion {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reservation_id: Option<String>,
    pub pricing: Option<RoomPricing>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl ReservationFlow {
    pub fn start(
        property: PropertyContext,
        capabilities: &Capabilities,
    ) -> Result<Self, FlowError> {
        if !capabilities.reservations {
            return Err(FlowError::CapabilityDisabled("reservation"));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            state: ReservationState::Searching,
            ctx: ReservationContext::new(property),
            dispense_stage: None,
            cards_enabled: capabilities.card_issuance,
        })
    }

    /// Search availability. Repeat searches are allowed until a room is
    /// selected; each replaces the offer list.
    pub async fn search(
        &mut self,
        services: &FlowServices,
        criteria: SearchCriteria,
    ) -> Result<Vec<RoomOffer>, FlowError> {
        self.require(ReservationState::Searching, "search")?;
        criteria.nights()?;

        let offers = services
            .pms
            .search_offers(&self.ctx.property, &criteria)
            .await?;

        tracing::info!(flow = %self.id, offers = offers.len(), "availability search");
        self.ctx.criteria = Some(criteria);
        self.ctx.offers = offers.clone();
        Ok(offers)
    }

    /// Pin one of the searched offers and price the stay.
    pub fn select_room(
        &mut self,
        services: &FlowServices,
        unit_group_id: &str,
        rate_plan_id: &str,
    ) -> Result<RoomPricing, FlowError> {
        self.require(ReservationState::Searching, "select_room")?;
        let criteria = self.ctx.criteria()?.clone();

        let room = self
            .ctx
            .offers
            .iter()
            .find(|o| o.unit_group_id == unit_group_id && o.rate_plan_id == rate_plan_id)
            .cloned()
            .ok_or_else(|| {
                FlowError::Pms(PmsError::not_found(
                    "The selected room is no longer in the offer list.",
                ))
            })?;

        let pricing = calculate_room_pricing(
            &room,
            criteria.check_in,
            criteria.check_out,
            &services.rules.pricing,
        )?;

        self.ctx.selected = Some(room);
        self.ctx.pricing = Some(pricing.clone());
        self.state.advance(ReservationState::RoomSelected)?;
        Ok(pricing)
    }

    /// Validate and lock in the guest's details.
    pub fn capture_guest(
        &mut self,
        guest: portico_core::guest::GuestDetails,
    ) -> Result<(), FlowError> {
        self.require(ReservationState::RoomSelected, "capture_guest")?;

        let fields = guest.validation_errors();
        if !fields.is_empty() {
            return Err(FlowError::Validation { fields });
        }

        tracing::info!(flow = %self.id, guest = %mask_email(&guest.email), "guest details captured");
        self.ctx.guest = Some(guest);
        self.state.advance(ReservationState::GuestCaptured)?;
        Ok(())
    }

    pub async fn book(&mut self, services: &FlowServices) -> Result<BookingResult, FlowError> {
        self.require(ReservationState::GuestCaptured, "book")?;

        let payload =
            build_booking_payload(self.ctx.criteria()?, self.ctx.guest()?, self.ctx.selected()?)?;
        let response = services
            .pms
            .create_booking(&self.ctx.property, &payload.0)
            .await?;

        match extract_reservation_id(&response) {
            Some(id) => {
                tracing::info!(flow = %self.id, reservation_id = %id, "booking created");
                self.ctx.reservation_id = Some(id);
                self.ctx.booking_id = extract_booking_id(&response);
            }
            None => {
                tracing::warn!(flow = %self.id, "booking accepted without an extractable id, treating as pending");
                self.ctx.booking_pending = true;
            }
        }

        self.state.advance(ReservationState::Booked)?;
        Ok(BookingResult {
            reservation_id: self.ctx.reservation_id.clone(),
            booking_id: self.ctx.booking_id.clone(),
            pending: self.ctx.booking_pending,
        })
    }

    /// Charge the booked total on the payment terminal. A pending booking
    /// has no reservation id to charge against.
    pub async fn pay(&mut self, services: &FlowServices) -> Result<PaymentStatus, FlowError> {
        self.require(ReservationState::Booked, "pay")?;

        let reservation_id = self.ctx.reservation_id()?.to_string();
        let pricing = self
            .ctx
            .pricing
            .clone()
            .ok_or(FlowError::MissingContext("pricing"))?;

        let result = settle_by_terminal(
            services,
            &self.ctx.property,
            &reservation_id,
            pricing.total,
            &pricing.currency,
        )
        .await;

        match result {
            Ok(status) => {
                self.ctx.payment = Some(status.clone());
                self.state.advance(ReservationState::Paid)?;
                Ok(status)
            }
            Err(e) => {
                self.state.advance(ReservationState::Failed)?;
                Err(e)
            }
        }
    }

    pub async fn issue_card(&mut self, services: &FlowServices) -> Result<CardIssuance, FlowError> {
        self.require(ReservationState::Paid, "issue_card")?;

        if !self.cards_enabled {
            tracing::warn!(flow = %self.id, "card issuance disabled, skipping dispense");
            let outcome = portico_core::card::HardwareOutcome::skipped(
                crate::dispense::CARDS_DISABLED_NOTICE,
            );
            self.ctx.hardware = Some(outcome.clone());
            self.state.advance(ReservationState::CardIssued)?;
            return Ok(CardIssuance {
                credentials: Default::default(),
                hardware: Some(outcome),
            });
        }

        let reservation_id = self.ctx.reservation_id()?.to_string();
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
        self.state.advance(ReservationState::CardIssued)?;

        Ok(CardIssuance {
            credentials,
            hardware: Some(outcome),
        })
    }

    pub fn finish(&mut self) -> Result<ReservationCompletion, FlowError> {
        self.require(ReservationState::CardIssued, "finish")?;

        let completion = ReservationCompletion {
            reservation_id: self.ctx.reservation_id.clone(),
            pricing: self.ctx.pricing.clone(),
            warning: self.ctx.hardware.as_ref().and_then(|h| h.warning()),
        };
        self.state.advance(ReservationState::Completed)?;
        Ok(completion)
    }

    pub fn fail(&mut self) {
        if self.state.can_transition(ReservationState::Failed) {
            let _ = self.state.advance(ReservationState::Failed);
        }
    }

    fn require(&self, expected: ReservationState, step: &'static str) -> Result<(), FlowError> {
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
    use chrono::NaiveDate;
    use portico_core::guest::GuestDetails;
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

    fn criteria() -> SearchCriteria {
        SearchCriteria {
            check_in: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
            check_out: NaiveDate::from_ymd_opt(2026, 9, 4).unwrap(),
            adults: 2,
        }
    }

    fn guest() -> GuestDetails {
        GuestDetails {
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            email: "jane@example.com".to_string(),
            phone: "+4420794600000".to_string(),
            country: "GB".to_string(),
            address_street: "1 High Street".to_string(),
            address_city: "London".to_string(),
            address_postal: "SW1A 1AA".to_string(),
            ..Default::default()
        }
    }

    fn start_flow() -> ReservationFlow {
        ReservationFlow::start(
            PropertyContext::new("PROP1", "ORG1"),
            &Capabilities::default(),
        )
        .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_walkthrough() {
        let services = services();
        let mut flow = start_flow();

        let offers = flow.search(&services, criteria()).await.unwrap();
        assert!(!offers.is_empty());

        let first = offers[0].clone();
        let pricing = flow
            .select_room(&services, &first.unit_group_id, &first.rate_plan_id)
            .unwrap();
        assert_eq!(pricing.nights, 3);

        flow.capture_guest(guest()).unwrap();

        let booking = flow.book(&services).await.unwrap();
        assert!(!booking.pending);
        assert!(booking.reservation_id.is_some());

        let status = flow.pay(&services).await.unwrap();
        assert!(status.is_completed());

        flow.issue_card(&services).await.unwrap();
        let completion = flow.finish().unwrap();
        assert!(completion.warning.is_none());
        assert_eq!(flow.state, ReservationState::Completed);
    }

    #[tokio::test]
    async fn test_invalid_guest_details_keep_state() {
        let services = services();
        let mut flow = start_flow();

        flow.search(&services, criteria()).await.unwrap();
        let first = flow.ctx.offers[0].clone();
        flow.select_room(&services, &first.unit_group_id, &first.rate_plan_id)
            .unwrap();

        let mut bad_guest = guest();
        bad_guest.email = String::new();
        let err = flow.capture_guest(bad_guest).unwrap_err();
        match err {
            FlowError::Validation { fields } => assert!(fields.contains_key("email")),
            other => panic!("expected validation error, got {other:?}"),
        }
        assert_eq!(flow.state, ReservationState::RoomSelected);
    }

    #[tokio::test]
    async fn test_repeat_search_allowed_until_selection() {
        let services = services();
        let mut flow = start_flow();

        flow.search(&services, criteria()).await.unwrap();
        flow.search(&services, criteria()).await.unwrap();

        let first = flow.ctx.offers[0].clone();
        flow.select_room(&services, &first.unit_group_id, &first.rate_plan_id)
            .unwrap();
        assert!(matches!(
            flow.search(&services, criteria()).await.unwrap_err(),
            FlowError::WrongState { .. }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_disabled_card_issuance_completes_with_notice() {
        let services = services();
        let capabilities = Capabilities {
            card_issuance: false,
            ..Capabilities::default()
        };
        let mut flow = ReservationFlow::start(
            PropertyContext::new("PROP1", "ORG1"),
            &capabilities,
        )
        .unwrap();

        flow.search(&services, criteria()).await.unwrap();
        let first = flow.ctx.offers[0].clone();
        flow.select_room(&services, &first.unit_group_id, &first.rate_plan_id)
            .unwrap();
        flow.capture_guest(guest()).unwrap();
        flow.book(&services).await.unwrap();
        flow.pay(&services).await.unwrap();

        let issuance = flow.issue_card(&services).await.unwrap();
        assert!(!issuance.hardware.as_ref().unwrap().success);
        assert!(issuance.credentials.card_data.is_none());

        let completion = flow.finish().unwrap();
        assert!(completion.warning.unwrap().contains("front desk"));
        assert_eq!(flow.state, ReservationState::Completed);
    }

    #[tokio::test]
    async fn test_unknown_room_selection_rejected() {
        let services = services();
        let mut flow = start_flow();

        flow.search(&services, criteria()).await.unwrap();
        assert!(flow.select_room(&services, "UG-NOPE", "RP-NOPE").is_err());
        assert_eq!(flow.state, ReservationState::Searching);
    }
}
