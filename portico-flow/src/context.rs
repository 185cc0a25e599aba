use portico_core::card::{CardCredentials, HardwareOutcome};
use portico_core::context::PropertyContext;
use portico_core::guest::GuestDetails;
use portico_core::offer::{RoomOffer, SearchCriteria};
use portico_core::payment::PaymentStatus;
use portico_core::pricing::RoomPricing;
use portico_core::reservation::ReservationSummary;
use serde::{Deserialize, Serialize};

use crate::FlowError;

/// Context accumulated by the check-in wizard. Each accessor names the
/// step that must have run before; a miss maps to a redirect back to the
/// flow entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckInContext {
    pub property: PropertyContext,
    pub reservation: Option<ReservationSummary>,
    pub payment: Option<PaymentStatus>,
    pub credentials: Option<CardCredentials>,
    pub hardware: Option<HardwareOutcome>,
    pub assigned_room: Option<String>,
}

impl CheckInContext {
    pub fn new(property: PropertyContext) -> Self {
        Self {
            property,
            reservation: None,
            payment: None,
            credentials: None,
            hardware: None,
            assigned_room: None,
        }
    }

    pub fn reservation(&self) -> Result<&ReservationSummary, FlowError> {
        self.reservation
            .as_ref()
            .ok_or(FlowError::MissingContext("reservation"))
    }

    pub fn payment(&self) -> Result<&PaymentStatus, FlowError> {
        self.payment
            .as_ref()
            .ok_or(FlowError::MissingContext("payment status"))
    }
}

/// Context accumulated by the new-reservation wizard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationContext {
    pub property: PropertyContext,
    pub criteria: Option<SearchCriteria>,
    pub offers: Vec<RoomOffer>,
    pub selected: Option<RoomOffer>,
    pub pricing: Option<RoomPricing>,
    pub guest: Option<GuestDetails>,
    pub reservation_id: Option<String>,
    pub booking_id: Option<String>,
    /// The booking endpoint returned no extractable id; treated as
    /// pending, not failed.
    pub booking_pending: bool,
    pub payment: Option<PaymentStatus>,
    pub credentials: Option<CardCredentials>,
    pub hardware: Option<HardwareOutcome>,
}

impl ReservationContext {
    pub fn new(property: PropertyContext) -> Self {
        Self {
            property,
            criteria: None,
            offers: Vec::new(),
            selected: None,
            pricing: None,
            guest: None,
            reservation_id: None,
            booking_id: None,
            booking_pending: false,
            payment: None,
            credentials: None,
            hardware: None,
        }
    }

    pub fn criteria(&self) -> Result<&SearchCriteria, FlowError> {
        self.criteria
            .as_ref()
            .ok_or(FlowError::MissingContext("search criteria"))
    }

    pub fn selected(&self) -> Result<&RoomOffer, FlowError> {
        self.selected
            .as_ref()
            .ok_or(FlowError::MissingContext("selected room"))
    }

    pub fn guest(&self) -> Result<&GuestDetails, FlowError> {
        self.guest
            .as_ref()
            .ok_or(FlowError::MissingContext("guest details"))
    }

    pub fn reservation_id(&self) -> Result<&str, FlowError> {
        self.reservation_id
            .as_deref()
            .ok_or(FlowError::MissingContext("reservation id"))
    }
}

/// Context accumulated by the lost-card wizard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LostCardContext {
    pub property: PropertyContext,
    pub reservation: Option<ReservationSummary>,
    pub credentials: Option<CardCredentials>,
    pub hardware: Option<HardwareOutcome>,
}

impl LostCardContext {
    pub fn new(property: PropertyContext) -> Self {
        Self {
            property,
            reservation: None,
            credentials: None,
            hardware: None,
        }
    }

    pub fn reservation(&self) -> Result<&ReservationSummary, FlowError> {
        self.reservation
            .as_ref()
            .ok_or(FlowError::MissingContext("reservation"))
    }
}
