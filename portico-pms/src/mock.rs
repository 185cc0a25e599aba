use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use portico_core::card::CardCredentials;
use portico_core::context::{Capabilities, PropertyContext};
use portico_core::offer::{RoomOffer, SearchCriteria};
use portico_core::payment::PaymentStatus;
use portico_core::reservation::ReservationSummary;

use crate::api::PmsApi;
use crate::error::{PmsError, PmsResult};

/// Offline PMS adapter for demo kiosks and tests. Generates plausible
/// payloads, never touches the network.
pub struct MockPms {
    status_polls: AtomicU32,
}

impl MockPms {
    pub fn new() -> Self {
        Self {
            status_polls: AtomicU32::new(0),
        }
    }

    fn mock_reservation(&self, reservation_id: &str, property_id: &str) -> Value {
        json!({
            "id": reservation_id,
            "bookingId": format!("BK-{}", reservation_id.get(..8).unwrap_or(reservation_id)),
            "primaryGuest": {
                "firstName": "Alex",
                "lastName": "Morgan",
                "email": "alex.morgan@example.com",
                "phone": "+3612345678"
            },
            "arrival": Utc::now().format("%Y-%m-%d").to_string(),
            "departure": (Utc::now() + chrono::Duration::days(2)).format("%Y-%m-%d").to_string(),
            "numberOfAdults": 2,
            "totalGrossAmount": { "amount": 240.0, "currency": "EUR" },
            "balance": { "amount": 240.0 },
            "status": "Confirmed",
            "unitGroup": { "name": "Standard Double" },
            "property": { "id": property_id }
        })
    }
}

impl Default for MockPms {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PmsApi for MockPms {
    async fn get_reservation(
        &self,
        ctx: &PropertyContext,
        reservation_id: &str,
    ) -> PmsResult<ReservationSummary> {
        let raw = self.mock_reservation(reservation_id, &ctx.property_id);
        ReservationSummary::from_pms(&raw, &ctx.property_id)
            .ok_or_else(|| PmsError::not_found("No reservation found matching the provided details."))
    }

    async fn search_offers(
        &self,
        _ctx: &PropertyContext,
        criteria: &SearchCriteria,
    ) -> PmsResult<Vec<RoomOffer>> {
        let nights = criteria.nights().unwrap_or(1) as f64;
        let raw = json!({
            "offers": [
                {
                    "unitGroup": { "id": "UG-STD", "name": "Standard Double", "maxPersons": 2,
                                   "description": "Queen bed, city view" },
                    "ratePlan": { "id": "RP-FLEX", "name": "Flexible" },
                    "totalGrossAmount": { "amount": 120.0 * nights, "currency": "EUR" },
                    "totalNetAmount": { "amount": 109.0 * nights },
                    "availableUnits": 4
                },
                {
                    "unitGroup": { "id": "UG-DLX", "name": "Deluxe King", "maxPersons": 3,
                                   "description": "King bed, balcony" },
                    "ratePlan": { "id": "RP-PREPAID", "name": "Prepaid saver" },
                    "totalGrossAmount": { "amount": 165.0 * nights, "currency": "EUR" },
                    "totalNetAmount": { "amount": 150.0 * nights },
                    "availableUnits": 2
                }
            ]
        });
        Ok(RoomOffer::from_availability(&raw))
    }

    async fn create_booking(&self, _ctx: &PropertyContext, _payload: &Value) -> PmsResult<Value> {
        let id = format!("RES-{}", Uuid::new_v4());
        Ok(json!({
            "booking": { "id": format!("BK-{}", Uuid::new_v4()), "reservationIds": [{ "id": id }] }
        }))
    }

    async fn perform_check_in(
        &self,
        _ctx: &PropertyContext,
        reservation_id: &str,
    ) -> PmsResult<Value> {
        Ok(json!({
            "reservationId": reservation_id,
            "status": "InHouse",
            "assignedRoom": { "timeSlices": [{ "unit": { "name": "204" } }] }
        }))
    }

    async fn process_payment(
        &self,
        _ctx: &PropertyContext,
        _reservation_id: &str,
        amount: f64,
        currency: &str,
    ) -> PmsResult<Value> {
        Ok(json!({
            "transactionId": format!("TXN-{}", Uuid::new_v4()),
            "status": "completed",
            "amount": amount,
            "currency": currency
        }))
    }

    async fn payment_by_terminal(
        &self,
        ctx: &PropertyContext,
        reservation_id: &str,
        amount: f64,
        currency: &str,
    ) -> PmsResult<Value> {
        self.status_polls.store(0, Ordering::SeqCst);
        self.process_payment(ctx, reservation_id, amount, currency)
            .await
    }

    async fn payment_status(
        &self,
        _ctx: &PropertyContext,
        _reservation_id: &str,
    ) -> PmsResult<PaymentStatus> {
        // Settle on the second poll so the poller path gets exercised.
        let polls = self.status_polls.fetch_add(1, Ordering::SeqCst);
        let status = if polls >= 1 { "completed" } else { "pending" };
        Ok(PaymentStatus {
            status: status.to_string(),
            amount: 240.0,
            currency: "EUR".to_string(),
            balance: if polls >= 1 { 0.0 } else { 240.0 },
            transaction_id: Some(format!("TXN-{}", Uuid::new_v4())),
        })
    }

    async fn payment_history(
        &self,
        _ctx: &PropertyContext,
        reservation_id: &str,
    ) -> PmsResult<Value> {
        Ok(json!({ "reservationId": reservation_id, "payments": [] }))
    }

    async fn refund_payment(
        &self,
        _ctx: &PropertyContext,
        _reservation_id: &str,
        transaction_id: &str,
    ) -> PmsResult<Value> {
        Ok(json!({ "transactionId": transaction_id, "status": "refunded" }))
    }

    async fn issue_card(
        &self,
        _ctx: &PropertyContext,
        reservation_id: &str,
    ) -> PmsResult<CardCredentials> {
        Ok(CardCredentials::from_response(json!({
            "cardNo": format!("{}", 1000 + (Uuid::new_v4().as_u128() % 9000)),
            "cardData": format!("{:032X}", Uuid::new_v4().as_u128()),
            "hotelInfo": format!("MOCK-{reservation_id}")
        })))
    }

    async fn validate_lost_card(
        &self,
        _ctx: &PropertyContext,
        reservation_id: &str,
    ) -> PmsResult<Value> {
        Ok(json!({ "reservationId": reservation_id, "eligible": true }))
    }

    async fn issue_lost_card(
        &self,
        ctx: &PropertyContext,
        reservation_id: &str,
    ) -> PmsResult<CardCredentials> {
        self.issue_card(ctx, reservation_id).await
    }

    async fn list_properties(&self, organization_id: &str) -> PmsResult<Value> {
        Ok(json!({
            "properties": [
                { "id": "PROP-DEMO", "name": "Demo Hotel", "organizationId": organization_id }
            ]
        }))
    }

    async fn capabilities(&self, _ctx: &PropertyContext) -> PmsResult<Capabilities> {
        Ok(Capabilities::default())
    }

    async fn report_client_error(&self, _ctx: &PropertyContext, _report: &Value) -> PmsResult<()> {
        Ok(())
    }
}

/// Decorator that answers from [`MockPms`] when the wrapped client fails
/// with a network kind. Read paths only; selected at the composition root,
/// never inside service code.
pub struct MockFallback {
    primary: Arc<dyn PmsApi>,
    mock: MockPms,
}

impl MockFallback {
    pub fn new(primary: Arc<dyn PmsApi>) -> Self {
        Self {
            primary,
            mock: MockPms::new(),
        }
    }
}

macro_rules! with_fallback {
    ($self:ident, $method:ident ( $($arg:expr),* )) => {
        match $self.primary.$method($($arg),*).await {
            Err(e) if e.is_network() => {
                tracing::warn!(method = stringify!($method), "PMS unreachable, serving mock data");
                $self.mock.$method($($arg),*).await
            }
            other => other,
        }
    };
}

#[async_trait]
impl PmsApi for MockFallback {
    async fn get_reservation(
        &self,
        ctx: &PropertyContext,
        reservation_id: &str,
    ) -> PmsResult<ReservationSummary> {
        with_fallback!(self, get_reservation(ctx, reservation_id))
    }

    async fn search_offers(
        &self,
        ctx: &PropertyContext,
        criteria: &SearchCriteria,
    ) -> PmsResult<Vec<RoomOffer>> {
        with_fallback!(self, search_offers(ctx, criteria))
    }

    async fn create_booking(&self, ctx: &PropertyContext, payload: &Value) -> PmsResult<Value> {
        with_fallback!(self, create_booking(ctx, payload))
    }

    async fn perform_check_in(
        &self,
        ctx: &PropertyContext,
        reservation_id: &str,
    ) -> PmsResult<Value> {
        with_fallback!(self, perform_check_in(ctx, reservation_id))
    }

    async fn process_payment(
        &self,
        ctx: &PropertyContext,
        reservation_id: &str,
        amount: f64,
        currency: &str,
    ) -> PmsResult<Value> {
        with_fallback!(self, process_payment(ctx, reservation_id, amount, currency))
    }

    async fn payment_by_terminal(
        &self,
        ctx: &PropertyContext,
        reservation_id: &str,
        amount: f64,
        currency: &str,
    ) -> PmsResult<Value> {
        with_fallback!(self, payment_by_terminal(ctx, reservation_id, amount, currency))
    }

    async fn payment_status(
        &self,
        ctx: &PropertyContext,
        reservation_id: &str,
    ) -> PmsResult<PaymentStatus> {
        with_fallback!(self, payment_status(ctx, reservation_id))
    }

    async fn payment_history(
        &self,
        ctx: &PropertyContext,
        reservation_id: &str,
    ) -> PmsResult<Value> {
        with_fallback!(self, payment_history(ctx, reservation_id))
    }

    async fn refund_payment(
        &self,
        ctx: &PropertyContext,
        reservation_id: &str,
        transaction_id: &str,
    ) -> PmsResult<Value> {
        with_fallback!(self, refund_payment(ctx, reservation_id, transaction_id))
    }

    async fn issue_card(
        &self,
        ctx: &PropertyContext,
        reservation_id: &str,
    ) -> PmsResult<CardCredentials> {
        with_fallback!(self, issue_card(ctx, reservation_id))
    }

    async fn validate_lost_card(
        &self,
        ctx: &PropertyContext,
        reservation_id: &str,
    ) -> PmsResult<Value> {
        with_fallback!(self, validate_lost_card(ctx, reservation_id))
    }

    async fn issue_lost_card(
        &self,
        ctx: &PropertyContext,
        reservation_id: &str,
    ) -> PmsResult<CardCredentials> {
        with_fallback!(self, issue_lost_card(ctx, reservation_id))
    }

    async fn list_properties(&self, organization_id: &str) -> PmsResult<Value> {
        with_fallback!(self, list_properties(organization_id))
    }

    async fn capabilities(&self, ctx: &PropertyContext) -> PmsResult<Capabilities> {
        with_fallback!(self, capabilities(ctx))
    }

    async fn report_client_error(&self, ctx: &PropertyContext, report: &Value) -> PmsResult<()> {
        // Error reports are best-effort; nothing useful to mock.
        self.primary.report_client_error(ctx, report).await
    }
}
