pub mod api;
pub mod client;
pub mod envelope;
pub mod error;
pub mod mock;
pub mod services;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use portico_core::card::CardCredentials;
use portico_core::context::{Capabilities, PropertyContext};
use portico_core::offer::{RoomOffer, SearchCriteria};
use portico_core::payment::PaymentStatus;
use portico_core::reservation::ReservationSummary;

pub use api::PmsApi;
pub use client::PmsHttpClient;
pub use error::{PmsError, PmsResult};
pub use mock::{MockFallback, MockPms};

/// Live PMS adapter: the trait surface backed by HTTP service calls.
pub struct PmsClient {
    http: Arc<PmsHttpClient>,
}

impl PmsClient {
    pub fn new(http: Arc<PmsHttpClient>) -> Self {
        Self { http }
    }

    pub fn http(&self) -> &Arc<PmsHttpClient> {
        &self.http
    }
}

#[async_trait]
impl PmsApi for PmsClient {
    async fn get_reservation(
        &self,
        ctx: &PropertyContext,
        reservation_id: &str,
    ) -> PmsResult<ReservationSummary> {
        services::reservations::get_by_id(&self.http, ctx, reservation_id).await
    }

    async fn search_offers(
        &self,
        ctx: &PropertyContext,
        criteria: &SearchCriteria,
    ) -> PmsResult<Vec<RoomOffer>> {
        services::offers::search(&self.http, ctx, criteria).await
    }

    async fn create_booking(&self, ctx: &PropertyContext, payload: &Value) -> PmsResult<Value> {
        services::bookings::create(&self.http, ctx, payload).await
    }

    async fn perform_check_in(
        &self,
        ctx: &PropertyContext,
        reservation_id: &str,
    ) -> PmsResult<Value> {
        services::checkin::perform(&self.http, ctx, reservation_id).await
    }

    async fn process_payment(
        &self,
        ctx: &PropertyContext,
        reservation_id: &str,
        amount: f64,
        currency: &str,
    ) -> PmsResult<Value> {
        services::payments::process(&self.http, ctx, reservation_id, amount, currency).await
    }

    async fn payment_by_terminal(
        &self,
        ctx: &PropertyContext,
        reservation_id: &str,
        amount: f64,
        currency: &str,
    ) -> PmsResult<Value> {
        services::payments::by_terminal(&self.http, ctx, reservation_id, amount, currency).await
    }

    async fn payment_status(
        &self,
        ctx: &PropertyContext,
        reservation_id: &str,
    ) -> PmsResult<PaymentStatus> {
        services::payments::status(&self.http, ctx, reservation_id).await
    }

    async fn payment_history(
        &self,
        ctx: &PropertyContext,
        reservation_id: &str,
    ) -> PmsResult<Value> {
        services::payments::history(&self.http, ctx, reservation_id).await
    }

    async fn refund_payment(
        &self,
        ctx: &PropertyContext,
        reservation_id: &str,
        transaction_id: &str,
    ) -> PmsResult<Value> {
        services::payments::refund(&self.http, ctx, reservation_id, transaction_id).await
    }

    async fn issue_card(
        &self,
        ctx: &PropertyContext,
        reservation_id: &str,
    ) -> PmsResult<CardCredentials> {
        services::cards::issue(&self.http, ctx, reservation_id).await
    }

    async fn validate_lost_card(
        &self,
        ctx: &PropertyContext,
        reservation_id: &str,
    ) -> PmsResult<Value> {
        services::lostcard::validate(&self.http, ctx, reservation_id).await
    }

    async fn issue_lost_card(
        &self,
        ctx: &PropertyContext,
        reservation_id: &str,
    ) -> PmsResult<CardCredentials> {
        services::lostcard::issue(&self.http, ctx, reservation_id).await
    }

    async fn list_properties(&self, organization_id: &str) -> PmsResult<Value> {
        services::properties::list(&self.http, organization_id).await
    }

    async fn capabilities(&self, ctx: &PropertyContext) -> PmsResult<Capabilities> {
        services::properties::capabilities(&self.http, ctx).await
    }

    async fn report_client_error(&self, ctx: &PropertyContext, report: &Value) -> PmsResult<()> {
        services::reports::send(&self.http, ctx, report).await
    }
}
