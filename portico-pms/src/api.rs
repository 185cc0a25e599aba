use async_trait::async_trait;
use serde_json::Value;

use portico_core::card::CardCredentials;
use portico_core::context::{Capabilities, PropertyContext};
use portico_core::guest::last_name_matches;
use portico_core::offer::{RoomOffer, SearchCriteria};
use portico_core::payment::PaymentStatus;
use portico_core::reservation::ReservationSummary;

use crate::error::{PmsError, PmsResult};

/// The PMS operations the flows depend on.
///
/// Implemented by the live HTTP client and by the mock adapter; the
/// composition root decides which one the flows get.
#[async_trait]
pub trait PmsApi: Send + Sync {
    async fn get_reservation(
        &self,
        ctx: &PropertyContext,
        reservation_id: &str,
    ) -> PmsResult<ReservationSummary>;

    async fn search_offers(
        &self,
        ctx: &PropertyContext,
        criteria: &SearchCriteria,
    ) -> PmsResult<Vec<RoomOffer>>;

    async fn create_booking(&self, ctx: &PropertyContext, payload: &Value) -> PmsResult<Value>;

    async fn perform_check_in(&self, ctx: &PropertyContext, reservation_id: &str)
        -> PmsResult<Value>;

    async fn process_payment(
        &self,
        ctx: &PropertyContext,
        reservation_id: &str,
        amount: f64,
        currency: &str,
    ) -> PmsResult<Value>;

    async fn payment_by_terminal(
        &self,
        ctx: &PropertyContext,
        reservation_id: &str,
        amount: f64,
        currency: &str,
    ) -> PmsResult<Value>;

    async fn payment_status(
        &self,
        ctx: &PropertyContext,
        reservation_id: &str,
    ) -> PmsResult<PaymentStatus>;

    async fn payment_history(
        &self,
        ctx: &PropertyContext,
        reservation_id: &str,
    ) -> PmsResult<Value>;

    async fn refund_payment(
        &self,
        ctx: &PropertyContext,
        reservation_id: &str,
        transaction_id: &str,
    ) -> PmsResult<Value>;

    async fn issue_card(
        &self,
        ctx: &PropertyContext,
        reservation_id: &str,
    ) -> PmsResult<CardCredentials>;

    async fn validate_lost_card(
        &self,
        ctx: &PropertyContext,
        reservation_id: &str,
    ) -> PmsResult<Value>;

    async fn issue_lost_card(
        &self,
        ctx: &PropertyContext,
        reservation_id: &str,
    ) -> PmsResult<CardCredentials>;

    async fn list_properties(&self, organization_id: &str) -> PmsResult<Value>;

    async fn capabilities(&self, ctx: &PropertyContext) -> PmsResult<Capabilities>;

    /// Fire-and-forget error report from the UI shell.
    async fn report_client_error(&self, ctx: &PropertyContext, report: &Value) -> PmsResult<()>;

    /// Look up a reservation and check the guest's last name against it.
    ///
    /// Shared by check-in and lost-card validation; a mismatch is reported
    /// as not-found so the kiosk never confirms which part was wrong.
    async fn validate_reservation(
        &self,
        ctx: &PropertyContext,
        reservation_id: &str,
        last_name: &str,
    ) -> PmsResult<ReservationSummary> {
        let summary = self.get_reservation(ctx, reservation_id).await?;
        if !last_name_matches(last_name, Some(&summary.last_name)) {
            return Err(PmsError::not_found(
                "No reservation found matching the provided details.",
            ));
        }
        Ok(summary)
    }
}
