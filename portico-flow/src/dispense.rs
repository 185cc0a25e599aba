use std::time::Duration;

use portico_core::card::{CardCredentials, HardwareOutcome};
use portico_core::HardwareKind;
use portico_hardware::CardHardware;
use serde::{Deserialize, Serialize};

/// Completion warning when the kiosk's card-issuance capability is off.
pub(crate) const CARDS_DISABLED_NOTICE: &str =
    "Card issuing is disabled on this kiosk. Please collect your key card at the front desk.";

/// Stages reported to the shell while a card is physically produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DispenseStage {
    Preparing,
    Encoding,
    Sending,
    Completed,
}

/// Run the paced dispensing pipeline.
///
/// Stage delays give the shell visible progress; tests run with a zero
/// delay. A hardware failure is folded into the returned outcome, never an
/// error, so callers surface it as a completion warning. The reported
/// stage always ends at `Completed`, so the shell's progress indicator
/// settles even when the attempt failed.
pub async fn run(
    hardware: &dyn CardHardware,
    credentials: &CardCredentials,
    stage_delay: Duration,
    mut on_stage: impl FnMut(DispenseStage),
) -> HardwareOutcome {
    on_stage(DispenseStage::Preparing);
    tokio::time::sleep(stage_delay).await;

    if !credentials.has_encoder_payload() {
        on_stage(DispenseStage::Completed);
        return HardwareOutcome::failed(
            HardwareKind::Unknown,
            "card credentials carried no encoder payload",
        );
    }

    on_stage(DispenseStage::Encoding);
    tokio::time::sleep(stage_delay).await;

    let outcome = match hardware.issue_card(credentials).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::warn!(kind = ?e.kind, error = %e, "card hardware failed");
            on_stage(DispenseStage::Completed);
            return HardwareOutcome::failed(e.kind, e.message);
        }
    };

    on_stage(DispenseStage::Sending);
    tokio::time::sleep(stage_delay).await;

    on_stage(DispenseStage::Completed);
    outcome
}

/// Fetch card credentials from the PMS and run the physical pipeline.
/// `replacement` selects the lost-card issuance endpoint.
pub(crate) async fn issue_and_dispense(
    services: &crate::FlowServices,
    property: &portico_core::context::PropertyContext,
    reservation_id: &str,
    replacement: bool,
    on_stage: impl FnMut(DispenseStage),
) -> Result<(CardCredentials, HardwareOutcome), crate::FlowError> {
    let credentials = if replacement {
        services.pms.issue_lost_card(property, reservation_id).await?
    } else {
        services.pms.issue_card(property, reservation_id).await?
    };

    let outcome = run(
        services.hardware.as_ref(),
        &credentials,
        services.rules.dispense_stage_delay,
        on_stage,
    )
    .await;

    Ok((credentials, outcome))
}

#[cfg(test)]
mod tests {
    use super::*;
    use portico_hardware::MockHardware;
    use serde_json::json;

    fn credentials() -> CardCredentials {
        CardCredentials::from_response(json!({ "cardNo": "42", "cardData": "A1B2" }))
    }

    #[tokio::test]
    async fn test_stages_in_order() {
        let hardware = MockHardware::new();
        let mut stages = Vec::new();

        let outcome = run(&hardware, &credentials(), Duration::ZERO, |s| {
            stages.push(s)
        })
        .await;

        assert!(outcome.success);
        assert_eq!(
            stages,
            vec![
                DispenseStage::Preparing,
                DispenseStage::Encoding,
                DispenseStage::Sending,
                DispenseStage::Completed,
            ]
        );
    }

    #[tokio::test]
    async fn test_hardware_failure_becomes_outcome() {
        let hardware = MockHardware::failing(HardwareKind::Dispenser);
        let outcome = run(&hardware, &credentials(), Duration::ZERO, |_| {}).await;

        assert!(!outcome.success);
        assert_eq!(outcome.error_kind, Some(HardwareKind::Dispenser));
        assert!(outcome.warning().unwrap().contains("dispenser"));
    }

    #[tokio::test]
    async fn test_missing_payload_fails_without_touching_hardware() {
        let hardware = MockHardware::failing(HardwareKind::Connection);
        let creds = CardCredentials::from_response(json!({ "cardNo": "42" }));
        let outcome = run(&hardware, &creds, Duration::ZERO, |_| {}).await;

        assert!(!outcome.success);
        assert_eq!(outcome.error_kind, Some(HardwareKind::Unknown));
    }

    #[tokio::test]
    async fn test_failure_still_settles_on_a_terminal_stage() {
        let hardware = MockHardware::failing(HardwareKind::Encoder);
        let mut stages = Vec::new();
        let outcome = run(&hardware, &credentials(), Duration::ZERO, |s| {
            stages.push(s)
        })
        .await;

        assert!(!outcome.success);
        assert_eq!(stages.last(), Some(&DispenseStage::Completed));

        let mut stages = Vec::new();
        let creds = CardCredentials::from_response(json!({ "cardNo": "42" }));
        run(&hardware, &creds, Duration::ZERO, |s| stages.push(s)).await;
        assert_eq!(stages.last(), Some(&DispenseStage::Completed));
    }
}
