pub mod checkin;
pub mod context;
pub mod dispense;
pub mod lostcard;
pub mod machine;
pub mod poll;
pub mod reservation;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use portico_core::pricing::PricingConfig;
use portico_hardware::CardHardware;
use portico_pms::{PmsApi, PmsError};

pub use checkin::CheckInFlow;
pub use lostcard::LostCardFlow;
pub use machine::{CheckInState, LostCardState, ReservationState};
pub use poll::{PollConfig, PollOutcome};
pub use reservation::ReservationFlow;

#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    #[error("Invalid state transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Step {step} is not allowed in state {state}")]
    WrongState { state: String, step: &'static str },

    /// A step was entered without the upstream data it needs; the caller
    /// is sent back to the flow entry point.
    #[error("Missing context: {0}")]
    MissingContext(&'static str),

    #[error("The {0} flow is not enabled on this kiosk")]
    CapabilityDisabled(&'static str),

    #[error("Validation failed")]
    Validation { fields: BTreeMap<String, String> },

    #[error("Payment was not completed in time")]
    PaymentTimeout,

    #[error("Payment failed: {0}")]
    PaymentFailed(String),

    #[error(transparent)]
    Pms(#[from] PmsError),

    #[error(transparent)]
    Core(#[from] portico_core::CoreError),
}

/// Everything a flow step needs to talk to the outside world. Built once
/// at the composition root.
pub struct FlowServices {
    pub pms: Arc<dyn PmsApi>,
    pub hardware: Arc<dyn CardHardware>,
    pub rules: FlowRules,
}

/// Tunable flow behavior, sourced from the application config.
#[derive(Debug, Clone)]
pub struct FlowRules {
    pub pricing: PricingConfig,
    pub payment_poll: poll::PollConfig,
    pub dispense_stage_delay: Duration,
}

impl Default for FlowRules {
    fn default() -> Self {
        Self {
            pricing: PricingConfig::default(),
            payment_poll: poll::PollConfig {
                interval: Duration::from_secs(3),
                timeout: Duration::from_secs(180),
            },
            dispense_stage_delay: Duration::from_millis(800),
        }
    }
}
