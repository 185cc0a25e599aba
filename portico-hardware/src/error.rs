use portico_core::HardwareKind;
use thiserror::Error;

/// Failure talking to the card dispenser service, classified at origin.
///
/// The simulator reports failures as free text, so this is the one place
/// that sniffs message strings; everything downstream branches on the kind.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct HardwareError {
    pub kind: HardwareKind,
    pub message: String,
}

impl HardwareError {
    pub fn new(kind: HardwareKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Classify a simulator error string into a structured kind.
    pub fn classify(message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_lowercase();

        let kind = if lower.contains("dispens") {
            HardwareKind::Dispenser
        } else if lower.contains("encod") {
            HardwareKind::Encoder
        } else if lower.contains("timeout") || lower.contains("timed out") {
            HardwareKind::Timeout
        } else if lower.contains("connect") || lower.contains("refused") {
            HardwareKind::Connection
        } else {
            HardwareKind::Unknown
        };

        Self { kind, message }
    }

    pub fn user_message(&self) -> &'static str {
        self.kind.user_message()
    }
}

pub type HardwareResult<T> = Result<T, HardwareError>;
