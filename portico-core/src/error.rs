use serde::{Deserialize, Serialize};

/// Failure classification assigned where an error is first observed.
///
/// Downstream code branches on the kind, never on message text. The one
/// place that still inspects free text is the hardware client, because the
/// dispenser simulator reports failures as strings; it classifies there and
/// attaches the resulting [`HardwareKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// No HTTP response from the server at all.
    Network,
    /// Schema-rejected input; surfaced inline, blocks submission.
    Validation,
    /// Resource does not exist (HTTP 404 or an empty lookup).
    NotFound,
    /// Property/organization context absent or rejected by the backend.
    PropertyContext,
    /// Bearer token missing or rejected (HTTP 401).
    Auth,
    /// Card dispenser/encoder failure; non-fatal to flows.
    Hardware(HardwareKind),
    /// The backend replied with an error we have no better bucket for.
    Backend,
    Unknown,
}

impl ErrorKind {
    /// Hardware failures never abort a flow; everything else does.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, ErrorKind::Hardware(_))
    }
}

/// Hardware failure categories, classified once at the hardware client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HardwareKind {
    Dispenser,
    Encoder,
    Timeout,
    Connection,
    Unknown,
}

impl HardwareKind {
    /// Operator-facing message for the completion screen's warning banner.
    pub fn user_message(&self) -> &'static str {
        match self {
            HardwareKind::Dispenser => {
                "Card dispenser error: unable to dispense the card. Please contact staff for assistance."
            }
            HardwareKind::Encoder => {
                "Card encoder error: unable to encode the card. Please contact staff for assistance."
            }
            HardwareKind::Timeout => {
                "Card processing timeout: the card dispenser did not respond in time. Please try again or contact staff."
            }
            HardwareKind::Connection => {
                "Hardware connection error: unable to connect to the card dispenser. Please contact staff."
            }
            HardwareKind::Unknown => {
                "Card data was retrieved but physical card issuance failed. Please contact staff."
            }
        }
    }
}
