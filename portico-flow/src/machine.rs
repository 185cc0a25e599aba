use serde::{Deserialize, Serialize};

use crate::FlowError;

macro_rules! impl_transitions {
    ($state:ident, failed = $failed:ident, terminal = $terminal:ident) => {
        impl $state {
            /// Apply a transition, rejecting anything not in the table.
            pub fn advance(&mut self, next: $state) -> Result<(), FlowError> {
                if !self.can_transition(next) {
                    return Err(FlowError::InvalidTransition {
                        from: format!("{:?}", self),
                        to: format!("{:?}", next),
                    });
                }
                *self = next;
                Ok(())
            }

            pub fn can_transition(&self, next: $state) -> bool {
                if next == $state::$failed {
                    return *self != $state::$terminal;
                }
                self.allowed_next().contains(&next)
            }

            pub fn is_terminal(&self) -> bool {
                matches!(self, $state::$terminal | $state::$failed)
            }
        }
    };
}

/// Check-in wizard states. Payment forks on the folio balance: an already
/// settled reservation skips the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckInState {
    Started,
    Validated,
    PaymentChecked,
    AwaitingPayment,
    Paid,
    CheckedIn,
    CardIssued,
    Completed,
    Failed,
}

impl CheckInState {
    fn allowed_next(&self) -> &'static [CheckInState] {
        use CheckInState::*;
        match self {
            Started => &[Validated],
            Validated => &[PaymentChecked],
            PaymentChecked => &[AwaitingPayment, Paid],
            AwaitingPayment => &[Paid],
            Paid => &[CheckedIn],
            CheckedIn => &[CardIssued],
            CardIssued => &[Completed],
            Completed | Failed => &[],
        }
    }
}

impl_transitions!(CheckInState, failed = Failed, terminal = Completed);

/// New-reservation wizard states. Re-searching stays in `Searching`; a new
/// search is a new session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationState {
    Searching,
    RoomSelected,
    GuestCaptured,
    Booked,
    Paid,
    CardIssued,
    Completed,
    Failed,
}

impl ReservationState {
    fn allowed_next(&self) -> &'static [ReservationState] {
        use ReservationState::*;
        match self {
            Searching => &[RoomSelected],
            RoomSelected => &[GuestCaptured],
            GuestCaptured => &[Booked],
            Booked => &[Paid],
            Paid => &[CardIssued],
            CardIssued => &[Completed],
            Completed | Failed => &[],
        }
    }
}

impl_transitions!(ReservationState, failed = Failed, terminal = Completed);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LostCardState {
    Started,
    GuestValidated,
    Regenerated,
    Completed,
    Failed,
}

impl LostCardState {
    fn allowed_next(&self) -> &'static [LostCardState] {
        use LostCardState::*;
        match self {
            Started => &[GuestValidated],
            GuestValidated => &[Regenerated],
            Regenerated => &[Completed],
            Completed | Failed => &[],
        }
    }
}

impl_transitions!(LostCardState, failed = Failed, terminal = Completed);
