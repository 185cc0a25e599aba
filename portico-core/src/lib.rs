pub mod booking;
pub mod card;
pub mod context;
pub mod error;
pub mod guest;
pub mod offer;
pub mod payment;
pub mod pricing;
pub mod reservation;

pub use error::{ErrorKind, HardwareKind};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    ValidationError(String),
    #[error("Invalid date range: {0}")]
    DateRangeError(String),
    #[error("Internal error: {0}")]
    InternalError(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
