use portico_core::ErrorKind;
use thiserror::Error;

/// Error from a PMS call, normalized at the client before any service or
/// flow code sees it.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct PmsError {
    pub kind: ErrorKind,
    pub message: String,
    /// HTTP status of the failed response, when one arrived.
    pub status: Option<u16>,
    /// Backend error code from the response body, when present.
    pub code: Option<String>,
}

impl PmsError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
            code: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_code(mut self, code: Option<String>) -> Self {
        self.code = code;
        self
    }

    pub fn network() -> Self {
        Self::new(
            ErrorKind::Network,
            "Unable to reach the reservation system. Please check the connection and try again.",
        )
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn is_network(&self) -> bool {
        self.kind == ErrorKind::Network
    }
}

pub type PmsResult<T> = Result<T, PmsError>;
