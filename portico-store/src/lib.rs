pub mod app_config;
pub mod auth;
pub mod language;
pub mod property;

pub use app_config::Config;
pub use auth::AuthStore;
pub use language::LanguageStore;
pub use property::PropertyStore;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;
