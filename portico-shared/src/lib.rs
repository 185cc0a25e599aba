pub mod money;
pub mod pii;
