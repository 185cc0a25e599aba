pub mod client;
pub mod error;

pub use client::{CardHardware, HardwareClient, MockHardware};
pub use error::{HardwareError, HardwareResult};
