use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub pms: PmsConfig,
    pub hardware: HardwareConfig,
    pub kiosk: KioskRules,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PmsConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
    /// Serve mock data when the backend is unreachable.
    #[serde(default)]
    pub mock_fallback: bool,
    /// Run fully offline against the mock adapter.
    #[serde(default)]
    pub mock_only: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HardwareConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
    #[serde(default)]
    pub mock: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct KioskRules {
    /// Directory holding the JSON-file stores.
    pub data_dir: String,
    pub default_organization_id: String,
    pub estimated_tax_rate: f64,
    pub fixed_fees: f64,
    pub payment_poll_interval_ms: u64,
    pub payment_poll_timeout_ms: u64,
    /// Delay between card-dispensing stages, for visible progress.
    pub dispense_stage_delay_ms: u64,
    /// Flow sessions untouched this long are dropped by the sweeper.
    pub session_idle_timeout_seconds: u64,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            // Start off by merging in the "default" configuration file
            .add_source(config::File::with_name("config/default"))
            // Add in the current environment file
            // Default to 'development' env
            // Note that this file is _optional_
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add in a local configuration file
            // This file shouldn't be checked in to git
            .add_source(config::File::with_name("config/local").required(false))
            // Add in settings from the environment (with a prefix of PORTICO)
            // Eg.. `PORTICO_SERVER__PORT=8090` would set the server port
            .add_source(config::Environment::with_prefix("PORTICO").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
