use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use crate::transport::TransportType;

/// Top-level adapter configuration.
///
/// `device` is transport-specific and handed to the
/// [`crate::TransportFactory`] untouched, the same way the lift's addressing
/// seeds are handed to the adapter.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AdapterConfig {
    #[serde(default)]
    pub transport: TransportType,
    pub device: serde_json::Value,
    #[serde(default = "default_machine")]
    pub machine: i64,
    #[serde(default = "default_exit_group")]
    pub exit_group: i64,
    #[serde(default = "default_request_id")]
    pub request_id: i64,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_command_settle_ms")]
    pub command_settle_ms: u64,
}

fn default_machine() -> i64 {
    1
}
fn default_exit_group() -> i64 {
    1
}
fn default_request_id() -> i64 {
    2000
}
fn default_poll_interval_ms() -> u64 {
    500
}
fn default_command_settle_ms() -> u64 {
    100
}

impl AdapterConfig {
    pub fn load(config_dir: &str) -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            // Base config file - required so the adapter never starts with
            // a missing device address
            .add_source(File::with_name(&format!("{}/default", config_dir)).required(true))
            // Run-mode override file, e.g. config/development.toml
            .add_source(File::with_name(&format!("{}/{}", config_dir, run_mode)).required(false))
            // Environment variables (e.g. LIFT__DEVICE__HOST=10.0.0.1)
            .add_source(Environment::with_prefix("LIFT").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
