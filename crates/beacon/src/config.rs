//! Beacon configuration

use crate::BeaconError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Beacon configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BeaconConfig {
    /// Drive the beacon at all
    pub enabled: bool,
    /// Relay module host
    pub host: String,
    /// Relay module TCP port
    pub port: u16,
    /// Quiet time after the last risk signal before switching off (seconds)
    pub cooldown_secs: f64,
    /// Connect and write timeout (seconds)
    pub connect_timeout_secs: f64,
}

impl Default for BeaconConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            host: "127.0.0.1".to_string(),
            port: 2101,
            cooldown_secs: 5.0,
            connect_timeout_secs: 2.0,
        }
    }
}

impl BeaconConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_secs_f64(self.cooldown_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.connect_timeout_secs)
    }

    pub fn validate(&self) -> Result<(), BeaconError> {
        if self.host.is_empty() {
            return Err(BeaconError::Config("beacon host is empty".into()));
        }
        for (name, secs) in [
            ("cooldown_secs", self.cooldown_secs),
            ("connect_timeout_secs", self.connect_timeout_secs),
        ] {
            if !(secs.is_finite() && secs > 0.0) {
                return Err(BeaconError::Config(format!("{name} must be positive, got {secs}")));
            }
        }
        Ok(())
    }
}
