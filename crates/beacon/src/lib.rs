//! Warning beacon
//!
//! A background task keeps a relay-driven beacon lit while risk signals keep
//! arriving and switches it off once they stop for a cooldown period.

mod config;
mod controller;
mod link;
mod protocol;

pub use config::BeaconConfig;
pub use controller::Beacon;
pub use link::BeaconLink;
pub use protocol::Command;

use thiserror::Error;

/// Beacon error types
#[derive(Debug, Error)]
pub enum BeaconError {
    /// Relay module unreachable
    #[error("Connection to {addr} failed: {reason}")]
    Connect { addr: String, reason: String },

    /// Connect or write took too long
    #[error("Timed out after {0}ms")]
    Timeout(u64),

    /// Write to the relay module failed
    #[error("I/O error: {0}")]
    Io(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<std::io::Error> for BeaconError {
    fn from(err: std::io::Error) -> Self {
        BeaconError::Io(err.to_string())
    }
}
