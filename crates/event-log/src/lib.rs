//! Risk event log
//!
//! Appends one JSON object per line to a daily file
//! (`risk_events_YYYY-MM-DD.jsonl`). Logging never blocks the caller; when
//! the bounded queue is full the newest event is dropped and counted.

mod writer;

pub use writer::{EventLog, RiskEvent};

use thiserror::Error;

/// Event log errors
#[derive(Debug, Error)]
pub enum EventLogError {
    #[error("I/O error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<std::io::Error> for EventLogError {
    fn from(err: std::io::Error) -> Self {
        EventLogError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for EventLogError {
    fn from(err: serde_json::Error) -> Self {
        EventLogError::Serialization(err.to_string())
    }
}
