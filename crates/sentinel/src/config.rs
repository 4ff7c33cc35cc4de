//! Layered application configuration
//!
//! Built-in defaults, then an optional file (TOML, YAML or JSON by
//! extension), then `SENTINEL__SECTION__KEY` environment variables.

use beacon::BeaconConfig;
use clip_recorder::ClipConfig;
use config::{Config, Environment, File};
use risk_engine::EngineConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Log output settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Maximum level: trace, debug, info, warn or error
    pub level: String,
    /// Emit JSON lines instead of human-readable text
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Video source settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Nominal frame rate, used to size the pre-roll
    pub fps: f64,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self { fps: 15.0 }
    }
}

/// Event log settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventLogConfig {
    pub enabled: bool,
    pub dir: PathBuf,
    /// Events buffered ahead of the writer; newer events are dropped when full
    pub queue: usize,
}

impl Default for EventLogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: PathBuf::from("logs"),
            queue: 1024,
        }
    }
}

/// Frame timing summary settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceConfig {
    /// Also write the shutdown summary here as JSON
    pub summary_path: Option<PathBuf>,
}

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub capture: CaptureConfig,
    pub engine: EngineConfig,
    pub beacon: BeaconConfig,
    pub clips: ClipConfig,
    pub event_log: EventLogConfig,
    pub performance: PerformanceConfig,
}

impl AppConfig {
    /// Load and validate configuration
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder().add_source(Config::try_from(&AppConfig::default())?);
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        let config: AppConfig = builder
            .add_source(Environment::with_prefix("SENTINEL").separator("__"))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.engine
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        if self.beacon.enabled {
            self.beacon
                .validate()
                .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        }
        if self.clips.enabled {
            self.clips
                .validate()
                .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        }
        if self.event_log.enabled && self.event_log.queue == 0 {
            return Err(ConfigError::Invalid("event_log.queue must be at least 1".into()));
        }
        if !(self.capture.fps.is_finite() && self.capture.fps > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "capture.fps must be positive, got {}",
                self.capture.fps
            )));
        }
        if self.logging.level.parse::<tracing::Level>().is_err() {
            return Err(ConfigError::Invalid(format!(
                "unknown log level {:?}",
                self.logging.level
            )));
        }
        Ok(())
    }
}
