//! Rig-floor risk engine
//!
//! Turns per-frame object and pose detections into debounced
//! `(scene, risk)` states for a fixed set of drill-floor hazards:
//! - Extraction near the rotating tool
//! - Feet next to an open wrench
//! - Hands on the gripper during pick-up
//! - Swinging tubular pin
//! - Timed coupling window
//! - Feet in the pick-up path
//! - Hands reaching into the mud bucket

pub mod config;
pub mod detection;
pub mod engine;
pub mod hysteresis;
pub mod report;
pub mod scene;
pub mod scenes;

pub use config::EngineConfig;
pub use detection::{Detection, DetectionFrame, Pose};
pub use engine::RiskEngine;
pub use hysteresis::{Activation, Hysteresis, SceneState, Thresholds};
pub use report::{FrameTime, RiskReport, SceneResult};
pub use scene::{Hazard, Scene};

use thiserror::Error;

/// Risk engine error types
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Scene already registered: {0}")]
    DuplicateScene(String),

    #[error("Evaluation failed: {0}")]
    Evaluation(String),
}
