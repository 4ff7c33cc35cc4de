//! Clip recorder configuration

use crate::ClipError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipConfig {
    /// Record clips at all
    pub enabled: bool,
    /// Directory clips are written to
    pub output_dir: PathBuf,
    /// Seconds of video kept before the triggering event
    pub preroll_secs: f64,
    /// Frames buffered between the capture loop and the writer; newer frames
    /// are dropped when full
    pub frame_queue: usize,
    /// FourCC of the video codec
    pub codec: String,
    /// How long shutdown waits for the writer thread before leaving it behind
    pub shutdown_timeout_secs: f64,
}

impl Default for ClipConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            output_dir: PathBuf::from("clips"),
            preroll_secs: 5.0,
            frame_queue: 120,
            codec: "mp4v".to_string(),
            shutdown_timeout_secs: 10.0,
        }
    }
}

impl ClipConfig {
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.shutdown_timeout_secs)
    }

    /// The codec as four characters
    pub fn fourcc(&self) -> Result<[char; 4], ClipError> {
        let chars: Vec<char> = self.codec.chars().collect();
        match chars.as_slice() {
            &[a, b, c, d] if chars.iter().all(|ch| ch.is_ascii() && !ch.is_ascii_control()) => Ok([a, b, c, d]),
            _ => Err(ClipError::Config(format!(
                "codec must be a four-character code, got {:?}",
                self.codec
            ))),
        }
    }

    pub fn validate(&self) -> Result<(), ClipError> {
        if !(self.preroll_secs.is_finite() && self.preroll_secs >= 0.0) {
            return Err(ClipError::Config(format!(
                "preroll_secs must be non-negative, got {}",
                self.preroll_secs
            )));
        }
        if self.frame_queue == 0 {
            return Err(ClipError::Config("frame_queue must be at least 1".into()));
        }
        if !(self.shutdown_timeout_secs.is_finite() && self.shutdown_timeout_secs > 0.0) {
            return Err(ClipError::Config(format!(
                "shutdown_timeout_secs must be positive, got {}",
                self.shutdown_timeout_secs
            )));
        }
        self.fourcc()?;
        Ok(())
    }
}
