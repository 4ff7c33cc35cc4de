//! Frame timing summary
//!
//! Tracks how long the risk engine takes per frame and how many frames the
//! monitor got through, for the report printed on shutdown.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::info;

/// Per-frame engine latency, accumulated since start
#[derive(Debug, Clone)]
pub struct PerfStats {
    started: Instant,
    frames: u64,
    total: Duration,
    max: Duration,
}

/// Snapshot of [`PerfStats`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerfSummary {
    pub frames: u64,
    /// Mean engine time per frame
    pub mean_ms: f64,
    /// Slowest frame
    pub max_ms: f64,
    /// Frames per second of wall time since start
    pub effective_fps: f64,
    pub elapsed_secs: f64,
}

impl PerfStats {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    pub fn starting_at(started: Instant) -> Self {
        Self {
            started,
            frames: 0,
            total: Duration::ZERO,
            max: Duration::ZERO,
        }
    }

    pub fn record(&mut self, latency: Duration) {
        self.frames += 1;
        self.total += latency;
        self.max = self.max.max(latency);
    }

    pub fn summary(&self) -> PerfSummary {
        self.summary_at(Instant::now())
    }

    pub fn summary_at(&self, now: Instant) -> PerfSummary {
        let elapsed = now.saturating_duration_since(self.started).as_secs_f64();
        let mean_ms = if self.frames == 0 {
            0.0
        } else {
            self.total.as_secs_f64() * 1000.0 / self.frames as f64
        };
        let effective_fps = if elapsed > 0.0 {
            self.frames as f64 / elapsed
        } else {
            0.0
        };
        PerfSummary {
            frames: self.frames,
            mean_ms,
            max_ms: self.max.as_secs_f64() * 1000.0,
            effective_fps,
            elapsed_secs: elapsed,
        }
    }
}

impl Default for PerfStats {
    fn default() -> Self {
        Self::new()
    }
}

impl PerfSummary {
    pub fn log(&self) {
        info!(
            frames = self.frames,
            mean_ms = self.mean_ms,
            max_ms = self.max_ms,
            effective_fps = self.effective_fps,
            elapsed_secs = self.elapsed_secs,
            "Performance summary"
        );
    }

    /// Write the summary as pretty JSON
    pub fn write_json(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}
