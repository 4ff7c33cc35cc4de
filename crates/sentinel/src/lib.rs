//! Rig Sentinel
//!
//! Application wiring for the drill-floor safety monitor: detection records
//! go through the risk engine, and risk transitions drive the warning
//! beacon, evidence clips and the event log.

pub mod config;
pub mod monitor;
pub mod perf;
pub mod replay;
pub mod transitions;

pub use config::{AppConfig, ConfigError};
pub use monitor::RiskMonitor;
pub use perf::{PerfStats, PerfSummary};
pub use replay::DetectionReplay;
pub use transitions::{RiskTransitions, Transition};

use crate::config::LoggingConfig;
use std::future::Future;
use std::time::Duration;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Initialize the global tracing subscriber
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let level: Level = config
        .level
        .parse()
        .map_err(|_| anyhow::anyhow!("unknown log level {:?}", config.level))?;

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true);

    if config.json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

/// Feed recorded detections through the monitor at `fps` until the input
/// ends or `stop` resolves. Returns the number of frames processed.
pub async fn run_replay<R, S>(
    monitor: &mut RiskMonitor,
    replay: &mut DetectionReplay<R>,
    fps: f64,
    stop: S,
) -> anyhow::Result<u64>
where
    R: tokio::io::AsyncBufRead + Unpin,
    S: Future<Output = ()>,
{
    anyhow::ensure!(fps.is_finite() && fps > 0.0, "fps must be positive, got {fps}");

    let mut ticker = tokio::time::interval(Duration::from_secs_f64(1.0 / fps));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    tokio::pin!(stop);

    let mut frames = 0u64;
    loop {
        tokio::select! {
            biased;
            _ = &mut stop => {
                info!(frames, "Replay interrupted");
                break;
            }
            _ = ticker.tick() => {
                let Some((video, detections)) = replay.next_frame().await? else {
                    info!(frames, "Replay finished");
                    break;
                };
                monitor.handle_frame(video, &detections);
                frames += 1;
            }
        }
    }
    Ok(frames)
}
