//! Rig Sentinel - Main Entry Point

use anyhow::Context;
use clap::Parser;
use sentinel::{init_logging, run_replay, AppConfig, DetectionReplay, RiskMonitor};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "sentinel", about = "Drill-floor safety monitor", version)]
struct Args {
    /// Configuration file (toml, yaml or json)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Detection records to replay, one JSON frame per line
    #[arg(long, value_name = "PATH")]
    detections: PathBuf,

    /// Replay rate; defaults to the configured capture rate
    #[arg(long)]
    fps: Option<f64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = AppConfig::load(args.config.as_deref()).context("loading configuration")?;
    init_logging(&config.logging)?;

    info!("=== Rig Sentinel v{} ===", env!("CARGO_PKG_VERSION"));

    let fps = args.fps.unwrap_or(config.capture.fps);
    let mut monitor = RiskMonitor::start(&config, fps).await?;
    let mut replay = DetectionReplay::open(&args.detections).await?;

    let result = run_replay(&mut monitor, &mut replay, fps, async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await;

    monitor.shutdown().await;
    let frames = result?;
    info!(frames, "Shutdown complete");
    Ok(())
}
