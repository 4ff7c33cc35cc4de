//! Per-frame risk monitor
//!
//! Runs the risk engine on every frame and turns risk transitions into
//! actions: clips start and stop on edges, the beacon is pinged while any
//! scene is at risk, and every at-risk scene is logged.

use crate::config::AppConfig;
use crate::perf::PerfStats;
use crate::transitions::{RiskTransitions, Transition};
use anyhow::Context;
use beacon::Beacon;
use chrono::{DateTime, Local};
use clip_recorder::{ClipRecorder, PrerollBuffer, SharedFrame};
use event_log::{EventLog, RiskEvent};
use risk_engine::{DetectionFrame, FrameTime, RiskEngine, RiskReport};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{error, info};

/// Clip file name for a scene whose risk started at `time`
pub fn clip_file_name(scene: &str, time: &DateTime<Local>) -> String {
    let stamp = time
        .format("%Y-%m-%dT%H:%M:%S%.6f")
        .to_string()
        .replace(':', "-")
        .replace('.', "_");
    format!("{scene}_{stamp}.mp4")
}

pub struct RiskMonitor {
    engine: RiskEngine,
    transitions: RiskTransitions,
    preroll: PrerollBuffer,
    beacon: Option<Beacon>,
    clips: Option<ClipRecorder>,
    events: Option<EventLog>,
    perf: PerfStats,
    summary_path: Option<PathBuf>,
}

impl RiskMonitor {
    /// Build the engine and start every enabled controller
    pub async fn start(config: &AppConfig, fps: f64) -> anyhow::Result<Self> {
        let engine = RiskEngine::new(&config.engine).context("building risk engine")?;

        let beacon = if config.beacon.enabled {
            Some(Beacon::spawn(&config.beacon).context("starting beacon")?)
        } else {
            None
        };
        let clips = if config.clips.enabled {
            Some(ClipRecorder::spawn(&config.clips).context("starting clip recorder")?)
        } else {
            None
        };
        let events = if config.event_log.enabled {
            Some(
                EventLog::start(&config.event_log.dir, config.event_log.queue)
                    .await
                    .context("starting event log")?,
            )
        } else {
            None
        };

        let preroll = PrerollBuffer::for_duration(fps, config.clips.preroll_secs);
        info!(
            scenes = engine.scenes().len(),
            beacon = beacon.is_some(),
            clips = clips.is_some(),
            events = events.is_some(),
            preroll_frames = preroll.capacity(),
            "Risk monitor started"
        );

        Ok(Self::from_parts(engine, preroll, beacon, clips, events)
            .with_summary_path(config.performance.summary_path.clone()))
    }

    pub fn from_parts(
        engine: RiskEngine,
        preroll: PrerollBuffer,
        beacon: Option<Beacon>,
        clips: Option<ClipRecorder>,
        events: Option<EventLog>,
    ) -> Self {
        Self {
            engine,
            transitions: RiskTransitions::new(),
            preroll,
            beacon,
            clips,
            events,
            perf: PerfStats::new(),
            summary_path: None,
        }
    }

    /// Also write the shutdown performance summary to `path`
    pub fn with_summary_path(mut self, path: Option<PathBuf>) -> Self {
        self.summary_path = path;
        self
    }

    pub fn handle_frame(&mut self, video: SharedFrame, detections: &DetectionFrame) -> RiskReport {
        self.handle_frame_at(video, detections, FrameTime::now())
    }

    pub fn handle_frame_at(
        &mut self,
        video: SharedFrame,
        detections: &DetectionFrame,
        at: FrameTime,
    ) -> RiskReport {
        let began = Instant::now();
        let report = self.engine.process_at(detections, at);
        self.perf.record(began.elapsed());

        // Clips start from the frames before this one; this frame follows live
        let mut started: HashMap<String, String> = HashMap::new();
        for transition in self.transitions.update(&report) {
            match transition {
                Transition::Started(scene) => {
                    info!(scene = %scene, "Risk started");
                    if let Some(clips) = &self.clips {
                        let file = clip_file_name(&scene, &at.wall);
                        clips.start(&scene, self.preroll.snapshot(), file.clone());
                        started.insert(scene, file);
                    }
                }
                Transition::Stopped(scene) => {
                    info!(scene = %scene, "Risk cleared");
                    if let Some(clips) = &self.clips {
                        clips.stop(&scene);
                    }
                }
            }
        }

        self.preroll.push(video.clone());
        if let Some(clips) = &self.clips {
            clips.push_frame(video);
        }

        if let Some(events) = &self.events {
            for (scene, result) in report.iter().filter(|(_, r)| r.risk) {
                events.log(RiskEvent {
                    scene_name: scene.to_string(),
                    timestamp: result.time,
                    scene_active: result.scene,
                    risk_active: result.risk,
                    clip_file: started.remove(scene),
                });
            }
        }

        if report.any_risk() {
            if let Some(beacon) = &self.beacon {
                beacon.ping();
            }
        }

        report
    }

    /// Stop the beacon, then the clip recorder, then the event log, and
    /// report frame timings
    pub async fn shutdown(self) {
        let summary = self.perf.summary();
        if let Some(beacon) = self.beacon {
            beacon.shutdown().await;
        }
        if let Some(clips) = self.clips {
            clips.shutdown().await;
        }
        if let Some(events) = self.events {
            events.shutdown().await;
        }

        summary.log();
        if let Some(path) = &self.summary_path {
            if let Err(e) = summary.write_json(path) {
                error!(path = %path.display(), error = %e, "Cannot write performance summary");
            }
        }
        info!("Risk monitor stopped");
    }
}
