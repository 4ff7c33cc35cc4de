//! Per-frame dispatcher over all registered scenes

use crate::config::EngineConfig;
use crate::detection::DetectionFrame;
use crate::report::{FrameTime, RiskReport, SceneResult};
use crate::scene::Scene;
use crate::scenes;
use crate::SceneError;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::{debug, warn};

/// Runs every scene on every frame.
///
/// A scene that errors or panics reports a neutral result for that frame and
/// is reset; the other scenes are unaffected.
#[derive(Debug, Default)]
pub struct RiskEngine {
    scenes: Vec<Scene>,
}

impl RiskEngine {
    /// Engine with all built-in hazards
    pub fn new(config: &EngineConfig) -> Result<Self, SceneError> {
        config.validate()?;
        Self::with_scenes(scenes::builtin(config))
    }

    /// Engine with the given scenes, in order. Scene names must be unique.
    pub fn with_scenes(scenes: Vec<Scene>) -> Result<Self, SceneError> {
        let mut engine = Self::default();
        for scene in scenes {
            engine.register(scene)?;
        }
        Ok(engine)
    }

    /// Add a scene; it is reported after the existing ones
    pub fn register(&mut self, scene: Scene) -> Result<(), SceneError> {
        if self.scenes.iter().any(|s| s.name() == scene.name()) {
            return Err(SceneError::DuplicateScene(scene.name().to_string()));
        }
        self.scenes.push(scene);
        Ok(())
    }

    pub fn scene_names(&self) -> impl Iterator<Item = &str> {
        self.scenes.iter().map(|s| s.name())
    }

    pub fn scenes(&self) -> &[Scene] {
        &self.scenes
    }

    pub fn process(&mut self, frame: &DetectionFrame) -> RiskReport {
        self.process_at(frame, FrameTime::now())
    }

    /// Evaluate every scene against `frame` at the given time
    pub fn process_at(&mut self, frame: &DetectionFrame, at: FrameTime) -> RiskReport {
        let mut report = RiskReport::with_capacity(self.scenes.len());

        for scene in &mut self.scenes {
            let outcome = catch_unwind(AssertUnwindSafe(|| scene.evaluate(frame, at)));
            let result = match outcome {
                Ok(Ok(result)) => result,
                Ok(Err(e)) => {
                    warn!(scene = scene.name(), error = %e, "Scene evaluation failed, resetting");
                    scene.reset();
                    SceneResult::neutral(at.wall)
                }
                Err(_) => {
                    warn!(scene = scene.name(), "Scene evaluation panicked, resetting");
                    scene.reset();
                    SceneResult::neutral(at.wall)
                }
            };
            report.push(scene.name(), result);
        }

        debug!(
            scenes = report.len(),
            at_risk = report.at_risk().count(),
            "Frame processed"
        );
        report
    }

    /// Reset every scene to inactive
    pub fn reset(&mut self) {
        for scene in &mut self.scenes {
            scene.reset();
        }
    }
}
