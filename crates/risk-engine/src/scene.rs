//! Scene abstraction: a hazard predicate pair wrapped in hysteresis

use crate::detection::DetectionFrame;
use crate::hysteresis::{Activation, Hysteresis, SceneState, Thresholds};
use crate::report::{FrameTime, SceneResult};
use crate::SceneError;
use std::collections::{BTreeMap, VecDeque};
use std::fmt;

/// Instantaneous predicates for one hazard.
///
/// Implementations are stateless; anything that must survive between frames
/// goes in the scene-local `history`, which is cleared whenever the scene
/// deactivates.
pub trait Hazard: Send {
    /// Does the operational context hold on this frame?
    fn scene_condition(
        &self,
        frame: &DetectionFrame,
        history: &mut VecDeque<f64>,
    ) -> Result<bool, SceneError>;

    /// Is a worker exposed on this frame? Only asked while the scene is active.
    fn risk_condition(&self, frame: &DetectionFrame) -> Result<bool, SceneError>;
}

/// A named hazard with its debouncing state
pub struct Scene {
    name: String,
    hazard: Box<dyn Hazard>,
    hysteresis: Hysteresis,
}

impl Scene {
    pub fn new(
        name: impl Into<String>,
        activation: Activation,
        risk: Thresholds,
        hazard: impl Hazard + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            hazard: Box::new(hazard),
            hysteresis: Hysteresis::new(activation, risk),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> &SceneState {
        self.hysteresis.state()
    }

    /// Run one frame through the scene
    pub fn evaluate(
        &mut self,
        frame: &DetectionFrame,
        at: FrameTime,
    ) -> Result<SceneResult, SceneError> {
        let hazard = &self.hazard;
        let scene_now = hazard.scene_condition(frame, self.hysteresis.history_mut())?;
        let (scene, risk) = self
            .hysteresis
            .step(at.instant, scene_now, || hazard.risk_condition(frame))?;

        let mut extras = BTreeMap::new();
        if self.state().activated_at.is_some() {
            let left = self.hysteresis.remaining(at.instant);
            extras.insert("remaining_secs".to_string(), left.as_secs_f64().into());
        }

        Ok(SceneResult {
            time: at.wall,
            scene,
            risk,
            extras,
        })
    }

    /// Return the scene to its inactive state
    pub fn reset(&mut self) {
        self.hysteresis.reset();
    }
}

impl fmt::Debug for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scene")
            .field("name", &self.name)
            .field("state", self.hysteresis.state())
            .finish()
    }
}
