//! Gripper picking up a tubular
//!
//! Scene: the drill arm overlaps a tubular and is within reach of it.
//! Risk: a hand strictly inside the drill arm's box.

use crate::config::{PickupConfig, SkeletonConfig};
use crate::detection::DetectionFrame;
use crate::hysteresis::Activation;
use crate::scene::{Hazard, Scene};
use crate::SceneError;
use geometry::predicates::{gap, overlap_ratio};
use std::collections::VecDeque;

pub const NAME: &str = "pickup_by_hand";

pub struct HandOnGripper {
    config: PickupConfig,
    hands: Vec<usize>,
}

impl HandOnGripper {
    pub fn new(config: PickupConfig, skeleton: &SkeletonConfig) -> Self {
        Self {
            config,
            hands: skeleton.hands.clone(),
        }
    }
}

impl Hazard for HandOnGripper {
    fn scene_condition(
        &self,
        frame: &DetectionFrame,
        _history: &mut VecDeque<f64>,
    ) -> Result<bool, SceneError> {
        let cfg = &self.config;
        let (Some(gripper), Some(tool)) = (frame.box_of(&cfg.gripper_class), frame.box_of(&cfg.tool_class)) else {
            return Ok(false);
        };
        Ok(overlap_ratio(gripper, tool) > cfg.overlap_min && gap(gripper, tool) < cfg.gap_max_px)
    }

    fn risk_condition(&self, frame: &DetectionFrame) -> Result<bool, SceneError> {
        let Some(gripper) = frame.box_of(&self.config.gripper_class) else {
            return Ok(false);
        };
        Ok(frame.keypoints(&self.hands).any(|p| gripper.contains_strict(p)))
    }
}

pub fn scene(config: &PickupConfig, skeleton: &SkeletonConfig) -> Scene {
    Scene::new(
        NAME,
        Activation::Symmetric(config.scene),
        config.risk,
        HandOnGripper::new(config.clone(), skeleton),
    )
}
