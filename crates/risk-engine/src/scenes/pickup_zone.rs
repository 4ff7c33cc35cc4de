//! Feet in the pick-up path
//!
//! Same scene as the hand pick-up, different exposure: a foot inside the
//! floor area the tubular sweeps over.

use crate::config::{PickupZoneConfig, SkeletonConfig};
use crate::detection::DetectionFrame;
use crate::hysteresis::Activation;
use crate::scene::{Hazard, Scene};
use crate::SceneError;
use geometry::predicates::{gap, overlap_ratio, point_in_or_on_polygon};
use std::collections::VecDeque;

pub const NAME: &str = "pickup_zone_proximity";

pub struct PickupZoneProximity {
    config: PickupZoneConfig,
    feet: Vec<usize>,
}

impl PickupZoneProximity {
    pub fn new(config: PickupZoneConfig, skeleton: &SkeletonConfig) -> Self {
        Self {
            config,
            feet: skeleton.feet.clone(),
        }
    }
}

impl Hazard for PickupZoneProximity {
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
        Ok(frame
            .keypoints(&self.feet)
            .any(|p| point_in_or_on_polygon(p, &self.config.danger_zone)))
    }
}

pub fn scene(config: &PickupZoneConfig, skeleton: &SkeletonConfig) -> Scene {
    Scene::new(
        NAME,
        Activation::Symmetric(config.scene),
        config.risk,
        PickupZoneProximity::new(config.clone(), skeleton),
    )
}
