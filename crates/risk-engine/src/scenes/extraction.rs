//! Extraction near the rotating tool
//!
//! Scene: the drill arm is engaged with the stick-out, either overlapping it
//! or sitting right next to it and horizontally aligned.
//! Risk: a foot inside the rotating-tool zone.

use crate::config::{ExtractionConfig, SkeletonConfig};
use crate::detection::DetectionFrame;
use crate::hysteresis::Activation;
use crate::scene::{Hazard, Scene};
use crate::SceneError;
use geometry::predicates::{gap, horizontal_alignment, overlap_ratio, point_in_or_on_polygon};
use std::collections::VecDeque;

pub const NAME: &str = "extraction_rotation_zone";

pub struct ExtractionNearRotation {
    config: ExtractionConfig,
    feet: Vec<usize>,
}

impl ExtractionNearRotation {
    pub fn new(config: ExtractionConfig, skeleton: &SkeletonConfig) -> Self {
        Self {
            config,
            feet: skeleton.feet.clone(),
        }
    }
}

impl Hazard for ExtractionNearRotation {
    fn scene_condition(
        &self,
        frame: &DetectionFrame,
        _history: &mut VecDeque<f64>,
    ) -> Result<bool, SceneError> {
        let cfg = &self.config;
        let (Some(anchor), Some(tool)) = (frame.box_of(&cfg.anchor_class), frame.box_of(&cfg.tool_class)) else {
            return Ok(false);
        };

        if overlap_ratio(anchor, tool) > cfg.overlap_min {
            return Ok(true);
        }
        Ok(gap(anchor, tool) <= cfg.gap_px && horizontal_alignment(anchor, tool, cfg.alignment_ratio))
    }

    fn risk_condition(&self, frame: &DetectionFrame) -> Result<bool, SceneError> {
        Ok(frame
            .keypoints(&self.feet)
            .any(|p| point_in_or_on_polygon(p, &self.config.danger_zone)))
    }
}

pub fn scene(config: &ExtractionConfig, skeleton: &SkeletonConfig) -> Scene {
    Scene::new(
        NAME,
        Activation::Symmetric(config.scene),
        config.risk,
        ExtractionNearRotation::new(config.clone(), skeleton),
    )
}
