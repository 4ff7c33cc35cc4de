//! Open wrench on the floor
//!
//! Scene: the wrench (cabron) is visible. Risk: a foot close to it.

use crate::config::{OpenAnchorConfig, SkeletonConfig};
use crate::detection::DetectionFrame;
use crate::hysteresis::Activation;
use crate::scene::{Hazard, Scene};
use crate::SceneError;
use geometry::predicates::any_within_distance;
use std::collections::VecDeque;

pub const NAME: &str = "open_anchor_proximity";

pub struct OpenAnchorProximity {
    config: OpenAnchorConfig,
    feet: Vec<usize>,
}

impl OpenAnchorProximity {
    pub fn new(config: OpenAnchorConfig, skeleton: &SkeletonConfig) -> Self {
        Self {
            config,
            feet: skeleton.feet.clone(),
        }
    }
}

impl Hazard for OpenAnchorProximity {
    fn scene_condition(
        &self,
        frame: &DetectionFrame,
        _history: &mut VecDeque<f64>,
    ) -> Result<bool, SceneError> {
        Ok(frame.has_class(&self.config.anchor_class))
    }

    fn risk_condition(&self, frame: &DetectionFrame) -> Result<bool, SceneError> {
        let Some(anchor) = frame.box_of(&self.config.anchor_class) else {
            return Ok(false);
        };
        Ok(any_within_distance(
            frame.keypoints(&self.feet),
            anchor,
            self.config.foot_distance_px,
        ))
    }
}

pub fn scene(config: &OpenAnchorConfig, skeleton: &SkeletonConfig) -> Scene {
    Scene::new(
        NAME,
        Activation::Symmetric(config.scene),
        config.risk,
        OpenAnchorProximity::new(config.clone(), skeleton),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenes::testing::{feet_at, run};
    use geometry::{BBox, Point};

    #[test]
    fn test_distance_threshold_is_inclusive() {
        let h = OpenAnchorProximity::new(OpenAnchorConfig::default(), &SkeletonConfig::default());
        let wrench = BBox::new(100.0, 100.0, 200.0, 150.0);

        let near = DetectionFrame::new(640, 480)
            .with_object("cabron", wrench)
            .with_pose(feet_at(Point::new(220.0, 120.0)));
        assert!(h.risk_condition(&near).unwrap());

        let far = DetectionFrame::new(640, 480)
            .with_object("cabron", wrench)
            .with_pose(feet_at(Point::new(220.5, 120.0)));
        assert!(!h.risk_condition(&far).unwrap());
    }

    #[test]
    fn test_scene_drops_after_off_run() {
        let mut s = scene(&OpenAnchorConfig::default(), &SkeletonConfig::default());
        let seen = DetectionFrame::new(640, 480).with_object("cabron", BBox::new(0.0, 0.0, 10.0, 10.0));
        let empty = DetectionFrame::new(640, 480);

        assert_eq!(run(&mut s, &seen, 5), (true, false));
        assert_eq!(run(&mut s, &empty, 9), (true, false));
        assert_eq!(run(&mut s, &empty, 1), (false, false));
    }

    #[test]
    fn test_no_people_no_risk() {
        let mut s = scene(&OpenAnchorConfig::default(), &SkeletonConfig::default());
        let seen = DetectionFrame::new(640, 480).with_object("cabron", BBox::new(0.0, 0.0, 10.0, 10.0));
        assert_eq!(run(&mut s, &seen, 20), (true, false));
    }
}
