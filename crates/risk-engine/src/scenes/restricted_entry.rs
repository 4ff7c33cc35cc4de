//! Hands reaching into the mud bucket
//!
//! Scene: the bucket (safata) is on the stick-out and a worker stands next
//! to it. Risk: an estimated fingertip inside the upper opening of the
//! bucket.

use crate::config::{RestrictedEntryConfig, SkeletonConfig};
use crate::detection::DetectionFrame;
use crate::hysteresis::Activation;
use crate::scene::{Hazard, Scene};
use crate::SceneError;
use geometry::predicates::{any_within_distance, gap, overlap_ratio, virtual_fingertip};
use std::collections::VecDeque;

pub const NAME: &str = "hand_in_restricted_entry";

pub struct RestrictedEntry {
    config: RestrictedEntryConfig,
    feet: Vec<usize>,
    arms: Vec<(usize, usize)>,
}

impl RestrictedEntry {
    pub fn new(config: RestrictedEntryConfig, skeleton: &SkeletonConfig) -> Self {
        Self {
            config,
            feet: skeleton.feet.clone(),
            arms: skeleton.arms.clone(),
        }
    }
}

impl Hazard for RestrictedEntry {
    fn scene_condition(
        &self,
        frame: &DetectionFrame,
        _history: &mut VecDeque<f64>,
    ) -> Result<bool, SceneError> {
        let cfg = &self.config;
        let (Some(anchor), Some(entry)) = (frame.box_of(&cfg.anchor_class), frame.box_of(&cfg.entry_class)) else {
            return Ok(false);
        };

        let engaged = overlap_ratio(anchor, entry) > cfg.overlap_min || gap(anchor, entry) < cfg.gap_max_px;
        Ok(engaged && any_within_distance(frame.keypoints(&self.feet), anchor, cfg.foot_distance_px))
    }

    fn risk_condition(&self, frame: &DetectionFrame) -> Result<bool, SceneError> {
        let cfg = &self.config;
        let Some(entry) = frame.box_of(&cfg.entry_class) else {
            return Ok(false);
        };
        let r = cfg.entry_region;
        let region = entry.fractional(r.left, r.top, r.right, r.bottom);

        let reaching = frame.poses.iter().any(|pose| {
            self.arms.iter().any(|&(elbow, wrist)| {
                match (pose.keypoint(elbow), pose.keypoint(wrist)) {
                    (Some(e), Some(w)) => {
                        region.contains_strict(virtual_fingertip(e, w, cfg.extension_factor))
                    }
                    _ => false,
                }
            })
        });
        Ok(reaching)
    }
}

pub fn scene(config: &RestrictedEntryConfig, skeleton: &SkeletonConfig) -> Scene {
    Scene::new(
        NAME,
        Activation::Symmetric(config.scene),
        config.risk,
        RestrictedEntry::new(config.clone(), skeleton),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::{skeleton, Pose};
    use geometry::{BBox, Point};

    fn hazard() -> RestrictedEntry {
        RestrictedEntry::new(RestrictedEntryConfig::default(), &SkeletonConfig::default())
    }

    fn rig() -> DetectionFrame {
        DetectionFrame::new(1152, 648)
            .with_object("stickout", BBox::new(500.0, 300.0, 560.0, 420.0))
            .with_object("safata", BBox::new(490.0, 280.0, 590.0, 380.0))
    }

    #[test]
    fn test_scene_needs_worker_nearby() {
        let h = hazard();
        assert!(!h.scene_condition(&rig(), &mut VecDeque::new()).unwrap());

        let worker = Pose::from_points(&[
            (skeleton::LEFT_ANKLE, Point::new(600.0, 420.0)),
            (skeleton::RIGHT_ANKLE, Point::new(900.0, 420.0)),
        ]);
        assert!(h.scene_condition(&rig().with_pose(worker), &mut VecDeque::new()).unwrap());
    }

    #[test]
    fn test_scene_by_gap_alone() {
        let h = hazard();
        let frame = DetectionFrame::new(1152, 648)
            .with_object("stickout", BBox::new(500.0, 300.0, 560.0, 420.0))
            .with_object("safata", BBox::new(563.0, 300.0, 600.0, 340.0))
            .with_pose(Pose::from_points(&[(skeleton::LEFT_ANKLE, Point::new(530.0, 430.0))]));
        assert!(h.scene_condition(&frame, &mut VecDeque::new()).unwrap());
    }

    #[test]
    fn test_fingertip_extends_past_wrist() {
        let h = hazard();
        // Region: x 510..590, y 285..325
        // Wrist outside the region, fingertip 0.65 forearms further lands inside
        let arm = Pose::from_points(&[
            (skeleton::LEFT_ELBOW, Point::new(450.0, 300.0)),
            (skeleton::LEFT_WRIST, Point::new(490.0, 300.0)),
        ]);
        assert!(h.risk_condition(&rig().with_pose(arm)).unwrap());

        let short = Pose::from_points(&[
            (skeleton::LEFT_ELBOW, Point::new(400.0, 300.0)),
            (skeleton::LEFT_WRIST, Point::new(440.0, 300.0)),
        ]);
        assert!(!h.risk_condition(&rig().with_pose(short)).unwrap());
    }

    #[test]
    fn test_no_entry_box_no_risk() {
        let h = hazard();
        let frame = DetectionFrame::new(1152, 648).with_pose(Pose::default());
        assert!(!h.risk_condition(&frame).unwrap());
    }
}
