//! Swinging tubular pin
//!
//! Scene: the pin has swung past a vertical line while the stick-out is in
//! view. Risk: a foot inside the swing zone.

use crate::config::{PendulumConfig, SkeletonConfig};
use crate::detection::DetectionFrame;
use crate::hysteresis::Activation;
use crate::scene::{Hazard, Scene};
use crate::SceneError;
use geometry::predicates::point_in_or_on_polygon;
use std::collections::VecDeque;

pub const NAME: &str = "pendulum_strike";

pub struct PendulumStrike {
    config: PendulumConfig,
    feet: Vec<usize>,
}

impl PendulumStrike {
    pub fn new(config: PendulumConfig, skeleton: &SkeletonConfig) -> Self {
        Self {
            config,
            feet: skeleton.feet.clone(),
        }
    }
}

impl Hazard for PendulumStrike {
    fn scene_condition(
        &self,
        frame: &DetectionFrame,
        _history: &mut VecDeque<f64>,
    ) -> Result<bool, SceneError> {
        let cfg = &self.config;
        if !frame.has_class(&cfg.anchor_class) {
            return Ok(false);
        }
        let Some(pin) = frame.box_of(&cfg.swinging_class) else {
            return Ok(false);
        };
        // Line sits on a whole pixel column
        let line_x = (f64::from(frame.width) * cfg.line_ratio).trunc();
        Ok(pin.centroid().x > line_x)
    }

    fn risk_condition(&self, frame: &DetectionFrame) -> Result<bool, SceneError> {
        Ok(frame
            .keypoints(&self.feet)
            .any(|p| point_in_or_on_polygon(p, &self.config.danger_zone)))
    }
}

pub fn scene(config: &PendulumConfig, skeleton: &SkeletonConfig) -> Scene {
    Scene::new(
        NAME,
        Activation::Symmetric(config.scene),
        config.risk,
        PendulumStrike::new(config.clone(), skeleton),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenes::testing::{feet_at, run};
    use geometry::{BBox, Point};

    fn with_pin(x1: f64) -> DetectionFrame {
        DetectionFrame::new(1152, 648)
            .with_object("stickout", BBox::new(460.0, 370.0, 600.0, 430.0))
            .with_object("pintubular", BBox::new(x1, 200.0, x1 + 40.0, 260.0))
    }

    #[test]
    fn test_scene_line_crossing() {
        let h = PendulumStrike::new(PendulumConfig::default(), &SkeletonConfig::default());
        // Line at 691.2 px for a 1152 px frame
        assert!(h.scene_condition(&with_pin(680.0), &mut VecDeque::new()).unwrap());
        assert!(!h.scene_condition(&with_pin(650.0), &mut VecDeque::new()).unwrap());

        let no_anchor = DetectionFrame::new(1152, 648)
            .with_object("pintubular", BBox::new(900.0, 200.0, 940.0, 260.0));
        assert!(!h.scene_condition(&no_anchor, &mut VecDeque::new()).unwrap());
    }

    #[test]
    fn test_line_is_truncated_to_whole_pixel() {
        let h = PendulumStrike::new(PendulumConfig::default(), &SkeletonConfig::default());
        // 1152 * 0.6 = 691.2, truncated to 691
        assert!(h.scene_condition(&with_pin(671.1), &mut VecDeque::new()).unwrap());
        assert!(!h.scene_condition(&with_pin(671.0), &mut VecDeque::new()).unwrap());
    }

    #[test]
    fn test_built_in_zone_uses_whole_pixels() {
        let zone = &PendulumConfig::default().danger_zone;
        assert!(zone.vertices().iter().all(|p| p.x.fract() == 0.0 && p.y.fract() == 0.0));
        // On the truncated first vertex
        assert!(point_in_or_on_polygon(geometry::Point::new(648.0, 299.0), zone));
    }

    #[test]
    fn test_foot_in_swing_zone() {
        let mut s = scene(&PendulumConfig::default(), &SkeletonConfig::default());
        let frame = with_pin(700.0).with_pose(feet_at(Point::new(635.0, 345.0)));
        assert_eq!(run(&mut s, &frame, 9), (true, true));

        let away = with_pin(700.0).with_pose(feet_at(Point::new(300.0, 345.0)));
        assert_eq!(run(&mut s, &away, 5), (true, false));
    }
}
