//! Timed coupling window
//!
//! Scene: the stick-out box suddenly grows taller than its recent average
//! (a new stand being coupled). Once this holds for enough frames the scene
//! latches for a fixed window regardless of later frames.
//! Risk: a foot inside the coupling-wrench zone during the window.

use crate::config::{CouplingConfig, SkeletonConfig};
use crate::detection::DetectionFrame;
use crate::hysteresis::Activation;
use crate::scene::{Hazard, Scene};
use crate::SceneError;
use geometry::predicates::point_in_or_on_polygon;
use std::collections::VecDeque;
use std::time::Duration;

pub const NAME: &str = "timed_coupling";

/// Most recent heights left out of the baseline average
const RECENT_EXCLUDED: usize = 3;

/// Below this many samples the baseline is the current height
const MIN_BASELINE_SAMPLES: usize = 5;

pub struct TimedCoupling {
    config: CouplingConfig,
    feet: Vec<usize>,
}

impl TimedCoupling {
    pub fn new(config: CouplingConfig, skeleton: &SkeletonConfig) -> Self {
        Self {
            config,
            feet: skeleton.feet.clone(),
        }
    }
}

impl Hazard for TimedCoupling {
    fn scene_condition(
        &self,
        frame: &DetectionFrame,
        history: &mut VecDeque<f64>,
    ) -> Result<bool, SceneError> {
        let cfg = &self.config;
        let Some(tracked) = frame.box_of(&cfg.tracked_class) else {
            return Ok(false);
        };

        let height = tracked.height();
        history.push_back(height);
        while history.len() > cfg.history_len {
            history.pop_front();
        }

        let baseline = if history.len() > MIN_BASELINE_SAMPLES {
            let n = history.len() - RECENT_EXCLUDED;
            history.iter().take(n).sum::<f64>() / n as f64
        } else {
            height
        };
        let increase = (height - baseline) / baseline.max(1.0);

        Ok(increase > cfg.increase_min && tracked.area() > cfg.area_min)
    }

    fn risk_condition(&self, frame: &DetectionFrame) -> Result<bool, SceneError> {
        Ok(frame
            .keypoints(&self.feet)
            .any(|p| point_in_or_on_polygon(p, &self.config.danger_zone)))
    }
}

pub fn scene(config: &CouplingConfig, skeleton: &SkeletonConfig) -> Scene {
    Scene::new(
        NAME,
        Activation::Latch {
            on: config.scene_on,
            window: Duration::from_secs_f64(config.window_secs),
        },
        config.risk,
        TimedCoupling::new(config.clone(), skeleton),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::FrameTime;
    use crate::scenes::testing::feet_at;
    use chrono::Local;
    use geometry::{BBox, Point};
    use std::time::Instant;

    fn stickout(height: f64) -> DetectionFrame {
        DetectionFrame::new(1152, 648).with_object("stickout", BBox::new(480.0, 400.0 - height, 580.0, 400.0))
    }

    fn hazard() -> TimedCoupling {
        TimedCoupling::new(CouplingConfig::default(), &SkeletonConfig::default())
    }

    #[test]
    fn test_growth_detection() {
        let h = hazard();
        let mut history = VecDeque::new();
        for _ in 0..10 {
            assert!(!h.scene_condition(&stickout(100.0), &mut history).unwrap());
        }
        assert!(h.scene_condition(&stickout(150.0), &mut history).unwrap());
        assert_eq!(history.len(), 11);
    }

    #[test]
    fn test_small_box_does_not_count() {
        let h = hazard();
        let mut history = VecDeque::new();
        let small = |height: f64| {
            DetectionFrame::new(1152, 648).with_object("stickout", BBox::new(0.0, 0.0, 20.0, height))
        };
        for _ in 0..10 {
            h.scene_condition(&small(100.0), &mut history).unwrap();
        }
        // +100% height but only 4000 px²
        assert!(!h.scene_condition(&small(200.0), &mut history).unwrap());
    }

    #[test]
    fn test_history_is_bounded() {
        let h = hazard();
        let mut history = VecDeque::new();
        for _ in 0..50 {
            h.scene_condition(&stickout(100.0), &mut history).unwrap();
        }
        assert_eq!(history.len(), 20);
    }

    #[test]
    fn test_missing_stickout_is_false() {
        let h = hazard();
        let mut history = VecDeque::new();
        assert!(!h.scene_condition(&DetectionFrame::new(1152, 648), &mut history).unwrap());
        assert!(history.is_empty());
    }

    #[test]
    fn test_window_latches_then_expires() {
        let mut s = scene(&CouplingConfig::default(), &SkeletonConfig::default());
        let t0 = Instant::now();
        let at = |ms: u64| FrameTime {
            instant: t0 + Duration::from_millis(ms),
            wall: Local::now(),
        };
        let foot = feet_at(Point::new(537.0, 300.0));

        for i in 0..10 {
            s.evaluate(&stickout(100.0), at(i * 100)).unwrap();
        }
        for i in 10..15 {
            let r = s.evaluate(&stickout(200.0), at(i * 100)).unwrap();
            assert!(!r.scene);
        }
        let r = s.evaluate(&stickout(200.0), at(1500)).unwrap();
        assert!(r.scene);
        assert_eq!(r.extras["remaining_secs"], 32.0);

        // Stick-out gone and worker in the zone: the window holds
        let empty = DetectionFrame::new(1152, 648).with_pose(foot);
        let mut last = None;
        for i in 0..5 {
            last = Some(s.evaluate(&empty, at(1600 + i * 100)).unwrap());
        }
        let r = last.unwrap();
        assert!(r.scene && r.risk);

        let r = s.evaluate(&empty, at(1500 + 31_900)).unwrap();
        assert!(r.scene);

        let r = s.evaluate(&empty, at(1500 + 32_000)).unwrap();
        assert!(!r.scene && !r.risk);
        assert!(r.extras.is_empty());
        assert!(s.state().history.is_empty());
    }
}
