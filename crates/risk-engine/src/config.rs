//! Hazard configuration
//!
//! Defaults match the calibration of the fixed rig-floor camera
//! (1152x648 frames).

use crate::detection::{skeleton, KEYPOINT_COUNT};
use crate::hysteresis::Thresholds;
use crate::SceneError;
use geometry::Polygon;
use serde::{Deserialize, Serialize};

// Zone vertices are whole pixels, as calibrated on the integer pixel grid.

/// Rotating-tool zone around the stick-out
pub const STICKOUT_ZONE: [[f64; 2]; 11] = [
    [483.0, 387.0],
    [514.0, 382.0],
    [544.0, 379.0],
    [572.0, 383.0],
    [590.0, 390.0],
    [593.0, 409.0],
    [566.0, 425.0],
    [530.0, 429.0],
    [496.0, 426.0],
    [471.0, 420.0],
    [464.0, 402.0],
];

/// Swing path of the tubular pin
pub const PENDULUM_ZONE: [[f64; 2]; 4] = [[648.0, 299.0], [694.0, 376.0], [618.0, 389.0], [578.0, 312.0]];

/// Floor area next to the coupling wrench
pub const COUPLING_ZONE: [[f64; 2]; 4] = [[445.0, 281.0], [447.0, 324.0], [628.0, 318.0], [625.0, 280.0]];

/// Floor area under the pick-up path
pub const PICKUP_ZONE: [[f64; 2]; 4] = [[643.0, 279.0], [703.0, 378.0], [607.0, 405.0], [560.0, 299.0]];

fn zone(raw: &[[f64; 2]]) -> Polygon {
    Polygon::from_trusted(raw)
}

/// Which keypoints count as feet, hands and arms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkeletonConfig {
    pub feet: Vec<usize>,
    pub hands: Vec<usize>,

    /// `(elbow, wrist)` pairs
    pub arms: Vec<(usize, usize)>,
}

impl Default for SkeletonConfig {
    fn default() -> Self {
        Self {
            feet: vec![skeleton::LEFT_ANKLE, skeleton::RIGHT_ANKLE],
            hands: vec![skeleton::LEFT_WRIST, skeleton::RIGHT_WRIST],
            arms: vec![
                (skeleton::LEFT_ELBOW, skeleton::LEFT_WRIST),
                (skeleton::RIGHT_ELBOW, skeleton::RIGHT_WRIST),
            ],
        }
    }
}

/// Fractional sub-rectangle of a box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

/// Drill-floor extraction near the rotating tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    pub anchor_class: String,
    pub tool_class: String,
    pub overlap_min: f64,
    pub gap_px: f64,
    pub alignment_ratio: f64,
    pub danger_zone: Polygon,
    pub scene: Thresholds,
    pub risk: Thresholds,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            anchor_class: "stickout".into(),
            tool_class: "brazotaladro".into(),
            overlap_min: 0.05,
            gap_px: 10.0,
            alignment_ratio: 0.8,
            danger_zone: zone(&STICKOUT_ZONE),
            scene: Thresholds::new(5, 10),
            risk: Thresholds::new(5, 10),
        }
    }
}

/// Open wrench (cabron) on the floor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAnchorConfig {
    pub anchor_class: String,
    pub foot_distance_px: f64,
    pub scene: Thresholds,
    pub risk: Thresholds,
}

impl Default for OpenAnchorConfig {
    fn default() -> Self {
        Self {
            anchor_class: "cabron".into(),
            foot_distance_px: 20.0,
            scene: Thresholds::new(5, 10),
            risk: Thresholds::new(5, 10),
        }
    }
}

/// Gripper picking up a tubular
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PickupConfig {
    pub gripper_class: String,
    pub tool_class: String,
    pub overlap_min: f64,
    pub gap_max_px: f64,
    pub scene: Thresholds,
    pub risk: Thresholds,
}

impl Default for PickupConfig {
    fn default() -> Self {
        Self {
            gripper_class: "brazotaladro".into(),
            tool_class: "tubular".into(),
            overlap_min: 0.05,
            gap_max_px: 30.0,
            scene: Thresholds::new(7, 5),
            risk: Thresholds::new(8, 5),
        }
    }
}

/// Tubular pin swinging past the stick-out
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PendulumConfig {
    pub anchor_class: String,
    pub swinging_class: String,

    /// Vertical line at `line_ratio × frame width` the swinging object must pass
    pub line_ratio: f64,
    pub danger_zone: Polygon,
    pub scene: Thresholds,
    pub risk: Thresholds,
}

impl Default for PendulumConfig {
    fn default() -> Self {
        Self {
            anchor_class: "stickout".into(),
            swinging_class: "pintubular".into(),
            line_ratio: 0.6,
            danger_zone: zone(&PENDULUM_ZONE),
            scene: Thresholds::new(5, 5),
            risk: Thresholds::new(5, 5),
        }
    }
}

/// Coupling: sudden growth of the stick-out opens a fixed window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CouplingConfig {
    pub tracked_class: String,

    /// Heights kept in the scene history
    pub history_len: usize,

    /// Relative height increase that counts as growth
    pub increase_min: f64,

    /// Minimum box area (px²) for the growth to count
    pub area_min: f64,

    /// Consecutive growth frames that open the window
    pub scene_on: u32,
    pub window_secs: f64,
    pub danger_zone: Polygon,
    pub risk: Thresholds,
}

impl Default for CouplingConfig {
    fn default() -> Self {
        Self {
            tracked_class: "stickout".into(),
            history_len: 20,
            increase_min: 0.40,
            area_min: 9000.0,
            scene_on: 6,
            window_secs: 32.0,
            danger_zone: zone(&COUPLING_ZONE),
            risk: Thresholds::new(5, 8),
        }
    }
}

/// Feet in the pick-up path while the gripper takes a tubular
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PickupZoneConfig {
    pub gripper_class: String,
    pub tool_class: String,
    pub overlap_min: f64,
    pub gap_max_px: f64,
    pub danger_zone: Polygon,
    pub scene: Thresholds,
    pub risk: Thresholds,
}

impl Default for PickupZoneConfig {
    fn default() -> Self {
        Self {
            gripper_class: "brazotaladro".into(),
            tool_class: "tubular".into(),
            overlap_min: 0.05,
            gap_max_px: 30.0,
            danger_zone: zone(&PICKUP_ZONE),
            scene: Thresholds::new(5, 5),
            risk: Thresholds::new(5, 5),
        }
    }
}

/// Hands reaching into the mud bucket (safata) region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RestrictedEntryConfig {
    pub anchor_class: String,
    pub entry_class: String,
    pub overlap_min: f64,
    pub gap_max_px: f64,

    /// A worker must stand this close to the anchor for the scene to hold
    pub foot_distance_px: f64,

    /// Forearm extension past the wrist used to estimate the fingertip
    pub extension_factor: f64,
    pub entry_region: Region,
    pub scene: Thresholds,
    pub risk: Thresholds,
}

impl Default for RestrictedEntryConfig {
    fn default() -> Self {
        Self {
            anchor_class: "stickout".into(),
            entry_class: "safata".into(),
            overlap_min: 0.5,
            gap_max_px: 5.0,
            foot_distance_px: 50.0,
            extension_factor: 0.65,
            entry_region: Region {
                left: 0.2,
                top: 0.05,
                right: 1.0,
                bottom: 0.45,
            },
            scene: Thresholds::new(5, 8),
            risk: Thresholds::new(8, 10),
        }
    }
}

/// Configuration for every built-in hazard
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub skeleton: SkeletonConfig,
    pub extraction: ExtractionConfig,
    pub open_anchor: OpenAnchorConfig,
    pub pickup: PickupConfig,
    pub pendulum: PendulumConfig,
    pub coupling: CouplingConfig,
    pub pickup_zone: PickupZoneConfig,
    pub restricted_entry: RestrictedEntryConfig,
}

impl EngineConfig {
    /// Reject thresholds and indices that would make a scene meaningless
    pub fn validate(&self) -> Result<(), SceneError> {
        let sk = &self.skeleton;
        let indices = sk
            .feet
            .iter()
            .chain(&sk.hands)
            .chain(sk.arms.iter().flat_map(|(e, w)| [e, w]));
        for &idx in indices {
            if idx >= KEYPOINT_COUNT {
                return Err(SceneError::Config(format!(
                    "keypoint index {idx} out of range (max {})",
                    KEYPOINT_COUNT - 1
                )));
            }
        }

        let thresholds = [
            ("extraction.scene", self.extraction.scene),
            ("extraction.risk", self.extraction.risk),
            ("open_anchor.scene", self.open_anchor.scene),
            ("open_anchor.risk", self.open_anchor.risk),
            ("pickup.scene", self.pickup.scene),
            ("pickup.risk", self.pickup.risk),
            ("pendulum.scene", self.pendulum.scene),
            ("pendulum.risk", self.pendulum.risk),
            ("coupling.risk", self.coupling.risk),
            ("pickup_zone.scene", self.pickup_zone.scene),
            ("pickup_zone.risk", self.pickup_zone.risk),
            ("restricted_entry.scene", self.restricted_entry.scene),
            ("restricted_entry.risk", self.restricted_entry.risk),
        ];
        for (name, t) in thresholds {
            if t.on == 0 || t.off == 0 {
                return Err(SceneError::Config(format!("{name}: thresholds must be at least 1")));
            }
        }

        let c = &self.coupling;
        if c.scene_on == 0 {
            return Err(SceneError::Config("coupling.scene_on must be at least 1".into()));
        }
        if !(c.window_secs.is_finite() && c.window_secs > 0.0) {
            return Err(SceneError::Config("coupling.window_secs must be positive".into()));
        }
        if c.history_len < 6 {
            return Err(SceneError::Config("coupling.history_len must be at least 6".into()));
        }

        Ok(())
    }
}
