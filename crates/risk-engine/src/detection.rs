//! Detection record consumed by the scenes
//!
//! Produced by the external object and pose detectors, read-only here.
//! A missing class or an empty pose list is a valid state, not an error.

use geometry::{BBox, Point};
use serde::{Deserialize, Serialize};

/// Number of keypoints per person (COCO-17 skeleton)
pub const KEYPOINT_COUNT: usize = 17;

/// Reserved skeleton indices
pub mod skeleton {
    pub const LEFT_ELBOW: usize = 7;
    pub const RIGHT_ELBOW: usize = 8;
    pub const LEFT_WRIST: usize = 9;
    pub const RIGHT_WRIST: usize = 10;
    pub const LEFT_ANKLE: usize = 15;
    pub const RIGHT_ANKLE: usize = 16;
}

/// One detected object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Class label from the object model
    pub class_name: String,

    /// Bounding box in pixels, `[x1, y1, x2, y2]`
    pub bbox: BBox,

    /// Detection confidence
    #[serde(default = "default_confidence")]
    pub confidence: f32,
}

fn default_confidence() -> f32 {
    1.0
}

/// Keypoints of one detected person
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub keypoints: [Point; KEYPOINT_COUNT],
}

impl Pose {
    /// Build a pose from `(index, point)` pairs; unspecified keypoints stay at the origin.
    pub fn from_points(points: &[(usize, Point)]) -> Self {
        let mut pose = Pose::default();
        for &(idx, p) in points {
            if let Some(slot) = pose.keypoints.get_mut(idx) {
                *slot = p;
            }
        }
        pose
    }

    pub fn keypoint(&self, idx: usize) -> Option<Point> {
        self.keypoints.get(idx).copied()
    }
}

/// Everything the detectors produced for one video frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionFrame {
    /// Frame width in pixels
    pub width: u32,

    /// Frame height in pixels
    pub height: u32,

    #[serde(default)]
    pub objects: Vec<Detection>,

    #[serde(default)]
    pub poses: Vec<Pose>,
}

impl DetectionFrame {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    pub fn with_object(mut self, class_name: &str, bbox: BBox) -> Self {
        self.objects.push(Detection {
            class_name: class_name.to_string(),
            bbox,
            confidence: 1.0,
        });
        self
    }

    pub fn with_pose(mut self, pose: Pose) -> Self {
        self.poses.push(pose);
        self
    }

    /// Box for a class. When the class was detected more than once the last
    /// detection in the record wins.
    pub fn box_of(&self, class_name: &str) -> Option<&BBox> {
        self.objects
            .iter()
            .rev()
            .find(|d| d.class_name == class_name)
            .map(|d| &d.bbox)
    }

    /// All boxes detected for a class, in record order
    pub fn boxes_of<'a>(&'a self, class_name: &'a str) -> impl Iterator<Item = &'a BBox> + 'a {
        self.objects
            .iter()
            .filter(move |d| d.class_name == class_name)
            .map(|d| &d.bbox)
    }

    pub fn has_class(&self, class_name: &str) -> bool {
        self.objects.iter().any(|d| d.class_name == class_name)
    }

    /// The keypoints at `indices` for every detected person
    pub fn keypoints<'a>(&'a self, indices: &'a [usize]) -> impl Iterator<Item = Point> + 'a {
        self.poses
            .iter()
            .flat_map(move |pose| indices.iter().filter_map(move |&i| pose.keypoint(i)))
    }
}
