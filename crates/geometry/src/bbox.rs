//! Axis-aligned bounding boxes

use crate::{Point, Shape};
use serde::{Deserialize, Serialize};

/// Axis-aligned box in `xyxy` form. Serialized as `[x1, y1, x2, y2]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct BBox {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl BBox {
    /// Create a box from two corners; the corners are normalized so that
    /// `x1 <= x2` and `y1 <= y2`.
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            x1: x1.min(x2),
            y1: y1.min(y2),
            x2: x1.max(x2),
            y2: y1.max(y2),
        }
    }

    pub fn width(&self) -> f64 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f64 {
        self.y2 - self.y1
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    pub fn centroid(&self) -> Point {
        Point::new((self.x1 + self.x2) / 2.0, (self.y1 + self.y2) / 2.0)
    }

    /// Intersection with another box, if they overlap with positive area
    pub fn intersection(&self, other: &BBox) -> Option<BBox> {
        let x1 = self.x1.max(other.x1);
        let y1 = self.y1.max(other.y1);
        let x2 = self.x2.min(other.x2);
        let y2 = self.y2.min(other.y2);
        if x2 > x1 && y2 > y1 {
            Some(BBox { x1, y1, x2, y2 })
        } else {
            None
        }
    }

    /// Strict interior test: points on the border are outside.
    pub fn contains_strict(&self, p: Point) -> bool {
        p.x > self.x1 && p.x < self.x2 && p.y > self.y1 && p.y < self.y2
    }

    /// Inclusive test: points on the border are inside.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x1 && p.x <= self.x2 && p.y >= self.y1 && p.y <= self.y2
    }

    /// Sub-rectangle expressed as fractions of this box's width and height.
    ///
    /// `left`/`right` are measured from `x1`, `top`/`bottom` from `y1`.
    pub fn fractional(&self, left: f64, top: f64, right: f64, bottom: f64) -> BBox {
        let (w, h) = (self.width(), self.height());
        BBox::new(
            self.x1 + w * left,
            self.y1 + h * top,
            self.x1 + w * right,
            self.y1 + h * bottom,
        )
    }
}

impl Shape for BBox {
    fn distance_to(&self, p: Point) -> f64 {
        let dx = (self.x1 - p.x).max(0.0).max(p.x - self.x2);
        let dy = (self.y1 - p.y).max(0.0).max(p.y - self.y2);
        dx.hypot(dy)
    }
}

impl From<[f64; 4]> for BBox {
    fn from([x1, y1, x2, y2]: [f64; 4]) -> Self {
        BBox::new(x1, y1, x2, y2)
    }
}

impl From<BBox> for [f64; 4] {
    fn from(b: BBox) -> Self {
        [b.x1, b.y1, b.x2, b.y2]
    }
}
