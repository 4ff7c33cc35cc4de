//! Geometric Predicate Toolkit
//!
//! Stateless building blocks for the hazard scenes:
//! - Axis-aligned boxes, points and simple polygons
//! - Overlap ratio normalized by the smaller shape
//! - Gap (minimum distance) between shapes
//! - Horizontal alignment of box centroids
//! - Inclusive point-in-polygon test
//! - Virtual fingertip extrapolation along the forearm

mod bbox;
mod point;
mod polygon;
pub mod predicates;

pub use bbox::BBox;
pub use point::Point;
pub use polygon::Polygon;
pub use predicates::{
    any_within_distance, gap, horizontal_alignment, overlap_ratio, point_in_or_on_polygon,
    virtual_fingertip,
};

use thiserror::Error;

/// Geometry error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("Polygon needs at least 3 vertices, got {0}")]
    TooFewVertices(usize),

    #[error("Non-finite coordinate in shape")]
    NonFinite,
}

/// Anything a point can be measured against.
pub trait Shape {
    /// Euclidean distance from `p` to the shape (zero when inside or on it)
    fn distance_to(&self, p: Point) -> f64;
}
