//! Simple (non self-intersecting) polygons for fixed danger zones

use crate::{GeometryError, Point, Shape};
use serde::{Deserialize, Serialize};

/// Tolerance used when deciding whether a point lies on an edge
const EDGE_EPSILON: f64 = 1e-9;

/// Closed polygon given by its vertices. A repeated closing vertex is allowed.
///
/// Serialized as a list of `[x, y]` pairs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<[f64; 2]>", into = "Vec<[f64; 2]>")]
pub struct Polygon {
    vertices: Vec<Point>,
}

impl Polygon {
    /// Create a polygon; at least three vertices with finite coordinates are required.
    pub fn new(vertices: Vec<Point>) -> Result<Self, GeometryError> {
        if vertices.len() < 3 {
            return Err(GeometryError::TooFewVertices(vertices.len()));
        }
        if vertices.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
            return Err(GeometryError::NonFinite);
        }
        Ok(Self { vertices })
    }

    /// Build a polygon from constant vertex data known to be valid.
    /// Validation only runs in debug builds.
    pub fn from_trusted(raw: &[[f64; 2]]) -> Self {
        let vertices: Vec<Point> = raw.iter().copied().map(Point::from).collect();
        debug_assert!(Polygon::new(vertices.clone()).is_ok(), "invalid built-in polygon");
        Self { vertices }
    }

    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    /// Iterate over the edges, including the closing one
    pub fn edges(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }

    /// True when `p` lies on one of the edges
    pub fn touches(&self, p: Point) -> bool {
        self.edges()
            .any(|(a, b)| p.distance_to_segment(a, b) <= EDGE_EPSILON)
    }

    /// Strict interior test (even-odd ray casting)
    pub fn contains_strict(&self, p: Point) -> bool {
        if self.touches(p) {
            return false;
        }
        let mut inside = false;
        for (a, b) in self.edges() {
            if (a.y > p.y) != (b.y > p.y) {
                let x_cross = a.x + (p.y - a.y) * (b.x - a.x) / (b.y - a.y);
                if p.x < x_cross {
                    inside = !inside;
                }
            }
        }
        inside
    }

    /// Inclusive test: interior or boundary
    pub fn contains_or_touches(&self, p: Point) -> bool {
        self.touches(p) || self.contains_strict(p)
    }
}

impl Shape for Polygon {
    fn distance_to(&self, p: Point) -> f64 {
        if self.contains_or_touches(p) {
            return 0.0;
        }
        self.edges()
            .map(|(a, b)| p.distance_to_segment(a, b))
            .fold(f64::INFINITY, f64::min)
    }
}

impl TryFrom<Vec<[f64; 2]>> for Polygon {
    type Error = GeometryError;

    fn try_from(raw: Vec<[f64; 2]>) -> Result<Self, Self::Error> {
        Polygon::new(raw.into_iter().map(Point::from).collect())
    }
}

impl From<Polygon> for Vec<[f64; 2]> {
    fn from(poly: Polygon) -> Self {
        poly.vertices.into_iter().map(<[f64; 2]>::from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Polygon {
        Polygon::try_from(vec![[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0]]).unwrap()
    }

    #[test]
    fn test_rejects_degenerate() {
        let err = Polygon::try_from(vec![[0.0, 0.0], [1.0, 1.0]]).unwrap_err();
        assert_eq!(err, GeometryError::TooFewVertices(2));
    }

    #[test]
    fn test_interior_boundary_exterior() {
        let sq = square();
        assert!(sq.contains_strict(Point::new(5.0, 5.0)));
        assert!(sq.contains_or_touches(Point::new(5.0, 5.0)));

        assert!(!sq.contains_strict(Point::new(10.0, 5.0)));
        assert!(sq.touches(Point::new(10.0, 5.0)));
        assert!(sq.contains_or_touches(Point::new(0.0, 0.0)));

        assert!(!sq.contains_or_touches(Point::new(11.0, 5.0)));
    }

    #[test]
    fn test_concave_polygon() {
        // U-shape: the notch between the arms is outside
        let u = Polygon::try_from(vec![
            [0.0, 0.0],
            [30.0, 0.0],
            [30.0, 30.0],
            [20.0, 30.0],
            [20.0, 10.0],
            [10.0, 10.0],
            [10.0, 30.0],
            [0.0, 30.0],
        ])
        .unwrap();
        assert!(u.contains_strict(Point::new(5.0, 20.0)));
        assert!(!u.contains_or_touches(Point::new(15.0, 20.0)));
    }

    #[test]
    fn test_distance() {
        let sq = square();
        assert_eq!(sq.distance_to(Point::new(5.0, 5.0)), 0.0);
        assert!((sq.distance_to(Point::new(5.0, 14.0)) - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_closing_vertex_is_harmless() {
        let closed = Polygon::try_from(vec![
            [0.0, 0.0],
            [10.0, 0.0],
            [10.0, 10.0],
            [0.0, 10.0],
            [0.0, 0.0],
        ])
        .unwrap();
        assert!(closed.contains_strict(Point::new(5.0, 5.0)));
        assert!(!closed.contains_or_touches(Point::new(-1.0, 5.0)));
    }
}
