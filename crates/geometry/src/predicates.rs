//! Per-frame predicates composed by the hazard scenes

use crate::{BBox, Point, Polygon, Shape};

/// Intersection area normalized by the smaller box.
///
/// `area(A ∩ B) / max(min(area(A), area(B)), 1)`: a small object fully covered
/// by a large one reads as fully overlapping.
pub fn overlap_ratio(a: &BBox, b: &BBox) -> f64 {
    let inter = a.intersection(b).map(|i| i.area()).unwrap_or(0.0);
    inter / a.area().min(b.area()).max(1.0)
}

/// Minimum Euclidean distance between two boxes; zero if they intersect or touch.
pub fn gap(a: &BBox, b: &BBox) -> f64 {
    let dx = (a.x1 - b.x2).max(b.x1 - a.x2).max(0.0);
    let dy = (a.y1 - b.y2).max(b.y1 - a.y2).max(0.0);
    dx.hypot(dy)
}

/// True when the horizontal distance between the centroids is below
/// `ratio × average width`.
pub fn horizontal_alignment(a: &BBox, b: &BBox, ratio: f64) -> bool {
    let w_avg = (a.width() + b.width()) / 2.0;
    (a.centroid().x - b.centroid().x).abs() < w_avg * ratio
}

/// Inclusive point-in-polygon: strict containment or a boundary touch.
pub fn point_in_or_on_polygon(p: Point, poly: &Polygon) -> bool {
    poly.contains_or_touches(p)
}

/// True if any of `points` lies within `threshold` of `shape`.
pub fn any_within_distance<S, I>(points: I, shape: &S, threshold: f64) -> bool
where
    S: Shape + ?Sized,
    I: IntoIterator<Item = Point>,
{
    points
        .into_iter()
        .any(|p| shape.distance_to(p) <= threshold)
}

/// Estimated fingertip position beyond the wrist.
///
/// Extends the elbow→wrist vector past the wrist by
/// `extension_factor × |elbow→wrist|`. Forearms shorter than one pixel
/// return the wrist unchanged.
pub fn virtual_fingertip(elbow: Point, wrist: Point, extension_factor: f64) -> Point {
    let forearm = wrist - elbow;
    if forearm.norm() < 1.0 {
        return wrist;
    }
    wrist + forearm * extension_factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_overlap_ratio_contained() {
        let big = BBox::new(0.0, 0.0, 100.0, 100.0);
        let small = BBox::new(10.0, 10.0, 20.0, 20.0);
        assert!((overlap_ratio(&big, &small) - 1.0).abs() < 1e-12);
        assert!((overlap_ratio(&small, &big) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_overlap_ratio_identical_is_one() {
        let a = BBox::new(3.0, 4.0, 50.0, 80.0);
        assert_eq!(overlap_ratio(&a, &a), 1.0);
    }

    #[test]
    fn test_overlap_ratio_disjoint() {
        let a = BBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BBox::new(20.0, 20.0, 30.0, 30.0);
        assert_eq!(overlap_ratio(&a, &b), 0.0);
    }

    #[test]
    fn test_overlap_ratio_tiny_boxes_use_unit_floor() {
        // Both areas < 1: normalized by 1 rather than the tiny area
        let a = BBox::new(0.0, 0.0, 0.5, 0.5);
        let b = BBox::new(0.0, 0.0, 0.5, 0.5);
        assert!((overlap_ratio(&a, &b) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_gap() {
        let a = BBox::new(0.0, 0.0, 10.0, 10.0);
        assert_eq!(gap(&a, &BBox::new(5.0, 5.0, 15.0, 15.0)), 0.0);
        assert_eq!(gap(&a, &BBox::new(10.0, 0.0, 20.0, 10.0)), 0.0);
        assert_eq!(gap(&a, &BBox::new(0.0, 13.0, 10.0, 20.0)), 3.0);
        assert!((gap(&a, &BBox::new(13.0, 14.0, 20.0, 20.0)) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_horizontal_alignment() {
        let a = BBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BBox::new(4.0, 50.0, 14.0, 60.0);
        // centroid dx = 4, average width = 10
        assert!(horizontal_alignment(&a, &b, 0.8));
        assert!(!horizontal_alignment(&a, &b, 0.4));
    }

    #[test]
    fn test_any_within_distance() {
        let b = BBox::new(0.0, 0.0, 10.0, 10.0);
        let feet = vec![Point::new(50.0, 50.0), Point::new(15.0, 5.0)];
        assert!(any_within_distance(feet.clone(), &b, 5.0));
        assert!(!any_within_distance(feet, &b, 4.9));
        assert!(!any_within_distance(Vec::new(), &b, 100.0));
    }

    #[test]
    fn test_virtual_fingertip() {
        let tip = virtual_fingertip(Point::new(0.0, 0.0), Point::new(10.0, 0.0), 0.65);
        assert!((tip.x - 16.5).abs() < 1e-9);
        assert_eq!(tip.y, 0.0);
    }

    #[test]
    fn test_virtual_fingertip_degenerate_forearm() {
        let wrist = Point::new(5.2, 5.2);
        let tip = virtual_fingertip(Point::new(5.0, 5.0), wrist, 0.65);
        assert_eq!(tip, wrist);
    }

    fn arb_box() -> impl Strategy<Value = BBox> {
        (0.0..500.0f64, 0.0..500.0f64, 0.0..200.0f64, 0.0..200.0f64)
            .prop_map(|(x, y, w, h)| BBox::new(x, y, x + w, y + h))
    }

    proptest! {
        #[test]
        fn prop_overlap_ratio_symmetric(a in arb_box(), b in arb_box()) {
            prop_assert!((overlap_ratio(&a, &b) - overlap_ratio(&b, &a)).abs() < 1e-12);
        }

        #[test]
        fn prop_overlap_ratio_bounded(a in arb_box(), b in arb_box()) {
            let r = overlap_ratio(&a, &b);
            prop_assert!((0.0..=1.0 + 1e-12).contains(&r));
        }

        #[test]
        fn prop_gap_symmetric_and_zero_when_overlapping(a in arb_box(), b in arb_box()) {
            prop_assert!((gap(&a, &b) - gap(&b, &a)).abs() < 1e-12);
            if a.intersection(&b).is_some() {
                prop_assert_eq!(gap(&a, &b), 0.0);
            }
        }
    }
}
