//! Segment intersection

use crate::foundation::math::Vec2;

/// Intersection of two segments
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentHit {
    /// Intersection point
    pub point: Vec2,
    /// Parameter along the first segment, in `[0, 1]`
    pub ratio_a: f32,
    /// Parameter along the second segment, in `[0, 1]`
    pub ratio_b: f32,
}

/// Parametric intersection of segment `a0 → a1` with `b0 → b1`
///
/// Segments whose slopes compare equal are treated as parallel and never
/// intersect, including colinear overlapping ones. Vertical segments have an
/// infinite slope, so two vertical segments are parallel as well.
pub fn segment_intersection(a0: Vec2, a1: Vec2, b0: Vec2, b1: Vec2) -> Option<SegmentHit> {
    let (x1, y1, x2, y2) = (a0.x, a0.y, a1.x, a1.y);
    let (x3, y3, x4, y4) = (b0.x, b0.y, b1.x, b1.y);

    #[allow(clippy::float_cmp)]
    let parallel = (y2 - y1) / (x2 - x1) == (y4 - y3) / (x4 - x3);
    if parallel {
        return None;
    }

    let d = (x2 - x1) * (y4 - y3) - (y2 - y1) * (x4 - x3);
    if d == 0.0 {
        return None;
    }

    let r = ((y1 - y3) * (x4 - x3) - (x1 - x3) * (y4 - y3)) / d;
    let s = ((y1 - y3) * (x2 - x1) - (x1 - x3) * (y2 - y1)) / d;

    ((0.0..=1.0).contains(&r) && (0.0..=1.0).contains(&s)).then(|| SegmentHit {
        point: Vec2::new(x1 + r * (x2 - x1), y1 + r * (y2 - y1)),
        ratio_a: r,
        ratio_b: s,
    })
}

/// Whether two segments cross
pub fn segments_intersect(a0: Vec2, a1: Vec2, b0: Vec2, b1: Vec2) -> bool {
    segment_intersection(a0, a1, b0, b1).is_some()
}

/// Whether a segment crosses any edge of a closed polygon
pub fn segment_crosses_polygon(start: Vec2, end: Vec2, polygon: &[Vec2]) -> bool {
    (0..polygon.len()).any(|i| segments_intersect(start, end, polygon[i], polygon[(i + 1) % polygon.len()]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_crossing_segments() {
        let hit = segment_intersection(
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 10.0),
            Vec2::new(0.0, 10.0),
            Vec2::new(10.0, 0.0),
        )
        .expect("segments cross");

        assert_relative_eq!(hit.point.x, 5.0, epsilon = 1e-5);
        assert_relative_eq!(hit.point.y, 5.0, epsilon = 1e-5);
        assert_relative_eq!(hit.ratio_a, 0.5, epsilon = 1e-5);
        assert_relative_eq!(hit.ratio_b, 0.5, epsilon = 1e-5);
    }

    #[test]
    fn test_segments_that_miss() {
        assert!(!segments_intersect(
            Vec2::new(0.0, 0.0),
            Vec2::new(4.0, 4.0),
            Vec2::new(0.0, 10.0),
            Vec2::new(10.0, 0.0),
        ));
    }

    #[test]
    fn test_colinear_overlap_is_not_an_intersection() {
        assert!(!segments_intersect(
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(5.0, 0.0),
            Vec2::new(15.0, 0.0),
        ));
        assert!(!segments_intersect(
            Vec2::new(0.0, 0.0),
            Vec2::new(0.0, 10.0),
            Vec2::new(0.0, 5.0),
            Vec2::new(0.0, 15.0),
        ));
    }

    #[test]
    fn test_parallel_offset_segments() {
        assert!(!segments_intersect(
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 5.0),
            Vec2::new(0.0, 1.0),
            Vec2::new(10.0, 6.0),
        ));
    }

    #[test]
    fn test_vertical_against_horizontal() {
        let hit = segment_intersection(
            Vec2::new(5.0, -5.0),
            Vec2::new(5.0, 5.0),
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
        )
        .expect("segments cross");

        assert_relative_eq!(hit.point.x, 5.0, epsilon = 1e-5);
        assert_relative_eq!(hit.point.y, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn test_segment_crosses_polygon() {
        let square = [
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(10.0, 10.0),
            Vec2::new(0.0, 10.0),
        ];

        assert!(segment_crosses_polygon(Vec2::new(-5.0, 5.0), Vec2::new(15.0, 5.0), &square));
        assert!(!segment_crosses_polygon(Vec2::new(-5.0, 15.0), Vec2::new(15.0, 15.0), &square));
    }
}
