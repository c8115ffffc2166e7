//! Convex polygon tests: separating-axis overlap and point containment
//!
//! Polygons are plain point slices in world space. Scene entities feed their
//! oriented quads; nothing here assumes four points.

use crate::foundation::math::{bounding_box, Vec2};

/// Result of a separating-axis test
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolygonCollision {
    /// Whether the polygons currently overlap
    pub intersect: bool,
    /// Translation to apply to polygon A to separate it from B
    ///
    /// Only filled when the test runs in resolve mode; zero otherwise.
    pub minimum_translation: Vec2,
}

/// Separating-axis overlap test between two convex polygons
///
/// Every edge of both polygons contributes its normal as a candidate axis.
/// The first axis on which the projections are separated ends the search.
/// Projections that only touch count as overlapping. With `resolve` set, the
/// axis of least penetration is tracked, oriented from B towards A, and
/// scaled into a minimum translation vector.
pub fn polygon_collision(a: &[Vec2], b: &[Vec2], resolve: bool) -> PolygonCollision {
    let mut result = PolygonCollision {
        intersect: true,
        minimum_translation: Vec2::zeros(),
    };

    if a.is_empty() || b.is_empty() {
        result.intersect = false;
        return result;
    }

    let (center_a, center_b) = if resolve {
        (centroid(a), centroid(b))
    } else {
        (Vec2::zeros(), Vec2::zeros())
    };

    let mut min_distance = f32::INFINITY;
    let mut translation_axis = Vec2::zeros();

    let edges = edges(a).chain(edges(b));
    for edge in edges {
        // Zero-length edges carry no direction
        let Some(axis) = Vec2::new(-edge.y, edge.x).try_normalize(f32::EPSILON) else {
            continue;
        };

        let (min_a, max_a) = project(axis, a);
        let (min_b, max_b) = project(axis, b);
        let distance = interval_distance(min_a, max_a, min_b, max_b);

        if distance > 0.0 {
            result.intersect = false;
            break;
        }

        if resolve {
            let depth = distance.abs();
            if depth < min_distance {
                min_distance = depth;
                translation_axis = if (center_a - center_b).dot(&axis) < 0.0 {
                    -axis
                } else {
                    axis
                };
            }
        }
    }

    if resolve && result.intersect {
        result.minimum_translation = translation_axis * min_distance;
    }

    result
}

/// Crossing-number containment test
///
/// A horizontal ray is cast from the point to just past the polygon's right
/// edge; an odd number of crossings means inside. Points exactly on an edge
/// resolve deterministically but either way.
pub fn point_in_polygon(point: Vec2, polygon: &[Vec2]) -> bool {
    if polygon.is_empty() {
        return false;
    }

    let end_x = bounding_box(polygon).right() + 1.0;
    let mut inside = false;

    for (i, start) in polygon.iter().enumerate() {
        let end = polygon[(i + 1) % polygon.len()];

        let crosses = (start.y <= point.y && end.y > point.y) || (start.y > point.y && end.y <= point.y);
        if crosses {
            let slope = (end.x - start.x) / (end.y - start.y);
            let hit_x = start.x + (point.y - start.y) * slope;

            if hit_x >= point.x && hit_x <= end_x {
                inside = !inside;
            }
        }
    }

    inside
}

/// Gap between two projected intervals; negative when they overlap
pub fn interval_distance(min_a: f32, max_a: f32, min_b: f32, max_b: f32) -> f32 {
    if min_a < min_b {
        min_b - max_a
    } else {
        min_a - max_b
    }
}

/// Project a polygon onto an axis, returning `(min, max)`
pub fn project(axis: Vec2, polygon: &[Vec2]) -> (f32, f32) {
    polygon.iter().fold((f32::INFINITY, f32::NEG_INFINITY), |(min, max), p| {
        let d = axis.dot(p);
        (min.min(d), max.max(d))
    })
}

/// Average of the polygon's points
pub fn centroid(polygon: &[Vec2]) -> Vec2 {
    let sum = polygon.iter().fold(Vec2::zeros(), |acc, p| acc + p);
    #[allow(clippy::cast_precision_loss)]
    let count = polygon.len().max(1) as f32;
    sum / count
}

fn edges(polygon: &[Vec2]) -> impl Iterator<Item = Vec2> + '_ {
    (0..polygon.len()).map(move |i| polygon[i] - polygon[(i + 1) % polygon.len()])
}
