//! Physics module for collision detection
//!
//! Provides the narrow-phase geometry behind the scene queries: separating
//! axis overlap for convex polygons, crossing-number containment, segment
//! intersection and collision layer filtering. There is no integration or
//! response step.

pub mod collision_layers;
pub mod polygon;
pub mod segment;

pub use collision_layers::CollisionMask;
pub use polygon::{point_in_polygon, polygon_collision, PolygonCollision};
pub use segment::{segment_crosses_polygon, segment_intersection, segments_intersect, SegmentHit};
