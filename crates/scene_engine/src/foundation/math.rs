//! Math utilities and types
//!
//! Provides the 2D vector and homogeneous matrix aliases used by the scene
//! graph, plus the rectangle/point helpers shared by the area pass and the
//! collision queries.

use serde::{Deserialize, Serialize};

use super::rect::RectF;

pub use nalgebra::{Matrix3, Vector2};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3x3 matrix type, used as a homogeneous 2D transform
pub type Mat3 = Matrix3<f32>;

/// Four corner points of an oriented rectangle, clockwise from the top-left
pub type Quad = [Vec2; 4];

/// Common math constants
pub mod constants {
    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = std::f32::consts::PI / 180.0;

    /// Radians to degrees conversion factor
    pub const RAD_TO_DEG: f32 = 180.0 / std::f32::consts::PI;

    /// Full turn in radians
    pub const TAU: f32 = std::f32::consts::TAU;
}

/// Math utility functions
pub mod utils {
    use super::constants::{DEG_TO_RAD, RAD_TO_DEG};

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * DEG_TO_RAD
    }

    /// Convert radians to degrees
    pub fn rad_to_deg(radians: f32) -> f32 {
        radians * RAD_TO_DEG
    }

    /// Clamp a value between min and max
    pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
        value.max(min).min(max)
    }

    /// Linear interpolation
    pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
        a + (b - a) * t
    }
}

/// RGBA color with normalized `0..=1` channels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    /// Red channel
    pub r: f32,
    /// Green channel
    pub g: f32,
    /// Blue channel
    pub b: f32,
    /// Alpha channel
    pub a: f32,
}

impl Color {
    /// Opaque white, the identity for [`Color::modulate`]
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);

    /// Opaque black
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0, 1.0);

    /// Create a color from normalized channels
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Create a color from 8-bit channels
    pub fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::new(
            f32::from(r) / 255.0,
            f32::from(g) / 255.0,
            f32::from(b) / 255.0,
            f32::from(a) / 255.0,
        )
    }

    /// Per-channel product of two colors
    pub fn modulate(self, other: Self) -> Self {
        Self::new(self.r * other.r, self.g * other.g, self.b * other.b, self.a * other.a)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Rotate a point around the origin by `radians`
pub fn rotate(p: Vec2, radians: f32) -> Vec2 {
    let (sin, cos) = radians.sin_cos();
    Vec2::new(p.x * cos - p.y * sin, p.y * cos + p.x * sin)
}

/// Euclidean distance between two points
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    (b - a).norm()
}

/// Build the four corners of a rectangle of `size`, pivoting around
/// `offset` (unscaled local units), scaled, rotated and finally moved to `pos`.
pub fn get_rectangle(pos: Vec2, size: Vec2, offset: Vec2, scale: Vec2, radians: f32) -> Quad {
    let mut points = [
        Vec2::new(-offset.x * scale.x, -offset.y * scale.y),
        Vec2::new((size.x - offset.x) * scale.x, -offset.y * scale.y),
        Vec2::new((size.x - offset.x) * scale.x, (size.y - offset.y) * scale.y),
        Vec2::new(-offset.x * scale.x, (size.y - offset.y) * scale.y),
    ];

    let rotated = radians % constants::TAU != 0.0;
    for point in &mut points {
        if rotated {
            *point = rotate(*point, radians);
        }
        *point += pos;
    }

    points
}

/// Map points into a parent space: `offset + rotate((p - origin) * scale)`
pub fn transform_points(points: &Quad, offset: Vec2, origin: Vec2, scale: Vec2, radians: f32) -> Quad {
    points.map(|p| {
        let scaled = (p - origin).component_mul(&scale);
        if radians == 0.0 {
            offset + scaled
        } else {
            offset + rotate(scaled, radians)
        }
    })
}

/// Axis-aligned bounding box of a point set
///
/// An empty slice yields an all-zero rectangle.
pub fn bounding_box(points: &[Vec2]) -> RectF {
    let Some(first) = points.first() else {
        return RectF::default();
    };

    let (mut min, mut max) = (*first, *first);
    for p in &points[1..] {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
    }

    RectF::new(min.x, min.y, max.x - min.x, max.y - min.y)
}

/// Axis-aligned bounding box spanned by a segment
pub fn segment_area(start: Vec2, end: Vec2) -> RectF {
    bounding_box(&[start, end])
}

/// Homogeneous 2D translation matrix
pub fn translation(offset: Vec2) -> Mat3 {
    Mat3::new_translation(&offset)
}

/// Homogeneous 2D rotation matrix
pub fn rotation(radians: f32) -> Mat3 {
    Mat3::new_rotation(radians)
}

/// Apply a homogeneous 2D transform to a point
pub fn transform_point(matrix: &Mat3, p: Vec2) -> Vec2 {
    let h = matrix * nalgebra::Vector3::new(p.x, p.y, 1.0);
    Vec2::new(h.x, h.y)
}
