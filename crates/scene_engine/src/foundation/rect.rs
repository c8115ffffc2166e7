//! Float rectangle used for areas, collision boxes and redraw regions

use serde::{Deserialize, Serialize};

use super::math::{Quad, Vec2};

/// Axis-aligned rectangle with float coordinates
///
/// `contains` is half-open on the right/bottom edges and `intersects` is
/// strict, so rectangles that merely share an edge do not intersect.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RectF {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Horizontal extent
    pub width: f32,
    /// Vertical extent
    pub height: f32,
}

impl RectF {
    /// Create a new rectangle
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Create a rectangle from a position and a size
    pub fn from_position_size(position: Vec2, size: Vec2) -> Self {
        Self::new(position.x, position.y, size.x, size.y)
    }

    /// Left edge
    pub fn left(&self) -> f32 {
        self.x
    }

    /// Right edge
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Top edge
    pub fn top(&self) -> f32 {
        self.y
    }

    /// Bottom edge
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Top-left corner
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Width and height as a vector
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// Center point
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    /// True when every field is zero
    pub fn is_empty(&self) -> bool {
        self.x == 0.0 && self.y == 0.0 && self.width == 0.0 && self.height == 0.0
    }

    /// Reset every field to zero
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Whether the point lies inside (left/top inclusive, right/bottom exclusive)
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// [`RectF::contains`] for a vector
    pub fn contains_point(&self, p: Vec2) -> bool {
        self.contains(p.x, p.y)
    }

    /// Whether the rectangle fully contains another one
    pub fn contains_rect(&self, other: &Self) -> bool {
        self.x <= other.x
            && other.right() <= self.right()
            && self.y <= other.y
            && other.bottom() <= self.bottom()
    }

    /// Strict overlap test
    pub fn intersects(&self, other: &Self) -> bool {
        other.x < self.right() && other.y < self.bottom() && other.right() > self.x && other.bottom() > self.y
    }

    /// Smallest rectangle containing both
    pub fn union(&self, other: &Self) -> Self {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Self::new(x, y, self.right().max(other.right()) - x, self.bottom().max(other.bottom()) - y)
    }

    /// Overlapping region, or `None` when the rectangles are disjoint
    pub fn intersect(&self, other: &Self) -> Option<Self> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        (right >= x && bottom >= y).then(|| Self::new(x, y, right - x, bottom - y))
    }

    /// Grow the rectangle by `dx`/`dy` on every side
    pub fn inflate(&mut self, dx: f32, dy: f32) {
        self.x -= dx;
        self.y -= dy;
        self.width += dx * 2.0;
        self.height += dy * 2.0;
    }

    /// Move the rectangle
    pub fn offset(&mut self, dx: f32, dy: f32) {
        self.x += dx;
        self.y += dy;
    }

    /// Corner points, clockwise from the top-left
    pub fn corners(&self) -> Quad {
        [
            Vec2::new(self.x, self.y),
            Vec2::new(self.right(), self.y),
            Vec2::new(self.right(), self.bottom()),
            Vec2::new(self.x, self.bottom()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_is_half_open() {
        let rect = RectF::new(0.0, 0.0, 10.0, 10.0);

        assert!(rect.contains(0.0, 0.0));
        assert!(rect.contains(9.99, 5.0));
        assert!(!rect.contains(10.0, 5.0));
        assert!(!rect.contains(5.0, 10.0));
    }

    #[test]
    fn test_intersects_is_strict() {
        let a = RectF::new(0.0, 0.0, 10.0, 10.0);

        assert!(a.intersects(&RectF::new(5.0, 5.0, 10.0, 10.0)));
        assert!(!a.intersects(&RectF::new(10.0, 0.0, 5.0, 5.0)));
        assert!(!a.intersects(&RectF::new(20.0, 20.0, 1.0, 1.0)));
    }

    #[test]
    fn test_union() {
        let a = RectF::new(0.0, 0.0, 10.0, 10.0);
        let b = RectF::new(20.0, 20.0, 5.0, 5.0);

        assert_eq!(a.union(&b), RectF::new(0.0, 0.0, 25.0, 25.0));
    }

    #[test]
    fn test_intersect() {
        let a = RectF::new(0.0, 0.0, 10.0, 10.0);

        assert_eq!(a.intersect(&RectF::new(5.0, 2.0, 10.0, 4.0)), Some(RectF::new(5.0, 2.0, 5.0, 4.0)));
        assert_eq!(a.intersect(&RectF::new(30.0, 0.0, 1.0, 1.0)), None);
    }

    #[test]
    fn test_inflate_offset_and_empty() {
        let mut rect = RectF::new(1.0, 1.0, 2.0, 2.0);
        rect.inflate(1.0, 1.0);
        assert_eq!(rect, RectF::new(0.0, 0.0, 4.0, 4.0));

        rect.offset(2.0, -1.0);
        assert_eq!(rect.position(), Vec2::new(2.0, -1.0));

        assert!(!rect.is_empty());
        rect.reset();
        assert!(rect.is_empty());
    }
}
