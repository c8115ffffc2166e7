//! 2D view rectangle over the scene

use serde::{Deserialize, Serialize};

use crate::foundation::rect::RectF;

/// Scrolling, zoomable view
///
/// The view is kept inside `boundaries` whenever its position, size or
/// boundaries change. Zoom is expressed through the view size relative to
/// the size it was created with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    original_width: f32,
    original_height: f32,
    boundaries: Option<RectF>,
}

impl Camera {
    /// Default view width
    pub const DEFAULT_WIDTH: f32 = 640.0;
    /// Default view height
    pub const DEFAULT_HEIGHT: f32 = 480.0;

    /// Create a view at `(x, y)` with the given unscaled size
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            original_width: width,
            original_height: height,
            boundaries: None,
        }
    }

    /// Left edge
    pub fn x(&self) -> f32 {
        self.x
    }

    /// Top edge
    pub fn y(&self) -> f32 {
        self.y
    }

    /// Current view width
    pub fn width(&self) -> f32 {
        self.width
    }

    /// Current view height
    pub fn height(&self) -> f32 {
        self.height
    }

    /// Region the view is kept inside
    pub fn boundaries(&self) -> Option<RectF> {
        self.boundaries
    }

    /// Horizontal zoom factor
    pub fn scale_x(&self) -> f32 {
        self.width / self.original_width
    }

    /// Vertical zoom factor
    pub fn scale_y(&self) -> f32 {
        self.height / self.original_height
    }

    /// Move the view
    pub fn set_position(&mut self, x: f32, y: f32) {
        self.x = x;
        self.y = y;
        self.constrain();
    }

    /// Resize the view
    ///
    /// Sizes that are not strictly positive are ignored.
    pub fn set_size(&mut self, width: f32, height: f32) {
        if !(width > 0.0 && height > 0.0 && width.is_finite() && height.is_finite()) {
            log::warn!("Ignoring camera size {width}x{height}");
            return;
        }
        self.width = width;
        self.height = height;
        self.constrain();
    }

    /// Zoom relative to the original size
    pub fn set_scale(&mut self, scale_x: f32, scale_y: f32) {
        self.set_size(self.original_width * scale_x, self.original_height * scale_y);
    }

    /// Replace the bounding region
    pub fn set_boundaries(&mut self, boundaries: Option<RectF>) {
        self.boundaries = boundaries;
        self.constrain();
    }

    /// Clamp the view inside the boundaries
    ///
    /// The right and bottom edges are clamped first so that a view larger
    /// than the boundaries ends up aligned on the top-left corner.
    pub fn constrain(&mut self) {
        let Some(bounds) = self.boundaries.filter(|b| !b.is_empty()) else {
            return;
        };

        if self.x + self.width > bounds.right() {
            self.x = bounds.right() - self.width;
        }
        if self.y + self.height > bounds.bottom() {
            self.y = bounds.bottom() - self.height;
        }
        if self.x < bounds.left() {
            self.x = bounds.left();
        }
        if self.y < bounds.top() {
            self.y = bounds.top();
        }
    }

    /// Back to the origin at the default size, without boundaries
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(0.0, 0.0, Self::DEFAULT_WIDTH, Self::DEFAULT_HEIGHT)
    }
}
