//! Content carried by an entity
//!
//! The set of leaf kinds is closed: a node is either a plain container or
//! one of the content-bearing variants. Leaves seed their bounding area with
//! the entity's original size; the renderer decides how to draw them.

use crate::foundation::rect::RectF;

/// Text alignment relative to the entity's pivot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    /// No alignment is applied
    #[default]
    None,
    /// Align on the left-most point
    Left,
    /// Align on the center point
    Center,
    /// Align on the right-most point
    Right,
}

/// A textured quad
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ImageContent {
    /// Texture key in the content storage
    pub texture: Option<String>,
    /// Source region of the texture, the whole texture when `None`
    pub source: Option<RectF>,
    /// Mirror horizontally
    pub flip_x: bool,
    /// Mirror vertically
    pub flip_y: bool,
}

/// A run of text, measured by the host
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextContent {
    /// The string to draw
    pub text: String,
    /// Font key
    pub font: Option<String>,
    /// Alignment
    pub align: TextAlign,
}

/// Frame-strip animation playback state
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationState {
    /// Descriptor key in the animation storage
    pub descriptor: Option<String>,
    /// Number of frames, zero while nothing is loaded
    pub frame_count: u32,
    /// Playback speed
    pub frames_per_second: f32,
    /// Fractional playhead, in frames
    pub current_frame: f32,
    /// Wrap around at the end
    pub looping: bool,
    /// Whether `advance` moves the playhead
    pub playing: bool,
}

impl AnimationState {
    /// Create a playing animation
    pub fn new(frame_count: u32, frames_per_second: f32, looping: bool) -> Self {
        Self {
            descriptor: None,
            frame_count,
            frames_per_second,
            current_frame: 0.0,
            looping,
            playing: frame_count > 0,
        }
    }

    /// Whether frames are available
    pub fn is_loaded(&self) -> bool {
        self.frame_count > 0
    }

    /// Index of the frame to draw
    pub fn frame_index(&self) -> u32 {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let index = self.current_frame.floor().max(0.0) as u32;
        index.min(self.frame_count.saturating_sub(1))
    }

    /// Move the playhead forward; returns `true` when a non-looping
    /// animation reaches its last frame
    pub fn advance(&mut self, delta_time: f32) -> bool {
        if !self.playing || !self.is_loaded() {
            return false;
        }

        #[allow(clippy::cast_precision_loss)]
        let count = self.frame_count as f32;
        self.current_frame += delta_time * self.frames_per_second;

        if self.current_frame < count {
            return false;
        }

        if self.looping {
            self.current_frame %= count;
            false
        } else {
            self.current_frame = count - 1.0;
            self.playing = false;
            true
        }
    }

    /// Rewind to the first frame and play
    pub fn restart(&mut self) {
        self.current_frame = 0.0;
        self.playing = self.is_loaded();
    }
}

impl Default for AnimationState {
    fn default() -> Self {
        Self::new(0, 0.0, false)
    }
}

/// Entity payload
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Visual {
    /// Grouping node with no content of its own
    #[default]
    Container,
    /// Textured quad
    Image(ImageContent),
    /// Text run
    Text(TextContent),
    /// Frame animation
    Animation(AnimationState),
}

impl Visual {
    /// Whether the payload has its own extent (seeded from the original size)
    pub fn has_intrinsic_area(&self) -> bool {
        match self {
            Self::Container => false,
            Self::Image(_) | Self::Text(_) => true,
            Self::Animation(state) => state.is_loaded(),
        }
    }

    /// Short name used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Container => "container",
            Self::Image(_) => "image",
            Self::Text(_) => "text",
            Self::Animation(_) => "animation",
        }
    }

    /// Drop references to external resources
    ///
    /// Playback state is always stopped; with `force` the content keys are
    /// dropped as well so the host can release the backing resources.
    pub fn release(&mut self, force: bool) {
        match self {
            Self::Container => {}
            Self::Image(image) => {
                if force {
                    image.texture = None;
                }
            }
            Self::Text(text) => {
                if force {
                    text.font = None;
                }
            }
            Self::Animation(state) => {
                state.playing = false;
                if force {
                    state.descriptor = None;
                    state.frame_count = 0;
                }
            }
        }
    }
}
