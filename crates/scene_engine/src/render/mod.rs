//! Renderer boundary
//!
//! The scene graph never touches pixels. During the draw traversal it hands
//! every visible, non-culled entity to a [`Renderer`] as a [`DrawCommand`]
//! carrying pre-computed world state.
//!
//! # Design Philosophy
//!
//! The renderer should be a passive consumer that:
//! - Accepts composed world state (no transform logic)
//! - Accepts content keys (no entity management)
//! - Only handles drawing (no lifecycle, input, or timing)

use crate::foundation::math::{Color, Vec2};
use crate::foundation::rect::RectF;
use crate::scene::{EntityId, Visual};

/// One entity to draw
#[derive(Debug, Clone, Copy)]
pub struct DrawCommand<'a> {
    /// Entity being drawn
    pub entity: EntityId,
    /// Entity name, if any
    pub name: Option<&'a str>,
    /// World position of the pivot
    pub position: Vec2,
    /// World rotation in degrees
    pub rotation_degrees: f32,
    /// World scale
    pub scale: Vec2,
    /// Pivot in unscaled local units
    pub origin: Vec2,
    /// Combined tint, alpha applied
    pub tint: Color,
    /// Payload to draw
    pub visual: &'a Visual,
    /// Unscaled content size
    pub original_size: Vec2,
    /// World-space clip, if any ancestor or the entity sets one
    pub clip: Option<RectF>,
}

/// Draw-call sink implemented by the host
pub trait Renderer {
    /// Draw a single entity
    fn draw_entity(&mut self, command: &DrawCommand<'_>);
}

/// Owned copy of a [`DrawCommand`]
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedDraw {
    /// Entity drawn
    pub entity: EntityId,
    /// Entity name, if any
    pub name: Option<String>,
    /// World position of the pivot
    pub position: Vec2,
    /// World rotation in degrees
    pub rotation_degrees: f32,
    /// World scale
    pub scale: Vec2,
    /// Combined tint
    pub tint: Color,
    /// Payload kind
    pub kind: &'static str,
    /// World-space clip
    pub clip: Option<RectF>,
}

impl From<&DrawCommand<'_>> for RecordedDraw {
    fn from(command: &DrawCommand<'_>) -> Self {
        Self {
            entity: command.entity,
            name: command.name.map(str::to_owned),
            position: command.position,
            rotation_degrees: command.rotation_degrees,
            scale: command.scale,
            tint: command.tint,
            kind: command.visual.kind(),
            clip: command.clip,
        }
    }
}

/// Renderer that records every command it receives
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    commands: Vec<RecordedDraw>,
}

impl RecordingRenderer {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands recorded so far, in draw order
    pub fn commands(&self) -> &[RecordedDraw] {
        &self.commands
    }

    /// Forget recorded commands
    pub fn clear(&mut self) {
        self.commands.clear();
    }
}

impl Renderer for RecordingRenderer {
    fn draw_entity(&mut self, command: &DrawCommand<'_>) {
        self.commands.push(RecordedDraw::from(command));
    }
}
