//! Scene graph node
//!
//! An [`Entity`] holds its local transform, its visual state, the absolute
//! state written by the propagation pass and the bounds written by the area
//! pass. Structural links (parent, root, children) are arena handles; the
//! parent and root handles never own anything.

use std::any::Any;

use slotmap::new_key_type;

use super::update::Behavior;
use super::visual::{AnimationState, ImageContent, TextContent, Visual};
use crate::foundation::collections::{LinkId, ListId};
use crate::foundation::math::{bounding_box, get_rectangle, rotate, utils::deg_to_rad, Color, Mat3, Quad, Vec2};
use crate::foundation::rect::RectF;
use crate::physics::CollisionMask;

new_key_type! {
    /// Stable handle to an entity in a [`SceneGraph`](super::SceneGraph)
    pub struct EntityId;
}

/// World-space state derived by the propagation pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AbsoluteState {
    /// Composed transform matrix
    pub transform: Mat3,
    /// World position of the pivot
    pub position: Vec2,
    /// Pivot offset, in unscaled local units
    pub offset: Vec2,
    /// Composed scale
    pub scale: Vec2,
    /// Scale inherited from the ancestors only
    pub relative_scale: Vec2,
    /// Summed rotation, in degrees
    pub rotation: f32,
    /// Combined tint, alpha applied
    pub tint: Color,
    /// Combined alpha
    pub alpha: f32,
}

impl Default for AbsoluteState {
    fn default() -> Self {
        Self {
            transform: Mat3::identity(),
            position: Vec2::zeros(),
            offset: Vec2::zeros(),
            scale: Vec2::new(1.0, 1.0),
            relative_scale: Vec2::new(1.0, 1.0),
            rotation: 0.0,
            tint: Color::WHITE,
            alpha: 1.0,
        }
    }
}

/// Bounding state derived by the area pass
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    /// World-space axis-aligned area
    pub area: RectF,
    /// World-space oriented corners of the content
    pub points: Quad,
    /// Area in the entity's own pivot space
    pub local_area: RectF,
    /// Corners in the entity's own pivot space
    pub local_points: Quad,
    /// Whether anything contributed an area
    pub has_area: bool,
}

/// Optional hit-test rectangle, distinct from the visual size
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CollisionShape {
    /// Rectangle relative to the entity's top-left, in unscaled units
    pub rect: RectF,
    /// World-space oriented corners
    pub points: Quad,
    /// Axis-aligned box around `points`
    pub aligned: RectF,
}

impl CollisionShape {
    /// Create a shape from a local rectangle
    pub fn new(rect: RectF) -> Self {
        Self {
            rect,
            ..Self::default()
        }
    }
}

/// A scene graph node
pub struct Entity {
    pub(crate) name: Option<String>,
    pub(crate) visual: Visual,
    pub(crate) behavior: Option<Box<dyn Behavior>>,
    /// Set when the behavior slot is written while its behavior is running
    pub(crate) behavior_replaced: bool,
    pub(crate) user_data: Option<Box<dyn Any>>,

    pub(crate) position: Vec2,
    pub(crate) origin: Vec2,
    pub(crate) scale: Vec2,
    pub(crate) rotation: f32,
    pub(crate) size: Vec2,
    pub(crate) original_size: Vec2,

    pub(crate) tint: Color,
    pub(crate) alpha: f32,
    pub(crate) visible: bool,
    pub(crate) collision_mask: CollisionMask,
    pub(crate) mask_rectangle: Option<RectF>,
    pub(crate) collision: Option<CollisionShape>,

    pub(crate) absolute: AbsoluteState,
    pub(crate) bounds: Bounds,

    pub(crate) parent: Option<EntityId>,
    pub(crate) root: Option<EntityId>,
    pub(crate) children: ListId,
    pub(crate) link: LinkId,
    pub(crate) child_index: Option<usize>,
    pub(crate) is_root: bool,
    pub(crate) dirty: bool,
    pub(crate) disposing: bool,
}

impl Entity {
    pub(crate) fn from_builder(builder: EntityBuilder, children: ListId, link: LinkId) -> Self {
        Self {
            name: builder.name,
            visual: builder.visual,
            behavior: builder.behavior,
            behavior_replaced: false,
            user_data: builder.user_data,
            position: builder.position,
            origin: builder.origin,
            scale: builder.scale,
            rotation: builder.rotation,
            size: builder.original_size.component_mul(&builder.scale),
            original_size: builder.original_size,
            tint: Color { a: builder.alpha, ..builder.tint },
            alpha: builder.alpha,
            visible: builder.visible,
            collision_mask: builder.collision_mask,
            mask_rectangle: builder.mask_rectangle,
            collision: builder.collision.map(CollisionShape::new),
            absolute: AbsoluteState::default(),
            bounds: Bounds::default(),
            parent: None,
            root: None,
            children,
            link,
            child_index: None,
            is_root: false,
            dirty: true,
            disposing: false,
        }
    }

    /// Optional, non-unique name
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Payload
    pub fn visual(&self) -> &Visual {
        &self.visual
    }

    /// Host data attached to the entity
    pub fn user_data(&self) -> Option<&dyn Any> {
        self.user_data.as_deref()
    }

    /// Local position, relative to the parent's pivot
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Pivot, in unscaled local units
    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    /// Local scale
    pub fn scale(&self) -> Vec2 {
        self.scale
    }

    /// Local rotation, in degrees
    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    /// Scaled size (absolute value)
    pub fn size(&self) -> Vec2 {
        self.size.abs()
    }

    /// Unscaled content size
    pub fn original_size(&self) -> Vec2 {
        self.original_size
    }

    /// Tint color; its alpha channel mirrors [`Entity::alpha`]
    pub fn tint(&self) -> Color {
        self.tint
    }

    /// Opacity in `0..=1`
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Whether the entity takes part in drawing and picking
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Collision layer bits
    pub fn collision_mask(&self) -> CollisionMask {
        self.collision_mask
    }

    /// Draw clip in local units
    pub fn mask_rectangle(&self) -> Option<RectF> {
        self.mask_rectangle
    }

    /// Collision shape, if one is set
    pub fn collision(&self) -> Option<&CollisionShape> {
        self.collision.as_ref()
    }

    /// State written by the last propagation pass
    pub fn absolute(&self) -> &AbsoluteState {
        &self.absolute
    }

    /// State written by the last area pass
    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    /// Parent handle
    pub fn parent(&self) -> Option<EntityId> {
        self.parent
    }

    /// Cached root of the tree this entity is attached to
    pub fn root(&self) -> Option<EntityId> {
        self.root
    }

    /// Position among the parent's children
    pub fn child_index(&self) -> Option<usize> {
        self.child_index
    }

    /// Whether this is a scene root
    pub fn is_root(&self) -> bool {
        self.is_root
    }

    /// Whether cached absolute state or bounds are stale
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Polygon used for exact hit tests
    ///
    /// The collision shape when present, else the content corners for leaf
    /// payloads. Containers have no polygon of their own.
    pub fn hit_shape(&self) -> Option<&Quad> {
        match &self.collision {
            Some(shape) => Some(&shape.points),
            None if self.visual.has_intrinsic_area() => Some(&self.bounds.points),
            None => None,
        }
    }

    /// Axis-aligned box matching [`Entity::hit_shape`]
    pub fn valid_collision_box(&self) -> RectF {
        self.collision.map_or(self.bounds.area, |shape| shape.aligned)
    }

    /// Recompute the collision shape from the absolute transform
    pub(crate) fn refresh_collision(&mut self) {
        let abs = self.absolute;
        let Some(shape) = self.collision.as_mut() else {
            return;
        };

        let radians = deg_to_rad(abs.rotation);
        let pos = abs.position + rotate(shape.rect.position().component_mul(&abs.scale), radians);
        shape.points = get_rectangle(pos, shape.rect.size(), abs.offset, abs.scale, radians);
        shape.aligned = bounding_box(&shape.points);
    }

    /// Seed the bounds from the entity's own content
    pub(crate) fn calculate_area(&mut self) {
        self.bounds.area.reset();
        self.bounds.local_area.reset();
        self.bounds.has_area = false;

        if self.visual.has_intrinsic_area() {
            let abs = self.absolute;
            self.bounds.points = get_rectangle(
                abs.position,
                self.original_size,
                abs.offset,
                abs.scale,
                deg_to_rad(abs.rotation),
            );
            self.bounds.local_points = get_rectangle(
                Vec2::zeros(),
                self.original_size,
                self.origin,
                Vec2::new(1.0, 1.0),
                0.0,
            );
            self.bounds.area = bounding_box(&self.bounds.points);
            self.bounds.local_area = bounding_box(&self.bounds.local_points);
            self.bounds.has_area = true;
        }

        if let Some(shape) = self.collision {
            let local = RectF::from_position_size(shape.rect.position() - self.origin, shape.rect.size());
            if self.bounds.has_area {
                self.bounds.area = self.bounds.area.union(&shape.aligned);
                self.bounds.local_area = self.bounds.local_area.union(&local);
            } else {
                self.bounds.area = shape.aligned;
                self.bounds.local_area = local;
                self.bounds.has_area = true;
            }
        }
    }
}

/// Description of an entity to spawn
///
/// ```
/// use scene_engine::scene::EntityBuilder;
///
/// let ship = EntityBuilder::image(32.0, 16.0)
///     .name("ship")
///     .position(100.0, 50.0)
///     .origin(16.0, 8.0)
///     .rotation(45.0);
/// ```
pub struct EntityBuilder {
    name: Option<String>,
    visual: Visual,
    behavior: Option<Box<dyn Behavior>>,
    user_data: Option<Box<dyn Any>>,
    position: Vec2,
    origin: Vec2,
    scale: Vec2,
    rotation: f32,
    original_size: Vec2,
    tint: Color,
    alpha: f32,
    visible: bool,
    collision_mask: CollisionMask,
    collision: Option<RectF>,
    mask_rectangle: Option<RectF>,
}

impl EntityBuilder {
    /// A container at the origin
    pub fn new() -> Self {
        Self {
            name: None,
            visual: Visual::Container,
            behavior: None,
            user_data: None,
            position: Vec2::zeros(),
            origin: Vec2::zeros(),
            scale: Vec2::new(1.0, 1.0),
            rotation: 0.0,
            original_size: Vec2::zeros(),
            tint: Color::WHITE,
            alpha: 1.0,
            visible: true,
            collision_mask: CollisionMask::ALL,
            collision: None,
            mask_rectangle: None,
        }
    }

    /// A container with a nominal size (used for roots)
    pub fn container(width: f32, height: f32) -> Self {
        Self::new().original_size(width, height)
    }

    /// An untextured image of the given size
    pub fn image(width: f32, height: f32) -> Self {
        Self::new()
            .visual(Visual::Image(ImageContent::default()))
            .original_size(width, height)
    }

    /// A text run with a host-measured size
    pub fn text(text: impl Into<String>, width: f32, height: f32) -> Self {
        Self::new()
            .visual(Visual::Text(TextContent {
                text: text.into(),
                ..TextContent::default()
            }))
            .original_size(width, height)
    }

    /// A frame animation with the given frame size
    pub fn animation(state: AnimationState, frame_width: f32, frame_height: f32) -> Self {
        Self::new()
            .visual(Visual::Animation(state))
            .original_size(frame_width, frame_height)
    }

    /// Set the name
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the payload
    pub fn visual(mut self, visual: Visual) -> Self {
        self.visual = visual;
        self
    }

    /// Attach per-frame logic
    pub fn behavior(mut self, behavior: impl Behavior + 'static) -> Self {
        self.behavior = Some(Box::new(behavior));
        self
    }

    /// Attach host data
    pub fn user_data(mut self, data: impl Any) -> Self {
        self.user_data = Some(Box::new(data));
        self
    }

    /// Set the local position
    pub fn position(mut self, x: f32, y: f32) -> Self {
        self.position = Vec2::new(x, y);
        self
    }

    /// Set the pivot
    pub fn origin(mut self, x: f32, y: f32) -> Self {
        self.origin = Vec2::new(x, y);
        self
    }

    /// Set the scale
    pub fn scale(mut self, x: f32, y: f32) -> Self {
        self.scale = Vec2::new(x, y);
        self
    }

    /// Set the rotation in degrees
    pub fn rotation(mut self, degrees: f32) -> Self {
        self.rotation = degrees;
        self
    }

    /// Set the unscaled content size
    pub fn original_size(mut self, width: f32, height: f32) -> Self {
        self.original_size = Vec2::new(width, height);
        self
    }

    /// Set the tint; its alpha channel becomes the entity's alpha
    pub fn tint(mut self, tint: Color) -> Self {
        self.tint = tint;
        self.alpha = tint.a;
        self
    }

    /// Set the opacity, clamped to `0..=1`
    pub fn alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha.clamp(0.0, 1.0);
        self.tint.a = self.alpha;
        self
    }

    /// Set visibility
    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Set the collision layer bits
    pub fn collision_mask(mut self, mask: CollisionMask) -> Self {
        self.collision_mask = mask;
        self
    }

    /// Set a collision rectangle relative to the entity's top-left
    pub fn collision(mut self, rect: RectF) -> Self {
        self.collision = Some(rect);
        self
    }

    /// Set a draw clip in local units
    pub fn mask_rectangle(mut self, rect: RectF) -> Self {
        self.mask_rectangle = Some(rect);
        self
    }
}

impl Default for EntityBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::collections::LinkPool;

    fn build(builder: EntityBuilder) -> Entity {
        let mut pool = LinkPool::<u8>::new();
        let list = pool.create_list();
        let link = pool.create_link(0);
        Entity::from_builder(builder, list, link)
    }

    #[test]
    fn test_builder_defaults() {
        let entity = build(EntityBuilder::new());

        assert_eq!(entity.scale(), Vec2::new(1.0, 1.0));
        assert_eq!(entity.tint(), Color::WHITE);
        assert_eq!(entity.collision_mask(), CollisionMask::ALL);
        assert!(entity.is_visible());
        assert!(entity.is_dirty());
        assert!(entity.hit_shape().is_none());
    }

    #[test]
    fn test_size_follows_scale() {
        let entity = build(EntityBuilder::image(10.0, 4.0).scale(2.0, -3.0));

        assert_eq!(entity.size(), Vec2::new(20.0, 12.0));
        assert_eq!(entity.original_size(), Vec2::new(10.0, 4.0));
    }

    #[test]
    fn test_tint_and_alpha_stay_consistent() {
        let entity = build(EntityBuilder::new().tint(Color::new(1.0, 0.0, 0.0, 0.25)));
        assert_eq!(entity.alpha(), 0.25);

        let entity = build(EntityBuilder::new().alpha(3.0));
        assert_eq!(entity.alpha(), 1.0);
        assert_eq!(entity.tint().a, 1.0);
    }

    #[test]
    fn test_calculate_area_for_image() {
        let mut entity = build(EntityBuilder::image(20.0, 10.0).origin(10.0, 5.0));
        entity.absolute.position = Vec2::new(100.0, 100.0);
        entity.absolute.offset = entity.origin;

        entity.calculate_area();

        assert!(entity.bounds.has_area);
        assert_eq!(entity.bounds.area, RectF::new(90.0, 95.0, 20.0, 10.0));
        assert_eq!(entity.bounds.local_area, RectF::new(-10.0, -5.0, 20.0, 10.0));
    }

    #[test]
    fn test_collision_shape_seeds_container_area() {
        let mut entity = build(EntityBuilder::new().collision(RectF::new(2.0, 2.0, 4.0, 4.0)));
        entity.absolute.position = Vec2::new(10.0, 10.0);

        entity.refresh_collision();
        entity.calculate_area();

        assert_eq!(entity.valid_collision_box(), RectF::new(12.0, 12.0, 4.0, 4.0));
        assert_eq!(entity.bounds.area, RectF::new(12.0, 12.0, 4.0, 4.0));
        assert!(entity.hit_shape().is_some());
    }
}
