//! Per-frame update and draw traversals

use super::entity::EntityId;
use super::error::SceneError;
use super::graph::SceneGraph;
use super::visual::Visual;
use crate::foundation::rect::RectF;
use crate::render::{DrawCommand, Renderer};

/// Per-entity game logic
///
/// The behavior is taken out of its entity while it runs, so it can freely
/// mutate the graph, including scheduling removals of its own entity.
pub trait Behavior {
    /// Advance the logic by `delta_time` seconds
    fn update(&mut self, scene: &mut SceneGraph, entity: EntityId, delta_time: f32) -> Result<(), SceneError>;
}

impl<F> Behavior for F
where
    F: FnMut(&mut SceneGraph, EntityId, f32) -> Result<(), SceneError>,
{
    fn update(&mut self, scene: &mut SceneGraph, entity: EntityId, delta_time: f32) -> Result<(), SceneError> {
        self(scene, entity, delta_time)
    }
}

impl SceneGraph {
    /// Run one update step on `id` and its subtree
    ///
    /// Children are snapshotted first; a child is only updated if it is
    /// still parented to this node when its turn comes.
    pub fn update(&mut self, id: EntityId, delta_time: f32) -> Result<(), SceneError> {
        let node = self.node_mut(id)?;
        if node.disposing {
            return Ok(());
        }

        if let Visual::Animation(state) = &mut node.visual {
            if state.advance(delta_time) {
                log::trace!("Animation on {id:?} finished");
            }
        }

        if let Some(mut behavior) = node.behavior.take() {
            node.behavior_replaced = false;
            let result = behavior.update(self, id, delta_time);
            if let Some(node) = self.entities.get_mut(id) {
                if !node.behavior_replaced {
                    node.behavior = Some(behavior);
                }
                node.behavior_replaced = false;
            }
            result?;
        }

        for child in self.snapshot_children(id) {
            if self.parent(child) == Some(id) {
                self.update(child, delta_time)?;
            }
        }
        Ok(())
    }

    /// Issue draw commands for `id` and its visible subtree
    ///
    /// Stale areas are refreshed on the way down. Entities whose area misses
    /// `redraw`, or whose clip is empty, are culled with their subtree.
    /// Returns the number of commands issued.
    pub fn draw(
        &mut self,
        id: EntityId,
        redraw: &RectF,
        clip: Option<RectF>,
        renderer: &mut dyn Renderer,
    ) -> usize {
        let Some(node) = self.entities.get(id) else {
            return 0;
        };
        if node.disposing || !node.visible || node.alpha <= 0.0 {
            return 0;
        }
        if node.dirty {
            self.refresh_area(id);
        }

        let node = &self.entities[id];
        if !node.bounds.has_area || !node.bounds.area.intersects(redraw) {
            return 0;
        }

        let abs = &node.absolute;
        let clip = match (node.mask_rectangle, clip) {
            (Some(mask), inherited) => {
                let world = RectF::from_position_size(
                    abs.position + mask.position(),
                    mask.size().component_mul(&abs.scale),
                );
                match inherited {
                    Some(inherited) => match world.intersect(&inherited) {
                        Some(rect) => Some(rect),
                        None => return 0,
                    },
                    None => Some(world),
                }
            }
            (None, inherited) => inherited,
        };

        renderer.draw_entity(&DrawCommand {
            entity: id,
            name: node.name(),
            position: abs.position,
            rotation_degrees: abs.rotation,
            scale: abs.scale,
            origin: abs.offset,
            tint: abs.tint,
            visual: &node.visual,
            original_size: node.original_size,
            clip,
        });

        let mut drawn = 1;
        for child in self.snapshot_children(id) {
            if self.parent(child) == Some(id) {
                drawn += self.draw(child, redraw, clip, renderer);
            }
        }
        drawn
    }
}
