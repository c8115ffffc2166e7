//! Top-down transform propagation

use super::entity::{AbsoluteState, EntityId};
use super::graph::SceneGraph;
use crate::foundation::math::{rotate, rotation, translation, utils::deg_to_rad, Color, Vec2};

impl SceneGraph {
    /// Recompute the absolute state of `id` and its whole subtree
    ///
    /// The walk ignores dirty flags and always visits every descendant, so
    /// callers should only run it from a root that is dirty.
    pub fn apply_transform_recursive(&mut self, id: EntityId) {
        let parent = self
            .entities
            .get(id)
            .and_then(|n| n.parent)
            .and_then(|p| self.entities.get(p))
            .map(|p| (p.absolute, p.alpha));

        let Some(node) = self.entities.get_mut(id) else {
            return;
        };

        let radians = deg_to_rad(node.rotation);
        let mut abs = AbsoluteState {
            transform: node.absolute.transform,
            position: node.position,
            offset: node.origin,
            scale: node.scale,
            relative_scale: Vec2::new(1.0, 1.0),
            rotation: node.rotation,
            tint: node.tint,
            alpha: node.alpha,
        };

        match parent {
            Some((parent, parent_alpha)) => {
                abs.scale = parent.scale.component_mul(&node.scale);
                abs.relative_scale = parent.scale;
                abs.rotation += parent.rotation;
                abs.alpha = node.alpha * parent_alpha;

                // Positions are relative to the parent's pivot
                let local = (node.position - parent.offset).component_mul(&abs.relative_scale);
                abs.position = parent.position + rotate(local, deg_to_rad(parent.rotation));
                abs.transform = parent.transform * translation(local) * rotation(radians);

                let tint = node.tint.modulate(parent.tint);
                abs.tint = Color { a: tint.a * abs.alpha, ..tint };
            }
            None => {
                abs.transform = translation(node.position) * rotation(radians);
                abs.tint.a = node.tint.a * node.alpha;
            }
        }

        node.absolute = abs;

        let mut cursor = self.links.first(node.children);
        while let Some(link) = cursor {
            cursor = self.links.next(link);
            if let Some(&child) = self.links.value(link) {
                self.apply_transform_recursive(child);
            }
        }
    }
}
