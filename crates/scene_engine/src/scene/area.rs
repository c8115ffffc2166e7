//! Bottom-up bounding area refresh

use super::entity::EntityId;
use super::graph::SceneGraph;
use crate::foundation::math::{bounding_box, transform_points, utils::deg_to_rad, Vec2};
use crate::foundation::rect::RectF;

impl SceneGraph {
    /// Recompute the bounds of a dirty subtree, children first
    ///
    /// Clean nodes are skipped along with everything below them.
    pub fn refresh_area(&mut self, id: EntityId) {
        let Some(node) = self.entities.get_mut(id) else {
            return;
        };
        if !node.dirty {
            return;
        }

        node.refresh_collision();
        node.calculate_area();
        let list = node.children;

        let mut cursor = self.links.first(list);
        while let Some(link) = cursor {
            cursor = self.links.next(link);
            let Some(&child) = self.links.value(link) else {
                continue;
            };

            self.refresh_area(child);

            let Some(child_node) = self.entities.get(child) else {
                continue;
            };
            if !child_node.bounds.has_area {
                continue;
            }

            let area = child_node.bounds.area;
            let local_area = bounding_box(&transform_points(
                &child_node.bounds.local_points,
                child_node.position,
                Vec2::zeros(),
                child_node.scale,
                deg_to_rad(child_node.rotation),
            ));

            let bounds = &mut self.entities[id].bounds;
            if bounds.has_area {
                bounds.area = bounds.area.union(&area);
                bounds.local_area = bounds.local_area.union(&local_area);
            } else {
                bounds.area = area;
                bounds.local_area = local_area;
                bounds.has_area = true;
            }
        }

        let node = &mut self.entities[id];
        if node.bounds.has_area {
            node.bounds.local_points = node.bounds.local_area.corners();
        }
        node.dirty = false;
    }

    /// World-space bounding area, refreshed first when requested and stale
    pub fn get_area(&mut self, id: EntityId, refresh_if_dirty: bool) -> Option<RectF> {
        if refresh_if_dirty && self.is_dirty(id) {
            self.refresh_tree(id);
        }
        self.entities.get(id).map(|n| n.bounds.area)
    }

    /// Bring the tree containing `id` up to date
    ///
    /// Propagates transforms from the topmost ancestor when it is dirty, then
    /// refreshes the areas of every dirty node below it.
    pub fn refresh_tree(&mut self, id: EntityId) {
        let top = self.top_ancestor(id);
        if self.is_dirty(top) {
            log::trace!("Refreshing tree at {top:?}");
            self.apply_transform_recursive(top);
            self.refresh_area(top);
        }
    }
}
