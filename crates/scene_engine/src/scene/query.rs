//! Spatial queries over a subtree
//!
//! Every query refreshes the tree it runs on, then walks it pre-order. A node
//! is pruned when its collision mask shares no bit with the query mask or its
//! area misses the probe; only then is the exact polygon test run against
//! the node's hit shape. Scene roots never match, only their descendants do.

use super::entity::EntityId;
use super::error::SceneError;
use super::graph::SceneGraph;
use crate::foundation::math::{
    bounding_box, distance, get_rectangle, segment_area, transform_point, utils::deg_to_rad, Quad, Vec2,
};
use crate::foundation::rect::RectF;
use crate::physics::{
    point_in_polygon, polygon_collision, segment_crosses_polygon, segment_intersection, CollisionMask,
};

/// Outcome of a ray cast
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastResult {
    /// Whether anything was hit
    pub hit: bool,
    /// Closest hit point, or the segment end when nothing was hit
    pub position: Vec2,
    /// Position of the hit along the cast segment, in `0..=1`
    pub ratio: f32,
    /// Entity owning the closest hit
    pub entity: Option<EntityId>,
}

impl RaycastResult {
    fn miss(end: Vec2) -> Self {
        Self {
            hit: false,
            position: end,
            ratio: 0.0,
            entity: None,
        }
    }
}

impl SceneGraph {
    /// Map a point through the cached absolute transform of `id`
    pub fn to_local_point(&self, id: EntityId, point: Vec2) -> Option<Vec2> {
        let abs = &self.entities.get(id)?.absolute;
        Some(transform_point(&abs.transform, point.component_mul(&abs.scale)) + abs.offset)
    }

    /// Deepest, topmost visible entity under a point
    ///
    /// Later children are on top and are searched first; a parent only
    /// matches when none of its children does.
    pub fn get_at_point(&mut self, id: EntityId, point: Vec2, mask: CollisionMask) -> Option<EntityId> {
        if !self.contains(id) {
            return None;
        }
        self.refresh_tree(id);
        self.pick(id, point, mask)
    }

    /// [`SceneGraph::get_at_point`] with the point mapped through
    /// [`SceneGraph::to_local_point`] first
    pub fn get_at_local_point(&mut self, id: EntityId, point: Vec2, mask: CollisionMask) -> Option<EntityId> {
        if !self.contains(id) {
            return None;
        }
        self.refresh_tree(id);
        let world = self.to_local_point(id, point)?;
        self.pick(id, world, mask)
    }

    fn pick(&self, id: EntityId, point: Vec2, mask: CollisionMask) -> Option<EntityId> {
        let node = self.entities.get(id)?;
        if !node.collision_mask.accepts(mask) || !node.visible || !node.bounds.area.contains_point(point) {
            return None;
        }

        let hit = self
            .links
            .iter_rev(node.children)
            .find_map(|(_, &child)| self.pick(child, point, mask));
        if hit.is_some() {
            return hit;
        }

        if node.is_root {
            return None;
        }
        node.hit_shape()
            .filter(|shape| point_in_polygon(point, &shape[..]))
            .map(|_| id)
    }

    /// Whether `a` or any of its descendants overlaps `b` or any of its
    /// descendants
    pub fn hit_test(&mut self, a: EntityId, b: EntityId, mask: CollisionMask, allow_self: bool) -> bool {
        self.hit_test_pair(a, b, mask, allow_self).is_some()
    }

    /// First overlapping pair found between the subtrees of `a` and `b`
    ///
    /// The first element belongs to `a`'s subtree. With `allow_self` false,
    /// `a` is never tested against itself.
    pub fn hit_test_pair(
        &mut self,
        a: EntityId,
        b: EntityId,
        mask: CollisionMask,
        allow_self: bool,
    ) -> Option<(EntityId, EntityId)> {
        if !self.contains(a) || !self.contains(b) {
            return None;
        }
        self.refresh_tree(a);
        self.refresh_tree(b);
        self.hit_pair(a, b, mask, allow_self, a)
    }

    fn hit_pair(
        &self,
        this: EntityId,
        other: EntityId,
        mask: CollisionMask,
        allow_self: bool,
        top: EntityId,
    ) -> Option<(EntityId, EntityId)> {
        if other == top && !allow_self {
            return None;
        }

        let this_node = self.entities.get(this)?;
        let other_node = self.entities.get(other)?;
        if !other_node.collision_mask.accepts(mask) {
            return None;
        }
        if !this_node.bounds.area.intersects(&other_node.bounds.area) {
            return None;
        }

        if !this_node.is_root
            && !other_node.is_root
            && this_node.valid_collision_box().intersects(&other_node.valid_collision_box())
        {
            if let (Some(shape_a), Some(shape_b)) = (this_node.hit_shape(), other_node.hit_shape()) {
                if polygon_collision(shape_a, shape_b, false).intersect {
                    return Some((this, other));
                }
            }
        }

        self.links
            .values(other_node.children)
            .find_map(|&child| self.hit_pair(this, child, mask, allow_self, top))
            .or_else(|| {
                self.links
                    .values(this_node.children)
                    .find_map(|&child| self.hit_pair(child, other, mask, allow_self, top))
            })
    }

    /// Entities whose shape overlaps a rectangle
    ///
    /// With `local_coords` the rectangle is placed relative to `id`'s
    /// absolute position and carries its scale and rotation.
    pub fn query_rect(&mut self, id: EntityId, rect: RectF, local_coords: bool, mask: CollisionMask) -> Vec<EntityId> {
        let mut found = Vec::new();
        if !self.contains(id) {
            return found;
        }
        self.refresh_tree(id);

        let node = &self.entities[id];
        let probe = if local_coords {
            let abs = &node.absolute;
            get_rectangle(
                abs.position + rect.position(),
                rect.size(),
                abs.offset,
                abs.scale,
                deg_to_rad(abs.rotation),
            )
        } else {
            rect.corners()
        };

        let probe_box = bounding_box(&probe);
        self.collect_rect(id, &probe, &probe_box, mask, &mut found);
        found
    }

    fn collect_rect(&self, id: EntityId, probe: &Quad, probe_box: &RectF, mask: CollisionMask, found: &mut Vec<EntityId>) {
        let Some(node) = self.entities.get(id) else {
            return;
        };
        if !node.collision_mask.accepts(mask) || !node.bounds.area.intersects(probe_box) {
            return;
        }

        if !node.is_root && node.valid_collision_box().intersects(probe_box) {
            if let Some(shape) = node.hit_shape() {
                if polygon_collision(shape, probe, false).intersect {
                    found.push(id);
                }
            }
        }

        for &child in self.links.values(node.children) {
            self.collect_rect(child, probe, probe_box, mask, found);
        }
    }

    /// Entities touched by a segment
    ///
    /// A node matches when either endpoint lies inside its shape or the
    /// segment crosses one of its edges.
    pub fn query_segment(&mut self, id: EntityId, start: Vec2, end: Vec2, mask: CollisionMask) -> Vec<EntityId> {
        let mut found = Vec::new();
        if !self.contains(id) {
            return found;
        }
        self.refresh_tree(id);
        self.collect_segment(id, start, end, &segment_area(start, end), mask, &mut found);
        found
    }

    fn collect_segment(
        &self,
        id: EntityId,
        start: Vec2,
        end: Vec2,
        area: &RectF,
        mask: CollisionMask,
        found: &mut Vec<EntityId>,
    ) {
        let Some(node) = self.entities.get(id) else {
            return;
        };
        if !node.collision_mask.accepts(mask) || !node.bounds.area.intersects(area) {
            return;
        }

        if !node.is_root {
            if let Some(shape) = node.hit_shape() {
                let valid = node.valid_collision_box();
                let inside = |p: Vec2| valid.contains_point(p) && point_in_polygon(p, &shape[..]);
                if inside(start) || inside(end) || segment_crosses_polygon(start, end, &shape[..]) {
                    found.push(id);
                }
            }
        }

        for &child in self.links.values(node.children) {
            self.collect_segment(child, start, end, area, mask, found);
        }
    }

    /// Entities in `id`'s subtree overlapping `query` or its descendants
    ///
    /// Each entity is reported once. A matching entity is not searched
    /// further. With `allow_self` false, `query` itself never matches.
    pub fn query_entity(
        &mut self,
        id: EntityId,
        query: EntityId,
        mask: CollisionMask,
        allow_self: bool,
    ) -> Vec<EntityId> {
        let mut found = Vec::new();
        if !self.contains(id) || !self.contains(query) {
            return found;
        }
        self.refresh_tree(id);
        self.refresh_tree(query);
        self.collect_entity(id, query, mask, allow_self, query, &mut found);
        found
    }

    fn collect_entity(
        &self,
        id: EntityId,
        query: EntityId,
        mask: CollisionMask,
        allow_self: bool,
        top: EntityId,
        found: &mut Vec<EntityId>,
    ) {
        if found.contains(&id) || (id == top && !allow_self) {
            return;
        }
        let (Some(node), Some(query_node)) = (self.entities.get(id), self.entities.get(query)) else {
            return;
        };
        if !node.collision_mask.accepts(mask) || !node.bounds.area.intersects(&query_node.bounds.area) {
            return;
        }

        if !node.is_root && node.valid_collision_box().intersects(&query_node.valid_collision_box()) {
            if let (Some(shape), Some(query_shape)) = (node.hit_shape(), query_node.hit_shape()) {
                if polygon_collision(shape, query_shape, false).intersect {
                    found.push(id);
                    return;
                }
            }
        }

        for &child in self.links.values(node.children) {
            self.collect_entity(child, query, mask, allow_self, top, found);
        }

        for &probe in self.links.values(query_node.children) {
            let probe_mask = self.entities.get(probe).map_or(CollisionMask::NONE, |n| n.collision_mask);
            if !probe_mask.is_empty() {
                self.collect_entity(id, probe, mask, allow_self, top, found);
            }
        }
    }

    /// Closest intersection of a segment with the shapes in a subtree
    ///
    /// The search window shrinks to `[start, closest hit]` as hits are found,
    /// so later candidates only need to beat the current closest one.
    pub fn raycast(&mut self, id: EntityId, start: Vec2, end: Vec2, mask: CollisionMask) -> RaycastResult {
        if !self.contains(id) {
            return RaycastResult::miss(end);
        }
        self.refresh_tree(id);

        let mut result = self.cast(id, start, end, segment_area(start, end), mask);
        if result.hit {
            let length = distance(start, end);
            result.ratio = if length > 0.0 {
                distance(start, result.position) / length
            } else {
                0.0
            };
        }
        result
    }

    fn cast(&self, id: EntityId, start: Vec2, mut end: Vec2, mut area: RectF, mask: CollisionMask) -> RaycastResult {
        let mut result = RaycastResult::miss(end);
        let Some(node) = self.entities.get(id) else {
            return result;
        };
        if !node.collision_mask.accepts(mask) || !node.bounds.area.intersects(&area) {
            return result;
        }

        if !node.is_root && area.intersects(&node.valid_collision_box()) {
            if let Some(shape) = node.hit_shape() {
                for i in 0..shape.len() {
                    let edge_start = shape[i];
                    let edge_end = shape[(i + 1) % shape.len()];
                    if let Some(hit) = segment_intersection(start, end, edge_start, edge_end) {
                        end = hit.point;
                        area = segment_area(start, end);
                        result = RaycastResult {
                            hit: true,
                            position: end,
                            ratio: hit.ratio_a,
                            entity: Some(id),
                        };
                    }
                }
            }
        }

        for &child in self.links.values(node.children) {
            let child_result = self.cast(child, start, end, area, mask);
            if child_result.hit {
                end = child_result.position;
                area = segment_area(start, end);
                result = child_result;
            }
        }
        result
    }

    /// Whether `id` would hit `other` if it were moved to `(x, y)`
    ///
    /// The entity is moved, its tree refreshed and hit-tested, then the
    /// original position is restored and the tree refreshed again.
    pub fn will_collide(
        &mut self,
        id: EntityId,
        other: EntityId,
        x: f32,
        y: f32,
        mask: CollisionMask,
        allow_self: bool,
    ) -> Result<bool, SceneError> {
        let saved = self.node(id)?.position;

        self.set_position(id, Vec2::new(x, y))?;
        self.refresh_tree(id);
        let collides = self.hit_test(id, other, mask, allow_self);

        self.set_position(id, saved)?;
        self.refresh_tree(id);

        Ok(collides)
    }
}
