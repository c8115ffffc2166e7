//! Scene graph arena: structure, dirty protocol and local-state setters
//!
//! Entities live in a slot map and are addressed by [`EntityId`]. Each entity
//! owns a child list in the shared [`LinkPool`] and one link node that threads
//! it into its parent's list. Parent and root handles are back-references
//! only.

use std::collections::VecDeque;

use slotmap::SlotMap;

use super::entity::{CollisionShape, Entity, EntityBuilder, EntityId};
use super::error::SceneError;
use super::update::Behavior;
use super::visual::Visual;
use crate::foundation::collections::{LinkPool, ListError};
use crate::foundation::math::{utils, Color, Vec2};
use crate::foundation::rect::RectF;
use crate::physics::CollisionMask;

/// Arena-backed scene graph
pub struct SceneGraph {
    pub(crate) entities: SlotMap<EntityId, Entity>,
    pub(crate) links: LinkPool<EntityId>,
    removed: VecDeque<EntityId>,
}

impl SceneGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self {
            entities: SlotMap::with_key(),
            links: LinkPool::new(),
            removed: VecDeque::new(),
        }
    }

    /// Create a detached entity
    pub fn spawn(&mut self, builder: EntityBuilder) -> EntityId {
        let children = self.links.create_list();
        let entities = &mut self.entities;
        let links = &mut self.links;

        entities.insert_with_key(|id| {
            let link = links.create_link(id);
            Entity::from_builder(builder, children, link)
        })
    }

    /// Create an entity flagged as a scene root
    pub fn spawn_root(&mut self, builder: EntityBuilder) -> EntityId {
        let id = self.spawn(builder);
        self.entities[id].is_root = true;
        id
    }

    /// Number of live entities
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the graph holds no entities
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Whether a handle is live
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(id)
    }

    /// Borrow an entity
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    pub(crate) fn node(&self, id: EntityId) -> Result<&Entity, SceneError> {
        self.entities.get(id).ok_or(SceneError::InvalidEntity)
    }

    pub(crate) fn node_mut(&mut self, id: EntityId) -> Result<&mut Entity, SceneError> {
        self.entities.get_mut(id).ok_or(SceneError::InvalidEntity)
    }

    // ---------------------------------------------------------------------
    // Structure
    // ---------------------------------------------------------------------

    /// Attach `child` on top of `parent`'s children
    pub fn add_child(&mut self, parent: EntityId, child: EntityId) -> Result<EntityId, SceneError> {
        self.add_child_at(parent, child, None)
    }

    /// Attach `child` so that it ends up at `index` among `parent`'s children
    ///
    /// `None` appends (top of the z-order). Re-adding a current child moves it
    /// to `index` instead of failing; there `index` must name an existing slot.
    pub fn add_child_at(
        &mut self,
        parent: EntityId,
        child: EntityId,
        index: Option<usize>,
    ) -> Result<EntityId, SceneError> {
        if parent == child {
            return Err(SceneError::SelfParenting);
        }

        let parent_node = self.node(parent)?;
        let child_node = self.node(child)?;

        if child_node.parent == Some(parent) {
            let len = self.links.len(parent_node.children);
            if let Some(index) = index.filter(|&i| i >= len) {
                return Err(ListError::IndexOutOfRange { index, len }.into());
            }
            self.remove_child(parent, child)?;
            return self.add_child_at(parent, child, index);
        }
        if child_node.parent.is_some() {
            return Err(SceneError::AlreadyParented);
        }
        if self.is_ancestor(child, parent) {
            return Err(SceneError::CyclicGraph);
        }

        let list = parent_node.children;
        let link = child_node.link;
        let root = if parent_node.is_root {
            Some(parent)
        } else {
            parent_node.root
        };

        self.links.insert(list, link, index)?;
        self.entities[child].parent = Some(parent);
        self.set_root_recursive(child, root);

        // Absolute state must be valid before anything queries the child
        self.apply_transform_recursive(child);

        if index.is_some() {
            self.renumber_children(parent);
        } else {
            self.entities[child].child_index = Some(self.links.len(list) - 1);
        }

        self.mark_ancestors_dirty(parent);
        self.mark_descendants_dirty(child);

        log::trace!("Attached {child:?} to {parent:?} at {:?}", self.entities[child].child_index);
        Ok(child)
    }

    /// Detach `child` from `parent` immediately
    pub fn remove_child(&mut self, parent: EntityId, child: EntityId) -> Result<(), SceneError> {
        if self.node(child)?.parent != Some(parent) {
            return Err(SceneError::NotMyChild);
        }

        let list = self.node(parent)?.children;
        let link = self.entities[child].link;
        self.links.remove(list, link);

        let node = &mut self.entities[child];
        node.parent = None;
        node.child_index = None;
        self.set_root_recursive(child, None);
        self.mark_descendants_dirty(child);

        if !self.entities[parent].disposing {
            self.renumber_children(parent);
            self.set_dirty(parent);
        }

        log::trace!("Detached {child:?} from {parent:?}");
        Ok(())
    }

    /// Queue `child` for detachment at the end of the frame
    ///
    /// The child stays attached until [`SceneGraph::drain_removals`] is
    /// processed, so traversals in progress are not disturbed.
    pub fn remove_child_deferred(&mut self, parent: EntityId, child: EntityId) -> Result<(), SceneError> {
        if self.node(child)?.parent != Some(parent) {
            return Err(SceneError::NotMyChild);
        }

        if !self.removed.contains(&child) {
            self.removed.push_back(child);
        }

        if !self.node(parent)?.disposing {
            self.set_dirty(parent);
        }
        Ok(())
    }

    /// Entities queued for deferred removal, oldest first
    pub fn pending_removals(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.removed.iter().copied()
    }

    /// Take the deferred-removal queue
    pub fn drain_removals(&mut self) -> VecDeque<EntityId> {
        std::mem::take(&mut self.removed)
    }

    /// Whether `ancestor` appears on the parent chain of `id`
    pub fn is_ancestor(&self, ancestor: EntityId, id: EntityId) -> bool {
        let mut cursor = self.entities.get(id).and_then(|n| n.parent);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.entities.get(current).and_then(|n| n.parent);
        }
        false
    }

    /// Topmost ancestor of `id` (itself when detached)
    pub fn top_ancestor(&self, id: EntityId) -> EntityId {
        let mut top = id;
        while let Some(parent) = self.entities.get(top).and_then(|n| n.parent) {
            top = parent;
        }
        top
    }

    /// Parent handle
    pub fn parent(&self, id: EntityId) -> Option<EntityId> {
        self.entities.get(id).and_then(|n| n.parent)
    }

    /// Cached root handle
    pub fn root_of(&self, id: EntityId) -> Option<EntityId> {
        self.entities.get(id).and_then(|n| n.root)
    }

    /// Number of direct children
    pub fn num_children(&self, id: EntityId) -> usize {
        self.entities.get(id).map_or(0, |n| self.links.len(n.children))
    }

    /// Direct children, bottom of the z-order first
    pub fn children(&self, id: EntityId) -> impl Iterator<Item = EntityId> + '_ {
        let list = self.entities.get(id).map(|n| n.children);
        list.into_iter()
            .flat_map(move |list| self.links.values(list).copied())
    }

    /// Copy of the direct children, safe to hold across mutations
    pub fn snapshot_children(&self, id: EntityId) -> Vec<EntityId> {
        self.entities
            .get(id)
            .map(|n| self.links.snapshot(n.children))
            .unwrap_or_default()
    }

    /// Child at a position
    pub fn child_at(&self, id: EntityId, index: usize) -> Result<EntityId, SceneError> {
        let list = self.node(id)?.children;
        let link = self.links.link_at(list, index)?;
        self.links.value(link).copied().ok_or(SceneError::InvalidEntity)
    }

    /// Position of `child` among `parent`'s children
    pub fn index_of_child(&self, parent: EntityId, child: EntityId) -> Option<usize> {
        let list = self.entities.get(parent)?.children;
        let link = self.entities.get(child)?.link;
        self.links.index_of(list, link)
    }

    /// First direct child with the given name
    pub fn child_named(&self, id: EntityId, name: &str) -> Option<EntityId> {
        self.children(id)
            .find(|&child| self.entities.get(child).and_then(Entity::name) == Some(name))
    }

    /// Depth-first search of the subtree for a name
    pub fn entity_named(&self, id: EntityId, name: &str, include_self: bool) -> Option<EntityId> {
        if include_self && self.entities.get(id)?.name() == Some(name) {
            return Some(id);
        }
        self.children(id)
            .find_map(|child| self.entity_named(child, name, true))
    }

    fn set_root_recursive(&mut self, id: EntityId, root: Option<EntityId>) {
        let Some(node) = self.entities.get_mut(id) else {
            return;
        };
        node.root = root;

        let mut cursor = self.links.first(node.children);
        while let Some(link) = cursor {
            cursor = self.links.next(link);
            if let Some(&child) = self.links.value(link) {
                self.set_root_recursive(child, root);
            }
        }
    }

    fn renumber_children(&mut self, id: EntityId) {
        let Some(list) = self.entities.get(id).map(|n| n.children) else {
            return;
        };

        let mut cursor = self.links.first(list);
        let mut index = 0;
        while let Some(link) = cursor {
            cursor = self.links.next(link);
            if let Some(node) = self.links.value(link).and_then(|&c| self.entities.get_mut(c)) {
                node.child_index = Some(index);
                index += 1;
            }
        }
    }

    // ---------------------------------------------------------------------
    // Teardown
    // ---------------------------------------------------------------------

    /// Release an entity and its whole subtree
    ///
    /// The entity is detached from its parent first. Payload resources are
    /// released on every node (`force` also drops content keys), then every
    /// node, child list and link of the subtree leaves the arena.
    pub fn free(&mut self, id: EntityId, force: bool) -> Result<(), SceneError> {
        if let Some(parent) = self.node(id)?.parent {
            self.remove_child(parent, id)?;
        }

        let count = self.release_subtree(id, force);
        log::trace!("Freed {id:?} ({count} entities)");
        Ok(())
    }

    /// Free every descendant of `id`, keeping `id` itself
    pub fn clear(&mut self, id: EntityId) -> Result<(), SceneError> {
        let list = self.node(id)?.children;
        self.entities[id].disposing = true;

        for child in self.links.snapshot(list) {
            self.links.remove(list, self.entities[child].link);
            self.release_subtree(child, false);
        }

        self.entities[id].disposing = false;
        self.set_dirty(id);
        Ok(())
    }

    fn release_subtree(&mut self, id: EntityId, force: bool) -> usize {
        let Some(node) = self.entities.get_mut(id) else {
            return 0;
        };
        node.disposing = true;
        let list = node.children;

        let mut count = 1;
        for child in self.links.snapshot(list) {
            count += self.release_subtree(child, force);
        }

        if let Some(mut node) = self.entities.remove(id) {
            node.visual.release(force);
            // The list header is known live here; a stale one only means nothing to unlink
            let _ = self.links.destroy_list(node.children);
            self.links.destroy_link(node.link);
        }
        count
    }

    // ---------------------------------------------------------------------
    // Dirty protocol
    // ---------------------------------------------------------------------

    /// Flag `id` and every ancestor up to the root
    pub fn mark_ancestors_dirty(&mut self, id: EntityId) {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let Some(node) = self.entities.get_mut(current) else {
                break;
            };
            node.dirty = true;
            cursor = node.parent;
        }
    }

    /// Flag `id` and every descendant
    pub fn mark_descendants_dirty(&mut self, id: EntityId) {
        let Some(node) = self.entities.get_mut(id) else {
            return;
        };
        node.dirty = true;

        let mut cursor = self.links.first(node.children);
        while let Some(link) = cursor {
            cursor = self.links.next(link);
            if let Some(&child) = self.links.value(link) {
                self.mark_descendants_dirty(child);
            }
        }
    }

    /// Flag the ancestor chain and the subtree
    pub fn set_dirty(&mut self, id: EntityId) {
        self.mark_ancestors_dirty(id);
        self.mark_descendants_dirty(id);
    }

    /// Whether cached state of `id` is stale
    pub fn is_dirty(&self, id: EntityId) -> bool {
        self.entities.get(id).is_some_and(|n| n.dirty)
    }

    fn modify<F>(&mut self, id: EntityId, apply: F) -> Result<(), SceneError>
    where
        F: FnOnce(&mut Entity) -> bool,
    {
        if apply(self.node_mut(id)?) {
            self.set_dirty(id);
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Local state
    // ---------------------------------------------------------------------

    /// Move the entity relative to its parent's pivot
    pub fn set_position(&mut self, id: EntityId, position: Vec2) -> Result<(), SceneError> {
        self.modify(id, |e| {
            let changed = e.position != position;
            e.position = position;
            changed
        })
    }

    /// Set the pivot
    pub fn set_origin(&mut self, id: EntityId, origin: Vec2) -> Result<(), SceneError> {
        self.modify(id, |e| {
            let changed = e.origin != origin;
            e.origin = origin;
            changed
        })
    }

    /// Set the scale; the size follows
    pub fn set_scale(&mut self, id: EntityId, scale: Vec2) -> Result<(), SceneError> {
        self.modify(id, |e| {
            let changed = e.scale != scale;
            e.scale = scale;
            e.size = e.original_size.component_mul(&scale);
            changed
        })
    }

    /// Set the rotation in degrees
    pub fn set_rotation(&mut self, id: EntityId, degrees: f32) -> Result<(), SceneError> {
        self.modify(id, |e| {
            #[allow(clippy::float_cmp)]
            let changed = e.rotation != degrees;
            e.rotation = degrees;
            changed
        })
    }

    /// Set the scaled size; the scale follows
    ///
    /// A zero original dimension keeps a scale of 1 on that axis.
    pub fn set_size(&mut self, id: EntityId, size: Vec2) -> Result<(), SceneError> {
        self.modify(id, |e| {
            let changed = e.size != size;
            e.size = size;
            e.scale = Vec2::new(
                scale_for(size.x, e.original_size.x),
                scale_for(size.y, e.original_size.y),
            );
            changed
        })
    }

    /// Replace the unscaled content size, keeping the scale
    pub fn set_original_size(&mut self, id: EntityId, original_size: Vec2) -> Result<(), SceneError> {
        self.modify(id, |e| {
            let changed = e.original_size != original_size;
            e.original_size = original_size;
            e.size = original_size.component_mul(&e.scale);
            changed
        })
    }

    /// Set the tint; its alpha channel becomes the entity's alpha
    pub fn set_tint(&mut self, id: EntityId, tint: Color) -> Result<(), SceneError> {
        self.modify(id, |e| {
            let changed = e.tint != tint;
            e.tint = tint;
            e.alpha = utils::clamp(tint.a, 0.0, 1.0);
            changed
        })
    }

    /// Set the opacity, clamped to `0..=1`
    pub fn set_alpha(&mut self, id: EntityId, alpha: f32) -> Result<(), SceneError> {
        let alpha = utils::clamp(alpha, 0.0, 1.0);
        self.modify(id, |e| {
            #[allow(clippy::float_cmp)]
            let changed = e.alpha != alpha;
            e.alpha = alpha;
            e.tint.a = alpha;
            changed
        })
    }

    /// Set or clear the collision rectangle
    pub fn set_collision(&mut self, id: EntityId, rect: Option<RectF>) -> Result<(), SceneError> {
        self.modify(id, |e| {
            let changed = e.collision.map(|shape| shape.rect) != rect;
            if changed {
                e.collision = rect.map(CollisionShape::new);
            }
            changed
        })
    }

    /// Replace the payload
    pub fn set_visual(&mut self, id: EntityId, visual: Visual) -> Result<(), SceneError> {
        self.modify(id, |e| {
            e.visual = visual;
            true
        })
    }

    /// Toggle drawing and picking
    pub fn set_visible(&mut self, id: EntityId, visible: bool) -> Result<(), SceneError> {
        self.node_mut(id)?.visible = visible;
        Ok(())
    }

    /// Set the collision layer bits
    pub fn set_collision_mask(&mut self, id: EntityId, mask: CollisionMask) -> Result<(), SceneError> {
        self.node_mut(id)?.collision_mask = mask;
        Ok(())
    }

    /// Set or clear the draw clip
    pub fn set_mask_rectangle(&mut self, id: EntityId, rect: Option<RectF>) -> Result<(), SceneError> {
        self.node_mut(id)?.mask_rectangle = rect;
        Ok(())
    }

    /// Rename
    pub fn set_name(&mut self, id: EntityId, name: Option<String>) -> Result<(), SceneError> {
        self.node_mut(id)?.name = name;
        Ok(())
    }

    /// Replace per-frame logic
    ///
    /// Called from inside the running behavior, `None` stops it for good.
    pub fn set_behavior(&mut self, id: EntityId, behavior: Option<Box<dyn Behavior>>) -> Result<(), SceneError> {
        let node = self.node_mut(id)?;
        node.behavior = behavior;
        node.behavior_replaced = true;
        Ok(())
    }

    /// Mutable access to host data
    pub fn user_data_mut(&mut self, id: EntityId) -> Option<&mut Box<dyn std::any::Any>> {
        self.entities.get_mut(id)?.user_data.as_mut()
    }

    /// Mutable access to the payload, for state that does not affect bounds
    pub fn visual_mut(&mut self, id: EntityId) -> Option<&mut Visual> {
        self.entities.get_mut(id).map(|n| &mut n.visual)
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

fn scale_for(size: f32, original: f32) -> f32 {
    if original > 0.0 {
        (size / original).abs()
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene_with_root() -> (SceneGraph, EntityId) {
        let mut scene = SceneGraph::new();
        let root = scene.spawn_root(EntityBuilder::container(640.0, 480.0));
        (scene, root)
    }

    #[test]
    fn test_add_child_sets_parent_root_and_index() {
        let (mut scene, root) = scene_with_root();
        let a = scene.spawn(EntityBuilder::new());
        let b = scene.spawn(EntityBuilder::new());

        scene.add_child(root, a).unwrap();
        scene.add_child(a, b).unwrap();

        assert_eq!(scene.parent(b), Some(a));
        assert_eq!(scene.root_of(b), Some(root));
        assert_eq!(scene.root_of(a), Some(root));
        assert_eq!(scene.get(b).unwrap().child_index(), Some(0));
        assert_eq!(scene.num_children(root), 1);
    }

    #[test]
    fn test_structural_errors() {
        let (mut scene, root) = scene_with_root();
        let a = scene.spawn(EntityBuilder::new());
        let b = scene.spawn(EntityBuilder::new());
        let other = scene.spawn(EntityBuilder::new());
        scene.add_child(root, a).unwrap();
        scene.add_child(a, b).unwrap();

        assert_eq!(scene.add_child(a, a), Err(SceneError::SelfParenting));
        assert_eq!(scene.add_child(other, b), Err(SceneError::AlreadyParented));
        assert_eq!(scene.remove_child(other, b), Err(SceneError::NotMyChild));
        assert_eq!(
            scene.child_at(a, 4),
            Err(SceneError::List(ListError::IndexOutOfRange { index: 4, len: 1 }))
        );
    }

    #[test]
    fn test_cycle_rejected_and_graph_unchanged() {
        let (mut scene, root) = scene_with_root();
        let a = scene.spawn(EntityBuilder::new());
        let b = scene.spawn(EntityBuilder::new());
        let c = scene.spawn(EntityBuilder::new());
        scene.add_child(root, a).unwrap();
        scene.add_child(a, b).unwrap();
        scene.add_child(b, c).unwrap();

        scene.remove_child(root, a).unwrap();
        assert_eq!(scene.add_child(c, a), Err(SceneError::CyclicGraph));

        assert_eq!(scene.parent(a), None);
        assert_eq!(scene.parent(b), Some(a));
        assert_eq!(scene.parent(c), Some(b));
        assert_eq!(scene.num_children(c), 0);
    }

    #[test]
    fn test_readd_moves_child_to_top() {
        let (mut scene, root) = scene_with_root();
        let ids: Vec<_> = (0..3)
            .map(|_| {
                let id = scene.spawn(EntityBuilder::new());
                scene.add_child(root, id).unwrap()
            })
            .collect();

        scene.add_child(root, ids[0]).unwrap();

        assert_eq!(scene.snapshot_children(root), vec![ids[1], ids[2], ids[0]]);
        assert_eq!(scene.get(ids[0]).unwrap().child_index(), Some(2));
        assert_eq!(scene.get(ids[1]).unwrap().child_index(), Some(0));
    }

    #[test]
    fn test_readd_at_index_moves_within_siblings() {
        let (mut scene, root) = scene_with_root();
        let ids: Vec<_> = (0..3)
            .map(|_| {
                let id = scene.spawn(EntityBuilder::new());
                scene.add_child(root, id).unwrap()
            })
            .collect();

        scene.add_child_at(root, ids[2], Some(0)).unwrap();
        assert_eq!(scene.snapshot_children(root), vec![ids[2], ids[0], ids[1]]);
        assert_eq!(scene.get(ids[1]).unwrap().child_index(), Some(2));

        assert!(matches!(
            scene.add_child_at(root, ids[0], Some(3)),
            Err(SceneError::List(ListError::IndexOutOfRange { index: 3, len: 3 }))
        ));
        assert_eq!(scene.snapshot_children(root), vec![ids[2], ids[0], ids[1]]);
        assert_eq!(scene.parent(ids[0]), Some(root));
    }

    #[test]
    fn test_insert_at_index_and_renumber_on_remove() {
        let (mut scene, root) = scene_with_root();
        let a = scene.spawn(EntityBuilder::new());
        let b = scene.spawn(EntityBuilder::new());
        let c = scene.spawn(EntityBuilder::new());
        scene.add_child(root, a).unwrap();
        scene.add_child(root, b).unwrap();
        scene.add_child_at(root, c, Some(0)).unwrap();

        assert_eq!(scene.snapshot_children(root), vec![c, a, b]);
        assert_eq!(scene.get(a).unwrap().child_index(), Some(1));

        scene.remove_child(root, c).unwrap();
        assert_eq!(scene.get(a).unwrap().child_index(), Some(0));
        assert_eq!(scene.get(b).unwrap().child_index(), Some(1));
        assert_eq!(scene.get(c).unwrap().child_index(), None);
        assert_eq!(scene.index_of_child(root, c), None);
    }

    #[test]
    fn test_tree_invariant_after_edits() {
        let (mut scene, root) = scene_with_root();
        let ids: Vec<_> = (0..6).map(|_| scene.spawn(EntityBuilder::new())).collect();
        scene.add_child(root, ids[0]).unwrap();
        scene.add_child(ids[0], ids[1]).unwrap();
        scene.add_child(ids[0], ids[2]).unwrap();
        scene.add_child(root, ids[3]).unwrap();
        scene.remove_child(ids[0], ids[1]).unwrap();
        scene.add_child(ids[3], ids[1]).unwrap();

        assert!(scene.parent(root).is_none());
        for (id, node) in &scene.entities {
            if let Some(parent) = node.parent() {
                assert_eq!(node.root(), Some(root));
                let holders = scene
                    .entities
                    .keys()
                    .filter(|&p| scene.children(p).any(|c| c == id))
                    .count();
                assert_eq!(holders, 1);
                assert!(scene.children(parent).any(|c| c == id));
            }
        }
    }

    #[test]
    fn test_dirty_marks_ancestors_and_descendants() {
        let (mut scene, root) = scene_with_root();
        let a = scene.spawn(EntityBuilder::new());
        let b = scene.spawn(EntityBuilder::new());
        let sibling = scene.spawn(EntityBuilder::new());
        scene.add_child(root, a).unwrap();
        scene.add_child(a, b).unwrap();
        scene.add_child(root, sibling).unwrap();
        scene.refresh_tree(root);
        assert!(!scene.is_dirty(root));

        scene.set_position(a, Vec2::new(5.0, 5.0)).unwrap();

        assert!(scene.is_dirty(root));
        assert!(scene.is_dirty(a));
        assert!(scene.is_dirty(b));
        assert!(!scene.is_dirty(sibling));
    }

    #[test]
    fn test_unchanged_setter_does_not_dirty() {
        let (mut scene, root) = scene_with_root();
        let a = scene.spawn(EntityBuilder::new().position(3.0, 4.0));
        scene.add_child(root, a).unwrap();
        scene.refresh_tree(root);

        scene.set_position(a, Vec2::new(3.0, 4.0)).unwrap();
        scene.set_rotation(a, 0.0).unwrap();
        scene.set_scale(a, Vec2::new(1.0, 1.0)).unwrap();

        assert!(!scene.is_dirty(a));
        assert!(!scene.is_dirty(root));
    }

    #[test]
    fn test_size_and_scale_linkage() {
        let mut scene = SceneGraph::new();
        let a = scene.spawn(EntityBuilder::image(10.0, 20.0));

        scene.set_size(a, Vec2::new(30.0, 10.0)).unwrap();
        assert_eq!(scene.get(a).unwrap().scale(), Vec2::new(3.0, 0.5));

        scene.set_scale(a, Vec2::new(2.0, 2.0)).unwrap();
        assert_eq!(scene.get(a).unwrap().size(), Vec2::new(20.0, 40.0));

        let empty = scene.spawn(EntityBuilder::new());
        scene.set_size(empty, Vec2::new(5.0, 5.0)).unwrap();
        assert_eq!(scene.get(empty).unwrap().scale(), Vec2::new(1.0, 1.0));
    }

    #[test]
    fn test_alpha_clamps_and_syncs_tint() {
        let mut scene = SceneGraph::new();
        let a = scene.spawn(EntityBuilder::new());

        scene.set_alpha(a, 1.5).unwrap();
        assert_eq!(scene.get(a).unwrap().alpha(), 1.0);

        scene.set_alpha(a, 0.5).unwrap();
        assert_eq!(scene.get(a).unwrap().tint().a, 0.5);

        scene.set_tint(a, Color::new(1.0, 1.0, 1.0, 0.2)).unwrap();
        assert_eq!(scene.get(a).unwrap().alpha(), 0.2);
    }

    #[test]
    fn test_name_lookup() {
        let (mut scene, root) = scene_with_root();
        let a = scene.spawn(EntityBuilder::new().name("layer"));
        let b = scene.spawn(EntityBuilder::new().name("ship"));
        let c = scene.spawn(EntityBuilder::new().name("ship"));
        scene.add_child(root, a).unwrap();
        scene.add_child(a, b).unwrap();
        scene.add_child(root, c).unwrap();

        assert_eq!(scene.child_named(root, "ship"), Some(c));
        assert_eq!(scene.entity_named(root, "ship", false), Some(b));
        assert_eq!(scene.entity_named(a, "layer", true), Some(a));
        assert_eq!(scene.entity_named(a, "layer", false), None);
        assert_eq!(scene.entity_named(root, "missing", true), None);
    }

    #[test]
    fn test_free_releases_subtree() {
        let (mut scene, root) = scene_with_root();
        let a = scene.spawn(EntityBuilder::new());
        let b = scene.spawn(EntityBuilder::new());
        let c = scene.spawn(EntityBuilder::new());
        scene.add_child(root, a).unwrap();
        scene.add_child(a, b).unwrap();
        scene.add_child(b, c).unwrap();

        scene.free(a, true).unwrap();

        assert!(!scene.contains(a));
        assert!(!scene.contains(b));
        assert!(!scene.contains(c));
        assert_eq!(scene.num_children(root), 0);
        assert_eq!(scene.len(), 1);
        assert_eq!(scene.free(a, false), Err(SceneError::InvalidEntity));
    }

    #[test]
    fn test_clear_keeps_entity() {
        let (mut scene, root) = scene_with_root();
        let a = scene.spawn(EntityBuilder::new());
        let b = scene.spawn(EntityBuilder::new());
        scene.add_child(root, a).unwrap();
        scene.add_child(a, b).unwrap();

        scene.clear(root).unwrap();

        assert!(scene.contains(root));
        assert!(!scene.contains(a));
        assert!(!scene.contains(b));
        assert_eq!(scene.num_children(root), 0);
        assert!(scene.is_dirty(root));
    }

    #[test]
    fn test_deferred_removal_keeps_child_attached() {
        let (mut scene, root) = scene_with_root();
        let a = scene.spawn(EntityBuilder::new());
        scene.add_child(root, a).unwrap();

        scene.remove_child_deferred(root, a).unwrap();
        scene.remove_child_deferred(root, a).unwrap();

        assert_eq!(scene.parent(a), Some(root));
        assert_eq!(scene.pending_removals().collect::<Vec<_>>(), vec![a]);
        assert_eq!(scene.drain_removals().len(), 1);
        assert_eq!(scene.pending_removals().count(), 0);
    }
}
