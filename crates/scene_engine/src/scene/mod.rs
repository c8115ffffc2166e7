//! Retained-mode scene graph
//!
//! A tree of transformable, drawable entities stored in an arena.
//!
//! ## Architecture
//!
//! ```text
//! local mutation ──► dirty flags (ancestors + descendants)
//!        │
//!        ▼
//! apply_transform_recursive   (top-down, absolute state)
//!        │
//!        ▼
//! refresh_area                (bottom-up, dirty nodes only)
//!        │
//!        ├──► queries  (point, rect, segment, entity, raycast)
//!        └──► draw     (cull against the redraw region, clip, emit)
//! ```
//!
//! Structural edits fail fast with [`SceneError`] and leave the graph
//! unmodified. Removals requested while a traversal is running are queued
//! with [`SceneGraph::remove_child_deferred`] and applied by the driver at
//! the end of the frame.

mod area;
mod camera;
mod entity;
mod error;
mod graph;
mod query;
mod transform;
mod update;
mod visual;

#[cfg(test)]
mod tests;

pub use camera::Camera;
pub use entity::{AbsoluteState, Bounds, CollisionShape, Entity, EntityBuilder, EntityId};
pub use error::SceneError;
pub use graph::SceneGraph;
pub use query::RaycastResult;
pub use update::Behavior;
pub use visual::{AnimationState, ImageContent, TextAlign, TextContent, Visual};

pub use crate::physics::{polygon_collision, PolygonCollision};
