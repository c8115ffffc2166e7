//! Structural errors raised by the scene graph

use thiserror::Error;

use crate::foundation::collections::ListError;

/// Scene graph invariant violations
///
/// These are surfaced immediately and leave the graph unmodified.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneError {
    /// The child already has a parent
    #[error("Entity is already a child of another entity")]
    AlreadyParented,

    /// An entity was attached to itself
    #[error("Cannot add an entity into itself")]
    SelfParenting,

    /// The new parent is a descendant of the child
    #[error("Cannot add an entity as a child of its own descendants")]
    CyclicGraph,

    /// Detach requested from a node that is not the child's parent
    #[error("Entity is not a child of this entity")]
    NotMyChild,

    /// The handle refers to a freed entity
    #[error("Entity handle does not exist")]
    InvalidEntity,

    /// Child list failure (already linked, index out of range)
    #[error(transparent)]
    List(#[from] ListError),
}
