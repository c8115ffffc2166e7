//! Collision bitmask used to filter picking, hit tests and queries
//!
//! Every entity carries a [`CollisionMask`]; a query passes its own mask and
//! an entity is considered only when the two share at least one bit.

use bitflags::bitflags;

bitflags! {
    /// Collision layer bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CollisionMask: u32 {
        /// Player controlled entities
        const PLAYER = 1 << 0;
        /// Hostile entities
        const ENEMY = 1 << 1;
        /// Projectiles
        const PROJECTILE = 1 << 2;
        /// Static scenery
        const ENVIRONMENT = 1 << 3;
        /// Trigger volumes
        const TRIGGER = 1 << 4;
        /// Interface elements
        const INTERFACE = 1 << 5;
        /// Pickups and collectibles
        const PICKUP = 1 << 6;

        // Bits 7-31 are free for the host
        const _ = !0;
    }
}

impl CollisionMask {
    /// Mask that matches nothing
    pub const NONE: Self = Self::empty();

    /// Mask that matches every layer
    pub const ALL: Self = Self::from_bits_retain(u32::MAX);

    /// Build a mask from a raw user bit index (0-31)
    pub fn layer(bit: u32) -> Self {
        Self::from_bits_retain(1u32.checked_shl(bit).unwrap_or(0))
    }

    /// Whether an entity with this mask is visible to a query with `query`
    pub fn accepts(self, query: Self) -> bool {
        self.intersects(query)
    }

    /// Mutual layer/mask filter
    ///
    /// A's layer must be in B's mask and B's layer must be in A's mask.
    pub fn should_collide(layer_a: Self, mask_a: Self, layer_b: Self, mask_b: Self) -> bool {
        layer_a.intersects(mask_b) && layer_b.intersects(mask_a)
    }
}

impl Default for CollisionMask {
    fn default() -> Self {
        Self::ALL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_everything() {
        let mask = CollisionMask::default();

        assert!(mask.accepts(CollisionMask::PLAYER));
        assert!(mask.accepts(CollisionMask::layer(31)));
        assert!(!mask.accepts(CollisionMask::NONE));
    }

    #[test]
    fn test_disjoint_masks_reject() {
        assert!(!CollisionMask::ENEMY.accepts(CollisionMask::PLAYER | CollisionMask::PICKUP));
        assert!(CollisionMask::ENEMY.accepts(CollisionMask::ENEMY | CollisionMask::PICKUP));
    }

    #[test]
    fn test_should_collide_mutual() {
        assert!(CollisionMask::should_collide(
            CollisionMask::PLAYER,
            CollisionMask::ENEMY,
            CollisionMask::ENEMY,
            CollisionMask::PLAYER,
        ));
        assert!(!CollisionMask::should_collide(
            CollisionMask::PLAYER,
            CollisionMask::ENEMY,
            CollisionMask::ENEMY,
            CollisionMask::PROJECTILE,
        ));
    }

    #[test]
    fn test_layer_out_of_range_is_empty() {
        assert_eq!(CollisionMask::layer(32), CollisionMask::NONE);
        assert_eq!(CollisionMask::layer(3), CollisionMask::ENVIRONMENT);
    }
}
