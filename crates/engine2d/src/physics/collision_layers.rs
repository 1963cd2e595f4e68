//! Collision layer filtering
//!
//! Every entity sits on one or more layers and carries a mask of the layers
//! it wants to hit. A pair is only tested when each side's layer is in the
//! other side's mask. Entities keep the default (`ALL`/`ALL`) unless a game
//! needs filtering, in which case every collision-capable pair is tested.

/// Collision layer bits
pub struct CollisionLayers;

impl CollisionLayers {
    /// No collision layer
    pub const NONE: u32 = 0;

    /// All collision layers
    pub const ALL: u32 = u32::MAX;

    /// Player-controlled entities
    pub const PLAYER: u32 = 1 << 0;

    /// Opponents and enemies
    pub const OPPONENT: u32 = 1 << 1;

    /// Balls, bullets and other moving projectiles
    pub const PROJECTILE: u32 = 1 << 2;

    /// Walls and other static scenery
    pub const WALL: u32 = 1 << 3;

    /// Pickups and collectibles
    pub const PICKUP: u32 = 1 << 4;

    /// HUD elements; give them this layer and a `NONE` mask to keep them out
    pub const HUD: u32 = 1 << 5;

    /// Check if two entities should be tested against each other
    pub fn should_collide(layer_a: u32, mask_a: u32, layer_b: u32, mask_b: u32) -> bool {
        // A's layer must be in B's mask AND B's layer must be in A's mask
        (layer_a & mask_b) != 0 && (layer_b & mask_a) != 0
    }

    /// Helper to create a mask from multiple layers
    pub fn mask(layers: &[u32]) -> u32 {
        layers.iter().fold(Self::NONE, |acc, &layer| acc | layer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_always_collide() {
        assert!(CollisionLayers::should_collide(
            CollisionLayers::ALL, CollisionLayers::ALL,
            CollisionLayers::ALL, CollisionLayers::ALL
        ));
    }

    #[test]
    fn test_one_way_interest_is_not_enough() {
        // The ball wants walls, but the wall only accepts players
        assert!(!CollisionLayers::should_collide(
            CollisionLayers::PROJECTILE, CollisionLayers::WALL,
            CollisionLayers::WALL, CollisionLayers::PLAYER
        ));
    }

    #[test]
    fn test_hud_stays_out() {
        assert!(!CollisionLayers::should_collide(
            CollisionLayers::HUD, CollisionLayers::NONE,
            CollisionLayers::ALL, CollisionLayers::ALL
        ));
    }

    #[test]
    fn test_mask_creation() {
        let mask = CollisionLayers::mask(&[
            CollisionLayers::PLAYER,
            CollisionLayers::WALL,
        ]);

        assert_eq!(mask, CollisionLayers::PLAYER | CollisionLayers::WALL);
    }
}
