//! Core collision detection system
//!
//! Pure pairwise AABB testing that doesn't depend on the entity collection,
//! so it can be driven from tests or tools with plain collider snapshots.
//! Every unordered pair of colliders is tested once per frame; there is no
//! spatial partitioning, which keeps the result deterministic and is fine at
//! the entity counts a 2D scene carries.

use crate::entities::bounding_box::BoundingBox;
use crate::foundation::collections::EntityId;
use crate::physics::collision_layers::CollisionLayers;

/// Collision pair representing two entities that are colliding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CollisionPair {
    /// Participant that comes first in the collection's insertion order
    pub first: EntityId,
    /// The other participant
    pub second: EntityId,
}

impl CollisionPair {
    /// Create a pair in detection order
    pub fn new(first: EntityId, second: EntityId) -> Self {
        Self { first, second }
    }
}

/// Snapshot of one collision-capable entity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collider {
    /// Entity handle
    pub entity: EntityId,
    /// Bounding box after the update phase
    pub bounds: BoundingBox,
    /// Collision layer
    pub layer: u32,
    /// Collision mask
    pub mask: u32,
}

/// Pairwise AABB collision detection
#[derive(Debug, Default)]
pub struct CollisionSystem {
    /// Pairs from the current frame, in detection order
    current_pairs: Vec<CollisionPair>,

    /// Bounding box tests performed in the current frame
    checks: usize,
}

impl CollisionSystem {
    /// Create a new collision system
    pub fn new() -> Self {
        Self::default()
    }

    /// Test every unordered pair of `colliders`
    ///
    /// Colliders are expected in the collection's insertion order; the
    /// resulting pairs keep that order.
    pub fn detect_collisions(&mut self, colliders: &[Collider]) -> &[CollisionPair] {
        self.current_pairs.clear();
        self.checks = 0;

        for (index, a) in colliders.iter().enumerate() {
            for b in &colliders[index + 1..] {
                if !CollisionLayers::should_collide(a.layer, a.mask, b.layer, b.mask) {
                    continue;
                }

                self.checks += 1;
                if a.bounds.intersects(&b.bounds) {
                    self.current_pairs.push(CollisionPair::new(a.entity, b.entity));
                }
            }
        }

        log::trace!(
            "Collision pass: {} colliders, {} checks, {} pairs",
            colliders.len(),
            self.checks,
            self.current_pairs.len()
        );

        &self.current_pairs
    }

    /// Pairs found by the last detection
    pub fn current_collisions(&self) -> &[CollisionPair] {
        &self.current_pairs
    }

    /// Bounding box tests performed by the last detection
    pub fn checks(&self) -> usize {
        self.checks
    }
}
