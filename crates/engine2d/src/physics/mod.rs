//! Physics module for collision detection
//!
//! Axis-aligned bounding box overlap is the only physics the engine does.

pub mod collision_layers;
pub mod collision_system;

pub use collision_layers::CollisionLayers;
pub use collision_system::{CollisionSystem, CollisionPair, Collider};
