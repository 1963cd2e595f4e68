//! Entities and the collection that runs them
//!
//! Entities are composed from an [`EntityCore`] plus whichever hooks their
//! [`Capabilities`] enable. The [`EntityCollection`] owns every live entity and
//! advances the simulation one frame per `update` call.

pub mod bounding_box;
pub mod collection;
pub mod context;
pub mod entity;
pub mod observer;
pub mod statistics;
pub mod supplier;

#[cfg(test)]
mod tests;

pub use bounding_box::BoundingBox;
pub use collection::{CollectionError, EntityCollection};
pub use context::UpdateContext;
pub use entity::{Anchor, Capabilities, CollisionPeer, Entity, EntityCore};
pub use observer::{ObserverError, StatisticsLog, StatisticsObserver};
pub use statistics::EntityCollectionStatistics;
pub use supplier::{
    share, EntityQueue, EntitySupplier, IntervalSpawner, OneShotSupplier, SharedSupplier, SupplyBatch, SupplyError,
};
