//! # Engine2D
//!
//! The simulation core of a small 2D game engine.
//!
//! ## Features
//!
//! - **Entity Collection**: Owns every live entity and runs a strict
//!   drain → update → collision → purge → publish pipeline each frame
//! - **Deferred Spawning**: Suppliers and in-frame spawns join the live set
//!   only at the next drain, so iteration never sees a mutating set
//! - **AABB Collisions**: Deterministic pairwise overlap tests with collision
//!   layers and one notification per colliding pair
//! - **Statistics**: A per-frame snapshot published to registered observers
//! - **Debug Overlay**: Bounding box visualizers toggled with F1
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use engine2d::prelude::*;
//!
//! struct MyGame;
//!
//! impl Application for MyGame {
//!     fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError> {
//!         // Register suppliers and observers
//!         engine.entities_mut().register_observer(StatisticsLog::new(60));
//!         Ok(())
//!     }
//!
//!     fn update(&mut self, _engine: &mut Engine, _delta_time: f64) -> Result<(), AppError> {
//!         // Update game logic
//!         Ok(())
//!     }
//!
//!     fn cleanup(&mut self, _engine: &mut Engine) {}
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = EngineConfig::default();
//!     let mut game = MyGame;
//!     Engine::run(config, &mut game)?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

// Core engine modules
pub mod core;

pub mod foundation;
pub mod config;
pub mod entities;
pub mod physics;
pub mod events;
pub mod input;
pub mod debug;

mod application;
mod engine;

pub use application::{AppError, AppEvent, Application};
pub use engine::{Engine, EngineError};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        AppError, AppEvent, Application,
        Engine, EngineError,
        core::config::{Config, ConfigError, DebugConfig, EngineConfig, LoopConfig},
        foundation::{
            collections::{EntityId, ObserverId, SupplierId},
            math::{Coordinate2D, Size, Vec2},
            time::NANOS_PER_SECOND,
        },
        entities::{
            Anchor, Capabilities, CollectionError, CollisionPeer, Entity, EntityCollection,
            EntityCollectionStatistics, EntityCore, EntityQueue, EntitySupplier, IntervalSpawner,
            ObserverError, OneShotSupplier, StatisticsLog, StatisticsObserver, SupplyBatch, SupplyError,
            UpdateContext,
        },
        events::{EntityEvent, EventKind},
        physics::{CollisionLayers, CollisionPair},
        input::{InputEvent, KeyCode},
    };
}
