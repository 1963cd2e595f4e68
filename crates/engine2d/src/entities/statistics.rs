//! Per-frame statistics snapshot

use serde::Serialize;

/// Counts gathered while the collection ran one frame
///
/// Built once at the end of the frame and never changed afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct EntityCollectionStatistics {
    frame: u64,
    timestamp: u64,
    entities: usize,
    updatables: usize,
    statics: usize,
    key_listeners: usize,
    suppliers: usize,
    drained: usize,
    removed: usize,
    collision_checks: usize,
    collisions: usize,
}

/// Mutable tallies the collection fills in phase by phase
#[derive(Debug, Default)]
pub(crate) struct FrameCounters {
    pub drained: usize,
    pub removed: usize,
    pub collision_checks: usize,
    pub collisions: usize,
}

/// Census of the live set at publish time
#[derive(Debug, Default)]
pub(crate) struct LiveCensus {
    pub entities: usize,
    pub updatables: usize,
    pub statics: usize,
    pub key_listeners: usize,
    pub suppliers: usize,
}

impl EntityCollectionStatistics {
    pub(crate) fn new(frame: u64, timestamp: u64, census: &LiveCensus, counters: &FrameCounters) -> Self {
        Self {
            frame,
            timestamp,
            entities: census.entities,
            updatables: census.updatables,
            statics: census.statics,
            key_listeners: census.key_listeners,
            suppliers: census.suppliers,
            drained: counters.drained,
            removed: counters.removed,
            collision_checks: counters.collision_checks,
            collisions: counters.collisions,
        }
    }

    /// Frame number, starting at 1
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Timestamp the frame ran with
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    /// Live entities after the purge phase
    pub fn entity_count(&self) -> usize {
        self.entities
    }

    /// Live entities with an update hook
    pub fn updatables(&self) -> usize {
        self.updatables
    }

    /// Live entities without an update hook
    pub fn statics(&self) -> usize {
        self.statics
    }

    /// Live entities listening for key changes
    pub fn key_listeners(&self) -> usize {
        self.key_listeners
    }

    /// Suppliers still registered after the drain phase
    pub fn suppliers(&self) -> usize {
        self.suppliers
    }

    /// Entities added by this frame's drain phase
    pub fn drained(&self) -> usize {
        self.drained
    }

    /// Entities purged this frame
    pub fn removed(&self) -> usize {
        self.removed
    }

    /// Bounding box tests performed by the collision phase
    pub fn collision_checks(&self) -> usize {
        self.collision_checks
    }

    /// Colliding pairs found by the collision phase
    pub fn collisions(&self) -> usize {
        self.collisions
    }
}

impl std::fmt::Display for EntityCollectionStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "frame {}: {} entities ({} updatable, {} static, {} key listeners), {} suppliers, +{} -{}, {} collisions in {} checks",
            self.frame,
            self.entities,
            self.updatables,
            self.statics,
            self.key_listeners,
            self.suppliers,
            self.drained,
            self.removed,
            self.collisions,
            self.collision_checks,
        )
    }
}
