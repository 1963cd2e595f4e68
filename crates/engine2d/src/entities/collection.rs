//! The entity collection
//!
//! Owns every live entity and runs one frame per [`EntityCollection::update`]
//! call, in five strict phases:
//!
//! 1. **Drain**: poll each registered supplier once, then the entities spawned
//!    during the previous frame. Drained entities join the live set but sit out
//!    the rest of this frame.
//! 2. **Update**: queued input is applied, then every updatable entity runs its
//!    hook in insertion order. Spawns and supplier registrations are queued.
//! 3. **Collision**: collision-capable, non-removed entities are tested pairwise
//!    with their post-update bounding boxes.
//! 4. **Purge**: entities flagged for removal are dropped, each with a single
//!    removal notification.
//! 5. **Publish**: a statistics snapshot goes to every observer.
//!
//! The live set is a slot map, so removal kills a slot instead of shifting
//! entities around and stale handles simply stop resolving.

use std::rc::Rc;

use thiserror::Error;

use crate::debug::bounding_box::BoundingBoxOverlay;
use crate::entities::context::UpdateContext;
use crate::entities::entity::{Capabilities, CollisionPeer, Entity};
use crate::entities::observer::{ObserverError, ObserverRegistry, StatisticsObserver};
use crate::entities::statistics::{EntityCollectionStatistics, FrameCounters, LiveCensus};
use crate::entities::supplier::{share, EntitySupplier, SharedSupplier, SupplyError};
use crate::events::{EntityEvent, EntityEventHandler, EventKind, EventSystem};
use crate::foundation::collections::{EntityId, HandleMap, ObserverId, SupplierId};
use crate::input::{InputEvent, InputFrame, InputManager, KeyCode};
use crate::physics::collision_system::{Collider, CollisionPair, CollisionSystem};

/// Entity collection errors
#[derive(Error, Debug)]
pub enum CollectionError {
    /// A supplier failed during the drain phase
    #[error("supplier '{supplier}' failed: {source}")]
    Supplier {
        /// Supplier name
        supplier: String,
        /// Underlying failure
        #[source]
        source: SupplyError,
    },

    /// An observer failed during the publish phase
    #[error("statistics observer failed: {source}")]
    Observer {
        /// Underlying failure
        #[from]
        source: ObserverError,
    },

    /// The same shared supplier instance was registered twice
    #[error("supplier is already registered")]
    DuplicateSupplier,

    /// No supplier with this handle
    #[error("unknown supplier {0:?}")]
    UnknownSupplier(SupplierId),

    /// No live entity with this handle
    #[error("unknown or removed entity {0:?}")]
    UnknownEntity(EntityId),

    /// No observer with this handle
    #[error("unknown observer {0:?}")]
    UnknownObserver(ObserverId),

    /// The driver went back in time
    #[error("timestamp {current} is earlier than the previous frame's {previous}")]
    NonMonotonicTimestamp {
        /// Previous frame's timestamp
        previous: u64,
        /// Offending timestamp
        current: u64,
    },
}

/// A live entity plus the frame it was drained in
struct EntitySlot {
    entity: Box<dyn Entity>,
    drained_in: u64,
}

/// Owner of all live entities and the per-frame pipeline
pub struct EntityCollection {
    entities: HandleMap<EntityId, EntitySlot>,
    order: Vec<EntityId>,

    suppliers: HandleMap<SupplierId, SharedSupplier>,
    supplier_order: Vec<SupplierId>,
    pending_suppliers: Vec<SharedSupplier>,
    staged: Vec<Box<dyn Entity>>,
    spawned: Vec<Box<dyn Entity>>,

    observers: ObserverRegistry,
    events: EventSystem,
    input: InputManager,
    collisions: CollisionSystem,
    overlay: Option<BoundingBoxOverlay>,

    frame: u64,
    last_timestamp: Option<u64>,
    last_statistics: Option<EntityCollectionStatistics>,
}

impl Default for EntityCollection {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityCollection {
    /// Create an empty collection
    pub fn new() -> Self {
        Self {
            entities: HandleMap::with_key(),
            order: Vec::new(),
            suppliers: HandleMap::with_key(),
            supplier_order: Vec::new(),
            pending_suppliers: Vec::new(),
            staged: Vec::new(),
            spawned: Vec::new(),
            observers: ObserverRegistry::new(),
            events: EventSystem::new(),
            input: InputManager::new(),
            collisions: CollisionSystem::new(),
            overlay: None,
            frame: 0,
            last_timestamp: None,
            last_statistics: None,
        }
    }

    // ---- registration -------------------------------------------------

    /// Register a supplier; it is drained from the next frame on
    pub fn register_supplier(&mut self, supplier: impl EntitySupplier + 'static) -> SupplierId {
        self.insert_supplier(share(supplier))
    }

    /// Register a supplier the caller keeps a handle to
    ///
    /// Registering the same instance twice is an invariant violation.
    pub fn register_shared_supplier(&mut self, supplier: SharedSupplier) -> Result<SupplierId, CollectionError> {
        if self.is_registered(&supplier) {
            log::error!("Refusing duplicate registration of supplier '{}'", supplier.borrow().name());
            return Err(CollectionError::DuplicateSupplier);
        }
        Ok(self.insert_supplier(supplier))
    }

    /// Deregister a supplier before it is exhausted
    pub fn deregister_supplier(&mut self, id: SupplierId) -> Result<(), CollectionError> {
        if self.suppliers.remove(id).is_none() {
            log::warn!("Supplier {id:?} is not registered; it may already be exhausted");
            return Err(CollectionError::UnknownSupplier(id));
        }
        self.supplier_order.retain(|&s| s != id);
        Ok(())
    }

    /// Register a statistics observer
    pub fn register_observer(&mut self, observer: impl StatisticsObserver + 'static) -> ObserverId {
        self.observers.register(Box::new(observer))
    }

    /// Deregister a statistics observer
    pub fn deregister_observer(&mut self, id: ObserverId) -> Result<(), CollectionError> {
        self.observers
            .deregister(id)
            .map(drop)
            .ok_or(CollectionError::UnknownObserver(id))
    }

    /// Register a handler for entity lifecycle events
    pub fn register_event_handler(&mut self, kind: EventKind, handler: impl EntityEventHandler + 'static) {
        self.events.register_handler(kind, Box::new(handler));
    }

    /// Queue host input; applied at the next frame's update phase
    pub fn queue_input(&mut self, event: InputEvent) {
        self.input.queue(event);
    }

    /// Turn the bounding box overlay on or off
    pub fn set_bounding_box_overlay(&mut self, enabled: bool) {
        match (enabled, self.overlay.is_some()) {
            (true, false) => self.overlay = Some(BoundingBoxOverlay::new()),
            (false, true) => self.overlay = None,
            _ => {}
        }
    }

    fn insert_supplier(&mut self, supplier: SharedSupplier) -> SupplierId {
        let id = self.suppliers.insert(supplier);
        self.supplier_order.push(id);
        id
    }

    fn is_registered(&self, supplier: &SharedSupplier) -> bool {
        self.suppliers.values().any(|existing| Rc::ptr_eq(existing, supplier))
    }

    // ---- access -------------------------------------------------------

    /// Number of live entities
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether no entity is live
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Live entity handles in insertion order
    pub fn ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.order.iter().copied()
    }

    /// Live entities in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &dyn Entity)> + '_ {
        self.order
            .iter()
            .filter_map(|&id| self.entities.get(id).map(|slot| (id, slot.entity.as_ref())))
    }

    /// Whether `id` is live
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(id)
    }

    /// Look up a live entity
    pub fn entity(&self, id: EntityId) -> Result<&dyn Entity, CollectionError> {
        self.entities
            .get(id)
            .map(|slot| slot.entity.as_ref())
            .ok_or(CollectionError::UnknownEntity(id))
    }

    /// Look up a live entity for mutation between frames
    pub fn entity_mut(&mut self, id: EntityId) -> Result<&mut dyn Entity, CollectionError> {
        match self.entities.get_mut(id) {
            Some(slot) => Ok(slot.entity.as_mut()),
            None => Err(CollectionError::UnknownEntity(id)),
        }
    }

    /// Flag an entity for removal at the next purge phase
    pub fn remove(&mut self, id: EntityId) -> Result<(), CollectionError> {
        self.entity_mut(id)?.core_mut().remove();
        Ok(())
    }

    /// Visible, drawable entities sorted by view order
    ///
    /// Equal view orders keep insertion order.
    pub fn draw_order(&self) -> Vec<EntityId> {
        let mut drawable: Vec<(EntityId, f64)> = self
            .iter()
            .filter(|(_, entity)| {
                let core = entity.core();
                core.is_visible() && core.capabilities().contains(Capabilities::DRAWABLE)
            })
            .map(|(id, entity)| (id, entity.core().view_order()))
            .collect();
        drawable.sort_by(|a, b| a.1.total_cmp(&b.1));
        drawable.into_iter().map(|(id, _)| id).collect()
    }

    /// Number of registered suppliers
    pub fn supplier_count(&self) -> usize {
        self.supplier_order.len()
    }

    /// Number of registered observers
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Frames run so far
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Snapshot published by the last completed frame
    pub fn last_statistics(&self) -> Option<&EntityCollectionStatistics> {
        self.last_statistics.as_ref()
    }

    /// Pairs found by the last collision phase
    pub fn current_collisions(&self) -> &[CollisionPair] {
        self.collisions.current_collisions()
    }

    /// Bounding box overlay, when enabled
    pub fn bounding_box_overlay(&self) -> Option<&BoundingBoxOverlay> {
        self.overlay.as_ref()
    }

    /// Current input state
    pub fn input(&self) -> &InputManager {
        &self.input
    }

    // ---- the frame ----------------------------------------------------

    /// Run one frame
    ///
    /// `timestamp` is the driver's monotonic clock in nanoseconds. A failing
    /// supplier or observer aborts the frame and the error is returned as is.
    /// A supplier failure leaves the frame number and last timestamp untouched,
    /// and entities already handed over by earlier suppliers join the live set
    /// at the next successful drain.
    pub fn update(&mut self, timestamp: u64) -> Result<EntityCollectionStatistics, CollectionError> {
        if let Some(previous) = self.last_timestamp {
            if timestamp < previous {
                return Err(CollectionError::NonMonotonicTimestamp { previous, current: timestamp });
            }
        }

        let mut counters = FrameCounters::default();

        // The frame only counts once every supplier has delivered
        let frame = self.frame + 1;
        self.drain(timestamp, frame, &mut counters)?;
        self.frame = frame;
        self.last_timestamp = Some(timestamp);

        self.apply_input();
        self.update_entities(timestamp);
        self.detect_collisions(&mut counters);
        self.purge(&mut counters);
        let statistics = self.publish(timestamp, &counters)?;

        log::debug!("{statistics}");
        Ok(statistics)
    }

    fn drain(&mut self, timestamp: u64, frame: u64, counters: &mut FrameCounters) -> Result<(), CollectionError> {
        let mut exhausted = Vec::new();
        let mut failure = None;

        for &id in &self.supplier_order {
            let Some(supplier) = self.suppliers.get(id) else {
                continue;
            };
            let Ok(mut supplier) = supplier.try_borrow_mut() else {
                failure = Some(CollectionError::Supplier {
                    supplier: format!("{id:?}"),
                    source: SupplyError::new("supplier is borrowed elsewhere during the drain phase"),
                });
                break;
            };

            match supplier.supply(timestamp) {
                Ok(batch) => {
                    if batch.is_exhausted() {
                        log::debug!("Supplier '{}' exhausted in frame {frame}", supplier.name());
                        exhausted.push(id);
                    }
                    self.staged.extend(batch.into_entities());
                }
                Err(source) => {
                    log::error!("Supplier '{}' failed, aborting frame {frame}: {source}", supplier.name());
                    failure = Some(CollectionError::Supplier {
                        supplier: supplier.name().to_string(),
                        source,
                    });
                    break;
                }
            }
        }

        for id in exhausted {
            self.suppliers.remove(id);
            self.supplier_order.retain(|&s| s != id);
        }

        // Batches handed over before the failure stay staged for the next drain
        if let Some(error) = failure {
            log::debug!("{} supplied entities held back until the next frame", self.staged.len());
            return Err(error);
        }

        let mut drained = std::mem::take(&mut self.staged);
        drained.append(&mut self.spawned);

        for mut entity in drained {
            let tag = entity.core().tag();
            let id = self.entities.insert_with_key(|id| {
                entity.core_mut().assign_id(id);
                EntitySlot { entity, drained_in: frame }
            });
            self.order.push(id);
            self.events.send(EntityEvent::Spawned { id, tag });
            counters.drained += 1;
        }

        log::trace!("Drain phase: {} entities added", counters.drained);
        self.events.dispatch();
        Ok(())
    }

    fn apply_input(&mut self) {
        let f1_was_down = self.input.pressed_keys().contains(&KeyCode::F1);
        let frame: InputFrame = self.input.take_frame();
        if frame.is_empty() {
            return;
        }

        if let Some(pressed) = &frame.pressed_keys {
            if pressed.contains(&KeyCode::F1) && !f1_was_down {
                let enabled = self.overlay.is_none();
                log::info!("Bounding box overlay {}", if enabled { "on" } else { "off" });
                self.set_bounding_box_overlay(enabled);
            }
        }

        let mut key_listeners = 0usize;
        for &id in &self.order {
            let Some(slot) = self.entities.get_mut(id) else {
                continue;
            };
            if slot.drained_in == self.frame || slot.entity.core().is_removed() {
                continue;
            }

            let capabilities = slot.entity.core().capabilities();
            if let Some(pressed) = &frame.pressed_keys {
                if capabilities.contains(Capabilities::KEY_LISTENER) {
                    slot.entity.on_pressed_keys_change(pressed);
                    key_listeners += 1;
                }
            }
            if let Some(position) = frame.mouse_position {
                if capabilities.contains(Capabilities::MOUSE_LISTENER) {
                    slot.entity.on_mouse_moved(position);
                }
            }
        }

        if key_listeners == 0 && frame.changed_besides(KeyCode::F1) {
            log::warn!("Key change in frame {} dropped, no key listener is live", self.frame);
        }
    }

    fn update_entities(&mut self, timestamp: u64) {
        let mut updated = 0usize;

        for &id in &self.order {
            let Some(slot) = self.entities.get_mut(id) else {
                continue;
            };
            let core = slot.entity.core();
            if slot.drained_in == self.frame || core.is_removed() || core.is_static() {
                continue;
            }

            let mut ctx = UpdateContext::new(
                id,
                timestamp,
                self.frame,
                &mut self.spawned,
                &self.suppliers,
                &mut self.pending_suppliers,
            );
            slot.entity.update(&mut ctx);
            updated += 1;
        }

        for supplier in std::mem::take(&mut self.pending_suppliers) {
            self.insert_supplier(supplier);
        }

        log::trace!("Update phase: {updated} entities updated, {} spawns queued", self.spawned.len());
    }

    fn detect_collisions(&mut self, counters: &mut FrameCounters) {
        let colliders: Vec<Collider> = self
            .order
            .iter()
            .filter_map(|&id| {
                let slot = self.entities.get(id)?;
                let core = slot.entity.core();
                let eligible = slot.drained_in != self.frame && core.is_collision_capable() && !core.is_removed();
                eligible.then(|| Collider {
                    entity: id,
                    bounds: core.bounding_box(),
                    layer: core.layer(),
                    mask: core.mask(),
                })
            })
            .collect();

        let pairs = self.collisions.detect_collisions(&colliders).to_vec();
        counters.collision_checks = self.collisions.checks();
        counters.collisions = pairs.len();

        for pair in pairs {
            let (Some(first), Some(second)) = (self.peer(pair.first), self.peer(pair.second)) else {
                continue;
            };
            if let Some(slot) = self.entities.get_mut(pair.first) {
                slot.entity.on_collision(&second);
            }
            if let Some(slot) = self.entities.get_mut(pair.second) {
                slot.entity.on_collision(&first);
            }
            self.events.send(EntityEvent::Collision(pair));
        }
        self.events.dispatch();

        if let Some(overlay) = self.overlay.as_mut() {
            for &id in &self.order {
                if let Some(slot) = self.entities.get(id) {
                    if slot.entity.core().is_collision_capable() {
                        overlay.track(id, slot.entity.core());
                    }
                }
            }
        }
    }

    fn peer(&self, id: EntityId) -> Option<CollisionPeer> {
        let core = self.entities.get(id)?.entity.core();
        Some(CollisionPeer {
            id,
            tag: core.tag(),
            bounds: core.bounding_box(),
            view_order: core.view_order(),
        })
    }

    fn purge(&mut self, counters: &mut FrameCounters) {
        let entities = &mut self.entities;
        let events = &mut self.events;
        let overlay = &mut self.overlay;

        self.order.retain(|&id| {
            let flagged = entities.get(id).is_some_and(|slot| slot.entity.core().is_removed());
            if !flagged {
                return true;
            }

            if let Some(mut slot) = entities.remove(id) {
                slot.entity.on_removed();
                if let Some(overlay) = overlay.as_mut() {
                    overlay.detach(id);
                }
                events.send(EntityEvent::Removed { id, tag: slot.entity.core().tag() });
                counters.removed += 1;
            }
            false
        });

        log::trace!("Purge phase: {} entities removed", counters.removed);
        self.events.dispatch();
    }

    fn publish(&mut self, timestamp: u64, counters: &FrameCounters) -> Result<EntityCollectionStatistics, CollectionError> {
        let mut census = LiveCensus {
            suppliers: self.supplier_order.len(),
            ..LiveCensus::default()
        };
        for (_, entity) in self.iter() {
            let core = entity.core();
            census.entities += 1;
            if core.is_static() {
                census.statics += 1;
            } else {
                census.updatables += 1;
            }
            if core.capabilities().contains(Capabilities::KEY_LISTENER) {
                census.key_listeners += 1;
            }
        }

        let statistics = EntityCollectionStatistics::new(self.frame, timestamp, &census, counters);
        self.last_statistics = Some(statistics);

        self.observers.publish(&statistics).map_err(|err| {
            log::error!("Statistics observer failed in frame {}: {err}", self.frame);
            CollectionError::Observer { source: err }
        })?;
        Ok(statistics)
    }
}
