//! Per-entity view of the running frame
//!
//! An entity never touches the live set directly. Everything it wants to add
//! goes through the enqueue callbacks here and only takes effect at the next
//! drain phase.

use std::rc::Rc;

use crate::entities::collection::CollectionError;
use crate::entities::entity::Entity;
use crate::entities::supplier::{EntitySupplier, SharedSupplier};
use crate::foundation::collections::{EntityId, HandleMap, SupplierId};

/// Handed to [`Entity::update`]
pub struct UpdateContext<'a> {
    id: EntityId,
    timestamp: u64,
    frame: u64,
    spawned: &'a mut Vec<Box<dyn Entity>>,
    registered: &'a HandleMap<SupplierId, SharedSupplier>,
    pending_suppliers: &'a mut Vec<SharedSupplier>,
}

impl<'a> UpdateContext<'a> {
    pub(crate) fn new(
        id: EntityId,
        timestamp: u64,
        frame: u64,
        spawned: &'a mut Vec<Box<dyn Entity>>,
        registered: &'a HandleMap<SupplierId, SharedSupplier>,
        pending_suppliers: &'a mut Vec<SharedSupplier>,
    ) -> Self {
        Self {
            id,
            timestamp,
            frame,
            spawned,
            registered,
            pending_suppliers,
        }
    }

    /// Handle of the entity being updated
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Frame timestamp in nanoseconds
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    /// Number of the running frame, starting at 1
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Queue a new entity; it joins the live set at the next drain phase
    pub fn spawn(&mut self, entity: impl Entity + 'static) {
        self.spawned.push(Box::new(entity));
    }

    /// Queue an already boxed entity
    pub fn spawn_boxed(&mut self, entity: Box<dyn Entity>) {
        self.spawned.push(entity);
    }

    /// Register a supplier, drained from the next frame onward
    pub fn register_supplier(&mut self, supplier: impl EntitySupplier + 'static) {
        self.pending_suppliers.push(crate::entities::supplier::share(supplier));
    }

    /// Register a shared supplier
    ///
    /// Fails when the same instance is already registered or queued.
    pub fn register_shared_supplier(&mut self, supplier: SharedSupplier) -> Result<(), CollectionError> {
        let known = self
            .registered
            .values()
            .chain(self.pending_suppliers.iter())
            .any(|existing| Rc::ptr_eq(existing, &supplier));

        if known {
            return Err(CollectionError::DuplicateSupplier);
        }
        self.pending_suppliers.push(supplier);
        Ok(())
    }
}
