//! Deferred entity sources
//!
//! A supplier is polled once per frame during the drain phase. Whatever it
//! yields becomes owned by the collection; a supplier that reports itself
//! exhausted is dropped after that frame's drain.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use thiserror::Error;

use crate::entities::entity::Entity;
use crate::foundation::time::NANOS_PER_SECOND;

/// A supplier shared between the collection and its creator
pub type SharedSupplier = Rc<RefCell<dyn EntitySupplier>>;

/// Wrap a supplier for registration
pub fn share(supplier: impl EntitySupplier + 'static) -> SharedSupplier {
    Rc::new(RefCell::new(supplier))
}

/// A supplier could not produce its batch
///
/// This is a programming defect in the supplier, never a runtime condition.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{reason}")]
pub struct SupplyError {
    reason: String,
}

impl SupplyError {
    /// Create a new supply error
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }

    /// Why the supplier failed
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// Entities produced by one drain
pub struct SupplyBatch {
    entities: Vec<Box<dyn Entity>>,
    exhausted: bool,
}

impl SupplyBatch {
    /// A batch after which the supplier stays registered
    pub fn more(entities: Vec<Box<dyn Entity>>) -> Self {
        Self { entities, exhausted: false }
    }

    /// The final batch; the supplier is deregistered afterwards
    pub fn last(entities: Vec<Box<dyn Entity>>) -> Self {
        Self { entities, exhausted: true }
    }

    /// Nothing this frame
    pub fn empty() -> Self {
        Self::more(Vec::new())
    }

    /// Whether the supplier has finished
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Number of entities in the batch
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the batch carries no entities
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Take ownership of the entities
    pub fn into_entities(self) -> Vec<Box<dyn Entity>> {
        self.entities
    }
}

/// Lazy producer of entities
pub trait EntitySupplier {
    /// Produce this frame's entities
    ///
    /// Called exactly once per frame while the supplier is registered. Must
    /// not block.
    fn supply(&mut self, timestamp: u64) -> Result<SupplyBatch, SupplyError>;

    /// Name used in diagnostics
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Open-ended queue that game code can push to at any time
///
/// Clones share the same queue, so one clone can be registered while the
/// others keep pushing.
#[derive(Clone, Default)]
pub struct EntityQueue {
    queue: Rc<RefCell<VecDeque<Box<dyn Entity>>>>,
}

impl EntityQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an entity for the next drain
    pub fn push(&self, entity: impl Entity + 'static) {
        self.queue.borrow_mut().push_back(Box::new(entity));
    }

    /// Entities waiting for the next drain
    pub fn len(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Whether nothing is waiting
    pub fn is_empty(&self) -> bool {
        self.queue.borrow().is_empty()
    }
}

impl EntitySupplier for EntityQueue {
    fn supply(&mut self, _timestamp: u64) -> Result<SupplyBatch, SupplyError> {
        let entities = self.queue.borrow_mut().drain(..).collect();
        Ok(SupplyBatch::more(entities))
    }

    fn name(&self) -> &str {
        "entity-queue"
    }
}

/// Yields a fixed set of entities once
pub struct OneShotSupplier {
    entities: Vec<Box<dyn Entity>>,
}

impl OneShotSupplier {
    /// Create a supplier for the given entities
    pub fn new(entities: Vec<Box<dyn Entity>>) -> Self {
        Self { entities }
    }

    /// Add one more entity before registration
    pub fn with(mut self, entity: impl Entity + 'static) -> Self {
        self.entities.push(Box::new(entity));
        self
    }
}

impl EntitySupplier for OneShotSupplier {
    fn supply(&mut self, _timestamp: u64) -> Result<SupplyBatch, SupplyError> {
        Ok(SupplyBatch::last(std::mem::take(&mut self.entities)))
    }

    fn name(&self) -> &str {
        "one-shot"
    }
}

/// Spawns one entity per elapsed interval of frame time
///
/// The first spawn happens one interval after the first drain. With a limit
/// the spawner reports itself exhausted together with its last entity.
///
/// After a stall (a paused host, a slow frame) at most `max_burst` overdue
/// entities are spawned at once; the remaining missed intervals are skipped
/// and the schedule restarts from the current timestamp.
pub struct IntervalSpawner<F> {
    interval_nanos: u64,
    next_due: Option<u64>,
    remaining: Option<u32>,
    max_burst: u32,
    factory: F,
}

const DEFAULT_MAX_BURST: u32 = 4;

impl<F> IntervalSpawner<F>
where
    F: FnMut(u64) -> Result<Box<dyn Entity>, SupplyError>,
{
    /// Spawn through `factory` every `interval_nanos`
    pub fn new(interval_nanos: u64, factory: F) -> Self {
        Self {
            interval_nanos: interval_nanos.max(1),
            next_due: None,
            remaining: None,
            max_burst: DEFAULT_MAX_BURST,
            factory,
        }
    }

    /// Spawn every `millis` milliseconds
    pub fn every_millis(millis: u64, factory: F) -> Self {
        Self::new(millis.saturating_mul(NANOS_PER_SECOND / 1000), factory)
    }

    /// Spawn at most `count` overdue entities per drain (at least one)
    pub fn with_max_burst(mut self, count: u32) -> Self {
        self.max_burst = count.max(1);
        self
    }

    /// Stop after `count` entities
    pub fn with_limit(mut self, count: u32) -> Self {
        self.remaining = Some(count);
        self
    }
}

impl<F> EntitySupplier for IntervalSpawner<F>
where
    F: FnMut(u64) -> Result<Box<dyn Entity>, SupplyError>,
{
    fn supply(&mut self, timestamp: u64) -> Result<SupplyBatch, SupplyError> {
        if self.remaining == Some(0) {
            return Ok(SupplyBatch::last(Vec::new()));
        }

        let interval = self.interval_nanos;
        let mut due = *self.next_due.get_or_insert(timestamp.saturating_add(interval));
        let mut entities = Vec::new();

        while timestamp >= due && self.remaining != Some(0) && entities.len() < self.max_burst as usize {
            entities.push((self.factory)(timestamp)?);
            due = due.saturating_add(interval);
            if let Some(remaining) = self.remaining.as_mut() {
                *remaining -= 1;
            }
        }

        if timestamp >= due {
            log::debug!("Interval spawner fell behind at {timestamp}, skipping missed intervals");
            due = timestamp.saturating_add(interval);
        }
        self.next_due = Some(due);

        if self.remaining == Some(0) {
            Ok(SupplyBatch::last(entities))
        } else {
            Ok(SupplyBatch::more(entities))
        }
    }

    fn name(&self) -> &str {
        "interval-spawner"
    }
}
