//! Entity lifecycle events
//!
//! The collection reports what happened to its entities during a frame:
//! - Handlers register for one event kind and only see that kind
//! - Handlers run in registration order
//! - A handler returning `true` consumes the event (stops forwarding)
//! - Events are queued during a phase and dispatched at its end

use std::collections::HashMap;

use crate::foundation::collections::EntityId;
use crate::physics::collision_system::CollisionPair;

/// Event type identification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// An entity joined the live set
    Spawned,
    /// An entity was purged
    Removed,
    /// Two entities overlapped
    Collision,
}

/// What happened to an entity
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EntityEvent {
    /// Entity drained into the live set
    Spawned {
        /// Handle of the new entity
        id: EntityId,
        /// Its tag
        tag: &'static str,
    },
    /// Entity purged from the live set; sent exactly once per entity
    Removed {
        /// Handle of the purged entity, no longer resolvable
        id: EntityId,
        /// Its tag
        tag: &'static str,
    },
    /// Colliding pair found by the collision phase
    Collision(CollisionPair),
}

impl EntityEvent {
    /// Kind used for handler lookup
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Spawned { .. } => EventKind::Spawned,
            Self::Removed { .. } => EventKind::Removed,
            Self::Collision(_) => EventKind::Collision,
        }
    }
}

/// Event handler trait
/// Returns true if event was consumed (stops forwarding)
/// Returns false to allow forwarding to other handlers
pub trait EntityEventHandler {
    /// Handle an event, return true if consumed
    fn on_event(&mut self, event: &EntityEvent) -> bool;
}

impl<F> EntityEventHandler for F
where
    F: FnMut(&EntityEvent) -> bool,
{
    fn on_event(&mut self, event: &EntityEvent) -> bool {
        self(event)
    }
}

/// Event system with registration and queuing
/// Follows chain of responsibility pattern
#[derive(Default)]
pub struct EventSystem {
    queue: Vec<EntityEvent>,
    handlers: HashMap<EventKind, Vec<Box<dyn EntityEventHandler>>>,
    dispatched: u64,
}

impl EventSystem {
    /// Create a new empty event system
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for a specific event kind
    /// Only handlers registered for this kind will be notified
    pub fn register_handler(&mut self, kind: EventKind, handler: Box<dyn EntityEventHandler>) {
        self.handlers.entry(kind).or_default().push(handler);
    }

    /// Number of handlers for a kind
    pub fn handler_count(&self, kind: EventKind) -> usize {
        self.handlers.get(&kind).map_or(0, Vec::len)
    }

    /// Queue an event for the next dispatch
    pub fn send(&mut self, event: EntityEvent) {
        self.queue.push(event);
    }

    /// Events waiting for dispatch
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Total events dispatched so far
    pub fn dispatched(&self) -> u64 {
        self.dispatched
    }

    /// Dispatch all queued events in the order they were sent
    pub fn dispatch(&mut self) {
        let queued = std::mem::take(&mut self.queue);
        for event in &queued {
            self.dispatch_event(event);
        }
    }

    /// Dispatch single event to registered handlers
    /// Stops on first handler that returns true (consumed)
    fn dispatch_event(&mut self, event: &EntityEvent) {
        self.dispatched += 1;
        if let Some(handlers) = self.handlers.get_mut(&event.kind()) {
            for handler in handlers.iter_mut() {
                if handler.on_event(event) {
                    // Event consumed, stop forwarding
                    break;
                }
            }
        }
    }

    /// Drop queued events without dispatching them
    pub fn clear(&mut self) {
        self.queue.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::collections::HandleMap;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn entity_id() -> EntityId {
        let mut map: HandleMap<EntityId, ()> = HandleMap::with_key();
        map.insert(())
    }

    fn recorder(log: &Rc<RefCell<Vec<&'static str>>>, name: &'static str, consume: bool) -> Box<dyn EntityEventHandler> {
        let log = Rc::clone(log);
        Box::new(move |_: &EntityEvent| {
            log.borrow_mut().push(name);
            consume
        })
    }

    #[test]
    fn test_only_matching_kind_is_notified() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut system = EventSystem::new();
        system.register_handler(EventKind::Removed, recorder(&log, "removed", false));
        system.register_handler(EventKind::Spawned, recorder(&log, "spawned", false));

        system.send(EntityEvent::Removed { id: entity_id(), tag: "ball" });
        assert_eq!(system.pending(), 1);
        system.dispatch();

        assert_eq!(*log.borrow(), vec!["removed"]);
        assert_eq!(system.pending(), 0);
        assert_eq!(system.dispatched(), 1);
    }

    #[test]
    fn test_event_consumption() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut system = EventSystem::new();

        // First handler consumes, second should not receive
        system.register_handler(EventKind::Spawned, recorder(&log, "first", true));
        system.register_handler(EventKind::Spawned, recorder(&log, "second", false));

        system.send(EntityEvent::Spawned { id: entity_id(), tag: "bat" });
        system.dispatch();

        assert_eq!(*log.borrow(), vec!["first"]);
        assert_eq!(system.handler_count(EventKind::Spawned), 2);
    }

    #[test]
    fn test_clear_drops_queue() {
        let mut system = EventSystem::new();
        system.send(EntityEvent::Spawned { id: entity_id(), tag: "bat" });
        system.clear();
        system.dispatch();
        assert_eq!(system.dispatched(), 0);
    }
}
