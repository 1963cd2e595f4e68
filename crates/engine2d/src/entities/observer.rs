//! Statistics observers
//!
//! Observers are kept in registration order and addressed by the handle
//! returned from registration, so the subject never needs to know anything
//! about an observer's lifetime.

use thiserror::Error;

use crate::entities::statistics::EntityCollectionStatistics;
use crate::foundation::collections::{HandleMap, ObserverId};

/// An observer failed while handling a snapshot
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{reason}")]
pub struct ObserverError {
    reason: String,
}

impl ObserverError {
    /// Create a new observer error
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }

    /// Why the observer failed
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// Listener notified after every completed frame
pub trait StatisticsObserver {
    /// Handle the frame's snapshot
    fn update(&mut self, statistics: &EntityCollectionStatistics) -> Result<(), ObserverError>;
}

impl<F> StatisticsObserver for F
where
    F: FnMut(&EntityCollectionStatistics),
{
    fn update(&mut self, statistics: &EntityCollectionStatistics) -> Result<(), ObserverError> {
        self(statistics);
        Ok(())
    }
}

/// Insertion-ordered set of observers
pub struct ObserverRegistry {
    observers: HandleMap<ObserverId, Box<dyn StatisticsObserver>>,
    order: Vec<ObserverId>,
}

impl Default for ObserverRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ObserverRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            observers: HandleMap::with_key(),
            order: Vec::new(),
        }
    }

    /// Add an observer at the end of the notification order
    pub fn register(&mut self, observer: Box<dyn StatisticsObserver>) -> ObserverId {
        let id = self.observers.insert(observer);
        self.order.push(id);
        id
    }

    /// Remove an observer, returning it if the handle was live
    pub fn deregister(&mut self, id: ObserverId) -> Option<Box<dyn StatisticsObserver>> {
        let observer = self.observers.remove(id)?;
        self.order.retain(|&o| o != id);
        Some(observer)
    }

    /// Number of registered observers
    pub fn len(&self) -> usize {
        self.observers.len()
    }

    /// Whether no observer is registered
    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    /// Notify every observer in registration order
    ///
    /// Stops at the first failing observer.
    pub fn publish(&mut self, statistics: &EntityCollectionStatistics) -> Result<(), ObserverError> {
        for &id in &self.order {
            if let Some(observer) = self.observers.get_mut(id) {
                observer.update(statistics)?;
            }
        }
        Ok(())
    }
}

/// Logs every `interval`-th snapshot at info level
pub struct StatisticsLog {
    interval: u64,
}

impl StatisticsLog {
    /// Log every `interval` frames (at least every frame)
    pub fn new(interval: u64) -> Self {
        Self { interval: interval.max(1) }
    }
}

impl StatisticsObserver for StatisticsLog {
    fn update(&mut self, statistics: &EntityCollectionStatistics) -> Result<(), ObserverError> {
        if statistics.frame() % self.interval == 0 {
            log::info!("{statistics}");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_publish_in_registration_order() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut registry = ObserverRegistry::new();

        for name in ["first", "second", "third"] {
            let calls = Rc::clone(&calls);
            registry.register(Box::new(move |_: &EntityCollectionStatistics| {
                calls.borrow_mut().push(name);
            }));
        }

        registry.publish(&EntityCollectionStatistics::default()).unwrap();
        assert_eq!(*calls.borrow(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_deregister_by_handle() {
        let mut registry = ObserverRegistry::new();
        let id = registry.register(Box::new(|_: &EntityCollectionStatistics| {}));
        let other = registry.register(Box::new(|_: &EntityCollectionStatistics| {}));

        assert!(registry.deregister(id).is_some());
        assert!(registry.deregister(id).is_none());
        assert_eq!(registry.len(), 1);
        assert_ne!(id, other);
    }

    #[test]
    fn test_stale_handle_does_not_hit_reused_slot() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut registry = ObserverRegistry::new();

        let stale = registry.register(Box::new(|_: &EntityCollectionStatistics| {}));
        registry.deregister(stale);
        for name in ["late", "later"] {
            let calls = Rc::clone(&calls);
            registry.register(Box::new(move |_: &EntityCollectionStatistics| {
                calls.borrow_mut().push(name);
            }));
        }

        // The freed slot is reused, the old handle still doesn't resolve
        assert!(registry.deregister(stale).is_none());
        assert_eq!(registry.len(), 2);

        registry.publish(&EntityCollectionStatistics::default()).unwrap();
        assert_eq!(*calls.borrow(), vec!["late", "later"]);
    }

    struct Failing;

    impl StatisticsObserver for Failing {
        fn update(&mut self, _statistics: &EntityCollectionStatistics) -> Result<(), ObserverError> {
            Err(ObserverError::new("observer exploded"))
        }
    }

    #[test]
    fn test_failing_observer_stops_publish() {
        let reached = Rc::new(RefCell::new(false));
        let mut registry = ObserverRegistry::new();
        registry.register(Box::new(Failing));
        let flag = Rc::clone(&reached);
        registry.register(Box::new(move |_: &EntityCollectionStatistics| *flag.borrow_mut() = true));

        let err = registry.publish(&EntityCollectionStatistics::default()).unwrap_err();
        assert_eq!(err.reason(), "observer exploded");
        assert!(!*reached.borrow());
    }
}
