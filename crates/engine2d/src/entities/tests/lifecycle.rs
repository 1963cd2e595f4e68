//! Entity removal, supplier registration and input delivery across frames

use std::cell::RefCell;
use std::rc::Rc;

use super::{entries, journal, Actor, Journal, Script};
use crate::entities::collection::{CollectionError, EntityCollection};
use crate::entities::context::UpdateContext;
use crate::entities::entity::{Capabilities, Entity, EntityCore};
use crate::entities::supplier::{share, EntityQueue, IntervalSpawner, OneShotSupplier};
use crate::events::{EntityEvent, EventKind};
use crate::foundation::math::{Coordinate2D, Size};
use crate::input::{InputEvent, KeyCode};

/// Registers suppliers from inside its own update
struct Registrar {
    core: EntityCore,
    journal: Journal,
    outcomes: Rc<RefCell<Vec<bool>>>,
}

impl Entity for Registrar {
    fn core(&self) -> &EntityCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut EntityCore {
        &mut self.core
    }

    fn update(&mut self, ctx: &mut UpdateContext<'_>) {
        if ctx.frame() != 2 {
            return;
        }
        ctx.register_supplier(
            OneShotSupplier::new(Vec::new()).with(Actor::new("late", &self.journal, 0.0, 0.0, 1.0)),
        );

        let queue = share(EntityQueue::new());
        let first = ctx.register_shared_supplier(Rc::clone(&queue)).is_ok();
        let second = ctx.register_shared_supplier(queue).is_ok();
        self.outcomes.borrow_mut().extend([first, second]);
    }
}

fn removal_log(collection: &mut EntityCollection) -> Rc<RefCell<Vec<&'static str>>> {
    let removed = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&removed);
    collection.register_event_handler(EventKind::Removed, move |event: &EntityEvent| {
        if let EntityEvent::Removed { tag, .. } = event {
            sink.borrow_mut().push(*tag);
        }
        false
    });
    removed
}

#[test]
fn test_self_removal_notifies_once() {
    let log = journal();
    let mut collection = EntityCollection::new();
    let removed = removal_log(&mut collection);

    let doomed = Actor::new("doomed", &log, 0.0, 0.0, 1.0).with_script(Script {
        remove_in_frame: Some(2),
        ..Script::default()
    });
    collection.register_supplier(OneShotSupplier::new(Vec::new()).with(doomed));

    collection.update(0).unwrap();
    let id = collection.ids().next().unwrap();

    let stats = collection.update(1).unwrap();
    assert_eq!(stats.removed(), 1);
    assert!(!collection.contains(id));
    assert!(collection.is_empty());

    collection.update(2).unwrap();
    collection.update(3).unwrap();

    assert_eq!(entries(&log, "removed"), vec!["removed:doomed"]);
    assert_eq!(*removed.borrow(), vec!["doomed"]);
    assert_eq!(entries(&log, "update"), vec!["update:doomed:2"]);
}

#[test]
fn test_purged_handle_is_rejected() {
    let log = journal();
    let mut collection = EntityCollection::new();
    collection.register_supplier(OneShotSupplier::new(Vec::new()).with(Actor::new("a", &log, 0.0, 0.0, 1.0)));
    collection.update(0).unwrap();

    let id = collection.ids().next().unwrap();
    collection.remove(id).unwrap();
    collection.update(1).unwrap();

    // Flagged between frames: purged without another update
    assert!(entries(&log, "update").is_empty());
    assert!(matches!(collection.entity(id), Err(CollectionError::UnknownEntity(_))));
    assert!(matches!(collection.remove(id), Err(CollectionError::UnknownEntity(_))));
}

#[test]
fn test_spawned_events_carry_tags() {
    let log = journal();
    let mut collection = EntityCollection::new();
    let spawned = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&spawned);
    collection.register_event_handler(EventKind::Spawned, move |event: &EntityEvent| {
        if let EntityEvent::Spawned { tag, .. } = event {
            sink.borrow_mut().push(*tag);
        }
        true
    });

    collection.register_supplier(
        OneShotSupplier::new(Vec::new())
            .with(Actor::new("bat", &log, 0.0, 0.0, 1.0))
            .with(Actor::new("ball", &log, 0.0, 0.0, 1.0)),
    );
    collection.update(0).unwrap();

    assert_eq!(*spawned.borrow(), vec!["bat", "ball"]);
}

#[test]
fn test_exhausted_supplier_is_deregistered() {
    let log = journal();
    let mut collection = EntityCollection::new();
    collection.register_supplier(OneShotSupplier::new(Vec::new()).with(Actor::new("a", &log, 0.0, 0.0, 1.0)));
    assert_eq!(collection.supplier_count(), 1);

    let stats = collection.update(0).unwrap();
    assert_eq!(stats.suppliers(), 0);
    assert_eq!(collection.supplier_count(), 0);
}

#[test]
fn test_entity_queue_stays_registered() {
    let log = journal();
    let mut collection = EntityCollection::new();
    let queue = EntityQueue::new();
    collection.register_supplier(queue.clone());

    collection.update(0).unwrap();
    assert!(collection.is_empty());

    queue.push(Actor::new("pushed", &log, 0.0, 0.0, 1.0));
    let stats = collection.update(1).unwrap();
    assert_eq!(stats.drained(), 1);
    assert_eq!(stats.suppliers(), 1);
    assert!(queue.is_empty());
}

#[test]
fn test_interval_spawner_with_limit() {
    let log = journal();
    let factory_log = Rc::clone(&log);
    let mut collection = EntityCollection::new();
    collection.register_supplier(
        IntervalSpawner::new(100, move |_| Ok(Box::new(Actor::new("spawned", &factory_log, 0.0, 0.0, 1.0)) as Box<dyn Entity>))
            .with_limit(2),
    );

    assert_eq!(collection.update(0).unwrap().drained(), 0);
    assert_eq!(collection.update(100).unwrap().drained(), 1);

    let last = collection.update(200).unwrap();
    assert_eq!(last.drained(), 1);
    assert_eq!(last.suppliers(), 0);
    assert_eq!(collection.len(), 2);
}

#[test]
fn test_duplicate_shared_supplier_is_rejected() {
    let mut collection = EntityCollection::new();
    let queue = share(EntityQueue::new());

    let id = collection.register_shared_supplier(Rc::clone(&queue)).unwrap();
    assert!(matches!(
        collection.register_shared_supplier(queue),
        Err(CollectionError::DuplicateSupplier)
    ));

    collection.deregister_supplier(id).unwrap();
    assert!(matches!(
        collection.deregister_supplier(id),
        Err(CollectionError::UnknownSupplier(_))
    ));
}

#[test]
fn test_entities_register_suppliers_for_next_frame() {
    let log = journal();
    let outcomes = Rc::new(RefCell::new(Vec::new()));
    let mut collection = EntityCollection::new();
    collection.register_supplier(OneShotSupplier::new(Vec::new()).with(Registrar {
        core: EntityCore::new(Coordinate2D::ORIGIN, Size::square(1.0)),
        journal: Rc::clone(&log),
        outcomes: Rc::clone(&outcomes),
    }));

    collection.update(0).unwrap();
    let second = collection.update(1).unwrap();
    assert_eq!(second.suppliers(), 2);
    assert_eq!(second.drained(), 0);
    assert_eq!(*outcomes.borrow(), vec![true, false]);

    // The one-shot drains and leaves; the shared queue stays
    let third = collection.update(2).unwrap();
    assert_eq!(third.drained(), 1);
    assert_eq!(third.suppliers(), 1);
    assert_eq!(collection.len(), 2);
}

#[test]
fn test_every_registrar_in_a_frame_keeps_its_suppliers() {
    let log = journal();
    let outcomes = Rc::new(RefCell::new(Vec::new()));
    let registrar = || Registrar {
        core: EntityCore::new(Coordinate2D::ORIGIN, Size::square(1.0)),
        journal: Rc::clone(&log),
        outcomes: Rc::clone(&outcomes),
    };
    let mut collection = EntityCollection::new();
    collection.register_supplier(OneShotSupplier::new(Vec::new()).with(registrar()).with(registrar()));

    collection.update(0).unwrap();
    let second = collection.update(1).unwrap();
    assert_eq!(second.suppliers(), 4);
    assert_eq!(*outcomes.borrow(), vec![true, false, true, false]);

    let third = collection.update(2).unwrap();
    assert_eq!(third.drained(), 2);
    assert_eq!(third.suppliers(), 2);
    assert_eq!(collection.len(), 4);
}

#[test]
fn test_key_changes_reach_settled_listeners() {
    let log = journal();
    let mut collection = EntityCollection::new();
    let listening = Capabilities::UPDATABLE | Capabilities::KEY_LISTENER;
    collection.register_supplier(
        OneShotSupplier::new(Vec::new())
            .with(Actor::new("bat", &log, 0.0, 0.0, 1.0).with_capabilities(listening))
            .with(Actor::new("deaf", &log, 0.0, 0.0, 1.0)),
    );

    // Listener is still fresh in the frame that drains it
    collection.queue_input(InputEvent::KeyPressed(KeyCode::A));
    let first = collection.update(0).unwrap();
    assert_eq!(first.key_listeners(), 1);
    assert!(entries(&log, "keys").is_empty());

    collection.queue_input(InputEvent::KeyPressed(KeyCode::Z));
    collection.update(1).unwrap();
    assert_eq!(entries(&log, "keys"), vec!["keys:bat:2"]);

    // Nothing changed, nothing delivered
    collection.update(2).unwrap();
    assert_eq!(entries(&log, "keys").len(), 1);

    collection.queue_input(InputEvent::KeyReleased(KeyCode::A));
    collection.update(3).unwrap();
    assert_eq!(entries(&log, "keys"), vec!["keys:bat:2", "keys:bat:1"]);
}

#[test]
fn test_mouse_moves_reach_mouse_listeners() {
    let log = journal();
    let mut collection = EntityCollection::new();
    collection.register_supplier(OneShotSupplier::new(Vec::new()).with(
        Actor::new("cursor", &log, 0.0, 0.0, 1.0).with_capabilities(Capabilities::MOUSE_LISTENER),
    ));
    collection.update(0).unwrap();

    collection.queue_input(InputEvent::MouseMoved(Coordinate2D::new(3.0, 4.0)));
    collection.queue_input(InputEvent::MouseMoved(Coordinate2D::new(7.0, 8.0)));
    collection.update(1).unwrap();

    assert_eq!(entries(&log, "mouse"), vec!["mouse:cursor:7:8"]);
}

#[test]
fn test_f1_toggles_bounding_box_overlay() {
    let log = journal();
    let mut collection = EntityCollection::new();
    let doomed = Actor::new("doomed", &log, 10.0, 20.0, 5.0)
        .collidable()
        .with_view_order(3.0)
        .with_script(Script {
            remove_in_frame: Some(3),
            ..Script::default()
        });
    collection.register_supplier(
        OneShotSupplier::new(Vec::new())
            .with(doomed)
            .with(Actor::new("plain", &log, 0.0, 0.0, 5.0)),
    );
    collection.update(0).unwrap();
    assert!(collection.bounding_box_overlay().is_none());

    collection.queue_input(InputEvent::KeyPressed(KeyCode::F1));
    collection.update(1).unwrap();

    let id = collection.ids().next().unwrap();
    let overlay = collection.bounding_box_overlay().unwrap();
    assert_eq!(overlay.len(), 1);
    let visualizer = overlay.get(id).unwrap();
    assert_eq!(visualizer.anchor_location(), Coordinate2D::new(10.0, 20.0));
    assert_eq!(visualizer.width(), 5.0);
    assert_eq!(visualizer.view_order(), 2.0);

    // Detaches together with its target
    collection.update(2).unwrap();
    assert!(collection.bounding_box_overlay().unwrap().is_empty());

    // Holding F1 does not toggle again; releasing and pressing does
    collection.queue_input(InputEvent::KeyReleased(KeyCode::F1));
    collection.update(3).unwrap();
    assert!(collection.bounding_box_overlay().is_some());

    collection.queue_input(InputEvent::KeyPressed(KeyCode::F1));
    collection.update(4).unwrap();
    assert!(collection.bounding_box_overlay().is_none());
}
