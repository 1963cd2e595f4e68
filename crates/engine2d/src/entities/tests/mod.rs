//! Frame-level scenarios for the entity collection
//!
//! The entities here record every hook call in a shared journal so tests can
//! assert on the exact phase ordering.

mod lifecycle;

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use crate::entities::context::UpdateContext;
use crate::entities::entity::{Capabilities, CollisionPeer, Entity, EntityCore};
use crate::foundation::math::{Coordinate2D, Size};
use crate::input::KeyCode;

pub(super) type Journal = Rc<RefCell<Vec<String>>>;

pub(super) fn journal() -> Journal {
    Rc::new(RefCell::new(Vec::new()))
}

pub(super) fn entries(journal: &Journal, prefix: &str) -> Vec<String> {
    journal
        .borrow()
        .iter()
        .filter(|entry| entry.starts_with(prefix))
        .cloned()
        .collect()
}

/// What an actor does during its update hook
#[derive(Default)]
pub(super) struct Script {
    pub remove_in_frame: Option<u64>,
    pub spawn_in_frame: Option<u64>,
    pub step: Option<Coordinate2D>,
}

pub(super) struct Actor {
    core: EntityCore,
    name: &'static str,
    journal: Journal,
    script: Script,
}

impl Actor {
    pub fn new(name: &'static str, journal: &Journal, x: f64, y: f64, size: f64) -> Self {
        Self {
            core: EntityCore::new(Coordinate2D::new(x, y), Size::square(size)).with_tag(name),
            name,
            journal: Rc::clone(journal),
            script: Script::default(),
        }
    }

    pub fn collidable(mut self) -> Self {
        self.core = self.core.collidable();
        self
    }

    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.core = self.core.with_capabilities(capabilities);
        self
    }

    pub fn with_view_order(mut self, view_order: f64) -> Self {
        self.core = self.core.with_view_order(view_order);
        self
    }

    pub fn with_script(mut self, script: Script) -> Self {
        self.script = script;
        self
    }

    fn record(&self, entry: String) {
        self.journal.borrow_mut().push(entry);
    }
}

impl Entity for Actor {
    fn core(&self) -> &EntityCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut EntityCore {
        &mut self.core
    }

    fn update(&mut self, ctx: &mut UpdateContext<'_>) {
        self.record(format!("update:{}:{}", self.name, ctx.frame()));

        if let Some(step) = self.script.step {
            self.core.move_by(step);
        }
        if self.script.remove_in_frame == Some(ctx.frame()) {
            self.core.remove();
        }
        if self.script.spawn_in_frame == Some(ctx.frame()) {
            ctx.spawn(Actor::new("child", &self.journal, 500.0, 500.0, 1.0));
        }
    }

    fn on_collision(&mut self, other: &CollisionPeer) {
        self.record(format!("collision:{}:{}", self.name, other.tag));
    }

    fn on_pressed_keys_change(&mut self, pressed_keys: &HashSet<KeyCode>) {
        self.record(format!("keys:{}:{}", self.name, pressed_keys.len()));
    }

    fn on_mouse_moved(&mut self, position: Coordinate2D) {
        self.record(format!("mouse:{}:{}:{}", self.name, position.x, position.y));
    }

    fn on_removed(&mut self) {
        self.record(format!("removed:{}", self.name));
    }
}
