//! Input management system
//!
//! The host toolkit delivers keyboard and mouse events whenever it likes. They
//! are queued here and applied by the entity collection at the next frame
//! boundary, so listener callbacks never race with an entity update.

use std::collections::HashSet;

use crate::foundation::math::Coordinate2D;

/// Input event as delivered by the host toolkit
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Key went down
    KeyPressed(KeyCode),
    /// Key went up
    KeyReleased(KeyCode),
    /// Mouse pointer moved to a coordinate in game space
    MouseMoved(Coordinate2D),
}

/// Input applied during one frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputFrame {
    /// New pressed-key set, present only when it changed
    pub pressed_keys: Option<HashSet<KeyCode>>,
    /// Keys that went down or up since the previous frame
    pub changed_keys: HashSet<KeyCode>,
    /// Last mouse position reported since the previous frame
    pub mouse_position: Option<Coordinate2D>,
}

impl InputFrame {
    /// Whether nothing happened
    pub fn is_empty(&self) -> bool {
        self.pressed_keys.is_none() && self.mouse_position.is_none()
    }

    /// Whether a key other than `key` changed state
    pub fn changed_besides(&self, key: KeyCode) -> bool {
        self.changed_keys.iter().any(|&changed| changed != key)
    }
}

/// Input manager
///
/// Collects events between frames and folds them into an [`InputFrame`].
#[derive(Debug, Default)]
pub struct InputManager {
    queued: Vec<InputEvent>,
    pressed: HashSet<KeyCode>,
    mouse_position: Option<Coordinate2D>,
}

impl InputManager {
    /// Create a new input manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an event for the next frame
    pub fn queue(&mut self, event: InputEvent) {
        self.queued.push(event);
    }

    /// Handle key input
    pub fn handle_key_input(&mut self, key: KeyCode, pressed: bool) {
        if pressed {
            self.queue(InputEvent::KeyPressed(key));
        } else {
            self.queue(InputEvent::KeyReleased(key));
        }
    }

    /// Handle mouse movement
    pub fn handle_mouse_move(&mut self, x: f64, y: f64) {
        self.queue(InputEvent::MouseMoved(Coordinate2D::new(x, y)));
    }

    /// Keys currently held down, as of the last applied frame
    pub fn pressed_keys(&self) -> &HashSet<KeyCode> {
        &self.pressed
    }

    /// Last known mouse position
    pub fn mouse_position(&self) -> Option<Coordinate2D> {
        self.mouse_position
    }

    /// Number of events waiting for the next frame
    pub fn pending(&self) -> usize {
        self.queued.len()
    }

    /// Fold all queued events into the frame's input
    pub fn take_frame(&mut self) -> InputFrame {
        let mut frame = InputFrame::default();
        for event in self.queued.drain(..) {
            match event {
                InputEvent::KeyPressed(key) => {
                    if self.pressed.insert(key) {
                        frame.changed_keys.insert(key);
                    }
                }
                InputEvent::KeyReleased(key) => {
                    if self.pressed.remove(&key) {
                        frame.changed_keys.insert(key);
                    }
                }
                InputEvent::MouseMoved(position) => {
                    self.mouse_position = Some(position);
                    frame.mouse_position = Some(position);
                }
            }
        }

        if !frame.changed_keys.is_empty() {
            frame.pressed_keys = Some(self.pressed.clone());
        }
        frame
    }
}

/// Key codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A key
    A,
    /// D key
    D,
    /// P key
    P,
    /// Q key
    Q,
    /// R key
    R,
    /// S key
    S,
    /// W key
    W,
    /// Z key
    Z,
    /// Space key
    Space,
    /// Enter key
    Enter,
    /// Escape key
    Escape,
    /// Up arrow
    Up,
    /// Down arrow
    Down,
    /// Left arrow
    Left,
    /// Right arrow
    Right,
    /// F1, toggles debug overlays
    F1,
}
