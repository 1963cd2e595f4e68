//! Application trait and lifecycle management

use crate::engine::{Engine, EngineError};
use crate::input::KeyCode;
use thiserror::Error;

/// Application lifecycle trait
///
/// Implement this trait to create your game using the engine.
pub trait Application {
    /// Initialize the application
    ///
    /// Called once after the engine is created. Register suppliers and
    /// observers on the entity collection here.
    fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError>;

    /// Update the application
    ///
    /// Called every frame before the entity collection runs.
    ///
    /// # Arguments
    /// * `engine` - Mutable reference to the engine
    /// * `delta_time` - Time since last frame in seconds
    fn update(&mut self, engine: &mut Engine, delta_time: f64) -> Result<(), AppError>;

    /// Handle application events
    ///
    /// Called when the host delivers window or input events.
    fn handle_event(&mut self, engine: &mut Engine, event: AppEvent) -> Result<(), AppError> {
        // Default implementation forwards to engine
        engine.handle_event(event);
        Ok(())
    }

    /// Cleanup the application
    ///
    /// Called when the loop ends, whether it stopped normally or with an error.
    fn cleanup(&mut self, engine: &mut Engine);
}

/// Application-level errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Engine error propagated to application level
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// Custom application error
    #[error("Application error: {0}")]
    Custom(String),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),

    /// Game logic error
    #[error("Game logic error: {0}")]
    GameLogic(String),
}

/// Application events
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppEvent {
    /// Window close requested
    WindowCloseRequested,

    /// Key was pressed
    KeyPressed(KeyCode),

    /// Key was released
    KeyReleased(KeyCode),

    /// Key input event
    KeyInput {
        /// The key that was pressed/released
        key: KeyCode,
        /// Whether the key was pressed (true) or released (false)
        pressed: bool,
    },

    /// Mouse movement
    MouseMoved {
        /// New X coordinate
        x: f64,
        /// New Y coordinate
        y: f64,
    },
}
