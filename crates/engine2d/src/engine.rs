//! Core engine implementation
//!
//! The engine is the driver of the simulation: it owns the entity collection
//! and a monotonic clock, and calls `update` once per frame.

use crate::{
    application::{AppEvent, Application},
    core::config::{ConfigError, EngineConfig},
    entities::{CollectionError, EntityCollection, EntityCollectionStatistics, StatisticsLog},
    foundation::time::{FrameClock, TickPacer},
    input::InputEvent,
};
use thiserror::Error;

/// Main engine struct
///
/// Coordinates the entity collection and runs the main loop.
pub struct Engine {
    /// Every live entity and the per-frame pipeline
    entities: EntityCollection,

    /// Frame timing
    clock: FrameClock,

    /// Engine configuration
    config: EngineConfig,

    /// Whether the engine should continue running
    running: bool,

    /// Frames completed by this engine
    frames: u64,
}

impl Engine {
    /// Create a new engine instance
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        log::info!("Initializing engine for '{}'...", config.title);

        let mut entities = EntityCollection::new();
        if config.debug.show_bounding_boxes {
            entities.set_bounding_box_overlay(true);
        }
        if config.debug.statistics_log_interval > 0 {
            entities.register_observer(StatisticsLog::new(config.debug.statistics_log_interval));
        }

        Ok(Self {
            entities,
            clock: FrameClock::new(),
            config,
            running: true,
            frames: 0,
        })
    }

    /// Run the engine main loop with the given application
    ///
    /// Returns the number of frames run. The loop ends when the application
    /// calls [`Engine::quit`], the window close is requested, the configured
    /// frame limit is reached, or a frame fails.
    pub fn run<T: Application>(config: EngineConfig, app: &mut T) -> Result<u64, EngineError> {
        let mut engine = Self::new(config)?;

        // Initialize application
        app.initialize(&mut engine)
            .map_err(|e| EngineError::ApplicationError(format!("App initialization: {e}")))?;

        log::info!("Starting main loop...");
        let mut pacer = TickPacer::new(engine.config.game_loop.ticks_per_second);
        let outcome = engine.main_loop(app, &mut pacer);

        // Cleanup
        app.cleanup(&mut engine);

        match &outcome {
            Ok(()) => log::info!(
                "Engine shutdown complete after {} frames ({:.1} fps)",
                engine.frames,
                engine.clock.average_fps()
            ),
            Err(e) => log::error!("Engine stopped in frame {}: {e}", engine.frames + 1),
        }
        outcome.map(|()| engine.frames)
    }

    fn main_loop<T: Application>(&mut self, app: &mut T, pacer: &mut TickPacer) -> Result<(), EngineError> {
        while self.running && !self.frame_limit_reached() {
            let delta_time = self.clock.delta_time();

            // Update application
            app.update(self, delta_time)
                .map_err(|e| EngineError::ApplicationError(format!("App update: {e}")))?;

            let timestamp = self.clock.tick();
            self.step(timestamp)?;

            pacer.wait();
        }
        Ok(())
    }

    fn frame_limit_reached(&self) -> bool {
        self.config
            .game_loop
            .max_frames
            .is_some_and(|max| self.frames >= max)
    }

    /// Run exactly one frame at `timestamp`
    ///
    /// Lets tests and custom hosts drive the collection with their own clock.
    pub fn step(&mut self, timestamp: u64) -> Result<EntityCollectionStatistics, EngineError> {
        let statistics = self.entities.update(timestamp)?;
        self.frames += 1;
        Ok(statistics)
    }

    /// Handle an application event
    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::WindowCloseRequested => {
                self.quit();
            }
            AppEvent::KeyPressed(key) => {
                self.entities.queue_input(InputEvent::KeyPressed(key));
            }
            AppEvent::KeyReleased(key) => {
                self.entities.queue_input(InputEvent::KeyReleased(key));
            }
            AppEvent::KeyInput { key, pressed } => {
                let event = if pressed {
                    InputEvent::KeyPressed(key)
                } else {
                    InputEvent::KeyReleased(key)
                };
                self.entities.queue_input(event);
            }
            AppEvent::MouseMoved { x, y } => {
                self.entities
                    .queue_input(InputEvent::MouseMoved(crate::foundation::math::Coordinate2D::new(x, y)));
            }
        }
    }

    /// Request engine shutdown
    pub fn quit(&mut self) {
        log::info!("Engine shutdown requested");
        self.running = false;
    }

    /// Whether the main loop keeps going
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Get the entity collection
    pub fn entities(&self) -> &EntityCollection {
        &self.entities
    }

    /// Get mutable access to the entity collection
    pub fn entities_mut(&mut self) -> &mut EntityCollection {
        &mut self.entities
    }

    /// Get the engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Frames completed so far
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    /// Get the current frame delta time in seconds
    pub fn delta_time(&self) -> f64 {
        self.clock.delta_time()
    }
}

/// Engine-level errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A frame failed in the entity collection
    #[error("Frame error: {0}")]
    Frame(#[from] CollectionError),

    /// Application error
    #[error("Application error: {0}")]
    ApplicationError(String),
}
