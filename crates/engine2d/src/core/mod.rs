//! # Core Engine Module
//!
//! Shared abstractions other subsystems depend on. Currently this is the
//! unified configuration for the engine and its game loop.

pub mod config;

// Re-export foundation modules for convenience
pub use crate::foundation;

// Re-export commonly used config types
pub use config::{
    EngineConfig,
    LoopConfig,
    DebugConfig,
    Config,
    ConfigError,
};
