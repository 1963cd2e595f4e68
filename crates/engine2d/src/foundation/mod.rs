//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the engine:
//! - 2D math types and operations
//! - Stable handle collections
//! - Frame clock and pacing
//! - Logging utilities

pub mod math;
pub mod collections;
pub mod time;
pub mod logging;
