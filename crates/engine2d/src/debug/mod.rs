//! Debug module for visualization and debugging tools

pub mod bounding_box;

pub use bounding_box::{BoundingBoxOverlay, BoundingBoxVisualizer};
