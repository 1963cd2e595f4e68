//! Bounding box visualization
//!
//! One visualizer per collision-capable entity, drawn just below its target.
//! The overlay refreshes after the collision phase and detaches a visualizer
//! when its target's removal notification arrives.

use crate::entities::entity::EntityCore;
use crate::foundation::collections::{EntityId, SecondaryMap};
use crate::foundation::math::{Coordinate2D, Size};

/// Outline of one entity's bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBoxVisualizer {
    target: EntityId,
    anchor_location: Coordinate2D,
    size: Size,
    view_order: f64,
}

impl BoundingBoxVisualizer {
    /// Create a visualizer following `core`
    pub fn new(target: EntityId, core: &EntityCore) -> Self {
        let mut visualizer = Self {
            target,
            anchor_location: Coordinate2D::ORIGIN,
            size: Size::default(),
            view_order: 0.0,
        };
        visualizer.refresh(core);
        visualizer
    }

    /// Copy the target's current bounding box
    pub fn refresh(&mut self, core: &EntityCore) {
        let bounds = core.bounding_box();
        self.anchor_location = bounds.min();
        self.size = Size::new(bounds.width, bounds.height);
        self.view_order = core.view_order() - 1.0;
    }

    /// Entity being outlined
    pub fn target(&self) -> EntityId {
        self.target
    }

    /// Top left corner of the outline
    pub fn anchor_location(&self) -> Coordinate2D {
        self.anchor_location
    }

    /// Outline width
    pub fn width(&self) -> f64 {
        self.size.width
    }

    /// Outline height
    pub fn height(&self) -> f64 {
        self.size.height
    }

    /// Draw order, one below the target
    pub fn view_order(&self) -> f64 {
        self.view_order
    }
}

/// All visualizers the renderer should draw
#[derive(Debug, Default)]
pub struct BoundingBoxOverlay {
    visualizers: SecondaryMap<EntityId, BoundingBoxVisualizer>,
}

impl BoundingBoxOverlay {
    /// Create an empty overlay
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach or refresh the visualizer for `target`
    pub fn track(&mut self, target: EntityId, core: &EntityCore) {
        match self.visualizers.get_mut(target) {
            Some(visualizer) => visualizer.refresh(core),
            None => {
                self.visualizers.insert(target, BoundingBoxVisualizer::new(target, core));
            }
        }
    }

    /// Detach the visualizer of a removed target
    pub fn detach(&mut self, target: EntityId) -> bool {
        self.visualizers.remove(target).is_some()
    }

    /// Visualizer for `target`, if attached
    pub fn get(&self, target: EntityId) -> Option<&BoundingBoxVisualizer> {
        self.visualizers.get(target)
    }

    /// Number of attached visualizers
    pub fn len(&self) -> usize {
        self.visualizers.len()
    }

    /// Whether nothing is attached
    pub fn is_empty(&self) -> bool {
        self.visualizers.is_empty()
    }

    /// Iterate attached visualizers
    pub fn iter(&self) -> impl Iterator<Item = &BoundingBoxVisualizer> {
        self.visualizers.values()
    }
}
