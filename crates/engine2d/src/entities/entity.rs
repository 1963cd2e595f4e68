//! Entity data and behaviour hooks
//!
//! Entities are composed rather than inherited: every entity embeds an
//! [`EntityCore`] holding the shared state (position, size, flags) and opts
//! into collection behaviour through [`Capabilities`]. The collection
//! dispatches on those flags, so an entity only receives the callbacks it
//! declared.

use std::cell::Cell;
use std::collections::HashSet;

use bitflags::bitflags;

use crate::entities::bounding_box::BoundingBox;
use crate::entities::context::UpdateContext;
use crate::foundation::collections::EntityId;
use crate::foundation::math::{Coordinate2D, Size};
use crate::input::KeyCode;
use crate::physics::collision_layers::CollisionLayers;

bitflags! {
    /// What an entity takes part in
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Capabilities: u32 {
        /// Receives the per-frame update hook
        const UPDATABLE = 1 << 0;
        /// Takes part in pairwise overlap testing
        const COLLIDABLE = 1 << 1;
        /// Receives pressed-key changes
        const KEY_LISTENER = 1 << 2;
        /// Receives mouse movement
        const MOUSE_LISTENER = 1 << 3;
        /// Listed in the renderer's draw order
        const DRAWABLE = 1 << 4;
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::UPDATABLE | Self::DRAWABLE
    }
}

/// Which point of the bounding box the entity position refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Anchor {
    /// Top left corner
    #[default]
    TopLeft,
    /// Middle of the top edge
    TopCenter,
    /// Top right corner
    TopRight,
    /// Middle of the left edge
    CenterLeft,
    /// Centre of the box
    Center,
    /// Middle of the right edge
    CenterRight,
    /// Bottom left corner
    BottomLeft,
    /// Middle of the bottom edge
    BottomCenter,
    /// Bottom right corner
    BottomRight,
}

impl Anchor {
    /// Offset from the box's minimum corner to the anchor point
    pub fn offset(self, size: Size) -> Coordinate2D {
        let (fx, fy) = match self {
            Self::TopLeft => (0.0, 0.0),
            Self::TopCenter => (0.5, 0.0),
            Self::TopRight => (1.0, 0.0),
            Self::CenterLeft => (0.0, 0.5),
            Self::Center => (0.5, 0.5),
            Self::CenterRight => (1.0, 0.5),
            Self::BottomLeft => (0.0, 1.0),
            Self::BottomCenter => (0.5, 1.0),
            Self::BottomRight => (1.0, 1.0),
        };
        Coordinate2D::new(size.width * fx, size.height * fy)
    }
}

/// State shared by every entity
#[derive(Debug, Clone)]
pub struct EntityCore {
    id: Option<EntityId>,
    position: Coordinate2D,
    size: Size,
    anchor: Anchor,
    rotation: f64,
    view_order: f64,
    visible: bool,
    removed: bool,
    capabilities: Capabilities,
    layer: u32,
    mask: u32,
    tag: &'static str,
    cached_bounds: Cell<Option<BoundingBox>>,
}

impl EntityCore {
    /// Create an updatable, drawable entity at `position`
    pub fn new(position: Coordinate2D, size: Size) -> Self {
        Self {
            id: None,
            position,
            size,
            anchor: Anchor::default(),
            rotation: 0.0,
            view_order: 0.0,
            visible: true,
            removed: false,
            capabilities: Capabilities::default(),
            layer: CollisionLayers::ALL,
            mask: CollisionLayers::ALL,
            tag: "entity",
            cached_bounds: Cell::new(None),
        }
    }

    /// Replace the capability set
    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Add `COLLIDABLE`
    pub fn collidable(mut self) -> Self {
        self.capabilities |= Capabilities::COLLIDABLE;
        self
    }

    /// Drop `UPDATABLE`; the entity never changes on its own
    pub fn static_entity(mut self) -> Self {
        self.capabilities -= Capabilities::UPDATABLE;
        self
    }

    /// Set the anchor point
    pub fn with_anchor(mut self, anchor: Anchor) -> Self {
        self.anchor = anchor;
        self
    }

    /// Set the rotation in degrees
    pub fn with_rotation(mut self, degrees: f64) -> Self {
        self.rotation = degrees;
        self
    }

    /// Set the view order
    pub fn with_view_order(mut self, view_order: f64) -> Self {
        self.view_order = view_order;
        self
    }

    /// Set the tag other entities see in collision notifications
    pub fn with_tag(mut self, tag: &'static str) -> Self {
        self.tag = tag;
        self
    }

    /// Set collision layer and mask
    pub fn with_layers(mut self, layer: u32, mask: u32) -> Self {
        self.layer = layer;
        self.mask = mask;
        self
    }

    /// Handle assigned when the collection adopted this entity
    pub fn id(&self) -> Option<EntityId> {
        self.id
    }

    pub(crate) fn assign_id(&mut self, id: EntityId) {
        self.id = Some(id);
    }

    /// Anchor location
    pub fn position(&self) -> Coordinate2D {
        self.position
    }

    /// Move the anchor location
    pub fn set_position(&mut self, position: Coordinate2D) {
        self.position = position;
        self.invalidate();
    }

    /// Move the anchor location by `delta`
    pub fn move_by(&mut self, delta: Coordinate2D) {
        self.set_position(self.position + delta);
    }

    /// Width and height before rotation
    pub fn size(&self) -> Size {
        self.size
    }

    /// Resize the entity
    pub fn set_size(&mut self, size: Size) {
        self.size = size;
        self.invalidate();
    }

    /// Anchor point
    pub fn anchor(&self) -> Anchor {
        self.anchor
    }

    /// Rotation in degrees
    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    /// Rotate the entity
    pub fn set_rotation(&mut self, degrees: f64) {
        self.rotation = degrees;
        self.invalidate();
    }

    /// Draw priority, also the tie-break key for draw order
    pub fn view_order(&self) -> f64 {
        self.view_order
    }

    /// Change the draw priority
    pub fn set_view_order(&mut self, view_order: f64) {
        self.view_order = view_order;
    }

    /// Whether the renderer should draw this entity
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Show or hide the entity
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Flag the entity for removal at the next purge phase
    pub fn remove(&mut self) {
        self.removed = true;
    }

    /// Whether the entity is flagged for removal
    pub fn is_removed(&self) -> bool {
        self.removed
    }

    /// Capability set
    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// Whether the entity takes part in the collision pass
    pub fn is_collision_capable(&self) -> bool {
        self.capabilities.contains(Capabilities::COLLIDABLE)
    }

    /// Whether the entity has no update hook
    pub fn is_static(&self) -> bool {
        !self.capabilities.contains(Capabilities::UPDATABLE)
    }

    /// Collision layer
    pub fn layer(&self) -> u32 {
        self.layer
    }

    /// Collision mask
    pub fn mask(&self) -> u32 {
        self.mask
    }

    /// Tag shown to collision peers
    pub fn tag(&self) -> &'static str {
        self.tag
    }

    /// Bounding box derived from position, size, anchor and rotation
    ///
    /// Static entities keep the result until a setter changes their geometry;
    /// everything else recomputes on each call.
    pub fn bounding_box(&self) -> BoundingBox {
        if let Some(bounds) = self.cached_bounds.get() {
            return bounds;
        }

        let corner = self.position - self.anchor.offset(self.size);
        let bounds = BoundingBox::from_corner(corner, self.size).rotated(self.rotation);

        if self.is_static() {
            self.cached_bounds.set(Some(bounds));
        }
        bounds
    }

    fn invalidate(&mut self) {
        self.cached_bounds.set(None);
    }
}

/// Read-only view of the other participant of a collision
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionPeer {
    /// Handle of the other entity
    pub id: EntityId,
    /// Its tag
    pub tag: &'static str,
    /// Its bounding box after the update phase
    pub bounds: BoundingBox,
    /// Its view order
    pub view_order: f64,
}

/// A simulation unit owned by the entity collection
///
/// Only [`Entity::core`] and [`Entity::core_mut`] are required; the hooks
/// default to doing nothing and are only called when the matching capability
/// is set.
pub trait Entity {
    /// Shared entity state
    fn core(&self) -> &EntityCore;

    /// Mutable shared entity state
    fn core_mut(&mut self) -> &mut EntityCore;

    /// Per-frame update (`UPDATABLE`)
    fn update(&mut self, _ctx: &mut UpdateContext<'_>) {}

    /// Overlap with another collision-capable entity (`COLLIDABLE`)
    fn on_collision(&mut self, _other: &CollisionPeer) {}

    /// The set of pressed keys changed (`KEY_LISTENER`)
    fn on_pressed_keys_change(&mut self, _pressed_keys: &HashSet<KeyCode>) {}

    /// The mouse moved (`MOUSE_LISTENER`)
    fn on_mouse_moved(&mut self, _position: Coordinate2D) {}

    /// The entity was purged; called exactly once
    fn on_removed(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_capabilities() {
        let core = EntityCore::new(Coordinate2D::ORIGIN, Size::square(1.0));
        assert!(core.capabilities().contains(Capabilities::UPDATABLE));
        assert!(!core.is_collision_capable());
        assert!(!core.is_static());

        let wall = EntityCore::new(Coordinate2D::ORIGIN, Size::square(1.0))
            .collidable()
            .static_entity();
        assert!(wall.is_collision_capable());
        assert!(wall.is_static());
    }

    #[test]
    fn test_anchor_shifts_bounding_box() {
        let core = EntityCore::new(Coordinate2D::new(50.0, 50.0), Size::new(20.0, 10.0))
            .with_anchor(Anchor::Center);
        let bounds = core.bounding_box();

        assert_eq!(bounds.min(), Coordinate2D::new(40.0, 45.0));
        assert_eq!(bounds.width, 20.0);
        assert_eq!(bounds.height, 10.0);

        let bottom_right = core.clone().with_anchor(Anchor::BottomRight);
        assert_eq!(bottom_right.bounding_box().min(), Coordinate2D::new(30.0, 40.0));
    }

    #[test]
    fn test_rotation_widens_bounding_box() {
        let core = EntityCore::new(Coordinate2D::ORIGIN, Size::new(20.0, 10.0)).with_rotation(90.0);
        let bounds = core.bounding_box();

        assert_relative_eq!(bounds.width, 10.0, epsilon = 1e-9);
        assert_relative_eq!(bounds.height, 20.0, epsilon = 1e-9);
        assert_relative_eq!(bounds.centre().x, 10.0, epsilon = 1e-9);
        assert_relative_eq!(bounds.centre().y, 5.0, epsilon = 1e-9);
    }

    #[test]
    fn test_static_cache_invalidated_by_setters() {
        let mut core = EntityCore::new(Coordinate2D::ORIGIN, Size::square(10.0)).static_entity();
        assert_eq!(core.bounding_box().min(), Coordinate2D::ORIGIN);

        core.set_position(Coordinate2D::new(5.0, 5.0));
        assert_eq!(core.bounding_box().min(), Coordinate2D::new(5.0, 5.0));

        core.set_size(Size::square(2.0));
        assert_eq!(core.bounding_box().width, 2.0);
    }

    #[test]
    fn test_removal_flag() {
        let mut core = EntityCore::new(Coordinate2D::ORIGIN, Size::square(1.0));
        assert!(!core.is_removed());
        core.remove();
        core.remove();
        assert!(core.is_removed());
    }
}
