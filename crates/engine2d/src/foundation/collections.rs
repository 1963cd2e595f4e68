//! Specialized collection types

pub use slotmap::{SecondaryMap, SlotMap};

slotmap::new_key_type! {
    /// Stable handle of a live entity
    ///
    /// Handles stay valid while the entity is alive; once the entity is purged
    /// its slot is marked dead and the handle no longer resolves.
    pub struct EntityId;

    /// Handle of a registered entity supplier
    pub struct SupplierId;

    /// Handle of a registered statistics observer
    pub struct ObserverId;
}

/// Handle-based map using slot map for stable references
pub type HandleMap<K, T> = SlotMap<K, T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removed_handle_does_not_resolve() {
        let mut map: HandleMap<EntityId, &str> = HandleMap::with_key();
        let first = map.insert("first");
        map.remove(first);
        let second = map.insert("second");

        assert!(map.get(first).is_none());
        assert_eq!(map.get(second), Some(&"second"));
        assert_ne!(first, second);
    }
}
