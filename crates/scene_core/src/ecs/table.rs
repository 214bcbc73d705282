//! Per-node component registry
//!
//! Maps the `TypeId` of each concrete component type to its single owned
//! instance. Adding a second instance of a type is rejected and logged; the
//! table never holds two components of the same type.

use super::Component;
use crate::scene::{BoundsProvider, NodeId};
use std::any::{type_name, TypeId};
use std::collections::HashMap;

/// Type-keyed, single-instance-per-type component store owned by one node
pub struct ComponentTable {
    owner: NodeId,
    index: HashMap<TypeId, usize>,
    // insertion order, so capability lookups are deterministic
    entries: Vec<(TypeId, Box<dyn Component>)>,
}

impl ComponentTable {
    /// Empty table bound to `owner`
    pub fn new(owner: NodeId) -> Self {
        Self {
            owner,
            index: HashMap::new(),
            entries: Vec::new(),
        }
    }

    /// Node that owns this table
    pub fn owner(&self) -> NodeId {
        self.owner
    }

    /// Store `component`, returning it bound to the owner.
    ///
    /// Returns `None` and leaves the table untouched if a `T` is already
    /// present; call [`has`](Self::has) first when confirmation matters.
    pub fn add<T: Component>(&mut self, mut component: T) -> Option<&mut T> {
        let id = TypeId::of::<T>();
        if self.index.contains_key(&id) {
            log::warn!(
                "node {:?} already has a {}, ignoring duplicate add",
                self.owner,
                type_name::<T>()
            );
            return None;
        }

        component.on_attach(self.owner);
        self.index.insert(id, self.entries.len());
        self.entries.push((id, Box::new(component)));
        self.entries
            .last_mut()
            .and_then(|(_, c)| (**c).as_any_mut().downcast_mut::<T>())
    }

    /// Stored `T`, if any
    pub fn get<T: Component>(&self) -> Option<&T> {
        let slot = *self.index.get(&TypeId::of::<T>())?;
        (*self.entries[slot].1).as_any().downcast_ref::<T>()
    }

    /// Stored `T`, mutably, if any
    pub fn get_mut<T: Component>(&mut self) -> Option<&mut T> {
        let slot = *self.index.get(&TypeId::of::<T>())?;
        (*self.entries[slot].1).as_any_mut().downcast_mut::<T>()
    }

    /// Whether a `T` is stored
    pub fn has<T: Component>(&self) -> bool {
        self.index.contains_key(&TypeId::of::<T>())
    }

    /// Take the stored `T` out of the table
    pub fn remove<T: Component>(&mut self) -> Option<T> {
        let slot = self.index.remove(&TypeId::of::<T>())?;
        let (_, boxed) = self.entries.remove(slot);
        for v in self.index.values_mut() {
            if *v > slot {
                *v -= 1;
            }
        }
        boxed.into_any().downcast::<T>().ok().map(|b| *b)
    }

    /// Number of stored components
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First component, in insertion order, that exposes bounds
    pub fn bounds_provider(&self) -> Option<&dyn BoundsProvider> {
        self.entries.iter().find_map(|(_, c)| c.as_bounds())
    }

    /// All components, in insertion order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Box<dyn Component>> + '_ {
        self.entries.iter_mut().map(|(_, c)| c)
    }
}

impl std::fmt::Debug for ComponentTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentTable")
            .field("owner", &self.owner)
            .field("len", &self.entries.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::collections::{Key, SlotMap};
    use crate::foundation::math::Vec2;
    use crate::scene::AABB;

    #[derive(Debug, Default, PartialEq)]
    struct Health {
        points: i32,
        attached_to: Option<NodeId>,
    }

    impl Component for Health {
        fn on_attach(&mut self, owner: NodeId) {
            self.attached_to = Some(owner);
        }
    }

    #[derive(Debug)]
    struct Marker;

    impl Component for Marker {}

    struct Extent(AABB);

    impl BoundsProvider for Extent {
        fn model_bounds(&self) -> AABB {
            self.0
        }
        fn global_bounds(&self) -> AABB {
            self.0
        }
    }

    impl Component for Extent {
        fn as_bounds(&self) -> Option<&dyn BoundsProvider> {
            Some(self)
        }
    }

    fn owner() -> NodeId {
        let mut ids: SlotMap<NodeId, ()> = SlotMap::with_key();
        ids.insert(())
    }

    #[test]
    fn test_add_binds_owner() {
        let id = owner();
        let mut table = ComponentTable::new(id);
        let health = table.add(Health { points: 3, ..Default::default() }).unwrap();

        assert_eq!(health.attached_to, Some(id));
        assert!(!id.is_null());
        assert!(table.has::<Health>());
        assert!(!table.has::<Marker>());
    }

    #[test]
    fn test_duplicate_add_keeps_first_instance() {
        let mut table = ComponentTable::new(owner());
        table.add(Health { points: 10, ..Default::default() });
        table.get_mut::<Health>().unwrap().points = 7;

        assert!(table.add(Health { points: 99, ..Default::default() }).is_none());
        assert_eq!(table.len(), 1);
        assert_eq!(table.get::<Health>().unwrap().points, 7);
    }

    #[test]
    fn test_get_absent_is_none() {
        let table = ComponentTable::new(owner());
        assert!(table.get::<Health>().is_none());
        assert!(table.is_empty());
    }

    #[test]
    fn test_remove_returns_instance() {
        let mut table = ComponentTable::new(owner());
        table.add(Marker);
        table.add(Health { points: 5, ..Default::default() });

        let removed = table.remove::<Health>().unwrap();
        assert_eq!(removed.points, 5);
        assert!(!table.has::<Health>());
        assert!(table.remove::<Health>().is_none());
        assert_eq!(table.len(), 1);

        // type is free again
        assert!(table.add(Health::default()).is_some());
    }

    #[test]
    fn test_bounds_provider_lookup() {
        let mut table = ComponentTable::new(owner());
        table.add(Marker);
        assert!(table.bounds_provider().is_none());

        let b = AABB::new(Vec2::zeros(), Vec2::new(4.0, 4.0));
        table.add(Extent(b));
        assert_eq!(table.bounds_provider().map(|p| p.model_bounds()), Some(b));
    }

    #[test]
    fn test_iter_mut_follows_insertion_order() {
        let mut table = ComponentTable::new(owner());
        table.add(Marker);
        table.add(Health::default());

        let names: Vec<bool> = table
            .iter_mut()
            .map(|c| (**c).as_any().is::<Health>())
            .collect();
        assert_eq!(names, vec![false, true]);
    }
}
