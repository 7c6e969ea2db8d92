use std::{
    any::{TypeId, type_name},
    sync::{
        RwLock,
        atomic::{AtomicU32, Ordering},
    },
};

use dashmap::DashMap;
use log::debug;

use crate::ecs::component::{Component, Id, Info};

/// Maps component types to dense [`Id`]s, handing out the next id the first time a type is seen.
///
/// A registry can be shared between worlds (and threads) behind an `Arc` so their component ids
/// agree. Lookups go through a `DashMap` and never block each other; only registration of a new
/// type takes a write lock, on the info table.
pub struct Registry {
    ids: DashMap<TypeId, Id>,
    /// Indexed by [`Id::index`].
    infos: RwLock<Vec<Info>>,
    next: AtomicU32,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self {
            ids: DashMap::new(),
            infos: RwLock::new(Vec::new()),
            next: AtomicU32::new(0),
        }
    }

    /// The id of `C`, registering it first if needed. Concurrent callers racing on the same new
    /// type all receive the same id.
    pub fn register<C: Component>(&self) -> Id {
        if let Some(id) = self.get::<C>() {
            return id;
        }

        *self.ids.entry(TypeId::of::<C>()).or_insert_with(|| {
            let id = Id::new(self.next.fetch_add(1, Ordering::Relaxed));
            let mut infos = self.infos.write().unwrap_or_else(|poisoned| poisoned.into_inner());
            // Ids are taken under the entry lock but pushed under this one, so they may land out
            // of order. Pad until the slot exists.
            while infos.len() <= id.index() {
                infos.push(Info::new::<C>(id));
            }
            infos[id.index()] = Info::new::<C>(id);
            debug!("Registered component {} as {:?}", type_name::<C>(), id);
            id
        })
    }

    /// The id of `C`, if it was registered.
    #[inline]
    pub fn get<C: Component>(&self) -> Option<Id> {
        self.ids.get(&TypeId::of::<C>()).map(|id| *id)
    }

    /// Metadata of `C`, if it was registered.
    pub fn get_info<C: Component>(&self) -> Option<Info> {
        self.get_info_by_id(self.get::<C>()?)
    }

    pub fn get_info_by_id(&self, id: Id) -> Option<Info> {
        let infos = self.infos.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        infos.get(id.index()).copied().filter(|info| info.id() == id)
    }

    /// Number of registered component types.
    #[inline]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, thread};

    use orbit_macros::Component;

    use super::*;

    #[derive(Component, Debug)]
    struct Position;

    #[derive(Component, Debug)]
    struct Velocity;

    #[derive(Component, Debug)]
    struct Health;

    #[test]
    fn ids_are_dense_and_stable() {
        // Given
        let registry = Registry::new();

        // When
        let position = registry.register::<Position>();
        let velocity = registry.register::<Velocity>();

        // Then
        assert_eq!(position.index(), 0);
        assert_eq!(velocity.index(), 1);
        assert_eq!(registry.register::<Position>(), position);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get::<Velocity>(), Some(velocity));
        assert_eq!(registry.get::<Health>(), None);
    }

    #[test]
    fn info_describes_the_type() {
        // Given
        let registry = Registry::new();
        let id = registry.register::<Health>();

        // When
        let info = registry.get_info::<Health>();

        // Then
        let info = info.unwrap();
        assert_eq!(info.id(), id);
        assert_eq!(info.type_id(), TypeId::of::<Health>());
        assert!(info.name().ends_with("Health"));
        assert!(registry.get_info::<Position>().is_none());
        assert!(registry.get_info_by_id(Id::new(7)).is_none());
    }

    #[test]
    fn concurrent_registration_agrees() {
        // Given
        let registry = Arc::new(Registry::new());

        // When - Threads race to register the same two types
        let handles: Vec<_> = (0..10)
            .map(|i| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    if i % 2 == 0 {
                        registry.register::<Position>()
                    } else {
                        registry.register::<Velocity>()
                    }
                })
            })
            .collect();
        let ids: Vec<Id> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        // Then
        assert_eq!(registry.len(), 2);
        assert!(ids.iter().step_by(2).all(|id| *id == ids[0]));
        assert!(ids.iter().skip(1).step_by(2).all(|id| *id == ids[1]));
        assert_ne!(ids[0], ids[1]);
        assert_eq!(registry.get_info_by_id(ids[1]).map(|info| info.id()), Some(ids[1]));
    }
}
