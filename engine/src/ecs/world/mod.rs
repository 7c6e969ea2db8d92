//! The World is the central container for all entities and components.
//!
//! A `World` owns the entity allocator, the registry of live entities and one component store per
//! component type. Every operation takes `&mut self`; there is no interior mutability and no
//! concurrency inside a world.
//!
//! # Architecture
//!
//! - **Entity Allocator**: hands out slots and bumps generations on free
//! - **Entity Registry**: liveness plus each entity's component signature
//! - **Component Registry**: maps Rust types to component ids, optionally shared between worlds
//! - **Storage**: one sparse-set [`Store`](storage::Store) per component type
//!
//! # Stale handles
//!
//! Every operation taking an [`Entity`] treats a stale or null handle as absent: queries answer
//! `false`/`None` and mutations do nothing. Destroying a dead entity is logged at `warn` level
//! but is otherwise a no-op.
//!
//! # Example
//!
//! ```ignore
//! use orbit_engine::ecs::World;
//!
//! let mut world = World::new();
//! let player = world.spawn((Position::default(), Velocity::default()));
//!
//! world.each::<(Position, Velocity), _>(|_, _, (pos, vel)| {
//!     pos.0 = pos.0.add(vel.0);
//! });
//!
//! world.destroy(player);
//! assert!(!world.exists(player));
//! ```
mod values;

use std::{cmp::Ordering, sync::Arc};

use log::trace;

use crate::ecs::{
    component::{self, Component},
    entity::{self, Entity},
    query::{self, Query},
    storage::{self, SparseIndex},
};

pub use values::Values;

/// Tuning knobs for a [`World`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Entity slots reserved up front.
    pub entity_capacity: usize,

    /// Page size of the sparse index inside every component store.
    pub index_page_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            entity_capacity: 0,
            index_page_size: SparseIndex::DEFAULT_PAGE_SIZE,
        }
    }
}

/// The World is the central container for all entities and their components.
pub struct World {
    /// The world's entity allocator.
    allocator: entity::Allocator,

    /// Live entities and their component signatures.
    entities: entity::Registry,

    /// The registry of known component types.
    components: Arc<component::Registry>,

    /// The storage for components in the world.
    storage: storage::Storage,

    /// Reusable entity buffers for `each`. One is taken per (possibly nested) query.
    scratch: Vec<Vec<Entity>>,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    /// Create an empty world with the default [`Config`].
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Create an empty world with the given configuration.
    pub fn with_config(config: Config) -> Self {
        Self::with_components(Arc::new(component::Registry::new()), config)
    }

    /// Create an empty world that shares a component registry with other worlds, so component
    /// ids agree between them.
    pub fn with_components(components: Arc<component::Registry>, config: Config) -> Self {
        Self {
            allocator: entity::Allocator::with_capacity(config.entity_capacity),
            entities: entity::Registry::with_capacity(config.entity_capacity),
            components,
            storage: storage::Storage::new(config.index_page_size),
            scratch: Vec::new(),
        }
    }

    /// The component registry used by this world.
    #[inline]
    pub fn components(&self) -> &Arc<component::Registry> {
        &self.components
    }

    /// Spawn a new entity with the given set of components.
    pub fn spawn<V: Values>(&mut self, values: V) -> Entity {
        let entity = self.allocator.alloc();
        self.entities.spawn(entity);
        values.attach(self, entity);
        entity
    }

    /// Spawn a new entity reusing the slot of `hint` when that slot is not alive. Falls back to a
    /// regular allocation otherwise.
    ///
    /// The generation of the hinted handle is ignored; the result always carries the slot's
    /// current generation.
    pub fn spawn_at<V: Values>(&mut self, hint: Entity, values: V) -> Entity {
        let entity = match self.allocator.alloc_at(hint.id()) {
            Some(entity) => entity,
            None => self.allocator.alloc(),
        };
        self.entities.spawn(entity);
        values.attach(self, entity);
        entity
    }

    /// Spawn one entity per value set.
    pub fn spawn_many<V: Values>(&mut self, values: impl IntoIterator<Item = V>) -> Vec<Entity> {
        values.into_iter().map(|set| self.spawn(set)).collect()
    }

    /// Destroy an entity, removing it from every component store that holds it.
    ///
    /// Returns whether the entity was alive. Destroying a stale, null or already destroyed entity
    /// does nothing.
    pub fn destroy(&mut self, entity: Entity) -> bool {
        let Some(signature) = self.entities.despawn(entity) else {
            return false;
        };

        for index in signature.ones() {
            if let Some(store) = self.storage.erased_mut(component::Id::from(index)) {
                store.remove_entity(entity);
            }
        }
        self.allocator.free(entity);
        trace!("Destroyed {:?}", entity);
        true
    }

    /// Whether `entity` is alive in this world.
    #[inline]
    pub fn exists(&self, entity: Entity) -> bool {
        self.entities.is_alive(entity)
    }

    /// Number of live entities.
    #[inline]
    pub fn count(&self) -> usize {
        self.entities.len()
    }

    /// Whether `entity` holds a `T`.
    ///
    /// Also true while the value is lent to an enclosing [`each`](Self::each) visitor, even though
    /// [`get`](Self::get) returns `None` for it until the visitor returns.
    #[inline]
    pub fn has<T: Component>(&self, entity: Entity) -> bool {
        self.store::<T>().is_some_and(|store| store.contains(entity))
    }

    /// Get the `T` held by `entity`.
    ///
    /// Returns `None` while the value is lent to an enclosing [`each`](Self::each) visitor.
    #[inline]
    pub fn get<T: Component>(&self, entity: Entity) -> Option<&T> {
        self.store::<T>()?.get(entity)
    }

    /// Get the `T` held by `entity` mutably.
    #[inline]
    pub fn get_mut<T: Component>(&mut self, entity: Entity) -> Option<&mut T> {
        let id = self.components.get::<T>()?;
        self.storage.store_mut::<T>(id)?.get_mut(entity)
    }

    /// Get the `T` held by `entity`, attaching the value made by `make` if there is none.
    ///
    /// A value lent to an enclosing visitor counts as absent and is replaced. Returns `None` for a
    /// dead entity without calling `make`.
    pub fn get_or_insert_with<T: Component>(
        &mut self,
        entity: Entity,
        make: impl FnOnce() -> T,
    ) -> Option<&mut T> {
        if !self.entities.is_alive(entity) {
            return None;
        }
        let id = self.components.register::<T>();
        if self.storage.is_available::<T>(id, entity) {
            return self.storage.store_mut::<T>(id)?.get_mut(entity);
        }
        self.add(entity, make())
    }

    /// Attach `value` to `entity`, overwriting any `T` it already holds.
    ///
    /// Returns the stored value, or `None` (dropping `value`) if the entity is not alive.
    pub fn add<T: Component>(&mut self, entity: Entity, value: T) -> Option<&mut T> {
        if !self.entities.is_alive(entity) {
            return None;
        }
        let id = self.components.register::<T>();
        self.entities.attach(entity, id);
        Some(self.storage.store_or_insert::<T>(id).insert(entity, value))
    }

    /// Detach the `T` held by `entity` and return it. No-op if there is none.
    ///
    /// A value lent to a running visitor is not returned; it is dropped when the visitor returns.
    pub fn remove<T: Component>(&mut self, entity: Entity) -> Option<T> {
        let id = self.components.get::<T>()?;
        self.entities.detach(entity, id);
        self.storage.store_mut::<T>(id)?.remove(entity)
    }

    /// Detach every `T` from every entity.
    pub fn clear<T: Component>(&mut self) {
        let Some(id) = self.components.get::<T>() else {
            return;
        };
        if let Some(store) = self.storage.store_mut::<T>(id) {
            for entity in store.entities() {
                self.entities.detach(*entity, id);
            }
            store.clear();
        }
    }

    /// Stable sort of the `T` store. Changes iteration order only; every entity keeps its value.
    pub fn sort_by<T, F>(&mut self, compare: F)
    where
        T: Component,
        F: FnMut(&T, &T) -> Ordering,
    {
        if let Some(store) = self.store_mut::<T>() {
            store.sort_by(compare);
        }
    }

    /// Unstable sort of the `T` store. See [`sort_by`](Self::sort_by).
    pub fn sort_unstable_by<T, F>(&mut self, compare: F)
    where
        T: Component,
        F: FnMut(&T, &T) -> Ordering,
    {
        if let Some(store) = self.store_mut::<T>() {
            store.sort_unstable_by(compare);
        }
    }

    /// The store holding every `T`, if any `T` was ever added.
    #[inline]
    pub fn store<T: Component>(&self) -> Option<&storage::Store<T>> {
        self.storage.store::<T>(self.components.get::<T>()?)
    }

    #[inline]
    fn store_mut<T: Component>(&mut self) -> Option<&mut storage::Store<T>> {
        let id = self.components.get::<T>()?;
        self.storage.store_mut::<T>(id)
    }

    /// Iterate over every `(entity, &T)` in the store's dense order.
    pub fn iter<T: Component>(&self) -> impl Iterator<Item = (Entity, &T)> {
        self.store::<T>().into_iter().flat_map(|store| store.iter())
    }

    /// Visit every live entity holding all components of `Q`.
    ///
    /// The visitor receives the world and the entity's components. The components are lent out
    /// of their stores for the duration of the call, so the visitor may freely spawn, destroy,
    /// add, remove and run nested queries. A nested query does not see the lent components: a
    /// nested `each` over the same type visits every matching entity except the one currently
    /// visited by the outer call, and [`get`](Self::get) on that entity returns `None` for the lent
    /// types while [`has`](Self::has) still returns `true`.
    ///
    /// The set of candidates is fixed when the call starts: entities created by the visitor are
    /// not visited, and entities destroyed before their turn are skipped.
    ///
    /// # Panics
    ///
    /// If `Q` names the same component type twice.
    pub fn each<Q, F>(&mut self, mut visit: F)
    where
        Q: Query,
        F: FnMut(&mut World, Entity, &mut Q),
    {
        let ids = Q::ids(&self.components);
        query::validate(ids.as_ref());

        let mut entities = self.scratch.pop().unwrap_or_default();
        if ids.as_ref().is_empty() {
            self.entities.collect_alive(&mut entities);
        } else {
            query::collect_driver(&self.storage, ids.as_ref(), &mut entities);
        }

        for &entity in &entities {
            if !self.entities.is_alive(entity) {
                continue;
            }
            let Some(mut values) = Q::lend(&mut self.storage, &ids, entity) else {
                continue;
            };
            visit(self, entity, &mut values);
            values.restore(&mut self.storage, &ids, entity);
        }

        entities.clear();
        self.scratch.push(entities);
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use orbit_macros::Component;

    use super::*;

    #[derive(Component, Debug, Clone, PartialEq)]
    struct Comp1(i32);

    #[derive(Component, Debug, Clone, PartialEq)]
    struct Comp2(i32);

    #[derive(Component, Debug, Clone, PartialEq)]
    struct Marker;

    #[test]
    fn spawn_and_destroy() {
        // Given
        let mut world = World::new();

        // When
        let e1 = world.spawn(Comp1(1));
        let e2 = world.spawn((Comp1(2), Comp2(2)));

        // Then
        assert!(world.exists(e1));
        assert!(world.exists(e2));
        assert_eq!(world.count(), 2);

        // When
        assert!(world.destroy(e1));

        // Then
        assert!(!world.exists(e1));
        assert!(world.exists(e2));
        assert_eq!(world.get::<Comp1>(e1), None);
        assert_eq!(world.get::<Comp1>(e2), Some(&Comp1(2)));
        assert_eq!(world.store::<Comp1>().unwrap().len(), 1);
    }

    #[test]
    fn recycled_slot_rejects_stale_handle() {
        // Given
        let mut world = World::new();
        let old = world.spawn(Comp1(1));
        world.destroy(old);

        // When
        let new = world.spawn(Comp1(2));

        // Then
        assert_eq!(old.id(), new.id());
        assert_ne!(old, new);
        assert!(!world.exists(old));
        assert_eq!(world.get::<Comp1>(old), None);
        assert!(world.add(old, Comp2(0)).is_none());
        assert!(!world.destroy(old));
        assert_eq!(world.get::<Comp1>(new), Some(&Comp1(2)));
    }

    #[test]
    fn destroy_is_idempotent() {
        // Given
        let mut world = World::new();
        let e = world.spawn(Comp1(1));
        let other = world.spawn(Comp1(2));

        // When
        let first = world.destroy(e);
        let second = world.destroy(e);

        // Then
        assert!(first);
        assert!(!second);
        assert_eq!(world.count(), 1);
        assert!(world.exists(other));
        assert!(!world.destroy(Entity::NULL));
        assert!(!world.exists(Entity::NULL));
    }

    #[test]
    fn add_overwrites_and_remove_is_noop_when_absent() {
        // Given
        let mut world = World::new();
        let e = world.spawn(());

        // When
        world.add(e, Comp1(1));
        world.add(e, Comp1(2)).unwrap().0 += 1;

        // Then
        assert_eq!(world.get::<Comp1>(e), Some(&Comp1(3)));
        assert_eq!(world.store::<Comp1>().unwrap().len(), 1);

        // When
        assert_eq!(world.remove::<Comp1>(e), Some(Comp1(3)));
        assert_eq!(world.remove::<Comp1>(e), None);
        assert_eq!(world.remove::<Comp2>(e), None);

        // Then
        assert!(!world.has::<Comp1>(e));
        assert!(world.exists(e));
    }

    #[test]
    fn get_or_insert_with() {
        // Given
        let mut world = World::new();
        let e = world.spawn(());

        // When
        world.get_or_insert_with(e, || Comp1(5)).unwrap().0 += 1;
        world.get_or_insert_with(e, || Comp1(100)).unwrap().0 += 1;

        // Then
        assert_eq!(world.get::<Comp1>(e), Some(&Comp1(7)));
    }

    #[test]
    fn spawn_at_reuses_free_slot() {
        // Given
        let mut world = World::new();
        let a = world.spawn(Comp1(0));
        let b = world.spawn(Comp1(1));
        world.destroy(a);

        // When
        let reused = world.spawn_at(a, Comp1(2));
        let fallback = world.spawn_at(b, Comp1(3));

        // Then
        assert_eq!(reused.id(), a.id());
        assert_ne!(reused, a);
        assert_ne!(fallback.id(), b.id());
        assert_eq!(world.get::<Comp1>(b), Some(&Comp1(1)));
        assert_eq!(world.count(), 3);
    }

    #[test]
    fn clear_detaches_every_value() {
        // Given
        let mut world = World::new();
        let entities = world.spawn_many((0..5).map(|i| (Comp1(i), Marker)));

        // When
        world.clear::<Marker>();

        // Then
        assert!(entities.iter().all(|e| !world.has::<Marker>(*e)));
        assert!(entities.iter().all(|e| world.has::<Comp1>(*e)));

        // Then - Destroy still works after clear
        world.destroy(entities[0]);
        assert_eq!(world.store::<Comp1>().unwrap().len(), 4);
    }

    #[test]
    fn sort_keeps_association() {
        // Given
        let mut world = World::new();
        let values = [3, 1, 2];
        let entities = world.spawn_many(values.map(Comp1));

        // When
        world.sort_by::<Comp1, _>(|a, b| a.0.cmp(&b.0));

        // Then
        let order: Vec<_> = world.iter::<Comp1>().map(|(_, c)| c.0).collect();
        assert_eq!(order, vec![1, 2, 3]);
        for (e, v) in entities.iter().zip(values) {
            assert_eq!(world.get::<Comp1>(*e), Some(&Comp1(v)));
        }
    }

    #[test]
    fn each_requires_all_components() {
        // Given
        let mut world = World::new();
        world.spawn(Comp1(1));
        let both = world.spawn((Comp1(2), Comp2(2)));
        world.spawn(Comp2(3));

        // When
        let mut visited = Vec::new();
        world.each::<(Comp1, Comp2), _>(|_, e, (a, b)| {
            a.0 += b.0;
            visited.push(e);
        });

        // Then
        assert_eq!(visited, vec![both]);
        assert_eq!(world.get::<Comp1>(both), Some(&Comp1(4)));
    }

    #[test]
    fn empty_query_visits_all_live_entities() {
        // Given
        let mut world = World::new();
        let entities = world.spawn_many([(), (), ()]);
        world.destroy(entities[1]);

        // When
        let mut visited = Vec::new();
        world.each::<(), _>(|_, e, _| visited.push(e));

        // Then
        assert_eq!(visited, vec![entities[0], entities[2]]);
    }

    #[test]
    fn nested_each_does_not_see_lent_values() {
        // Given
        let mut world = World::new();
        world.spawn_many((0..3).map(Comp1));

        // When
        let mut pairs = 0;
        world.each::<Comp1, _>(|world, outer, _| {
            world.each::<Comp1, _>(|_, inner, _| {
                assert_ne!(outer, inner);
                pairs += 1;
            });
            assert_eq!(world.get::<Comp1>(outer), None);
            assert!(world.has::<Comp1>(outer));
        });

        // Then - Each of the 3 outer visits sees the other 2
        assert_eq!(pairs, 6);
        assert_eq!(world.iter::<Comp1>().count(), 3);
    }

    #[test]
    fn destroy_inside_each_skips_pending_entities() {
        // Given
        let mut world = World::new();
        let entities = world.spawn_many((0..4).map(Comp1));

        // When - The first visit destroys everything else
        let mut visited = Vec::new();
        world.each::<Comp1, _>(|world, e, _| {
            visited.push(e);
            for other in &entities {
                if *other != e {
                    world.destroy(*other);
                }
            }
        });

        // Then
        assert_eq!(visited.len(), 1);
        assert_eq!(world.count(), 1);
        assert_eq!(world.store::<Comp1>().unwrap().len(), 1);
    }

    #[test]
    fn structural_changes_inside_each() {
        // Given
        let mut world = World::new();
        let a = world.spawn(Comp1(1));
        let b = world.spawn(Comp1(2));

        // When
        world.each::<Comp1, _>(|world, e, value| {
            value.0 *= 10;
            if e == a {
                world.destroy(e);
                world.spawn(Comp1(99));
            } else {
                world.add(e, Comp2(value.0));
                world.add(e, Comp1(-1));
            }
        });

        // Then - The destroyed value is gone, the re-added value wins
        assert!(!world.exists(a));
        assert_eq!(world.get::<Comp1>(b), Some(&Comp1(-1)));
        assert_eq!(world.get::<Comp2>(b), Some(&Comp2(20)));
        assert_eq!(world.count(), 2);
    }

    #[test]
    fn remove_inside_each_drops_lent_value() {
        // Given
        let mut world = World::new();
        let e = world.spawn((Comp1(1), Comp2(1)));

        // When
        world.each::<Comp1, _>(|world, e, _| {
            assert_eq!(world.remove::<Comp1>(e), None);
        });

        // Then
        assert!(!world.has::<Comp1>(e));
        assert!(world.has::<Comp2>(e));
        let mut count = 0;
        world.each::<Comp1, _>(|_, _, _| count += 1);
        assert_eq!(count, 0);
    }

    #[derive(Debug)]
    struct Tracked(Rc<RefCell<Vec<&'static str>>>);

    impl Component for Tracked {
        fn on_add(&mut self, _entity: Entity) {
            self.0.borrow_mut().push("add");
        }

        fn on_remove(&mut self, _entity: Entity) {
            self.0.borrow_mut().push("remove");
        }
    }

    #[test]
    fn hooks_run_on_destroy_and_clear() {
        // Given
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut world = World::new();
        let a = world.spawn(Tracked(log.clone()));
        world.spawn(Tracked(log.clone()));

        // When
        world.destroy(a);
        world.clear::<Tracked>();

        // Then
        assert_eq!(*log.borrow(), vec!["add", "add", "remove", "remove"]);
    }

    #[test]
    fn hooks_run_once_for_value_removed_while_lent() {
        // Given
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut world = World::new();
        world.spawn(Tracked(log.clone()));

        // When
        world.each::<Tracked, _>(|world, e, _| {
            world.destroy(e);
        });

        // Then
        assert_eq!(*log.borrow(), vec!["add", "remove"]);
        assert_eq!(world.store::<Tracked>().unwrap().len(), 0);
    }

    #[test]
    fn shared_component_registry() {
        // Given
        let components = Arc::new(component::Registry::new());
        let mut w1 = World::with_components(components.clone(), Config::default());
        let mut w2 = World::with_components(components.clone(), Config::default());

        // When
        w2.spawn(Comp2(0));
        w1.spawn(Comp1(0));
        w1.spawn(Comp2(0));

        // Then
        assert_eq!(components.len(), 2);
        assert_eq!(components.get::<Comp2>(), Some(component::Id::new(0)));
    }

    #[test]
    fn custom_config() {
        // Given
        let config = Config {
            entity_capacity: 64,
            index_page_size: 8,
        };
        let mut world = World::with_config(config);

        // When
        let entities = world.spawn_many((0..40).map(Comp1));

        // Then
        assert_eq!(world.count(), 40);
        assert_eq!(world.get::<Comp1>(entities[39]), Some(&Comp1(39)));
    }

    #[test]
    #[should_panic(expected = "Query aliasing violation")]
    fn aliased_query_panics() {
        let mut world = World::new();
        world.spawn(Comp1(0));
        world.each::<(Comp1, Comp1), _>(|_, _, _| {});
    }
}
