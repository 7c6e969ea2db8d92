//! Multi-component queries over a [`World`](crate::ecs::World).
//!
//! A query names a set of component types statically, as a single type `C`, a tuple
//! `(A, B, ...)` or the empty tuple `()`. [`World::each`](crate::ecs::World::each) visits every
//! live entity holding all of them.
//!
//! # Execution
//!
//! 1. Every store named by the query is looked up. A missing store means nothing can match.
//! 2. The smallest store *drives* the query: its dense entity list is copied into a scratch
//!    buffer. The empty query is driven by the entity registry instead.
//! 3. For each driver entity that is still alive, every requested value is *lent* out of its
//!    store, the visitor runs with `&mut World` plus the lent values, and the values are restored.
//!
//! Lending is what makes nesting and structural mutation from inside a visitor sound without
//! interior mutability: the visitor owns the values for the duration of the call, so the world is
//! free to be borrowed mutably again.
//!
//! # Usage
//!
//! ```rust,ignore
//! world.each::<(Position, Velocity), _>(|_, _, (pos, vel)| {
//!     pos.0 = pos.0.add(vel.0);
//! });
//!
//! world.each::<Planet, _>(|world, planet, p| {
//!     world.each::<Player, _>(|_, player, pl| { /* planet vs player */ });
//! });
//! ```
//!
//! # Aliasing
//!
//! A query may not name the same component type twice. `(Foo, Foo)` panics at invocation.

use crate::ecs::{
    component::{self, Component},
    entity::Entity,
    storage::Storage,
};

/// A statically typed set of components that can be lent out of storage for one entity.
pub trait Query: Sized + 'static {
    /// The component ids this query touches, in declaration order.
    type Ids: Copy + AsRef<[component::Id]>;

    /// Resolve (registering if needed) the component ids of this query.
    fn ids(components: &component::Registry) -> Self::Ids;

    /// Take every requested value for `entity` out of storage. Either all values are lent or none.
    fn lend(storage: &mut Storage, ids: &Self::Ids, entity: Entity) -> Option<Self>;

    /// Return values taken with [`lend`](Self::lend).
    fn restore(self, storage: &mut Storage, ids: &Self::Ids, entity: Entity);
}

/// Panic if a query names the same component more than once.
pub(crate) fn validate(ids: &[component::Id]) {
    // Queries are short; a quadratic scan keeps the per-call path allocation free.
    for (i, id) in ids.iter().enumerate() {
        assert!(
            !ids[..i].contains(id),
            "Query aliasing violation: same component requested multiple times"
        );
    }
}

/// Pick the smallest store among `ids` and copy its entities into `out`.
///
/// Writes nothing if any of the stores has never been created.
pub(crate) fn collect_driver(storage: &Storage, ids: &[component::Id], out: &mut Vec<Entity>) {
    let mut driver: Option<&[Entity]> = None;
    for id in ids {
        let Some(store) = storage.erased(*id) else {
            return;
        };
        let entities = store.entities();
        if driver.is_none_or(|current| entities.len() < current.len()) {
            driver = Some(entities);
        }
    }
    if let Some(entities) = driver {
        out.extend_from_slice(entities);
    }
}

impl Query for () {
    type Ids = [component::Id; 0];

    #[inline]
    fn ids(_components: &component::Registry) -> Self::Ids {
        []
    }

    #[inline]
    fn lend(_storage: &mut Storage, _ids: &Self::Ids, _entity: Entity) -> Option<Self> {
        Some(())
    }

    #[inline]
    fn restore(self, _storage: &mut Storage, _ids: &Self::Ids, _entity: Entity) {}
}

impl<C: Component> Query for C {
    type Ids = [component::Id; 1];

    #[inline]
    fn ids(components: &component::Registry) -> Self::Ids {
        [components.register::<C>()]
    }

    #[inline]
    fn lend(storage: &mut Storage, ids: &Self::Ids, entity: Entity) -> Option<Self> {
        storage.lend::<C>(ids[0], entity)
    }

    #[inline]
    fn restore(self, storage: &mut Storage, ids: &Self::Ids, entity: Entity) {
        storage.restore(ids[0], entity, self);
    }
}

macro_rules! count {
    () => { 0 };
    ($head:ident $($tail:ident)*) => { 1 + count!($($tail)*) };
}

macro_rules! tuple_query {
    ($($name: ident),*) => {
        impl<$($name: Component),*> Query for ($($name,)*) {
            type Ids = [component::Id; count!($($name)*)];

            fn ids(components: &component::Registry) -> Self::Ids {
                [$(components.register::<$name>(),)*]
            }

            #[allow(non_snake_case)]
            fn lend(storage: &mut Storage, ids: &Self::Ids, entity: Entity) -> Option<Self> {
                let [$($name,)*] = *ids;
                // Check first so a partial match never leaves a value stranded outside its store.
                if !($(storage.is_available::<$name>($name, entity))&&*) {
                    return None;
                }
                Some(($(storage.lend::<$name>($name, entity)?,)*))
            }

            #[allow(non_snake_case)]
            fn restore(self, storage: &mut Storage, ids: &Self::Ids, entity: Entity) {
                let ($($name,)*) = self;
                let mut ids = ids.iter().copied();
                $(
                    if let Some(id) = ids.next() {
                        storage.restore(id, entity, $name);
                    }
                )*
            }
        }
    }
}

crate::all_tuples!(tuple_query);
