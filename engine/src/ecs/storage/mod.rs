//! Type-erased per-component storage for the ECS.
//!
//! Every component type registered in a world gets one [`Store`], created lazily the first time a
//! value of that type is attached. Stores never reference each other; the [`Storage`] container
//! only routes a component [`Id`](component::Id) to its store.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  Storage                                                 │
//! │  stores[component::Id] → Box<dyn AnyStore>               │
//! └─────────────┬────────────────────────────┬───────────────┘
//!               │                            │
//! ┌─────────────▼──────────────┐ ┌───────────▼────────────────┐
//! │  Store<Position>           │ │  Store<Velocity>           │
//! │  sparse: slot → row        │ │  sparse: slot → row        │
//! │  entities: [E3, E0, E7]    │ │  entities: [E0, E7]        │
//! │  values:   [P,  P,  P ]    │ │  values:   [V,  V ]        │
//! └────────────────────────────┘ └────────────────────────────┘
//! ```
//!
//! Values of one type sit in a single packed vec, so a query driven by a store walks sequential
//! memory. Structural changes to one store never move values of another.

mod index;
mod sparse;

use std::any::Any;

use log::debug;

use crate::ecs::{
    component::{self, Component},
    entity::Entity,
};

pub use index::{Row, SparseIndex};
pub use sparse::Store;

/// Object-safe view of a [`Store`] so stores of different component types can live side by side.
pub trait AnyStore: Any {
    /// Remove the value held by `entity`, if any. Returns whether one was held.
    fn remove_entity(&mut self, entity: Entity) -> bool;

    /// Remove every value.
    fn clear(&mut self);

    /// Entity handles in dense order.
    fn entities(&self) -> &[Entity];

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// The collection of all component stores in a world, indexed by component id.
#[derive(Default)]
pub struct Storage {
    stores: Vec<Option<Box<dyn AnyStore>>>,
    page_size: usize,
}

impl Storage {
    /// Create an empty storage whose stores use the given sparse page size.
    pub fn new(page_size: usize) -> Self {
        Self {
            stores: Vec::new(),
            page_size,
        }
    }

    /// Get the store for component `C`, if one has been created.
    #[inline]
    pub fn store<C: Component>(&self, id: component::Id) -> Option<&Store<C>> {
        self.stores
            .get(id.index())?
            .as_ref()?
            .as_any()
            .downcast_ref::<Store<C>>()
    }

    /// Get the store for component `C` mutably, if one has been created.
    #[inline]
    pub fn store_mut<C: Component>(&mut self, id: component::Id) -> Option<&mut Store<C>> {
        self.stores
            .get_mut(id.index())?
            .as_mut()?
            .as_any_mut()
            .downcast_mut::<Store<C>>()
    }

    /// Get the store for component `C`, creating it on first use.
    ///
    /// # Panics
    ///
    /// If `id` already names a store of a different component type. Ids come from a single
    /// component registry, so this indicates a registry mix-up.
    pub fn store_or_insert<C: Component>(&mut self, id: component::Id) -> &mut Store<C> {
        let index = id.index();
        if index >= self.stores.len() {
            self.stores.resize_with(index + 1, || None);
        }

        let page_size = self.page_size.max(1);
        let store = self.stores[index].get_or_insert_with(|| {
            debug!(
                "Creating store for {} ({:?})",
                std::any::type_name::<C>(),
                id
            );
            Box::new(Store::<C>::new_with_page_size(page_size))
        });

        store
            .as_any_mut()
            .downcast_mut::<Store<C>>()
            .expect("component id registered for a different type")
    }

    /// Get the type-erased store for a component id.
    #[inline]
    pub fn erased_mut(&mut self, id: component::Id) -> Option<&mut dyn AnyStore> {
        Some(self.stores.get_mut(id.index())?.as_mut()?.as_mut())
    }

    /// Get the type-erased store for a component id.
    #[inline]
    pub fn erased(&self, id: component::Id) -> Option<&dyn AnyStore> {
        Some(self.stores.get(id.index())?.as_ref()?.as_ref())
    }

    /// Whether `entity` holds a lendable value of `C`.
    #[inline]
    pub fn is_available<C: Component>(&self, id: component::Id, entity: Entity) -> bool {
        self.store::<C>(id)
            .is_some_and(|store| store.is_available(entity))
    }

    /// Take `entity`'s `C` out of its store. See [`Store::lend`].
    #[inline]
    pub fn lend<C: Component>(&mut self, id: component::Id, entity: Entity) -> Option<C> {
        self.store_mut::<C>(id)?.lend(entity)
    }

    /// Return a lent value to its store. See [`Store::restore`].
    #[inline]
    pub fn restore<C: Component>(&mut self, id: component::Id, entity: Entity, mut value: C) {
        match self.store_mut::<C>(id) {
            Some(store) => store.restore(entity, value),
            None => value.on_remove(entity),
        }
    }
}
