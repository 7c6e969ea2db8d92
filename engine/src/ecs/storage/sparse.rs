//! The per-type component store.
//!
//! A [`Store`] is a sparse set: a paged [`SparseIndex`] maps entity slots to rows of two packed
//! vecs, one holding entity handles and one holding values. Lookups are O(1); removal swaps the
//! last row into the hole so both vecs stay packed and iteration touches only live values.
//!
//! # Lending
//!
//! Query visitors receive their components by value-backed `&mut` while also holding `&mut World`.
//! To make that sound the store *lends* a value out: the slot stays in place (so `contains` and
//! row order are unaffected) but is empty until the value is restored. While lent:
//!
//! - `get`/`get_mut` return `None` for that entity.
//! - `insert` fills the slot with the new value; on restore the lent value is the one discarded.
//! - `remove` drops the slot; on restore the lent value is discarded.
//!
//! Discarded values always see their `on_remove` hook.

use std::{any::Any, cmp::Ordering};

use log::trace;

use crate::ecs::{
    component::Component,
    entity::Entity,
    storage::{
        AnyStore,
        index::{Row, SparseIndex},
    },
};

/// Packed storage for every value of component type `T` in a world.
#[derive(Debug)]
pub struct Store<T> {
    index: SparseIndex,
    entities: Vec<Entity>,
    values: Vec<Option<T>>,
}

impl<T: Component> Default for Store<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Component> Store<T> {
    /// Create an empty store with the default sparse page size.
    #[inline]
    pub fn new() -> Self {
        Self::new_with_page_size(SparseIndex::DEFAULT_PAGE_SIZE)
    }

    /// Create an empty store with a custom sparse page size.
    #[inline]
    pub fn new_with_page_size(page_size: usize) -> Self {
        Self {
            index: SparseIndex::new_with_page_size(page_size),
            entities: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Number of entities holding this component, lent values included.
    #[inline]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether no entity holds this component.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Entity handles in dense (iteration) order.
    #[inline]
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Whether `entity` holds this component. True while the value is lent.
    #[inline]
    pub fn contains(&self, entity: Entity) -> bool {
        self.row(entity).is_some()
    }

    /// Whether `entity` holds this component and the value is in the store.
    #[inline]
    pub fn is_available(&self, entity: Entity) -> bool {
        self.row(entity)
            .is_some_and(|row| self.values[row.index()].is_some())
    }

    /// Get the value held by `entity`.
    #[inline]
    pub fn get(&self, entity: Entity) -> Option<&T> {
        let row = self.row(entity)?;
        self.values[row.index()].as_ref()
    }

    /// Get the value held by `entity` mutably.
    #[inline]
    pub fn get_mut(&mut self, entity: Entity) -> Option<&mut T> {
        let row = self.row(entity)?;
        self.values[row.index()].as_mut()
    }

    /// Attach `value` to `entity`, replacing (and unhooking) any previous value.
    pub fn insert(&mut self, entity: Entity, mut value: T) -> &mut T {
        let row = match self.row(entity) {
            Some(row) => {
                if let Some(mut old) = self.values[row.index()].take() {
                    old.on_remove(entity);
                }
                row
            }
            None => {
                // A stale handle for the same slot may still be indexed.
                if let Some(stale) = self
                    .index
                    .get(entity.id())
                    .map(|row| self.entities[row.index()])
                {
                    self.remove(stale);
                }
                let row = Row::new(self.entities.len());
                self.index.insert(entity.id(), row);
                self.entities.push(entity);
                self.values.push(None);
                row
            }
        };

        value.on_add(entity);
        self.values[row.index()].insert(value)
    }

    /// Detach the value held by `entity`. The `on_remove` hook runs before the value is returned.
    /// A lent value is not returned; it is discarded when restored.
    pub fn remove(&mut self, entity: Entity) -> Option<T> {
        let row = self.row(entity)?;
        self.index.remove(entity.id());

        let last = self.entities.len() - 1;
        if row.index() != last {
            let moved = self.entities[last];
            self.index.insert(moved.id(), row);
        }
        self.entities.swap_remove(row.index());
        let mut value = self.values.swap_remove(row.index())?;
        value.on_remove(entity);
        Some(value)
    }

    /// Detach every value, running `on_remove` hooks in dense order.
    pub fn clear(&mut self) {
        trace!(
            "Clearing {} values of {}",
            self.entities.len(),
            std::any::type_name::<T>()
        );
        for (entity, value) in self.entities.iter().zip(self.values.iter_mut()) {
            if let Some(value) = value {
                value.on_remove(*entity);
            }
        }
        self.entities.clear();
        self.values.clear();
        self.index.clear();
    }

    /// Take the value held by `entity` out of the store, leaving its slot in place.
    pub fn lend(&mut self, entity: Entity) -> Option<T> {
        let row = self.row(entity)?;
        self.values[row.index()].take()
    }

    /// Return a value previously taken with [`lend`](Self::lend).
    ///
    /// If the slot was removed, refilled or re-targeted while the value was out, the lent value is
    /// stale: its `on_remove` hook runs and it is dropped.
    pub fn restore(&mut self, entity: Entity, mut value: T) {
        match self.row(entity) {
            Some(row) if self.values[row.index()].is_none() => {
                self.values[row.index()] = Some(value);
            }
            _ => value.on_remove(entity),
        }
    }

    /// Stable sort of the dense storage by `compare`. Entity ↔ value association is preserved;
    /// only iteration order changes. Lent slots sort last.
    pub fn sort_by<F>(&mut self, mut compare: F)
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        let mut order: Vec<usize> = (0..self.entities.len()).collect();
        order.sort_by(|&a, &b| Self::compare_slots(&self.values, a, b, &mut compare));
        self.apply_order(&order);
    }

    /// Unstable sort of the dense storage by `compare`. See [`sort_by`](Self::sort_by).
    pub fn sort_unstable_by<F>(&mut self, mut compare: F)
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        let mut order: Vec<usize> = (0..self.entities.len()).collect();
        order.sort_unstable_by(|&a, &b| Self::compare_slots(&self.values, a, b, &mut compare));
        self.apply_order(&order);
    }

    /// Iterate over `(entity, value)` pairs in dense order, skipping lent values.
    pub fn iter(&self) -> impl Iterator<Item = (Entity, &T)> {
        self.entities
            .iter()
            .zip(self.values.iter())
            .filter_map(|(entity, value)| value.as_ref().map(|value| (*entity, value)))
    }

    /// Iterate mutably over `(entity, value)` pairs in dense order, skipping lent values.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Entity, &mut T)> {
        self.entities
            .iter()
            .zip(self.values.iter_mut())
            .filter_map(|(entity, value)| value.as_mut().map(|value| (*entity, value)))
    }

    /// Look up the dense row for `entity`, rejecting stale handles.
    #[inline]
    fn row(&self, entity: Entity) -> Option<Row> {
        let row = self.index.get(entity.id())?;
        (self.entities[row.index()] == entity).then_some(row)
    }

    fn compare_slots<F>(values: &[Option<T>], a: usize, b: usize, compare: &mut F) -> Ordering
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        match (&values[a], &values[b]) {
            (Some(a), Some(b)) => compare(a, b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }

    /// Rearrange the dense vecs so that new row `i` holds old row `order[i]`.
    fn apply_order(&mut self, order: &[usize]) {
        trace!(
            "Sorting {} values of {}",
            order.len(),
            std::any::type_name::<T>()
        );
        let mut values: Vec<Option<T>> = self.values.iter_mut().map(Option::take).collect();
        let entities = std::mem::take(&mut self.entities);

        self.entities = order.iter().map(|&old| entities[old]).collect();
        self.values = order.iter().map(|&old| values[old].take()).collect();
        for (row, entity) in self.entities.iter().enumerate() {
            self.index.insert(entity.id(), Row::new(row));
        }
    }
}

impl<T: Component> AnyStore for Store<T> {
    fn remove_entity(&mut self, entity: Entity) -> bool {
        let had = self.contains(entity);
        self.remove(entity);
        had
    }

    fn clear(&mut self) {
        Store::clear(self);
    }

    fn entities(&self) -> &[Entity] {
        &self.entities
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
