//! Component management for the ECS.
//!
//! Components are plain data values attached to entities. Every concrete component type gets
//! exactly one store in a world, and that store owns every value of the type.
//!
//! ## Architecture
//!
//! - [`Component`]: The trait that all component types must implement
//! - [`Id`]: A unique identifier for each registered component type
//! - [`Registry`]: Registration and lookup of component types
//! - [`Info`]: Metadata about a registered component type
//!
//! ## Lifecycle hooks
//!
//! [`Component::on_add`] runs after a value is attached to an entity and
//! [`Component::on_remove`] runs before a value is detached, whether the detach comes from
//! `remove`, `clear`, an overwrite by `add`, or the entity being destroyed.
//!
//! ## Usage
//!
//! ```ignore
//! use orbit_engine::ecs::component::{Component, Registry};
//!
//! #[derive(Component)]
//! struct Position { x: f32, y: f32 }
//!
//! let registry = Registry::new();
//! let pos_id = registry.register::<Position>();
//! ```

use std::any::TypeId;

mod registry;

pub use registry::Registry;

use crate::ecs::entity::Entity;

/// A component identifier. This is a unique identifier for a component type in a registry.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Id(u32);

impl Id {
    /// Construct a new component Id from a raw u32 value.
    #[inline]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the index of this component if it were to live in indexable storage (e.g. Vec)
    #[inline]
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl From<u32> for Id {
    #[inline]
    fn from(value: u32) -> Self {
        Self::new(value)
    }
}

impl From<usize> for Id {
    #[inline]
    fn from(value: usize) -> Self {
        Self::new(value as u32)
    }
}

/// A trait representing a component in the ECS.
///
/// Most types derive this with `#[derive(Component)]`. Implement it by hand to react to a value
/// being attached to or detached from an entity.
pub trait Component: 'static + Sized {
    /// Called after this value has been attached to `entity`.
    #[inline]
    fn on_add(&mut self, entity: Entity) {
        let _ = entity;
    }

    /// Called before this value is detached from `entity`.
    #[inline]
    fn on_remove(&mut self, entity: Entity) {
        let _ = entity;
    }
}

/// Metadata about a registered component type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Info {
    id: Id,
    type_id: TypeId,
    name: &'static str,
}

impl Info {
    /// Construct the info for component type `C` registered under `id`.
    #[inline]
    pub fn new<C: Component>(id: Id) -> Self {
        Self {
            id,
            type_id: TypeId::of::<C>(),
            name: std::any::type_name::<C>(),
        }
    }

    /// The registered component id.
    #[inline]
    pub fn id(&self) -> Id {
        self.id
    }

    /// The Rust type id of the component.
    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// The Rust type name of the component.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }
}
