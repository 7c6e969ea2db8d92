//! A generational, sparse-set entity component system.
//!
//! - [`entity`]: generation-checked handles, their allocator and the liveness registry
//! - [`component`]: the [`Component`] trait and the type registry
//! - [`storage`]: one packed store per component type
//! - [`query`]: statically typed multi-component queries
//! - [`world`]: the [`World`] tying it all together

pub mod component;
pub mod entity;
pub mod query;
pub mod storage;
pub(crate) mod util;
pub mod world;

pub use component::Component;
pub use entity::Entity;
pub use query::Query;
pub use world::{Config, Values, World};
