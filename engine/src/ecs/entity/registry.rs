use fixedbitset::FixedBitSet;
use log::warn;

use crate::ecs::{
    component,
    entity::{Entity, Generation},
};

/// The state of an entity slot. If the slot is alive, it holds the current generation and the
/// set of component types attached to the entity.
#[derive(Debug, Default, Clone)]
enum State {
    /// A live entity, its generation and its component signature.
    Alive(Generation, FixedBitSet),
    /// A slot that is not alive, but may have been in the past.
    #[default]
    Dead,
}

/// The collection of all known entities in the world. This tracks whether an entity is alive and
/// if alive, which component stores hold a value for it.
#[derive(Debug, Default, Clone)]
pub struct Registry {
    entries: Vec<State>,
    alive: usize,
}

impl Registry {
    /// Construct a new empty registry.
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            alive: 0,
        }
    }

    /// Construct a new registry with room for `capacity` entity slots.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            alive: 0,
        }
    }

    /// Mark a freshly allocated entity as alive with an empty signature.
    pub fn spawn(&mut self, entity: Entity) {
        let index = entity.index();
        if index >= self.entries.len() {
            self.entries.resize(index + 1, State::Dead);
        }
        debug_assert!(
            matches!(self.entries[index], State::Dead),
            "spawned an entity over a live slot: {entity:?}"
        );
        self.entries[index] = State::Alive(entity.generation(), FixedBitSet::new());
        self.alive += 1;
    }

    /// Mark the given entity as dead and hand back its component signature. Returns `None` if
    /// the entity was not alive.
    pub fn despawn(&mut self, entity: Entity) -> Option<FixedBitSet> {
        if !self.is_alive(entity) {
            warn!(
                "Attempted to destroy an entity that is not alive: {:?}",
                entity
            );
            return None;
        }
        self.alive -= 1;
        match std::mem::take(&mut self.entries[entity.index()]) {
            State::Alive(_, signature) => Some(signature),
            State::Dead => None,
        }
    }

    /// Determine if the given entity is currently alive.
    #[inline]
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.signature(entity).is_some()
    }

    /// Number of live entities.
    #[inline]
    pub fn len(&self) -> usize {
        self.alive
    }

    /// Whether no entities are alive.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.alive == 0
    }

    /// Record that `entity` now holds a component of type `id`. No-op for dead entities.
    pub fn attach(&mut self, entity: Entity, id: component::Id) {
        if let Some(signature) = self.signature_mut(entity) {
            signature.grow(id.index() + 1);
            signature.insert(id.index());
        }
    }

    /// Record that `entity` no longer holds a component of type `id`.
    pub fn detach(&mut self, entity: Entity, id: component::Id) {
        if let Some(signature) = self.signature_mut(entity)
            && id.index() < signature.len()
        {
            signature.set(id.index(), false);
        }
    }

    /// The component signature of a live entity.
    pub fn signature(&self, entity: Entity) -> Option<&FixedBitSet> {
        match self.entries.get(entity.index()) {
            Some(State::Alive(generation, signature)) if *generation == entity.generation() => {
                Some(signature)
            }
            _ => None,
        }
    }

    /// Write the handles of every live entity, in slot order, into `out`.
    pub fn collect_alive(&self, out: &mut Vec<Entity>) {
        out.extend(
            self.entries
                .iter()
                .enumerate()
                .filter_map(|(index, state)| match state {
                    State::Alive(generation, _) => Some(Entity::new_with_generation(
                        (index as u32).into(),
                        *generation,
                    )),
                    State::Dead => None,
                }),
        );
    }

    fn signature_mut(&mut self, entity: Entity) -> Option<&mut FixedBitSet> {
        match self.entries.get_mut(entity.index()) {
            Some(State::Alive(generation, signature)) if *generation == entity.generation() => {
                Some(signature)
            }
            _ => None,
        }
    }
}
