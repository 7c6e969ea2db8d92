//! Entity management for the ECS (Entity Component System).
//!
//! This module provides the core entity types and allocation mechanisms for managing
//! unique entity identifiers within the ECS. Entities are lightweight handles that tie
//! together the components stored in each per-type component store.
//!
//! # Architecture
//!
//! - **[`Entity`]**: A unique identifier combining an [`Id`] and [`Generation`]. The ID
//!   identifies the entity slot, while the generation tracks how many times that slot
//!   has been reused. This allows the world to reject stale entity references.
//!
//! - **[`Allocator`]**: Manages slot allocation and recycling. When entities are freed,
//!   their slot is placed in a dead pool for reuse.
//!
//! - **[`Registry`]**: Tracks which entities are alive and which component types each of
//!   them currently holds.
//!
//! # Generation Tracking
//!
//! When an entity is freed, the generation of its slot is incremented before the slot is
//! placed in the dead pool. Any handle to the old entity carries a mismatched generation,
//! so lookups through it fail instead of silently matching the new occupant:
//!
//! ```rust,ignore
//! let entity = allocator.alloc(); // Entity { id: 0, generation: 0 }
//! allocator.free(entity);
//! let reused = allocator.alloc();  // Entity { id: 0, generation: 1 }
//! assert_ne!(entity, reused);
//! ```
//!
//! # The null entity
//!
//! [`Entity::NULL`] uses the reserved slot `u32::MAX`, which the allocator never hands out.
//! It therefore never satisfies an existence check and is safe to store as "no reference".

mod registry;

use crossbeam::queue::SegQueue;
use fixedbitset::FixedBitSet;

pub use registry::Registry;

/// The generation of an entity, used to track whether an entity is the active entity in a world.
/// The generation starts at `FIRST` and is incremented each time the slot is freed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u32);

impl Generation {
    /// The first generation of an entity.
    pub const FIRST: Self = Self(0);

    /// Get the next generation from the current. Wraps after `u32::MAX` reuses of one slot.
    #[inline]
    pub fn next(&self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    /// Get the raw generation value.
    #[inline]
    pub const fn value(&self) -> u32 {
        self.0
    }
}

/// An entity slot identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Id(u32);

impl Id {
    /// The slot reserved for [`Entity::NULL`].
    pub const RESERVED: Self = Self(u32::MAX);

    /// Get the raw id value.
    #[inline]
    pub const fn value(&self) -> u32 {
        self.0
    }
}

impl From<u32> for Id {
    /// Get an id from a raw slot value.
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// An entity in the ECS.
///
/// An entity is valid only while its generation matches the live generation of its slot.
/// Entities do not own components; the per-type component stores do, keyed by entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Entity {
    /// The slot of the entity.
    id: Id,

    /// The generation of the entity.
    generation: Generation,
}

impl Entity {
    /// The null entity. Represents the absence of a reference and is never alive.
    pub const NULL: Self = Self::new_with_generation(Id::RESERVED, Generation(u32::MAX));

    /// Construct a new entity with just an id. This will default to the first generation.
    ///
    /// Test-only: live handles come from the allocator.
    #[cfg(test)]
    #[inline]
    pub(crate) fn new(id: impl Into<Id>) -> Self {
        Self::new_with_generation(id.into(), Generation::FIRST)
    }

    /// Construct a new entity with an id and known generation.
    #[inline]
    pub(crate) const fn new_with_generation(id: Id, generation: Generation) -> Self {
        Self { id, generation }
    }

    /// Get the id of this entity.
    #[inline]
    pub fn id(&self) -> Id {
        self.id
    }

    /// Get the generation of this entity.
    #[inline]
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Get the index of this entity if it were to live in indexable storage (e.g. Vec)
    #[inline]
    pub fn index(&self) -> usize {
        self.id.0 as usize
    }

    /// Whether this is the null entity.
    #[inline]
    pub fn is_null(&self) -> bool {
        self.id == Id::RESERVED
    }

    /// Get a new entity with the same id but the next generation.
    #[inline]
    pub fn genned(&self) -> Self {
        Self::new_with_generation(self.id, self.generation.next())
    }

    /// Pack this entity into a single integer, generation in the high bits.
    ///
    /// Useful for embedding handles in external data. The value carries no liveness, so it
    /// must be validated against a world after [`from_bits`](Self::from_bits).
    #[inline]
    pub const fn to_bits(&self) -> u64 {
        ((self.generation.0 as u64) << 32) | self.id.0 as u64
    }

    /// Unpack an entity previously packed with [`to_bits`](Self::to_bits).
    #[inline]
    pub const fn from_bits(bits: u64) -> Self {
        Self::new_with_generation(Id(bits as u32), Generation((bits >> 32) as u32))
    }
}

impl Default for Entity {
    /// Entities default to null.
    fn default() -> Self {
        Self::NULL
    }
}

/// Implement ordering for Entity based on id and generation.
impl PartialOrd for Entity {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Implement ordering for Entity based on id and generation.
impl Ord for Entity {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        match self.id.cmp(&other.id) {
            std::cmp::Ordering::Equal => self.generation.cmp(&other.generation),
            ord => ord,
        }
    }
}

/// An allocator for entities in the ECS.
///
/// Allocates unique entity IDs and recycles freed slots to avoid ID exhaustion.
/// When an entity is freed, its generation is incremented before the slot is placed in the
/// dead pool, invalidating any stale references.
///
/// The allocator is owned by the world and requires `&mut self` for every operation.
#[derive(Default, Debug)]
pub struct Allocator {
    /// Generation of each slot. This is the generation the next allocation of the slot gets.
    generations: Vec<Generation>,

    /// Pool of slots available for reuse. May contain stale entries for slots that were
    /// claimed through [`alloc_at`](Self::alloc_at); `free` is authoritative.
    dead_pool: SegQueue<Id>,

    /// Slots currently sitting in the dead pool.
    free: FixedBitSet,

    /// Next fresh ID to allocate.
    next_id: u32,
}

impl Allocator {
    /// Construct a new entity allocator starting from ID 0.
    #[inline]
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Construct a new entity allocator with room for `capacity` slots.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            generations: Vec::with_capacity(capacity),
            dead_pool: SegQueue::new(),
            free: FixedBitSet::with_capacity(capacity),
            next_id: 0,
        }
    }

    /// Allocate a new entity, either by reusing a freed slot from the dead pool or by
    /// allocating a new unique ID.
    pub fn alloc(&mut self) -> Entity {
        // Try to reuse from dead pool first, skipping slots claimed by a hint.
        while let Some(id) = self.dead_pool.pop() {
            if self.free.contains(id.0 as usize) {
                self.free.set(id.0 as usize, false);
                return Entity::new_with_generation(id, self.generation(id));
            }
        }

        self.fresh()
    }

    /// Allocate many new entities at once.
    ///
    /// Reuses slots from the dead pool first, then allocates new IDs as needed.
    pub fn alloc_many(&mut self, count: usize) -> Vec<Entity> {
        (0..count).map(|_| self.alloc()).collect()
    }

    /// Allocate the entity slot named by `hint` if that slot is not currently in use.
    ///
    /// Slots beyond the allocated range are claimed by first moving every skipped slot into
    /// the dead pool. Returns `None` if the slot is alive or reserved.
    pub fn alloc_at(&mut self, hint: Id) -> Option<Entity> {
        if hint == Id::RESERVED {
            return None;
        }

        if hint.0 >= self.next_id {
            // Everything between the current high-water mark and the hint becomes reusable.
            for id in self.next_id..hint.0 {
                self.push_free(Id(id));
            }
            self.next_id = hint.0 + 1;
            self.ensure_capacity(hint);
            return Some(Entity::new_with_generation(hint, self.generation(hint)));
        }

        let index = hint.0 as usize;
        if self.free.contains(index) {
            // The pool entry goes stale and is skipped by `alloc`.
            self.free.set(index, false);
            return Some(Entity::new_with_generation(hint, self.generation(hint)));
        }

        None
    }

    /// Free an entity for reuse.
    pub fn free(&mut self, entity: Entity) {
        let id = entity.id();
        debug_assert!(
            (id.0 as usize) < self.generations.len(),
            "freed an entity that was never allocated: {entity:?}"
        );

        // Bump generation so outstanding handles go stale.
        let index = id.0 as usize;
        self.generations[index] = self.generations[index].next();
        self.push_free(id);
    }

    /// Get the generation the next allocation of slot `id` receives.
    #[inline]
    pub fn generation(&self, id: Id) -> Generation {
        self.generations
            .get(id.0 as usize)
            .copied()
            .unwrap_or(Generation::FIRST)
    }

    /// Number of slots ever handed out (live or dead).
    #[inline]
    pub fn slots(&self) -> usize {
        self.next_id as usize
    }

    fn fresh(&mut self) -> Entity {
        assert!(self.next_id != Id::RESERVED.0, "entity id space exhausted");
        let id = Id(self.next_id);
        self.next_id += 1;
        self.ensure_capacity(id);
        Entity::new_with_generation(id, self.generation(id))
    }

    fn push_free(&mut self, id: Id) {
        let index = id.0 as usize;
        self.ensure_capacity(id);
        self.free.grow(index + 1);
        self.free.insert(index);
        self.dead_pool.push(id);
    }

    fn ensure_capacity(&mut self, id: Id) {
        let index = id.0 as usize;
        if index >= self.generations.len() {
            self.generations.resize(index + 1, Generation::FIRST);
        }
    }
}

#[test]
fn allocator_uniqueness() {
    // Given
    let mut allocator = Allocator::default();

    // When
    let mut entities = Vec::new();
    for _ in 0..200 {
        entities.push(allocator.alloc());
    }

    // Then - No dupes generated
    let pre_len = entities.len();
    entities.sort();
    entities.dedup();
    assert_eq!(pre_len, entities.len());
}

#[test]
fn allocator_reuse() {
    // Given
    let mut allocator = Allocator::default();

    // When
    let mut entities = Vec::new();
    for _ in 0..10 {
        entities.push(allocator.alloc());
    }

    for e in entities.drain(..) {
        allocator.free(e);
    }

    let mut reused_entities = Vec::new();
    for _ in 0..10 {
        reused_entities.push(allocator.alloc());
    }

    // Then - Entities should be reused with incremented generation
    reused_entities.sort();
    for (i, e) in reused_entities.iter().enumerate() {
        assert_eq!(e.id.0, i as u32);
        assert_eq!(e.generation.0, 1);
    }
}

#[test]
fn allocator_free_and_reuse_cycle() {
    // Given
    let mut allocator = Allocator::default();
    let mut entities = allocator.alloc_many(5);

    // When - Free all entities
    for e in entities.drain(..) {
        allocator.free(e);
    }

    // Then - Pool should have 5 entities
    assert_eq!(allocator.dead_pool.len(), 5);

    // When - Allocate 6 (more than pool size)
    let new_entities = allocator.alloc_many(6);

    // Then - 5 reused (gen 1) + 1 new (gen 0)
    assert_eq!(allocator.dead_pool.len(), 0);
    let new_count = new_entities.iter().filter(|e| e.generation.0 == 0).count();
    let reused_count = new_entities.iter().filter(|e| e.generation.0 == 1).count();
    assert_eq!(new_count, 1);
    assert_eq!(reused_count, 5);
}

#[test]
fn allocator_multiple_generations() {
    // Given
    let mut allocator = Allocator::default();
    let entity = allocator.alloc();
    let original_id = entity.id;

    // When - Free and reallocate multiple times
    allocator.free(entity);
    let gen1 = allocator.alloc();

    allocator.free(gen1);
    let gen2 = allocator.alloc();

    // Then - Same ID, incrementing generations, never equal handles
    assert_eq!(gen1.id, original_id);
    assert_eq!(gen1.generation.0, 1);
    assert_eq!(gen2.id, original_id);
    assert_eq!(gen2.generation.0, 2);
    assert_ne!(entity, gen1);
    assert_ne!(gen1, gen2);
}

#[test]
fn allocator_alloc_at_beyond_range() {
    // Given
    let mut allocator = Allocator::default();
    allocator.alloc();

    // When - Hint a slot past the high-water mark
    let hinted = allocator.alloc_at(Id(4)).unwrap();

    // Then - The hinted slot is used and the skipped slots become reusable
    assert_eq!(hinted.id, Id(4));
    assert_eq!(allocator.slots(), 5);
    let mut reused: Vec<_> = allocator.alloc_many(3).iter().map(|e| e.id.0).collect();
    reused.sort();
    assert_eq!(reused, vec![1, 2, 3]);
    assert_eq!(allocator.alloc().id, Id(5));
}

#[test]
fn allocator_alloc_at_dead_slot() {
    // Given
    let mut allocator = Allocator::default();
    let entities = allocator.alloc_many(3);
    allocator.free(entities[0]);
    allocator.free(entities[1]);

    // When - Claim the second freed slot by hint
    let hinted = allocator.alloc_at(Id(1)).unwrap();

    // Then - The slot is handed out once, and the stale pool entry is skipped
    assert_eq!(hinted, entities[1].genned());
    assert_eq!(allocator.alloc().id, Id(0));
    assert_eq!(allocator.alloc().id, Id(3));
}

#[test]
fn allocator_alloc_at_live_slot() {
    // Given
    let mut allocator = Allocator::default();
    let entity = allocator.alloc();

    // Then - Live and reserved slots can't be claimed
    assert!(allocator.alloc_at(entity.id).is_none());
    assert!(allocator.alloc_at(Id::RESERVED).is_none());
}

#[test]
fn entity_ordering() {
    // Given
    let e1 = Entity::new(Id(1));
    let e2 = Entity::new(Id(2));
    let e1_gen1 = e1.genned();

    // Then - Ordered by ID first, then generation
    assert!(e1 < e2);
    assert!(e1 < e1_gen1);
    assert!(e1_gen1 < e2);
}

#[test]
fn entity_bits_round_trip() {
    // Given
    let entity = Entity::new_with_generation(Id(42), Generation(7));

    // When
    let bits = entity.to_bits();

    // Then
    assert_eq!(bits, (7u64 << 32) | 42);
    assert_eq!(Entity::from_bits(bits), entity);
    assert_eq!(Entity::from_bits(Entity::NULL.to_bits()), Entity::NULL);
}

#[test]
fn null_entity() {
    // Then
    assert!(Entity::NULL.is_null());
    assert!(Entity::default().is_null());
    assert!(!Entity::new(Id(0)).is_null());
}
