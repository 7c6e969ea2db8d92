//! Broad-phase lookup of entities by bounding box.
//!
//! An index answers one question: which entities have bounds overlapping a given box. Every
//! realization answers it with the same set of entities; they differ only in cost.
//!
//! ```
//! use orbit_engine::ecs::World;
//! use orbit_engine::geom::{Aabb, GridIndex, SpatialIndex, Vec2};
//!
//! let mut world = World::new();
//! let rock = world.spawn(());
//!
//! let mut index = GridIndex::new(4.0);
//! index.insert(rock, Aabb::from_center(Vec2::new(10.0, 0.0), Vec2::ONE));
//!
//! let near = index.collect(&Aabb::from_center(Vec2::new(9.0, 0.0), Vec2::ONE));
//! assert_eq!(near, vec![rock]);
//! ```

use std::collections::HashMap;

use log::{trace, warn};

use crate::{ecs::Entity, geom::Aabb};

pub trait SpatialIndex {
    /// Track `entity` with `bounds`. Inserting a tracked entity moves it.
    ///
    /// Bounds with a NaN or infinite corner are refused with a warning and change nothing.
    fn insert(&mut self, entity: Entity, bounds: Aabb);

    /// Stop tracking `entity`. Returns whether it was tracked.
    fn remove(&mut self, entity: Entity) -> bool;

    /// Move a tracked entity to new bounds. Untracked entities and non-finite bounds are ignored.
    fn reindex(&mut self, entity: Entity, bounds: Aabb);

    /// Visit every tracked entity whose bounds overlap `area`, each exactly once, in no particular
    /// order.
    fn query(&self, area: &Aabb, visit: &mut dyn FnMut(Entity));

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The entities a [`query`](Self::query) of `area` visits.
    fn collect(&self, area: &Aabb) -> Vec<Entity> {
        let mut found = Vec::new();
        self.query(area, &mut |entity| found.push(entity));
        found
    }
}

/// Checks every tracked entity on each query.
#[derive(Debug, Default, Clone)]
pub struct LinearIndex {
    entries: Vec<(Entity, Aabb)>,
}

impl LinearIndex {
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, entity: Entity) -> Option<usize> {
        self.entries.iter().position(|(e, _)| *e == entity)
    }
}

/// Whether `bounds` may be tracked, warning when it can't.
fn accept(entity: Entity, bounds: &Aabb) -> bool {
    let finite = bounds.is_finite();
    if !finite {
        warn!("Refusing non-finite bounds {:?} for {:?}", bounds, entity);
    }
    finite
}

impl SpatialIndex for LinearIndex {
    fn insert(&mut self, entity: Entity, bounds: Aabb) {
        if !accept(entity, &bounds) {
            return;
        }
        match self.position(entity) {
            Some(i) => self.entries[i].1 = bounds,
            None => self.entries.push((entity, bounds)),
        }
    }

    fn remove(&mut self, entity: Entity) -> bool {
        self.position(entity)
            .map(|i| self.entries.swap_remove(i))
            .is_some()
    }

    fn reindex(&mut self, entity: Entity, bounds: Aabb) {
        if !accept(entity, &bounds) {
            return;
        }
        if let Some(i) = self.position(entity) {
            self.entries[i].1 = bounds;
        }
    }

    fn query(&self, area: &Aabb, visit: &mut dyn FnMut(Entity)) {
        for (entity, bounds) in &self.entries {
            if bounds.overlaps(area) {
                visit(*entity);
            }
        }
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

type Cell = (i32, i32);

/// Uniform hash grid. Each entity is listed in every cell its bounds touch.
///
/// Queries look at the cells `area` touches, or at every occupied cell when that is fewer, and
/// report an entity from the lowest cell it shares with `area`, so nothing is visited twice.
#[derive(Debug, Clone)]
pub struct GridIndex {
    cell_size: f32,
    cells: HashMap<Cell, Vec<Entity>>,
    bounds: HashMap<Entity, Aabb>,
}

impl GridIndex {
    /// A grid of square cells `cell_size` wide. Sizes below `1e-5` are raised to it.
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size: cell_size.max(1.0e-5),
            cells: HashMap::new(),
            bounds: HashMap::new(),
        }
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Number of non-empty cells.
    pub fn occupied_cells(&self) -> usize {
        self.cells.len()
    }

    fn cell_of(&self, x: f32, y: f32) -> Cell {
        (
            (x / self.cell_size).floor() as i32,
            (y / self.cell_size).floor() as i32,
        )
    }

    fn cell_range(&self, bounds: &Aabb) -> (Cell, Cell) {
        (
            self.cell_of(bounds.min.x, bounds.min.y),
            self.cell_of(bounds.max.x, bounds.max.y),
        )
    }

    fn link(&mut self, entity: Entity, bounds: &Aabb) {
        let ((x0, y0), (x1, y1)) = self.cell_range(bounds);
        for y in y0..=y1 {
            for x in x0..=x1 {
                self.cells.entry((x, y)).or_default().push(entity);
            }
        }
    }

    /// Visit the occupied cells inside `(x0, y0)..=(x1, y1)`, in no particular order.
    fn occupied_in(
        &self,
        (x0, y0): Cell,
        (x1, y1): Cell,
        mut visit: impl FnMut(Cell, &[Entity]),
    ) {
        let span = (i64::from(x1) - i64::from(x0) + 1) * (i64::from(y1) - i64::from(y0) + 1);
        if span > self.cells.len() as i64 {
            for (&(x, y), list) in &self.cells {
                if (x0..=x1).contains(&x) && (y0..=y1).contains(&y) {
                    visit((x, y), list.as_slice());
                }
            }
            return;
        }
        for y in y0..=y1 {
            for x in x0..=x1 {
                if let Some(list) = self.cells.get(&(x, y)) {
                    visit((x, y), list.as_slice());
                }
            }
        }
    }

    fn unlink(&mut self, entity: Entity, bounds: &Aabb) {
        let (lo, hi) = self.cell_range(bounds);
        let mut linked = Vec::new();
        self.occupied_in(lo, hi, |cell, list| {
            if list.contains(&entity) {
                linked.push(cell);
            }
        });
        for cell in linked {
            if let Some(list) = self.cells.get_mut(&cell) {
                list.retain(|e| *e != entity);
                if list.is_empty() {
                    self.cells.remove(&cell);
                }
            }
        }
    }
}

impl Default for GridIndex {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl SpatialIndex for GridIndex {
    fn insert(&mut self, entity: Entity, bounds: Aabb) {
        if !accept(entity, &bounds) {
            return;
        }
        if let Some(old) = self.bounds.insert(entity, bounds) {
            self.unlink(entity, &old);
        }
        self.link(entity, &bounds);
    }

    fn remove(&mut self, entity: Entity) -> bool {
        match self.bounds.remove(&entity) {
            Some(old) => {
                self.unlink(entity, &old);
                true
            }
            None => false,
        }
    }

    fn reindex(&mut self, entity: Entity, bounds: Aabb) {
        if !accept(entity, &bounds) {
            return;
        }
        let Some(old) = self.bounds.get(&entity).copied() else {
            trace!("Ignoring reindex of untracked entity {:?}", entity);
            return;
        };
        if self.cell_range(&old) != self.cell_range(&bounds) {
            self.unlink(entity, &old);
            self.link(entity, &bounds);
        }
        self.bounds.insert(entity, bounds);
    }

    fn query(&self, area: &Aabb, visit: &mut dyn FnMut(Entity)) {
        let (lo, hi) = self.cell_range(area);
        self.occupied_in(lo, hi, |cell, list| {
            for entity in list {
                let Some(bounds) = self.bounds.get(entity) else {
                    continue;
                };
                if !bounds.overlaps(area) {
                    continue;
                }
                // Report from the first cell both boxes touch.
                let ((ex, ey), _) = self.cell_range(bounds);
                if cell == (ex.max(lo.0), ey.max(lo.1)) {
                    visit(*entity);
                }
            }
        });
    }

    fn len(&self) -> usize {
        self.bounds.len()
    }
}
