use crate::ecs::entity;

/// A dense row in a component store. A simple index into the store's entity and value vecs.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Row(u32);

impl From<usize> for Row {
    /// Get a row from a usize index.
    fn from(value: usize) -> Self {
        Self::new(value)
    }
}

impl Row {
    /// Construct a new row from an index.
    #[inline]
    pub const fn new(index: usize) -> Self {
        Self(index as u32)
    }

    /// Get the index used in the dense vecs.
    #[inline]
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

/// A paged sparse index mapping entity slots to dense store rows.
///
/// The slot space is divided into fixed-size pages, and memory is only allocated for pages that
/// hold at least one entry. Entity slots are handed out sequentially and recycled in batches, so
/// live slots cluster and most pages end up either full or absent.
///
/// | Operation | Time | Memory |
/// |-----------|------|--------|
/// | `insert()` | O(1) amortized | Allocates a page on first use |
/// | `get()` | O(1) | No allocation |
/// | `remove()` | O(1) | No deallocation (leaves `None`) |
///
/// The index is keyed by slot only. Generation checks are the store's job: it keeps the full
/// entity handle next to every dense row.
///
/// # Example
///
/// ```ignore
/// let mut index = SparseIndex::new_with_page_size(64);
///
/// index.insert(entity_3.id(), 0.into());
/// index.insert(entity_700.id(), 1.into()); // Allocates a second page
///
/// assert_eq!(index.get(entity_700.id()), Some(1.into()));
/// assert_eq!(index.get(entity_4.id()), None);
/// ```
#[derive(Debug, Clone)]
pub struct SparseIndex {
    /// The size of pages to allocate when growing the index.
    page_size: usize,

    /// Outer Vec is indexed by `slot / page_size`, inner by `slot % page_size`.
    pages: Vec<Option<Box<[Option<Row>]>>>,
}

impl SparseIndex {
    /// Default page size balances memory usage and access speed for typical entity patterns.
    pub const DEFAULT_PAGE_SIZE: usize = 256;

    /// Create a new index with the default page size.
    #[inline]
    pub const fn new() -> Self {
        Self::new_with_page_size(Self::DEFAULT_PAGE_SIZE)
    }

    /// Create a new index with a custom page size.
    ///
    /// # Panics
    ///
    /// Debug builds panic if page_size is 0.
    #[inline]
    pub const fn new_with_page_size(page_size: usize) -> Self {
        debug_assert!(page_size > 0, "page_size must be greater than 0");
        Self {
            page_size,
            pages: Vec::new(),
        }
    }

    /// Calculate page and within-page indices for a slot.
    #[inline]
    fn indices(&self, id: entity::Id) -> (usize, usize) {
        let slot = id.value() as usize;
        (slot / self.page_size, slot % self.page_size)
    }

    /// Map `id` to `row`, replacing any existing mapping.
    pub fn insert(&mut self, id: entity::Id, row: Row) {
        let (page_index, within_page_index) = self.indices(id);

        if page_index >= self.pages.len() {
            self.pages.resize_with(page_index + 1, || None);
        }

        let page_size = self.page_size;
        let page = self.pages[page_index]
            .get_or_insert_with(|| vec![None; page_size].into_boxed_slice());
        page[within_page_index] = Some(row);
    }

    /// Get the row for the given slot if it exists.
    #[inline]
    pub fn get(&self, id: entity::Id) -> Option<Row> {
        let (page_index, within_page_index) = self.indices(id);
        let page = self.pages.get(page_index)?.as_ref()?;
        page[within_page_index]
    }

    /// Remove the row for the given slot, returning it if present.
    pub fn remove(&mut self, id: entity::Id) -> Option<Row> {
        let (page_index, within_page_index) = self.indices(id);
        let page = self.pages.get_mut(page_index)?.as_mut()?;
        page[within_page_index].take()
    }

    /// Drop every mapping, keeping allocated pages for reuse.
    pub fn clear(&mut self) {
        for page in self.pages.iter_mut().flatten() {
            page.fill(None);
        }
    }

    /// Number of pages addressed so far (including unallocated ones).
    #[inline]
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Number of pages that have been allocated.
    pub fn allocated_page_count(&self) -> usize {
        self.pages.iter().filter(|page| page.is_some()).count()
    }
}

impl Default for SparseIndex {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}
