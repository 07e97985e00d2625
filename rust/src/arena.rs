//! Ordered, id-keyed storage for graph records.
//!
//! Records live in a `Vec` in insertion order and are addressed by a dense
//! `usize` index; string ids map to indices through an `FxHashMap`. Hot graph
//! passes work on indices only, strings appear at the boundaries.

use rustc_hash::FxHashMap;

/// Insertion-ordered arena keyed by string id.
#[derive(Debug, Clone)]
pub struct IdArena<T> {
    to_index: FxHashMap<String, usize>,
    items: Vec<T>,
}

impl<T> IdArena<T> {
    /// Create an empty arena with pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            to_index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            items: Vec::with_capacity(capacity),
        }
    }

    /// Insert a record, or replace the record already stored under `id`.
    ///
    /// A replaced record keeps its original slot (and therefore its position
    /// in insertion order). Returns the index and the displaced record, if any.
    pub fn upsert(&mut self, id: &str, item: T) -> (usize, Option<T>) {
        if let Some(&index) = self.to_index.get(id) {
            let old = std::mem::replace(&mut self.items[index], item);
            return (index, Some(old));
        }
        let index = self.items.len();
        self.items.push(item);
        self.to_index.insert(id.to_string(), index);
        (index, None)
    }

    /// Index of the record stored under `id`, if any.
    #[inline]
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.to_index.get(id).copied()
    }

    #[inline]
    pub fn get(&self, id: &str) -> Option<&T> {
        self.index_of(id).map(|index| &self.items[index])
    }

    #[inline]
    pub fn at(&self, index: usize) -> &T {
        &self.items[index]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.items.iter_mut()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T> Default for IdArena<T> {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}
