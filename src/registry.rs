//! Id-keyed, insertion-ordered collections of live entities.
//!
//! Iteration follows insertion order (removals keep the relative order
//! of the survivors), which keeps collision scans deterministic.

use indexmap::map::{Iter, IterMut, Values};
use indexmap::IndexMap;

#[derive(Debug, Clone)]
pub struct Registry<T> {
    entries: IndexMap<String, T>,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }
}

impl<T> Registry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.entries.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut T> {
        self.entries.get_mut(id)
    }

    /// Inserts unless the id is taken; hands the value back on conflict.
    pub fn insert(&mut self, id: String, value: T) -> Result<(), T> {
        if self.entries.contains_key(&id) {
            return Err(value);
        }
        self.entries.insert(id, value);
        Ok(())
    }

    pub fn remove(&mut self, id: &str) -> Option<T> {
        self.entries.shift_remove(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> Iter<'_, String, T> {
        self.entries.iter()
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, String, T> {
        self.entries.iter_mut()
    }

    pub fn values(&self) -> Values<'_, String, T> {
        self.entries.values()
    }
}
