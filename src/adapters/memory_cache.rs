//! In-process cache backing [`CachePort`].

use std::collections::HashMap;

use crate::ports::cache_port::{CacheKey, CachePort};

/// Unbounded map cache. Values are cloned out on every hit.
#[derive(Debug)]
pub struct MemoryCache<V> {
    entries: HashMap<CacheKey, V>,
}

impl<V> MemoryCache<V> {
    pub fn new() -> Self {
        MemoryCache {
            entries: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V> Default for MemoryCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone> CachePort<V> for MemoryCache<V> {
    fn get(&self, key: &CacheKey) -> Option<V> {
        self.entries.get(key).cloned()
    }

    fn put(&mut self, key: CacheKey, value: V) {
        self.entries.insert(key, value);
    }

    fn clear(&mut self) {
        self.entries.clear();
    }
}
