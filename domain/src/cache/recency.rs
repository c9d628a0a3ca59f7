//! Bounded cache ordered by recency of use

use indexmap::IndexMap;
use std::hash::Hash;

/// Default number of entries kept by each gateway cache
pub const DEFAULT_CACHE_CAPACITY: usize = 100;

/// Map that keeps at most `capacity` entries.
///
/// Iteration order is least-recently-used first. A hit promotes the entry
/// to most recent; an insert past capacity evicts the least recent entry.
#[derive(Debug, Clone)]
pub struct RecencyCache<K, V> {
    entries: IndexMap<K, V>,
    capacity: usize,
}

impl<K: Hash + Eq, V: Clone> RecencyCache<K, V> {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: IndexMap::new(),
            capacity: capacity.max(1),
        }
    }

    /// Look up and promote an entry
    pub fn get(&mut self, key: &K) -> Option<V> {
        let index = self.entries.get_index_of(key)?;
        let last = self.entries.len() - 1;
        self.entries.move_index(index, last);
        self.entries.get_index(last).map(|(_, v)| v.clone())
    }

    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Insert (or replace) as most recent; returns the evicted entry, if any
    pub fn insert(&mut self, key: K, value: V) -> Option<(K, V)> {
        self.entries.shift_remove(&key);
        self.entries.insert(key, value);
        if self.entries.len() > self.capacity {
            self.entries.shift_remove_index(0)
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Entries from least to most recently used
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_past_capacity_evicts_oldest() {
        let mut cache = RecencyCache::new(2);
        assert!(cache.insert("a", 1).is_none());
        assert!(cache.insert("b", 2).is_none());
        assert_eq!(cache.insert("c", 3), Some(("a", 1)));
        assert_eq!(cache.len(), 2);
        assert!(!cache.contains(&"a"));
    }

    #[test]
    fn test_hit_promotes_entry() {
        let mut cache = RecencyCache::new(2);
        cache.insert("a", 1);
        cache.insert("b", 2);
        assert_eq!(cache.get(&"a"), Some(1));

        // "b" is now the least recent entry
        assert_eq!(cache.insert("c", 3), Some(("b", 2)));
        let keys: Vec<_> = cache.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec!["a", "c"]);
    }

    #[test]
    fn test_reinsert_replaces_value() {
        let mut cache = RecencyCache::new(3);
        cache.insert("a", 1);
        cache.insert("b", 2);
        cache.insert("a", 10);
        let entries: Vec<_> = cache.iter().map(|(k, v)| (*k, *v)).collect();
        assert_eq!(entries, vec![("b", 2), ("a", 10)]);
    }

    #[test]
    fn test_miss() {
        let mut cache: RecencyCache<&str, i32> = RecencyCache::new(DEFAULT_CACHE_CAPACITY);
        assert_eq!(cache.get(&"missing"), None);
        assert!(cache.is_empty());
        assert_eq!(cache.capacity(), 100);
    }
}
