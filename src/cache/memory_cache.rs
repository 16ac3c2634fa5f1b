use super::{CacheEntry, DEFAULT_MEMORY_CAPACITY};
use lru::LruCache;
use std::num::NonZeroUsize;

/// Volatile tier: a bounded, least-recently-used map of entries.
///
/// The tier stores entries as given and never judges them; the store decides
/// validity on read.
pub struct MemoryTier<T> {
    store: LruCache<String, CacheEntry<T>>,
}

impl<T: Clone> MemoryTier<T> {
    /// A zero capacity falls back to [`DEFAULT_MEMORY_CAPACITY`].
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity)
            .or(NonZeroUsize::new(DEFAULT_MEMORY_CAPACITY))
            .unwrap_or(NonZeroUsize::MIN);
        Self {
            store: LruCache::new(capacity),
        }
    }

    pub fn get(&mut self, key: &str) -> Option<CacheEntry<T>> {
        self.store.get(key).cloned()
    }

    pub fn put(&mut self, key: String, entry: CacheEntry<T>) {
        self.store.put(key, entry);
    }

    pub fn remove(&mut self, key: &str) -> Option<CacheEntry<T>> {
        self.store.pop(key)
    }

    pub fn clear(&mut self) {
        self.store.clear();
    }

    /// Drops every entry that is no longer valid at `now`; returns how many went.
    pub fn remove_expired(&mut self, now: i64) -> usize {
        let expired: Vec<String> = self
            .store
            .iter()
            .filter(|(_, entry)| !entry.is_valid_at(now))
            .map(|(key, _)| key.clone())
            .collect();
        for key in &expired {
            self.store.pop(key);
        }
        expired.len()
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.store.cap().get()
    }
}
