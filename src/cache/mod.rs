//! In-process caching.
//!
//! `ExpiringLruCache` is a capacity-bounded LRU map whose entries also expire a fixed
//! time after they were last written. An entry is still live at exactly
//! `written_at + ttl` and gone one millisecond later. Time is passed in explicitly as epoch
//! milliseconds so callers decide which clock they run on.

use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use lru::LruCache;

struct CacheEntry<V> {
    value: V,
    expires_at: i64,
}

/// Bounded LRU cache with a per-entry time-to-live
pub struct ExpiringLruCache<K: Hash + Eq, V> {
    entries: Mutex<LruCache<K, CacheEntry<V>>>,
    ttl_ms: i64,
}

impl<K: Hash + Eq, V: Clone> ExpiringLruCache<K, V> {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            ttl_ms: i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX),
        }
    }

    /// Returns a copy of the live value for `key`. Expired entries are dropped.
    pub fn get(&self, key: &K, now_ms: i64) -> Option<V> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);

        let expired = match entries.get(key) {
            Some(entry) if entry.expires_at >= now_ms => return Some(entry.value.clone()),
            Some(_) => true,
            None => false,
        };
        if expired {
            entries.pop(key);
        }
        None
    }

    /// Stores `value` and restarts its time-to-live. Evicts the least recently
    /// used entry when the cache is full.
    pub fn set(&self, key: K, value: V, now_ms: i64) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.put(
            key,
            CacheEntry {
                value,
                expires_at: now_ms.saturating_add(self.ttl_ms),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .cap()
            .get()
    }
}
