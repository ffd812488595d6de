//! Time-bounded cache
//!
//! Entries go stale a fixed window after insertion. Every method has an
//! `_at` variant taking the current instant so staleness is testable
//! without sleeping.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
}

/// Cache whose entries expire `ttl` after insertion
#[derive(Debug, Clone)]
pub struct TtlCache<K, V> {
    entries: HashMap<K, CacheEntry<V>>,
    ttl: Duration,
}

impl<K: Eq + Hash, V: Clone> TtlCache<K, V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.get_at(key, Instant::now())
    }

    /// Fresh value for `key` as of `now`
    pub fn get_at(&self, key: &K, now: Instant) -> Option<V> {
        let entry = self.entries.get(key)?;
        if now.saturating_duration_since(entry.inserted_at) < self.ttl {
            Some(entry.value.clone())
        } else {
            None
        }
    }

    pub fn insert(&mut self, key: K, value: V) {
        self.insert_at(key, value, Instant::now());
    }

    /// Insert `value`, dropping entries already stale at `now`
    pub fn insert_at(&mut self, key: K, value: V, now: Instant) {
        self.purge_expired_at(now);
        self.entries.insert(
            key,
            CacheEntry {
                value,
                inserted_at: now,
            },
        );
    }

    pub fn invalidate(&mut self, key: &K) {
        self.entries.remove(key);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Drop stale entries; returns how many were removed
    pub fn purge_expired(&mut self) -> usize {
        self.purge_expired_at(Instant::now())
    }

    pub fn purge_expired_at(&mut self, now: Instant) -> usize {
        let ttl = self.ttl;
        let before = self.entries.len();
        self.entries
            .retain(|_, e| now.saturating_duration_since(e.inserted_at) < ttl);
        before - self.entries.len()
    }

    /// Update every cached value in place, keeping insertion times
    pub fn update_all<F: FnMut(&mut V)>(&mut self, mut f: F) {
        for entry in self.entries.values_mut() {
            f(&mut entry.value);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_then_stale() {
        let mut cache = TtlCache::new(Duration::from_secs(60));
        let t0 = Instant::now();
        cache.insert_at("page-1", 10, t0);

        assert_eq!(cache.get_at(&"page-1", t0 + Duration::from_secs(59)), Some(10));
        assert_eq!(cache.get_at(&"page-1", t0 + Duration::from_secs(60)), None);
    }

    #[test]
    fn test_reinsert_resets_window() {
        let mut cache = TtlCache::new(Duration::from_secs(10));
        let t0 = Instant::now();
        cache.insert_at(1, "a", t0);
        cache.insert_at(1, "b", t0 + Duration::from_secs(8));

        assert_eq!(cache.get_at(&1, t0 + Duration::from_secs(15)), Some("b"));
    }

    #[test]
    fn test_purge_and_invalidate() {
        let mut cache = TtlCache::new(Duration::from_secs(10));
        let t0 = Instant::now();
        cache.insert_at(1, 1, t0);
        cache.insert_at(2, 2, t0 + Duration::from_secs(5));
        cache.insert_at(3, 3, t0 + Duration::from_secs(5));

        assert_eq!(cache.purge_expired_at(t0 + Duration::from_secs(12)), 1);
        assert_eq!(cache.len(), 2);

        cache.invalidate(&2);
        assert_eq!(cache.get_at(&2, t0 + Duration::from_secs(6)), None);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_insert_evicts_stale_keys() {
        let mut cache = TtlCache::new(Duration::from_secs(10));
        let t0 = Instant::now();
        for page in 0..50u64 {
            cache.insert_at(page, page, t0 + Duration::from_secs(page * 11));
        }
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get_at(&49, t0 + Duration::from_secs(49 * 11)), Some(49));
    }

    #[test]
    fn test_update_all() {
        let mut cache = TtlCache::new(Duration::from_secs(10));
        cache.insert(1, 5);
        cache.insert(2, 7);
        cache.update_all(|v| *v += 1);
        assert_eq!(cache.get(&1), Some(6));
        assert_eq!(cache.get(&2), Some(8));
    }
}
