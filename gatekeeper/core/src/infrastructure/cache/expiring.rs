// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Expiring decision cache.
//!
//! Unbounded map guarded by a reader/writer lock. Stale entries are dropped
//! when a read finds them; there is no background sweep.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::RwLock;

use crate::domain::cache::{CacheEntry, DecisionCache};
use crate::domain::digest::CacheKey;

pub struct ExpiringCache<V> {
    entries: RwLock<HashMap<CacheKey, CacheEntry<V>>>,
    ttl: Duration,
}

impl<V: Clone + Send + Sync> ExpiringCache<V> {
    /// A `ttl` of zero keeps entries forever.
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }
}

impl<V: Clone + Send + Sync> DecisionCache<V> for ExpiringCache<V> {
    fn get(&self, key: &CacheKey) -> Option<V> {
        let now = Instant::now();
        {
            let entries = self.entries.read();
            match entries.get(key) {
                None => return None,
                Some(entry) if !entry.is_expired(now) => return Some(entry.value.clone()),
                Some(_) => {}
            }
        }

        // A writer may have refreshed the entry between the two locks
        let mut entries = self.entries.write();
        if entries.get(key).is_some_and(|entry| entry.is_expired(now)) {
            entries.remove(key);
            return None;
        }
        entries.get(key).map(|entry| entry.value.clone())
    }

    fn set(&self, key: CacheKey, value: V) {
        self.entries.write().insert(key, CacheEntry::new(value, self.ttl));
    }

    fn delete(&self, key: &CacheKey) {
        self.entries.write().remove(key);
    }

    fn len(&self) -> usize {
        self.entries.read().len()
    }
}

impl<V> std::fmt::Debug for ExpiringCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpiringCache")
            .field("len", &self.entries.read().len())
            .field("ttl", &self.ttl)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;
    use std::thread::sleep;

    fn key(n: u64) -> CacheKey {
        CacheKey::digest(&json!({ "n": n }))
    }

    #[test]
    fn test_set_then_get() {
        let cache = ExpiringCache::new(Duration::from_secs(60));
        cache.set(key(1), "partner1".to_string());

        assert_eq!(cache.get(&key(1)), Some("partner1".to_string()));
        assert_eq!(cache.get(&key(2)), None);
    }

    #[test]
    fn test_entries_expire_and_are_evicted_on_read() {
        let cache = ExpiringCache::new(Duration::from_millis(50));
        cache.set(key(1), true);
        sleep(Duration::from_millis(100));

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&key(1)), None);
        assert_eq!(cache.len(), 0);

        // Writing another key does not resurrect the stale one
        cache.set(key(2), false);
        assert_eq!(cache.get(&key(1)), None);
        assert_eq!(cache.get(&key(2)), Some(false));
    }

    #[test]
    fn test_zero_ttl_never_expires() {
        let cache = ExpiringCache::new(Duration::ZERO);
        cache.set(key(1), 7);
        sleep(Duration::from_millis(20));
        assert_eq!(cache.get(&key(1)), Some(7));
    }

    #[test]
    fn test_set_replaces_and_delete_removes() {
        let cache = ExpiringCache::new(Duration::from_secs(60));
        cache.set(key(1), 1);
        cache.set(key(1), 2);
        assert_eq!(cache.get(&key(1)), Some(2));

        cache.delete(&key(1));
        assert_eq!(cache.get(&key(1)), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_concurrent_access() {
        let cache = Arc::new(ExpiringCache::new(Duration::from_secs(60)));
        let handles: Vec<_> = (0..8u64)
            .map(|t| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    for i in 0..100u64 {
                        cache.set(key(t * 1000 + i), i);
                        assert_eq!(cache.get(&key(t * 1000 + i)), Some(i));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(cache.len(), 800);
    }
}
