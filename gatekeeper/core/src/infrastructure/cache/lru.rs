// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Fixed-capacity LRU decision cache.
//!
//! Reads promote entries, so every operation takes the same mutex.

use std::num::NonZeroUsize;

use ::lru::LruCache;
use parking_lot::Mutex;

use crate::domain::cache::DecisionCache;
use crate::domain::digest::CacheKey;

pub struct LruDecisionCache<V> {
    inner: Mutex<LruCache<CacheKey, V>>,
}

impl<V: Clone + Send + Sync> LruDecisionCache<V> {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn capacity(&self) -> NonZeroUsize {
        self.inner.lock().cap()
    }
}

impl<V: Clone + Send + Sync> DecisionCache<V> for LruDecisionCache<V> {
    fn get(&self, key: &CacheKey) -> Option<V> {
        self.inner.lock().get(key).cloned()
    }

    fn set(&self, key: CacheKey, value: V) {
        self.inner.lock().put(key, value);
    }

    fn delete(&self, key: &CacheKey) {
        self.inner.lock().pop(key);
    }

    fn len(&self) -> usize {
        self.inner.lock().len()
    }
}

impl<V> std::fmt::Debug for LruDecisionCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("LruDecisionCache")
            .field("len", &inner.len())
            .field("capacity", &inner.cap())
            .finish()
    }
}
