// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Decision Cache
//!
//! The capability every cache policy offers to the decision client, and the
//! static selection between policies.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Define the cache contract; implementations live in
//!   `infrastructure::cache`
//!
//! Cache operations never fail. A miss is `None`.

use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

use crate::domain::digest::CacheKey;

/// Concurrent key→value store shared by every call through one filter.
pub trait DecisionCache<V>: Send + Sync {
    fn get(&self, key: &CacheKey) -> Option<V>;

    fn set(&self, key: CacheKey, value: V);

    fn delete(&self, key: &CacheKey);

    /// Number of entries currently held, including stale ones not yet
    /// noticed by a read.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A cached value with an optional absolute expiry.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub value: V,
    pub expires_at: Option<Instant>,
}

impl<V> CacheEntry<V> {
    /// `ttl` of zero means the entry never expires.
    pub fn new(value: V, ttl: Duration) -> Self {
        let expires_at = if ttl.is_zero() {
            None
        } else {
            Instant::now().checked_add(ttl)
        };
        Self { value, expires_at }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        matches!(self.expires_at, Some(at) if now > at)
    }
}

/// Which policy a filter instance uses. Chosen once, at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheMode {
    /// Unbounded map; entries older than `ttl` are dropped on read.
    Expiring { ttl: Duration },
    /// Fixed-capacity least-recently-used store with no expiry.
    Lru { capacity: NonZeroUsize },
}

impl CacheMode {
    /// A positive `size` selects LRU with that capacity; anything else
    /// selects the expiring map with `duration_secs` (0 = never expire).
    pub fn select(duration_secs: u64, size: i64) -> Self {
        usize::try_from(size)
            .ok()
            .and_then(NonZeroUsize::new)
            .map(|capacity| CacheMode::Lru { capacity })
            .unwrap_or(CacheMode::Expiring {
                ttl: Duration::from_secs(duration_secs),
            })
    }
}

impl std::fmt::Display for CacheMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheMode::Expiring { ttl } if ttl.is_zero() => write!(f, "expiring (never)"),
            CacheMode::Expiring { ttl } => write!(f, "expiring ({}s)", ttl.as_secs()),
            CacheMode::Lru { capacity } => write!(f, "lru ({} entries)", capacity),
        }
    }
}
