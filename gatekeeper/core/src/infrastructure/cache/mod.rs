// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Decision cache policies.

pub mod expiring;
pub mod lru;

use std::sync::Arc;

use crate::domain::cache::{CacheMode, DecisionCache};

pub use self::expiring::ExpiringCache;
pub use self::lru::LruDecisionCache;

/// Build the cache for `mode`. Each filter instance owns its own.
pub fn build_cache<V>(mode: CacheMode) -> Arc<dyn DecisionCache<V>>
where
    V: Clone + Send + Sync + 'static,
{
    match mode {
        CacheMode::Expiring { ttl } => Arc::new(ExpiringCache::new(ttl)),
        CacheMode::Lru { capacity } => Arc::new(LruDecisionCache::new(capacity)),
    }
}
