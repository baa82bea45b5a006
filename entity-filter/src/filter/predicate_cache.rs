// Copyright 2023 The Entity Filter Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Compiled Predicate Cache
//!
//! Compiled predicates are cached per `(entity type, filter name, value
//! signature)`. The cache is the only structure mutated concurrently by
//! different sessions. It is split into independently locked LRU shards, so
//! sessions compiling different keys rarely contend and the total number of
//! entries stays bounded.
//!
//! Entries are immutable. A changed binding produces a different signature and
//! therefore a new entry; an entry already handed to an in-flight query is
//! never altered. Two sessions racing to compile the same key both compile,
//! and the first insertion wins. Both results are behaviorally identical.

use std::num::NonZeroUsize;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use ahash::RandomState;
use cheetah_string::CheetahString;
use entity_filter_error::FilterResult;
use lru::LruCache;
use parking_lot::Mutex;
use tracing::debug;
use tracing::trace;

use crate::expression::CompiledPredicate;
use crate::model::EntityType;

/// Cache key of one compiled predicate.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub entity_type: EntityType,
    pub filter: CheetahString,
    /// Deterministic encoding of the bound values in declared-parameter order.
    pub signature: String,
}

impl CacheKey {
    pub fn new(entity_type: EntityType, filter: CheetahString, signature: String) -> Self {
        Self {
            entity_type,
            filter,
            signature,
        }
    }
}

/// Point-in-time cache counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub len: usize,
    pub capacity: usize,
}

type Shard = Mutex<LruCache<CacheKey, Arc<CompiledPredicate>>>;

/// Bounded, sharded LRU cache of compiled predicates.
pub struct PredicateCache {
    shards: Box<[Shard]>,
    hasher: RandomState,
    capacity: usize,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl PredicateCache {
    /// Creates a cache holding at most about `capacity` entries spread over
    /// `shards` locks. Both values are clamped to at least one, and the shard
    /// count never exceeds the capacity.
    pub fn new(capacity: usize, shards: usize) -> Self {
        let capacity = capacity.max(1);
        let shard_count = shards.clamp(1, capacity);
        let per_shard = NonZeroUsize::new(capacity.div_ceil(shard_count)).unwrap_or(NonZeroUsize::MIN);
        let shards = (0..shard_count)
            .map(|_| Mutex::new(LruCache::new(per_shard)))
            .collect::<Vec<_>>()
            .into_boxed_slice();
        Self {
            shards,
            hasher: RandomState::new(),
            capacity: per_shard.get() * shard_count,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// Looks up a compiled predicate, marking it most recently used.
    pub fn get(&self, key: &CacheKey) -> Option<Arc<CompiledPredicate>> {
        let found = self.shard(key).lock().get(key).cloned();
        if found.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            trace!("Predicate cache hit: {}/{} [{}]", key.entity_type, key.filter, key.signature);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
        found
    }

    /// Inserts `predicate` unless an entry for `key` already exists, and
    /// returns the entry that ends up cached.
    pub fn insert(&self, key: CacheKey, predicate: CompiledPredicate) -> Arc<CompiledPredicate> {
        let mut shard = self.shard(&key).lock();
        if let Some(existing) = shard.get(&key) {
            return Arc::clone(existing);
        }
        let predicate = Arc::new(predicate);
        debug!(
            "Caching compiled predicate for {}/{} [{}]",
            key.entity_type, key.filter, key.signature
        );
        if let Some((evicted, _)) = shard.push(key, Arc::clone(&predicate)) {
            self.evictions.fetch_add(1, Ordering::Relaxed);
            debug!(
                "Evicted compiled predicate for {}/{} [{}]",
                evicted.entity_type, evicted.filter, evicted.signature
            );
        }
        predicate
    }

    /// Returns the cached predicate for `key`, compiling it with `compile` on a
    /// miss. The shard lock is not held while compiling.
    pub fn get_or_try_insert_with<F>(&self, key: CacheKey, compile: F) -> FilterResult<Arc<CompiledPredicate>>
    where
        F: FnOnce() -> FilterResult<CompiledPredicate>,
    {
        if let Some(predicate) = self.get(&key) {
            return Ok(predicate);
        }
        let predicate = compile()?;
        Ok(self.insert(key, predicate))
    }

    /// Drops every entry. Counters are kept.
    pub fn clear(&self) {
        for shard in self.shards.iter() {
            shard.lock().clear();
        }
    }

    pub fn len(&self) -> usize {
        self.shards.iter().map(|shard| shard.lock().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            len: self.len(),
            capacity: self.capacity,
        }
    }

    fn shard(&self, key: &CacheKey) -> &Shard {
        let index = (self.hasher.hash_one(key) % self.shards.len() as u64) as usize;
        &self.shards[index]
    }
}

impl std::fmt::Debug for PredicateCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PredicateCache")
            .field("shards", &self.shards.len())
            .field("stats", &self.stats())
            .finish()
    }
}
