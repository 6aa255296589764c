// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::hash::Hash;
use tokio::sync::Mutex;

use crate::config::consts::DEFAULT_CACHE_CAPACITY;

/// Loads a value for a key that missed the cache.
///
/// `Ok(None)` means the upstream has no value for the key. Absence is never
/// cached, so the next lookup for that key calls the loader again.
#[async_trait]
pub trait CacheLoader<K, V>: Send + Sync {
    type Error: Send;

    async fn load(&self, key: &K) -> Result<Option<V>, Self::Error>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

/// Bounded least-recently-used memo cache in front of an async loader.
///
/// At most `capacity` entries are held. A hit promotes the entry to most recently
/// used; inserting a new key into a full cache evicts the least recently used one.
///
/// The lock is never held across the loader call, so concurrent misses for the
/// same key each call the loader (no single-flight). The last load to finish wins.
pub struct MemoCache<K, V, L> {
    capacity: usize,
    loader: L,
    state: Mutex<CacheState<K, V>>,
}

struct CacheEntry<V> {
    value: V,
    version: u64,
}

// Recency is tracked with versioned positions in `order`. Promoting an entry
// pushes a fresh position and leaves the old one stale; stale positions are
// skipped on eviction and compacted away once they outnumber live entries.
struct CacheState<K, V> {
    entries: HashMap<K, CacheEntry<V>>,
    order: VecDeque<(K, u64)>,
    next_version: u64,
    stats: CacheStats,
}

impl<K, V, L> MemoCache<K, V, L>
where
    K: Clone + Eq + Hash + Send + Sync,
    V: Clone + Send,
    L: CacheLoader<K, V>,
{
    pub fn new(capacity: usize, loader: L) -> Self {
        Self {
            capacity: capacity.max(1),
            loader,
            state: Mutex::new(CacheState {
                entries: HashMap::new(),
                order: VecDeque::new(),
                next_version: 0,
                stats: CacheStats::default(),
            }),
        }
    }

    pub fn with_default_capacity(loader: L) -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY, loader)
    }

    /// Return the cached value for `key`, loading and caching it on a miss.
    pub async fn get(&self, key: &K) -> Result<Option<V>, L::Error> {
        {
            let mut state = self.state.lock().await;
            if let Some(value) = state.touch(key) {
                state.stats.hits += 1;
                return Ok(Some(value));
            }
            state.stats.misses += 1;
        }

        let Some(value) = self.loader.load(key).await? else {
            return Ok(None);
        };

        let mut state = self.state.lock().await;
        state.insert(key.clone(), value.clone(), self.capacity);
        Ok(Some(value))
    }

    /// Look up `key` without loading or changing its recency.
    pub async fn peek(&self, key: &K) -> Option<V> {
        let state = self.state.lock().await;
        state.entries.get(key).map(|entry| entry.value.clone())
    }

    pub async fn invalidate(&self, key: &K) -> bool {
        self.state.lock().await.entries.remove(key).is_some()
    }

    pub async fn clear(&self) {
        let mut state = self.state.lock().await;
        state.entries.clear();
        state.order.clear();
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub async fn stats(&self) -> CacheStats {
        self.state.lock().await.stats
    }

    /// Cached keys from least to most recently used.
    pub async fn keys_by_recency(&self) -> Vec<K> {
        let state = self.state.lock().await;
        state
            .order
            .iter()
            .filter(|(key, version)| state.is_live(key, *version))
            .map(|(key, _)| key.clone())
            .collect()
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }
}

impl<K: Clone + Eq + Hash, V: Clone> CacheState<K, V> {
    fn is_live(&self, key: &K, version: u64) -> bool {
        self.entries
            .get(key)
            .is_some_and(|entry| entry.version == version)
    }

    fn bump_version(&mut self) -> u64 {
        self.next_version += 1;
        self.next_version
    }

    fn touch(&mut self, key: &K) -> Option<V> {
        let version = self.bump_version();
        let entry = self.entries.get_mut(key)?;
        entry.version = version;
        let value = entry.value.clone();
        self.order.push_back((key.clone(), version));
        self.compact();
        Some(value)
    }

    fn insert(&mut self, key: K, value: V, capacity: usize) {
        let version = self.bump_version();
        if let Some(entry) = self.entries.get_mut(&key) {
            entry.value = value;
            entry.version = version;
        } else {
            while self.entries.len() >= capacity {
                if !self.evict_lru() {
                    break;
                }
            }
            self.entries.insert(key.clone(), CacheEntry { value, version });
        }
        self.order.push_back((key, version));
        self.compact();
    }

    fn evict_lru(&mut self) -> bool {
        while let Some((key, version)) = self.order.pop_front() {
            if self.is_live(&key, version) {
                self.entries.remove(&key);
                self.stats.evictions += 1;
                return true;
            }
        }
        false
    }

    fn compact(&mut self) {
        if self.order.len() > 2 * self.entries.len() + 16 {
            let entries = &self.entries;
            self.order.retain(|(key, version)| {
                entries.get(key).is_some_and(|entry| entry.version == *version)
            });
        }
    }
}
