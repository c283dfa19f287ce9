//! Cache backend implementations.

use super::key::CacheKey;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

#[derive(Clone)]
struct CacheEntry {
    data: Vec<u8>,
    created_at: Instant,
    ttl: Option<Duration>,
}

impl CacheEntry {
    fn new(data: Vec<u8>, ttl: Option<Duration>) -> Self {
        Self {
            data,
            created_at: Instant::now(),
            ttl,
        }
    }
    fn is_expired(&self) -> bool {
        self.ttl
            .map(|ttl| self.created_at.elapsed() > ttl)
            .unwrap_or(false)
    }
}

/// Storage behind a [`RequestCache`](super::RequestCache).
///
/// Operations are synchronous and infallible: a lookup that finds nothing is
/// a miss, never an error.
pub trait CacheBackend: Send + Sync {
    fn get(&self, key: &CacheKey) -> Option<Vec<u8>>;
    fn set(&self, key: &CacheKey, value: Vec<u8>, ttl: Option<Duration>);
    /// Returns whether an entry was removed.
    fn delete(&self, key: &CacheKey) -> bool;
    /// Removes every entry whose key matches; returns how many were removed.
    fn delete_where(&self, predicate: &dyn Fn(&CacheKey) -> bool) -> usize;
    fn clear(&self);
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    fn name(&self) -> &'static str;
}

/// In-memory backend, unbounded unless built with [`MemoryCache::bounded`].
pub struct MemoryCache {
    entries: Mutex<LruCache<CacheKey, CacheEntry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(LruCache::unbounded()),
        }
    }

    /// Evicts the least recently used entry once `max_entries` is reached.
    pub fn bounded(max_entries: NonZeroUsize) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(max_entries)),
        }
    }

    fn entries(&self) -> MutexGuard<'_, LruCache<CacheKey, CacheEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheBackend for MemoryCache {
    fn get(&self, key: &CacheKey) -> Option<Vec<u8>> {
        let mut entries = self.entries();
        match entries.get(key) {
            Some(entry) if !entry.is_expired() => return Some(entry.data.clone()),
            Some(_) => {}
            None => return None,
        }
        entries.pop(key);
        None
    }
    fn set(&self, key: &CacheKey, value: Vec<u8>, ttl: Option<Duration>) {
        self.entries().put(key.clone(), CacheEntry::new(value, ttl));
    }
    fn delete(&self, key: &CacheKey) -> bool {
        self.entries().pop(key).is_some()
    }
    fn delete_where(&self, predicate: &dyn Fn(&CacheKey) -> bool) -> usize {
        let mut entries = self.entries();
        let matching: Vec<CacheKey> = entries
            .iter()
            .filter(|(k, _)| predicate(k))
            .map(|(k, _)| k.clone())
            .collect();
        for key in &matching {
            entries.pop(key);
        }
        matching.len()
    }
    fn clear(&self) {
        self.entries().clear();
    }
    fn len(&self) -> usize {
        self.entries()
            .iter()
            .filter(|(_, e)| !e.is_expired())
            .count()
    }
    fn name(&self) -> &'static str {
        "memory"
    }
}

/// Backend that stores nothing; used when caching is disabled.
pub struct NullCache;
impl NullCache {
    pub fn new() -> Self {
        Self
    }
}
impl Default for NullCache {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheBackend for NullCache {
    fn get(&self, _: &CacheKey) -> Option<Vec<u8>> {
        None
    }
    fn set(&self, _: &CacheKey, _: Vec<u8>, _: Option<Duration>) {}
    fn delete(&self, _: &CacheKey) -> bool {
        false
    }
    fn delete_where(&self, _: &dyn Fn(&CacheKey) -> bool) -> usize {
        0
    }
    fn clear(&self) {}
    fn len(&self) -> usize {
        0
    }
    fn name(&self) -> &'static str {
        "null"
    }
}
