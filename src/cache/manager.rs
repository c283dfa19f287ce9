//! Request cache.

use super::backend::{CacheBackend, MemoryCache, NullCache};
use super::key::CacheKey;
use crate::{Error, ErrorContext, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::future::Future;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub enabled: bool,
    /// Upper bound on stored entries; `None` keeps everything until invalidated.
    pub max_entries: Option<usize>,
    /// Entry lifetime; `None` keeps entries until invalidated.
    pub ttl: Option<Duration>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_entries: None,
            ttl: None,
        }
    }
}

impl CacheConfig {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
    pub fn with_max_entries(mut self, max: usize) -> Self {
        self.max_entries = Some(max);
        self
    }
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_entries == Some(0) {
            return Err(Error::configuration_with_context(
                "max_entries must be at least 1",
                ErrorContext::new()
                    .with_field_path("cache.max_entries")
                    .with_source("cache_config"),
            ));
        }
        if self.ttl == Some(Duration::ZERO) {
            return Err(Error::configuration_with_context(
                "ttl must be greater than zero",
                ErrorContext::new()
                    .with_field_path("cache.ttl")
                    .with_source("cache_config"),
            ));
        }
        Ok(())
    }

    /// Backend matching this configuration.
    pub fn build_backend(&self) -> Result<Box<dyn CacheBackend>> {
        self.validate()?;
        if !self.enabled {
            return Ok(Box::new(NullCache::new()));
        }
        Ok(match self.max_entries.and_then(NonZeroUsize::new) {
            Some(max) => Box::new(MemoryCache::bounded(max)),
            None => Box::new(MemoryCache::new()),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub sets: u64,
    /// Entries removed by any invalidation.
    pub invalidations: u64,
    /// Values that could not be serialized or deserialized.
    pub errors: u64,
}

impl CacheStats {
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[derive(Default)]
struct AtomicStats {
    hits: AtomicU64,
    misses: AtomicU64,
    sets: AtomicU64,
    invalidations: AtomicU64,
    errors: AtomicU64,
}

impl AtomicStats {
    fn to_stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            sets: self.sets.load(Ordering::Relaxed),
            invalidations: self.invalidations.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
        }
    }
}

/// Memoizes keyed asynchronous fetches for one session.
///
/// Each session constructs its own instance; nothing is shared through
/// globals. Values are stored as JSON so one cache can hold results of any
/// serializable type.
///
/// Concurrent misses on the same key are not coalesced: each miss runs its
/// own producer and the last successful write wins. Invalidation does not
/// cancel a producer that is already running, so its result is still stored
/// when it completes.
pub struct RequestCache {
    config: CacheConfig,
    backend: Box<dyn CacheBackend>,
    stats: AtomicStats,
}

impl RequestCache {
    pub fn new(config: CacheConfig, backend: Box<dyn CacheBackend>) -> Self {
        Self {
            config,
            backend,
            stats: AtomicStats::default(),
        }
    }

    pub fn from_config(config: CacheConfig) -> Result<Self> {
        let backend = config.build_backend()?;
        Ok(Self::new(config, backend))
    }

    /// Unbounded in-memory cache with no TTL.
    pub fn in_memory() -> Self {
        Self::new(CacheConfig::default(), Box::new(MemoryCache::new()))
    }

    /// Cached value for `key`, or `None` on a miss.
    pub fn get<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        if !self.config.enabled {
            self.stats.misses.fetch_add(1, Ordering::Relaxed);
            return None;
        }
        let Some(data) = self.backend.get(key) else {
            self.stats.misses.fetch_add(1, Ordering::Relaxed);
            debug!(key = %key, "cache miss");
            return None;
        };
        match serde_json::from_slice(&data) {
            Ok(value) => {
                self.stats.hits.fetch_add(1, Ordering::Relaxed);
                debug!(key = %key, "cache hit");
                Some(value)
            }
            Err(e) => {
                self.stats.errors.fetch_add(1, Ordering::Relaxed);
                self.stats.misses.fetch_add(1, Ordering::Relaxed);
                warn!(key = %key, error = %e, "cached value does not match requested type");
                None
            }
        }
    }

    /// Stores `value` under `key`, replacing any previous entry.
    pub fn set<T: Serialize + ?Sized>(&self, key: &CacheKey, value: &T) {
        if !self.config.enabled {
            return;
        }
        match serde_json::to_vec(value) {
            Ok(data) => {
                self.backend.set(key, data, self.config.ttl);
                self.stats.sets.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                self.stats.errors.fetch_add(1, Ordering::Relaxed);
                warn!(key = %key, error = %e, "value not cached: serialization failed");
            }
        }
    }

    /// Returns the cached value for `key`, or runs `producer` and caches its
    /// successful result.
    ///
    /// A failing producer leaves the cache untouched and its error is returned
    /// as is.
    pub async fn fetch_with_cache<T, E, F, Fut>(
        &self,
        key: &CacheKey,
        producer: F,
    ) -> std::result::Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
    {
        if let Some(cached) = self.get(key) {
            return Ok(cached);
        }
        let value = producer().await?;
        self.set(key, &value);
        Ok(value)
    }

    /// Removes the entry for `key`. Returns whether one was present.
    pub fn invalidate(&self, key: &CacheKey) -> bool {
        let removed = self.backend.delete(key);
        if removed {
            self.stats.invalidations.fetch_add(1, Ordering::Relaxed);
            debug!(key = %key, "cache entry invalidated");
        }
        removed
    }

    /// Removes every entry whose key belongs to `endpoint`.
    pub fn invalidate_endpoint(&self, endpoint: &str) -> usize {
        let removed = self.backend.delete_where(&|k: &CacheKey| k.belongs_to(endpoint));
        self.stats
            .invalidations
            .fetch_add(removed as u64, Ordering::Relaxed);
        debug!(endpoint, removed, "endpoint cache entries invalidated");
        removed
    }

    /// Removes every entry.
    pub fn invalidate_all(&self) {
        let removed = self.backend.len();
        self.backend.clear();
        self.stats
            .invalidations
            .fetch_add(removed as u64, Ordering::Relaxed);
        info!(removed, "request cache cleared");
    }

    pub fn len(&self) -> usize {
        self.backend.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backend.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.to_stats()
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }
}

impl Default for RequestCache {
    fn default() -> Self {
        Self::in_memory()
    }
}
