//! 请求缓存模块：按请求签名记忆异步获取结果，并支持显式失效。
//!
//! # Request Cache Module
//!
//! Memoizes the results of keyed asynchronous fetches for one session and
//! lets callers force freshness after a mutation.
//!
//! ## Key Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`RequestCache`] | Session cache: get/set, `fetch_with_cache`, invalidation, statistics |
//! | [`CacheConfig`] | Enable flag and optional entry bound / TTL |
//! | [`CacheBackend`] | Trait for storage backends |
//! | [`MemoryCache`] | In-memory backend, optionally LRU-bounded |
//! | [`NullCache`] | No-op backend for disabling caching |
//! | [`CacheKey`] | Key derived from an operation name and its parameters |
//!
//! ## Example
//!
//! ```rust
//! use txn_cache::cache::{CacheKey, RequestCache};
//! use serde_json::json;
//!
//! # tokio_test::block_on(async {
//! let cache = RequestCache::in_memory();
//! let key = CacheKey::for_request("paginatedTransactions", &json!({"page": 0})).unwrap();
//!
//! let first: Result<Vec<String>, std::io::Error> = cache
//!     .fetch_with_cache(&key, || async { Ok(vec!["tx-1".to_string()]) })
//!     .await;
//! assert_eq!(first.unwrap(), vec!["tx-1"]);
//!
//! // second lookup is served from the cache
//! assert_eq!(cache.get::<Vec<String>>(&key), Some(vec!["tx-1".to_string()]));
//!
//! cache.invalidate_all();
//! assert!(cache.get::<Vec<String>>(&key).is_none());
//! # });
//! ```
//!
//! ## Cache Keys
//!
//! Keys have the form `op` or `op:<canonical json params>`. Object fields are
//! sorted before serialization, so equal parameters always map to equal keys.
//! The `op` prefix doubles as the endpoint used by
//! [`RequestCache::invalidate_endpoint`].

mod backend;
mod key;
mod manager;

pub use backend::{CacheBackend, MemoryCache, NullCache};
pub use key::{CacheKey, KEY_SEPARATOR};
pub use manager::{CacheConfig, CacheStats, RequestCache};
