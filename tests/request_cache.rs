//! Behavioural tests for RequestCache through its public API.

use futures::future::join_all;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};
use txn_cache::cache::{CacheConfig, CacheKey, RequestCache};

fn key(op: &str, params: serde_json::Value) -> CacheKey {
    CacheKey::for_request(op, &params).unwrap()
}

#[tokio::test]
async fn test_invalidate_then_refetch_calls_producer_again() {
    let cache = RequestCache::in_memory();
    let calls = AtomicUsize::new(0);
    let k = key("e", serde_json::json!(1));

    let producer = || async {
        let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok::<_, String>(format!("value-{n}"))
    };

    assert_eq!(assert_ok!(cache.fetch_with_cache(&k, producer).await), "value-1");
    assert_eq!(assert_ok!(cache.fetch_with_cache(&k, producer).await), "value-1");
    assert!(cache.invalidate(&k));
    assert_eq!(assert_ok!(cache.fetch_with_cache(&k, producer).await), "value-2");
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_sequential_page_fetches_are_memoized() {
    let cache = RequestCache::in_memory();
    let calls = AtomicUsize::new(0);
    let k = key("page", serde_json::json!({"page": 1}));

    for _ in 0..3 {
        let v: Vec<u32> = assert_ok!(
            cache
                .fetch_with_cache(&k, || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, String>(vec![5, 6, 7])
                })
                .await
        );
        assert_eq!(v, vec![5, 6, 7]);
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_failure_is_not_cached_and_error_passes_through() {
    let cache = RequestCache::in_memory();
    let k = CacheKey::for_operation("flaky").unwrap();

    let err = assert_err!(
        cache
            .fetch_with_cache(&k, || async { Err::<u32, _>(std::io::Error::other("down")) })
            .await
    );
    assert_eq!(err.to_string(), "down");
    assert!(cache.get::<u32>(&k).is_none());

    let v = assert_ok!(cache.fetch_with_cache(&k, || async { Ok::<_, String>(7u32) }).await);
    assert_eq!(v, 7);
}

#[tokio::test]
async fn test_concurrent_misses_are_not_deduplicated() {
    let cache = Arc::new(RequestCache::in_memory());
    let calls = Arc::new(AtomicUsize::new(0));
    let k = CacheKey::for_operation("employees").unwrap();

    let fetches = (0..4).map(|_| {
        let cache = cache.clone();
        let calls = calls.clone();
        let k = k.clone();
        async move {
            cache
                .fetch_with_cache(&k, || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    Ok::<_, String>("same".to_string())
                })
                .await
        }
    });

    for result in join_all(fetches).await {
        assert_eq!(assert_ok!(result), "same");
    }
    assert_eq!(calls.load(Ordering::SeqCst), 4);
    assert_eq!(cache.len(), 1);
}

#[tokio::test]
async fn test_invalidation_during_fetch_keeps_late_result() {
    let cache = Arc::new(RequestCache::in_memory());
    let k = CacheKey::for_operation("employees").unwrap();

    let pending = {
        let cache = cache.clone();
        let k = k.clone();
        tokio::spawn(async move {
            cache
                .fetch_with_cache(&k, || async {
                    tokio::time::sleep(Duration::from_millis(30)).await;
                    Ok::<_, String>(1u32)
                })
                .await
        })
    };
    tokio::time::sleep(Duration::from_millis(5)).await;
    cache.invalidate_all();

    assert_eq!(assert_ok!(pending.await.unwrap()), 1);
    assert_eq!(cache.get::<u32>(&k), Some(1));
}

#[tokio::test]
async fn test_endpoint_invalidation_scopes() {
    let cache = RequestCache::in_memory();
    let page0 = key("paginatedTransactions", serde_json::json!({"page": 0}));
    let page1 = key("paginatedTransactions", serde_json::json!({"page": 1}));
    let employees = CacheKey::for_operation("employees").unwrap();

    cache.set(&page0, &"p0");
    cache.set(&page1, &"p1");
    cache.set(&employees, &"e");

    assert_eq!(cache.invalidate_endpoint("paginatedTransactions"), 2);
    assert!(cache.get::<String>(&page0).is_none());
    assert_eq!(cache.get::<String>(&employees).as_deref(), Some("e"));

    cache.invalidate_all();
    assert!(cache.is_empty());
    // idempotent
    cache.invalidate_all();
    assert!(!cache.invalidate(&employees));
}

#[tokio::test]
async fn test_bounded_and_expiring_cache() {
    let cache = RequestCache::from_config(
        CacheConfig::new()
            .with_max_entries(2)
            .with_ttl(Duration::from_millis(30)),
    )
    .unwrap();
    let a = CacheKey::for_operation("a").unwrap();
    let b = CacheKey::for_operation("b").unwrap();
    let c = CacheKey::for_operation("c").unwrap();

    cache.set(&a, &1);
    cache.set(&b, &2);
    cache.set(&c, &3);
    assert_eq!(cache.len(), 2);
    assert!(cache.get::<i32>(&a).is_none());

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(cache.get::<i32>(&c).is_none());
}

#[tokio::test]
async fn test_disabled_cache_always_calls_producer() {
    let cache = RequestCache::from_config(CacheConfig::new().with_enabled(false)).unwrap();
    let calls = AtomicUsize::new(0);
    let k = CacheKey::for_operation("employees").unwrap();

    for _ in 0..2 {
        assert_ok!(
            cache
                .fetch_with_cache(&k, || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, String>(())
                })
                .await
        );
    }
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(cache.backend_name(), "null");
}
