//! Resilience contract: a broken or slow store must degrade to "no cache",
//! never fail or stall the request path.

use async_trait::async_trait;
use bytes::Bytes;
use reply_cache::cache::store::{CacheStore, StoreError, StoreResult, StoredEntry};
use reply_cache::{CacheKey, ResponseCache, ResponseCacheConfig};
use serde_json::json;
use std::time::{Duration, Instant};

/// Store whose backend is unreachable: every operation fails.
struct UnreachableStore;

#[async_trait]
impl CacheStore for UnreachableStore {
    async fn get(&self, _: &CacheKey) -> StoreResult<Option<StoredEntry>> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn set(&self, _: &CacheKey, _: Bytes, _: Duration) -> StoreResult<()> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn invalidate(&self, _: &CacheKey) -> StoreResult<bool> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn clear(&self) -> StoreResult<()> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn len(&self) -> StoreResult<usize> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    fn name(&self) -> &'static str {
        "unreachable"
    }
}

/// Store that hangs far beyond any reasonable round-trip bound.
struct HangingStore;

#[async_trait]
impl CacheStore for HangingStore {
    async fn get(&self, _: &CacheKey) -> StoreResult<Option<StoredEntry>> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(None)
    }

    async fn set(&self, _: &CacheKey, _: Bytes, _: Duration) -> StoreResult<()> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(())
    }

    async fn invalidate(&self, _: &CacheKey) -> StoreResult<bool> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(false)
    }

    async fn clear(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn len(&self) -> StoreResult<usize> {
        Ok(0)
    }

    fn name(&self) -> &'static str {
        "hanging"
    }
}

#[tokio::test]
async fn unreachable_store_reads_as_miss() {
    let cache = ResponseCache::new(
        ResponseCacheConfig::default(),
        Box::new(UnreachableStore),
    );
    assert!(!cache.get_response("refund policy?", &[]).await.is_hit());
    assert!(cache.stats().errors > 0);
}

#[tokio::test]
async fn unreachable_store_write_is_swallowed() {
    let cache = ResponseCache::new(
        ResponseCacheConfig::default(),
        Box::new(UnreachableStore),
    );
    let payload = json!({ "answer": "30 days" });
    // The write must not error; the request path continues as if uncached.
    cache
        .set_response("refund policy?", &[], &payload, 1800)
        .await
        .unwrap();
    assert!(!cache.invalidate("refund policy?", &[]).await);
    assert!(cache.stats().errors >= 2);
}

#[tokio::test]
async fn hanging_store_is_bounded_by_op_timeout() {
    let cache = ResponseCache::new(
        ResponseCacheConfig::default().with_op_timeout(Duration::from_millis(50)),
        Box::new(HangingStore),
    );
    let payload = json!({ "answer": "30 days" });

    let started = Instant::now();
    assert!(!cache.get_response("refund policy?", &[]).await.is_hit());
    cache
        .set_response("refund policy?", &[], &payload, 1800)
        .await
        .unwrap();
    assert!(!cache.invalidate("refund policy?", &[]).await);

    // Three bounded round trips; nowhere near the store's 30s hang.
    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(cache.stats().errors, 3);
}
