use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::future::Future;
use tokio::sync::RwLock;
use tracing::debug;

use crate::constants::DEFAULT_CACHE_TTL_MS;
use crate::types::RemoteMetadata;

/// A cached value and the moment it was stored
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub captured_at: DateTime<Utc>,
    pub data: V,
}

impl<V> CacheEntry<V> {
    fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.captured_at < ttl
    }
}

/// Process-wide TTL cache.
///
/// Expired entries are not evicted; they are treated as absent and overwritten
/// by the next computation for the same key. No lock is held while a producer
/// runs, so concurrent misses on one key may both compute (last write wins).
pub struct TtlCache<V> {
    entries: RwLock<HashMap<String, CacheEntry<V>>>,
    ttl: Duration,
}

/// Cache of scrape results keyed by `platform:url`
pub type ResponseCache = TtlCache<RemoteMetadata>;

impl<V: Clone> TtlCache<V> {
    pub fn new(ttl: std::time::Duration) -> Self {
        Self::with_ttl_ms(ttl.as_millis().min(i64::MAX as u128) as i64)
    }

    pub fn with_ttl_ms(ttl_ms: i64) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl: Duration::milliseconds(ttl_ms.max(0)),
        }
    }

    /// A cache that never serves a hit; every call runs its producer
    pub fn passthrough() -> Self {
        Self::with_ttl_ms(0)
    }

    /// Returns the fresh value for `key`, if any
    pub async fn get(&self, key: &str) -> Option<V> {
        let entries = self.entries.read().await;
        let entry = entries.get(key)?;
        if entry.is_fresh(Utc::now(), self.ttl) {
            Some(entry.data.clone())
        } else {
            None
        }
    }

    /// Stores `data` under `key`, replacing whatever was there
    pub async fn insert(&self, key: impl Into<String>, data: V) {
        let mut entries = self.entries.write().await;
        entries.insert(
            key.into(),
            CacheEntry {
                captured_at: Utc::now(),
                data,
            },
        );
    }

    /// Returns the cached value when fresh, otherwise awaits `producer` once,
    /// stores its output and returns it.
    pub async fn get_or_compute<F, Fut>(&self, key: &str, producer: F) -> V
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = V>,
    {
        if let Some(hit) = self.get(key).await {
            debug!(key, "Cache hit");
            return hit;
        }

        debug!(key, "Cache miss");
        let data = producer().await;
        self.insert(key, data.clone()).await;
        data
    }

    pub async fn evict(&self, key: &str) -> bool {
        self.entries.write().await.remove(key).is_some()
    }

    pub async fn clear(&self) {
        let mut entries = self.entries.write().await;
        let dropped = entries.len();
        entries.clear();
        debug!(dropped, "Cache cleared");
    }

    /// Number of stored entries, stale ones included
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl<V: Clone> Default for TtlCache<V> {
    fn default() -> Self {
        Self::with_ttl_ms(DEFAULT_CACHE_TTL_MS as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_second_call_within_ttl_is_served_from_cache() {
        let cache: TtlCache<String> = TtlCache::default();
        let calls = AtomicUsize::new(0);

        let first = cache
            .get_or_compute("k", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                "value".to_string()
            })
            .await;
        let second = cache
            .get_or_compute("k", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                "other".to_string()
            })
            .await;

        assert_eq!(first, "value");
        assert_eq!(second, first);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_expired_error_result_is_recomputed() {
        let cache: TtlCache<Result<u32, String>> = TtlCache::with_ttl_ms(30);
        let calls = AtomicUsize::new(0);

        let first = cache
            .get_or_compute("k", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err("boom".to_string())
            })
            .await;
        assert!(first.is_err());

        // still fresh: the failure is served without calling the producer
        let cached = cache.get_or_compute("k", || async { Ok(1) }).await;
        assert!(cached.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        tokio::time::sleep(std::time::Duration::from_millis(60)).await;

        let refreshed = cache
            .get_or_compute("k", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(7)
            })
            .await;
        assert_eq!(refreshed, Ok(7));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_passthrough_always_computes() {
        let cache: TtlCache<u32> = TtlCache::passthrough();
        let calls = AtomicUsize::new(0);
        for _ in 0..3 {
            cache
                .get_or_compute("k", || async { calls.fetch_add(1, Ordering::SeqCst) as u32 })
                .await;
        }
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_clear_and_evict() {
        let cache: TtlCache<u32> = TtlCache::default();
        cache.insert("a", 1).await;
        cache.insert("b", 2).await;

        assert!(cache.evict("a").await);
        assert!(!cache.evict("a").await);
        assert_eq!(cache.get("b").await, Some(2));

        cache.clear().await;
        assert!(cache.is_empty().await);
        assert_eq!(cache.get("b").await, None);
    }
}
