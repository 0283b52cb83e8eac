//! Read-through caching over the document store.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::cache::key_store::KeyStore;
use crate::cache::keys::CacheKey;
use crate::metrics::CacheMetrics;

/// How a miss writes the loaded value back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PopulateMode {
    /// Await the write before returning. Failures are logged.
    #[default]
    Inline,
    /// Spawn the write and return immediately.
    Detached,
}

/// Get-or-populate access to the key store.
///
/// Values are stored as JSON. Concurrent misses on the same key may each run
/// their loader; the last write wins.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use storefront_server::cache::{CacheKey, MemoryKeyStore, ReadThrough};
///
/// # #[tokio::main]
/// # async fn main() {
/// let cache = ReadThrough::new(Arc::new(MemoryKeyStore::new(100)));
///
/// let categories: Result<Vec<String>, std::convert::Infallible> = cache
///     .read_through(&CacheKey::Categories, || async { Ok(vec!["lighting".to_string()]) })
///     .await;
/// assert_eq!(categories.unwrap(), vec!["lighting"]);
/// # }
/// ```
#[derive(Clone)]
pub struct ReadThrough {
    store: Arc<dyn KeyStore>,
    mode: PopulateMode,
    metrics: CacheMetrics,
}

impl ReadThrough {
    pub fn new(store: Arc<dyn KeyStore>) -> Self {
        Self {
            store,
            mode: PopulateMode::default(),
            metrics: CacheMetrics::new(),
        }
    }

    pub fn with_mode(mut self, mode: PopulateMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn mode(&self) -> PopulateMode {
        self.mode
    }

    pub fn metrics(&self) -> &CacheMetrics {
        &self.metrics
    }

    /// Returns the cached value for `key`, or runs `loader` and caches its result.
    ///
    /// Loader errors propagate and nothing is cached. Key store errors never
    /// propagate: a failed read counts as a miss and a failed write is logged.
    pub async fn read_through<T, E, F, Fut>(&self, key: &CacheKey, loader: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.fetch(key.to_string(), None, loader).await
    }

    /// Like [`read_through`](Self::read_through), but the entry expires after `ttl`.
    pub async fn read_through_with_ttl<T, E, F, Fut>(
        &self,
        key: &CacheKey,
        ttl: Duration,
        loader: F,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.fetch(key.to_string(), Some(ttl), loader).await
    }

    async fn fetch<T, E, F, Fut>(
        &self,
        key: String,
        ttl: Option<Duration>,
        loader: F,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let start = Instant::now();

        if let Some(value) = self.lookup(&key).await {
            self.metrics.record_hit();
            self.metrics
                .record_operation_duration("read_through_hit", start.elapsed());
            return Ok(value);
        }
        self.metrics.record_miss();

        let value = loader().await?;

        match serde_json::to_vec(&value) {
            Ok(bytes) => self.populate(key, bytes, ttl).await,
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to serialize value for cache");
                self.metrics.record_populate_failure();
            }
        }

        self.metrics
            .record_operation_duration("read_through_miss", start.elapsed());
        Ok(value)
    }

    async fn lookup<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.store.get(key).await {
            Ok(Some(bytes)) => match serde_json::from_slice(&bytes) {
                Ok(value) => {
                    debug!(key = %key, "Cache hit");
                    Some(value)
                }
                Err(e) => {
                    warn!(key = %key, error = %e, "Discarding undecodable cache entry");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!(key = %key, error = %e, "Cache read failed, loading from store");
                self.metrics.record_backend_error("get");
                None
            }
        }
    }

    async fn populate(&self, key: String, bytes: Vec<u8>, ttl: Option<Duration>) {
        match self.mode {
            PopulateMode::Inline => {
                write_back(self.store.as_ref(), &self.metrics, &key, bytes, ttl).await;
            }
            PopulateMode::Detached => {
                let store = Arc::clone(&self.store);
                let metrics = self.metrics.clone();
                tokio::spawn(async move {
                    write_back(store.as_ref(), &metrics, &key, bytes, ttl).await;
                });
            }
        }
    }
}

async fn write_back(
    store: &dyn KeyStore,
    metrics: &CacheMetrics,
    key: &str,
    bytes: Vec<u8>,
    ttl: Option<Duration>,
) {
    if let Err(e) = store.set(key, bytes, ttl).await {
        warn!(key = %key, error = %e, "Failed to populate cache");
        metrics.record_backend_error("set");
        metrics.record_populate_failure();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::error::CacheError;
    use crate::cache::key_store::MemoryKeyStore;
    use async_trait::async_trait;
    use std::collections::BTreeSet;
    use std::convert::Infallible;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// A key store whose every call fails.
    struct BrokenStore;

    #[async_trait]
    impl KeyStore for BrokenStore {
        async fn get(&self, _: &str) -> Result<Option<Vec<u8>>, CacheError> {
            Err(CacheError::Pool("connection refused".into()))
        }

        async fn set(&self, _: &str, _: Vec<u8>, _: Option<Duration>) -> Result<(), CacheError> {
            Err(CacheError::Pool("connection refused".into()))
        }

        async fn delete_many(&self, _: &BTreeSet<String>) -> Result<usize, CacheError> {
            Err(CacheError::Pool("connection refused".into()))
        }

        fn backend_name(&self) -> &'static str {
            "broken"
        }
    }

    #[tokio::test]
    async fn test_miss_populates_then_hits() {
        let store = Arc::new(MemoryKeyStore::new(100));
        let cache = ReadThrough::new(store.clone());
        let calls = AtomicU32::new(0);

        for _ in 0..3 {
            let value: Result<u32, Infallible> = cache
                .read_through(&CacheKey::AllProducts, || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(7)
                })
                .await;
            assert_eq!(value.unwrap(), 7);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.metrics().misses(), 1);
        assert_eq!(cache.metrics().hits(), 2);
        assert_eq!(store.get("all-products").await.unwrap(), Some(b"7".to_vec()));
    }

    #[tokio::test]
    async fn test_loader_error_is_not_cached() {
        let store = Arc::new(MemoryKeyStore::new(100));
        let cache = ReadThrough::new(store.clone());

        let result: Result<u32, &str> = cache
            .read_through(&CacheKey::product("gone"), || async { Err("not found") })
            .await;

        assert_eq!(result, Err("not found"));
        assert!(!store.contains_key("product-gone"));
    }

    #[tokio::test]
    async fn test_failing_store_still_returns_loader_result() {
        let cache = ReadThrough::new(Arc::new(BrokenStore));

        let value: Result<String, Infallible> = cache
            .read_through(&CacheKey::product("p1"), || async { Ok("fresh".to_string()) })
            .await;

        assert_eq!(value.unwrap(), "fresh");
        // One failed read and one failed write-back
        assert_eq!(cache.metrics().backend_errors(), 2);
    }

    #[tokio::test]
    async fn test_undecodable_entry_is_a_miss() {
        let store = Arc::new(MemoryKeyStore::new(100));
        store
            .set("categories", b"not json".to_vec(), None)
            .await
            .unwrap();
        let cache = ReadThrough::new(store.clone());

        let value: Result<Vec<String>, Infallible> = cache
            .read_through(&CacheKey::Categories, || async { Ok(vec!["desk".to_string()]) })
            .await;

        assert_eq!(value.unwrap(), vec!["desk"]);
        assert_eq!(
            store.get("categories").await.unwrap(),
            Some(br#"["desk"]"#.to_vec())
        );
    }

    #[tokio::test]
    async fn test_ttl_entry_expires_and_reloads() {
        let store = Arc::new(MemoryKeyStore::new(100));
        let cache = ReadThrough::new(store.clone());
        let calls = AtomicU32::new(0);
        let key = CacheKey::ProductSearch(Default::default());

        for _ in 0..2 {
            let _: Result<u32, Infallible> = cache
                .read_through_with_ttl(&key, Duration::from_millis(50), || async {
                    Ok(calls.fetch_add(1, Ordering::SeqCst))
                })
                .await;
            tokio::time::sleep(Duration::from_millis(120)).await;
        }

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_detached_mode_populates_eventually() {
        let store = Arc::new(MemoryKeyStore::new(100));
        let cache = ReadThrough::new(store.clone()).with_mode(PopulateMode::Detached);

        let _: Result<u32, Infallible> = cache
            .read_through(&CacheKey::LatestProducts, || async { Ok(1) })
            .await;

        for _ in 0..50 {
            if store.contains_key("latest-products") {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("detached write never landed");
    }
}
