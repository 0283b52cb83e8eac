//! Key store backends.
//!
//! A key store is a plain string-keyed byte cache with an atomic multi-key
//! delete. Two implementations exist: an in-process Moka cache for single
//! instance deployments and tests, and Redis for shared deployments.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use deadpool_redis::{Pool, PoolConfig, Runtime};
use moka::Expiry;
use moka::future::Cache;
use moka::notification::RemovalCause;
use redis::AsyncCommands;
use tracing::{debug, info, warn};

use crate::cache::error::CacheError;
use crate::metrics::CacheMetrics;
use crate::settings::{CacheBackendKind, CacheSettings, RedisSettings};

/// String-keyed byte storage behind the read-through cache.
///
/// Every call is a potentially remote operation that may fail. Callers treat
/// failures as non-fatal.
#[async_trait]
pub trait KeyStore: Send + Sync {
    /// Returns the stored bytes, or `None` on a miss.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    /// Stores `value`. Without a TTL the entry lives until it is deleted.
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>)
    -> Result<(), CacheError>;

    /// Deletes every key and returns how many existed.
    ///
    /// Remote backends issue one atomic multi-key delete. An empty set is a no-op.
    async fn delete_many(&self, keys: &BTreeSet<String>) -> Result<usize, CacheError>;

    /// Checks the backend is reachable.
    async fn ping(&self) -> Result<(), CacheError> {
        Ok(())
    }

    /// Returns the backend name, used for logging and health reporting.
    fn backend_name(&self) -> &'static str;
}

#[derive(Clone)]
struct StoredValue {
    bytes: Arc<[u8]>,
    ttl: Option<Duration>,
}

/// Per-entry expiry: entries written with a TTL expire, the rest never do.
struct EntryExpiry;

impl Expiry<String, StoredValue> for EntryExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &StoredValue,
        _created_at: Instant,
    ) -> Option<Duration> {
        value.ttl
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &StoredValue,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        value.ttl
    }
}

/// In-process key store using Moka.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeSet;
/// use storefront_server::cache::{KeyStore, MemoryKeyStore};
///
/// # #[tokio::main]
/// # async fn main() {
/// let store = MemoryKeyStore::new(1_000);
/// store.set("categories", b"[]".to_vec(), None).await.unwrap();
/// assert_eq!(store.get("categories").await.unwrap(), Some(b"[]".to_vec()));
///
/// let keys = BTreeSet::from(["categories".to_string()]);
/// assert_eq!(store.delete_many(&keys).await.unwrap(), 1);
/// # }
/// ```
#[derive(Clone)]
pub struct MemoryKeyStore {
    inner: Cache<String, StoredValue>,
    metrics: CacheMetrics,
}

impl MemoryKeyStore {
    pub fn new(max_capacity: u64) -> Self {
        let metrics = CacheMetrics::new();

        let eviction_metrics = metrics.clone();
        let inner = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(EntryExpiry)
            .eviction_listener(move |_key, _value, cause| {
                let reason = match cause {
                    RemovalCause::Expired => "ttl",
                    RemovalCause::Size => "capacity",
                    RemovalCause::Explicit => "manual",
                    RemovalCause::Replaced => "replaced",
                };
                eviction_metrics.record_eviction(reason);
            })
            .build();

        Self { inner, metrics }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.contains_key(key)
    }

    /// Approximate number of live entries.
    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }

    /// Runs pending maintenance so expirations and counts are up to date.
    pub async fn sync(&self) {
        self.inner.run_pending_tasks().await;
        self.metrics.update_entry_count(self.inner.entry_count());
    }
}

#[async_trait]
impl KeyStore for MemoryKeyStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let start = Instant::now();
        let value = self.inner.get(key).await.map(|v| v.bytes.to_vec());
        self.metrics
            .record_operation_duration("get", start.elapsed());
        Ok(value)
    }

    async fn set(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl: Option<Duration>,
    ) -> Result<(), CacheError> {
        let stored = StoredValue {
            bytes: Arc::from(value),
            ttl,
        };
        self.inner.insert(key.to_string(), stored).await;
        Ok(())
    }

    /// Removes the keys one at a time. A concurrent reader may see some keys
    /// already gone and others still present until the call returns; each key
    /// still ends up absent, which is all invalidation relies on in one process.
    async fn delete_many(&self, keys: &BTreeSet<String>) -> Result<usize, CacheError> {
        let mut removed = 0;
        for key in keys {
            if self.inner.remove(key).await.is_some() {
                removed += 1;
            }
        }
        Ok(removed)
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

/// Redis-backed key store using a deadpool connection pool.
#[derive(Clone)]
pub struct RedisKeyStore {
    pool: Pool,
}

impl RedisKeyStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Builds the pool and verifies the server answers.
    pub async fn connect(settings: &RedisSettings) -> Result<Self, CacheError> {
        let timeout = Duration::from_millis(settings.timeout_ms);

        let mut pool_config = PoolConfig::new(settings.pool_size);
        pool_config.timeouts.wait = Some(timeout);
        pool_config.timeouts.create = Some(timeout);
        pool_config.timeouts.recycle = Some(timeout);

        let mut config = deadpool_redis::Config::from_url(&settings.url);
        config.pool = Some(pool_config);

        let pool = config
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| CacheError::Config(e.to_string()))?;

        let store = Self::new(pool);
        store.ping().await?;
        info!(url = %settings.url, "Connected to Redis");
        Ok(store)
    }
}

#[async_trait]
impl KeyStore for RedisKeyStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let mut conn = self.pool.get().await?;
        let value: Option<Vec<u8>> = conn.get(key).await?;
        Ok(value)
    }

    async fn set(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl: Option<Duration>,
    ) -> Result<(), CacheError> {
        let mut conn = self.pool.get().await?;
        match ttl {
            // SET EX only takes whole seconds
            Some(ttl) => {
                let () = conn.set_ex(key, value, ttl.as_secs().max(1)).await?;
            }
            None => {
                let () = conn.set(key, value).await?;
            }
        }
        Ok(())
    }

    async fn delete_many(&self, keys: &BTreeSet<String>) -> Result<usize, CacheError> {
        if keys.is_empty() {
            return Ok(0);
        }
        let mut conn = self.pool.get().await?;
        let keys: Vec<&str> = keys.iter().map(String::as_str).collect();
        let removed: usize = conn.del(keys).await?;
        Ok(removed)
    }

    async fn ping(&self) -> Result<(), CacheError> {
        let mut conn = self.pool.get().await?;
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }
}

/// Builds the configured key store.
///
/// When Redis is selected but unreachable the server still starts, falling
/// back to the in-process store.
pub async fn build_key_store(settings: &CacheSettings) -> Arc<dyn KeyStore> {
    match settings.backend {
        CacheBackendKind::Memory => {
            debug!(max_capacity = settings.max_capacity, "Using in-memory key store");
            Arc::new(MemoryKeyStore::new(settings.max_capacity))
        }
        CacheBackendKind::Redis => match RedisKeyStore::connect(&settings.redis).await {
            Ok(store) => Arc::new(store),
            Err(e) => {
                warn!(error = %e, "Redis unavailable, falling back to in-memory key store");
                Arc::new(MemoryKeyStore::new(settings.max_capacity))
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_set_get_and_overwrite() {
        let store = MemoryKeyStore::new(100);
        assert_eq!(store.get("k").await.unwrap(), None);

        store.set("k", b"one".to_vec(), None).await.unwrap();
        store.set("k", b"two".to_vec(), None).await.unwrap();

        assert_eq!(store.get("k").await.unwrap(), Some(b"two".to_vec()));
    }

    #[tokio::test]
    async fn test_delete_many_counts_existing_keys() {
        let store = MemoryKeyStore::new(100);
        store.set("a", b"1".to_vec(), None).await.unwrap();
        store.set("b", b"2".to_vec(), None).await.unwrap();

        let removed = store.delete_many(&keys(&["a", "b", "c"])).await.unwrap();

        assert_eq!(removed, 2);
        assert!(!store.contains_key("a"));
        assert!(!store.contains_key("b"));
    }

    #[tokio::test]
    async fn test_concurrent_deletes_remove_each_key_once() {
        let store = Arc::new(MemoryKeyStore::new(100));
        let all = keys(&["a", "b", "c", "d"]);
        for key in &all {
            store.set(key, b"1".to_vec(), None).await.unwrap();
        }

        let first = tokio::spawn({
            let (store, all) = (store.clone(), all.clone());
            async move { store.delete_many(&all).await.unwrap() }
        });
        let second = tokio::spawn({
            let (store, all) = (store.clone(), all.clone());
            async move { store.delete_many(&all).await.unwrap() }
        });

        let removed = first.await.unwrap() + second.await.unwrap();
        assert_eq!(removed, all.len());
        assert!(all.iter().all(|key| !store.contains_key(key)));
    }

    #[tokio::test]
    async fn test_delete_many_empty_is_noop() {
        let store = MemoryKeyStore::new(100);
        store.set("a", b"1".to_vec(), None).await.unwrap();

        assert_eq!(store.delete_many(&BTreeSet::new()).await.unwrap(), 0);
        assert!(store.contains_key("a"));
    }

    #[tokio::test]
    async fn test_ttl_entries_expire() {
        let store = MemoryKeyStore::new(100);
        store
            .set("short", b"x".to_vec(), Some(Duration::from_millis(50)))
            .await
            .unwrap();
        store.set("forever", b"y".to_vec(), None).await.unwrap();

        tokio::time::sleep(Duration::from_millis(120)).await;
        store.sync().await;

        assert_eq!(store.get("short").await.unwrap(), None);
        assert_eq!(store.get("forever").await.unwrap(), Some(b"y".to_vec()));
    }

    #[tokio::test]
    async fn test_build_memory_backend() {
        let store = build_key_store(&CacheSettings::default()).await;
        assert_eq!(store.backend_name(), "memory");
        assert!(store.ping().await.is_ok());
    }
}
