//! Stale-time query cache on top of Moka
//!
//! Values are stored as JSON so one cache can hold every query type. An
//! entry is fresh for `stale_time` after it was stored; a stale entry stays
//! readable through [`QueryCache::get_query_data`] until it is refetched or
//! evicted.

use std::{
    future::Future,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::{Duration, Instant},
};

use moka::future::Cache;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::{debug, instrument};

use super::QueryKey;
use crate::ApplicationError;

/// Configuration for the query cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryCacheConfig {
    /// Seconds a fetched value is served without refetching
    #[serde(default = "default_stale_time_secs")]
    pub stale_time_secs: u64,

    /// Maximum number of cached queries
    #[serde(default = "default_max_entries")]
    pub max_entries: u64,
}

const fn default_stale_time_secs() -> u64 {
    30
}

const fn default_max_entries() -> u64 {
    1000
}

impl Default for QueryCacheConfig {
    fn default() -> Self {
        Self {
            stale_time_secs: default_stale_time_secs(),
            max_entries: default_max_entries(),
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: u64,
}

#[derive(Debug, Clone)]
struct CachedEntry {
    value: Arc<Value>,
    stored_at: Instant,
}

impl CachedEntry {
    fn new(value: Value) -> Self {
        Self {
            value: Arc::new(value),
            stored_at: Instant::now(),
        }
    }
}

/// Saved state of every entry under a prefix
#[derive(Debug, Clone)]
pub struct QuerySnapshot {
    prefix: QueryKey,
    entries: Vec<(QueryKey, CachedEntry)>,
}

impl QuerySnapshot {
    #[must_use]
    pub const fn prefix(&self) -> &QueryKey {
        &self.prefix
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Query cache keyed by [`QueryKey`]
pub struct QueryCache {
    entries: Cache<QueryKey, CachedEntry>,
    stale_time: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl std::fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCache")
            .field("entries", &self.entries.entry_count())
            .field("stale_time", &self.stale_time)
            .field("hits", &self.hits.load(Ordering::Relaxed))
            .field("misses", &self.misses.load(Ordering::Relaxed))
            .finish()
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(QueryCacheConfig::default())
    }
}

impl QueryCache {
    #[must_use]
    pub fn new(config: QueryCacheConfig) -> Self {
        Self {
            entries: Cache::builder().max_capacity(config.max_entries).build(),
            stale_time: Duration::from_secs(config.stale_time_secs),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub const fn stale_time(&self) -> Duration {
        self.stale_time
    }

    /// Serve `key` from the cache while fresh, otherwise run `fetcher`
    ///
    /// A failed fetch leaves the cache untouched.
    #[instrument(skip(self, fetcher), fields(key = %key), level = "debug")]
    pub async fn fetch<T, F, Fut>(&self, key: QueryKey, fetcher: F) -> Result<T, ApplicationError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ApplicationError>>,
    {
        let cached = self
            .entries
            .get(&key)
            .await
            .filter(|entry| entry.stored_at.elapsed() < self.stale_time)
            .and_then(|entry| decode(&entry.value));
        if let Some(value) = cached {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!("Query cache hit");
            return Ok(value);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        debug!("Query cache miss");

        let value = fetcher().await?;
        self.entries
            .insert(key, CachedEntry::new(encode(&value)?))
            .await;
        Ok(value)
    }

    /// Cached value regardless of age
    pub async fn get_query_data<T: DeserializeOwned>(&self, key: &QueryKey) -> Option<T> {
        let entry = self.entries.get(key).await?;
        decode(&entry.value)
    }

    /// Store a value as if it had just been fetched
    pub async fn set_query_data<T: Serialize + ?Sized>(
        &self,
        key: QueryKey,
        value: &T,
    ) -> Result<(), ApplicationError> {
        self.entries
            .insert(key, CachedEntry::new(encode(value)?))
            .await;
        Ok(())
    }

    /// Rewrite every cached value under `prefix` that decodes as `T`
    ///
    /// Entries of another shape are left alone. Returns how many were
    /// rewritten.
    pub async fn update_matching<T, F>(
        &self,
        prefix: &QueryKey,
        mut update: F,
    ) -> Result<usize, ApplicationError>
    where
        T: Serialize + DeserializeOwned,
        F: FnMut(&QueryKey, &mut T),
    {
        let mut updated = 0;
        for (key, entry) in self.matching(prefix) {
            let Some(mut value) = decode::<T>(&entry.value) else {
                continue;
            };
            update(&key, &mut value);
            self.entries
                .insert(key, CachedEntry::new(encode(&value)?))
                .await;
            updated += 1;
        }
        Ok(updated)
    }

    pub async fn invalidate(&self, key: &QueryKey) {
        self.entries.invalidate(key).await;
        debug!(key = %key, "Query invalidated");
    }

    /// Drop every entry under `prefix`
    pub async fn invalidate_prefix(&self, prefix: &QueryKey) -> u64 {
        let mut count = 0u64;
        for (key, _) in self.matching(prefix) {
            self.entries.invalidate(&key).await;
            count += 1;
        }
        debug!(prefix = %prefix, count, "Query prefix invalidated");
        count
    }

    /// Save every entry under `prefix` so it can be put back with [`Self::restore`]
    pub fn snapshot(&self, prefix: &QueryKey) -> QuerySnapshot {
        QuerySnapshot {
            prefix: prefix.clone(),
            entries: self.matching(prefix),
        }
    }

    /// Put the prefix back exactly as it was when the snapshot was taken
    pub async fn restore(&self, snapshot: QuerySnapshot) {
        self.invalidate_prefix(&snapshot.prefix).await;
        for (key, entry) in snapshot.entries {
            self.entries.insert(key, entry).await;
        }
        debug!(prefix = %snapshot.prefix, "Query prefix restored");
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.entries.entry_count(),
        }
    }

    fn matching(&self, prefix: &QueryKey) -> Vec<(QueryKey, CachedEntry)> {
        self.entries
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, entry)| ((*key).clone(), entry))
            .collect()
    }
}

fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Value, ApplicationError> {
    serde_json::to_value(value)
        .map_err(|e| ApplicationError::Internal(format!("Cache serialization error: {e}")))
}

fn decode<T: DeserializeOwned>(value: &Value) -> Option<T> {
    T::deserialize(value).ok()
}
