//! Query cache coordinator

use super::key::{QueryFilter, QueryKey};
use super::state::{QueryOptions, QueryResult};
use crate::config::QueryConfig;
use crate::error::{ApiError, ApiErrorKind};
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, trace};

type SharedFetch = Shared<BoxFuture<'static, Result<Value, ApiError>>>;

struct CacheEntry {
    value: Value,
    fetched_at: Instant,
    freshness: Duration,
}

impl CacheEntry {
    fn is_fresh(&self) -> bool {
        self.fetched_at.elapsed() < self.freshness
    }
}

struct InFlight {
    generation: u64,
    future: SharedFetch,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<QueryKey, CacheEntry>,
    in_flight: HashMap<QueryKey, InFlight>,
}

struct QueryInner {
    cache: Mutex<CacheState>,
    next_generation: AtomicU64,
    config: QueryConfig,
}

/// Caches read results and coordinates fetches per key.
///
/// Cloning is cheap; clones share the same cache.
///
/// Every fetch gets a generation number when it starts. Only the fetch that
/// is still registered as the key's in-flight fetch when it settles may
/// write the cache, so a slow, superseded fetch never overwrites a newer
/// result and a fetch that raced an invalidation never resurrects the entry.
#[derive(Clone)]
pub struct QueryClient {
    inner: Arc<QueryInner>,
}

impl QueryClient {
    pub fn new(config: QueryConfig) -> Self {
        Self {
            inner: Arc::new(QueryInner {
                cache: Mutex::new(CacheState::default()),
                next_generation: AtomicU64::new(0),
                config,
            }),
        }
    }

    /// Freshness used when a read does not specify one
    pub fn default_freshness(&self) -> Duration {
        self.inner.config.default_freshness
    }

    /// Serve `key` from cache while fresh, otherwise fetch it.
    ///
    /// Concurrent calls for the same key share one fetch. `fetch` only
    /// builds the future; it must not touch this client synchronously.
    pub async fn fetch_query<F, Fut>(
        &self,
        key: &QueryKey,
        freshness: Duration,
        fetch: F,
    ) -> Result<Value, ApiError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, ApiError>> + Send + 'static,
    {
        let (generation, future) = {
            let mut cache = self.inner.cache.lock();
            if let Some(entry) = cache.entries.get(key) {
                if entry.is_fresh() {
                    trace!(key = %key, "cache hit");
                    return Ok(entry.value.clone());
                }
            }
            match cache.in_flight.get(key) {
                Some(in_flight) => {
                    debug!(key = %key, "joining in-flight fetch");
                    (in_flight.generation, in_flight.future.clone())
                }
                None => self.start_fetch(&mut cache, key, fetch),
            }
        };

        self.settle(key, generation, freshness, future).await
    }

    /// Fetch `key` now, superseding any fetch already in flight
    pub async fn refetch<F, Fut>(
        &self,
        key: &QueryKey,
        freshness: Duration,
        fetch: F,
    ) -> Result<Value, ApiError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, ApiError>> + Send + 'static,
    {
        let (generation, future) = {
            let mut cache = self.inner.cache.lock();
            self.start_fetch(&mut cache, key, fetch)
        };
        self.settle(key, generation, freshness, future).await
    }

    /// View-facing read.
    ///
    /// Disabled reads return [`QueryResult::disabled`] without fetching. A
    /// failed refresh reports the error together with the last good value.
    pub async fn query<T, F, Fut>(&self, options: &QueryOptions, fetch: F) -> QueryResult<T>
    where
        T: DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, ApiError>> + Send + 'static,
    {
        if !options.enabled {
            trace!(key = %options.key, "query disabled");
            return QueryResult::disabled();
        }

        let freshness = options.freshness.unwrap_or(self.default_freshness());
        match self
            .fetch_query(&options.key, freshness, fetch)
            .await
            .and_then(decode::<T>)
        {
            Ok(data) => QueryResult::success(data),
            Err(error) => {
                let stale = self
                    .get_query_data(&options.key)
                    .and_then(|value| decode::<T>(value).ok());
                QueryResult::failure(error, stale)
            }
        }
    }

    /// Current state of a read without fetching
    pub fn peek(&self, options: &QueryOptions) -> QueryResult<Value> {
        if !options.enabled {
            return QueryResult::disabled();
        }
        let cache = self.inner.cache.lock();
        let cached = cache.entries.get(&options.key).map(|e| e.value.clone());
        if cache.in_flight.contains_key(&options.key) {
            QueryResult::loading(cached)
        } else {
            match cached {
                Some(value) => QueryResult::success(value),
                None => QueryResult::idle(),
            }
        }
    }

    /// Cached value for a key, fresh or not
    pub fn get_query_data(&self, key: &QueryKey) -> Option<Value> {
        self.inner
            .cache
            .lock()
            .entries
            .get(key)
            .map(|entry| entry.value.clone())
    }

    /// Whether a fetch for the key is in flight
    pub fn is_fetching(&self, key: &QueryKey) -> bool {
        self.inner.cache.lock().in_flight.contains_key(key)
    }

    /// Remove every entry (and in-flight fetch) the filter matches.
    ///
    /// Returns the number of cached values removed.
    pub fn invalidate(&self, filter: &QueryFilter) -> usize {
        let mut cache = self.inner.cache.lock();
        let before = cache.entries.len();
        cache.entries.retain(|key, _| !filter.matches(key));
        cache.in_flight.retain(|key, _| !filter.matches(key));
        let removed = before - cache.entries.len();
        debug!(filter = %filter, removed, "invalidated queries");
        removed
    }

    /// Drop everything
    pub fn clear(&self) {
        let mut cache = self.inner.cache.lock();
        cache.entries.clear();
        cache.in_flight.clear();
    }

    /// Number of cached values
    pub fn len(&self) -> usize {
        self.inner.cache.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn start_fetch<F, Fut>(
        &self,
        cache: &mut CacheState,
        key: &QueryKey,
        fetch: F,
    ) -> (u64, SharedFetch)
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, ApiError>> + Send + 'static,
    {
        let generation = self.inner.next_generation.fetch_add(1, Ordering::Relaxed) + 1;
        let future = fetch().boxed().shared();
        cache.in_flight.insert(
            key.clone(),
            InFlight {
                generation,
                future: future.clone(),
            },
        );
        debug!(key = %key, generation, "starting fetch");
        (generation, future)
    }

    async fn settle(
        &self,
        key: &QueryKey,
        generation: u64,
        freshness: Duration,
        future: SharedFetch,
    ) -> Result<Value, ApiError> {
        let result = future.await;

        let mut cache = self.inner.cache.lock();
        let current = cache
            .in_flight
            .get(key)
            .is_some_and(|in_flight| in_flight.generation == generation);
        if !current {
            trace!(key = %key, generation, "result not adopted");
            return result;
        }

        cache.in_flight.remove(key);
        match &result {
            Ok(value) => {
                cache.entries.insert(
                    key.clone(),
                    CacheEntry {
                        value: value.clone(),
                        fetched_at: Instant::now(),
                        freshness,
                    },
                );
            }
            Err(error) => {
                debug!(key = %key, kind = %error.kind, "fetch failed, keeping last known value");
            }
        }
        result
    }
}

impl Default for QueryClient {
    fn default() -> Self {
        Self::new(QueryConfig::default())
    }
}

impl std::fmt::Debug for QueryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cache = self.inner.cache.lock();
        f.debug_struct("QueryClient")
            .field("entries", &cache.entries.len())
            .field("in_flight", &cache.in_flight.len())
            .finish()
    }
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|e| {
        ApiError::new(ApiErrorKind::Unknown).with_message(format!("Unexpected response shape: {}", e))
    })
}
