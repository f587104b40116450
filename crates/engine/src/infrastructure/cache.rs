//! TTL cache for catalog query results.
//!
//! Catalog rows only change when the SQLite files are replaced, so whole
//! result lists are cached for a fixed TTL and dropped wholesale on refresh.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

/// A thread-safe cache with time-to-live expiration.
///
/// Expired entries are ignored by reads and overwritten by the next load.
pub struct TtlCache<K, V> {
    entries: RwLock<HashMap<K, TtlEntry<V>>>,
    ttl: Duration,
}

struct TtlEntry<V> {
    value: V,
    inserted_at: Instant,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync,
    V: Clone + Send + Sync,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Insert a value, replacing any existing entry and resetting the TTL.
    pub async fn insert(&self, key: K, value: V) {
        let entry = TtlEntry {
            value,
            inserted_at: Instant::now(),
        };
        self.entries.write().await.insert(key, entry);
    }

    /// Insert a value with an explicit timestamp (tests only).
    #[cfg(test)]
    pub async fn insert_at(&self, key: K, value: V, inserted_at: Instant) {
        let entry = TtlEntry { value, inserted_at };
        self.entries.write().await.insert(key, entry);
    }

    /// Get a value if it exists and hasn't expired.
    pub async fn get(&self, key: &K) -> Option<V> {
        let guard = self.entries.read().await;
        guard
            .get(key)
            .filter(|entry| entry.inserted_at.elapsed() < self.ttl)
            .map(|entry| entry.value.clone())
    }

    /// Returns the live value for `key`, or runs `load` and stores its
    /// result. The flag reports whether the value came from the cache.
    /// A failed load stores nothing.
    pub async fn get_or_try_load<F, Fut, E>(&self, key: K, load: F) -> Result<(V, bool), E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(&key).await {
            return Ok((value, true));
        }
        let value = load().await?;
        self.insert(key, value.clone()).await;
        Ok((value, false))
    }

    /// Drops every entry; returns how many were held.
    pub async fn clear(&self) -> usize {
        let mut guard = self.entries.write().await;
        let count = guard.len();
        guard.clear();
        count
    }

    /// Entry count, including expired ones not yet overwritten.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn insert_and_get() {
        let cache: TtlCache<&'static str, i32> = TtlCache::new(Duration::from_secs(60));
        cache.insert("characters", 42).await;
        assert_eq!(cache.get(&"characters").await, Some(42));
        assert_eq!(cache.get(&"events").await, None);
    }

    #[tokio::test]
    async fn expired_entries_not_returned() {
        let ttl = Duration::from_millis(10);
        let cache: TtlCache<&'static str, i32> = TtlCache::new(ttl);
        let expired_at = Instant::now() - (ttl + Duration::from_millis(1));
        cache.insert_at("characters", 42, expired_at).await;

        assert_eq!(cache.get(&"characters").await, None);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn load_runs_once_until_cleared() {
        let cache: TtlCache<(), i32> = TtlCache::new(Duration::from_secs(60));

        let first = cache
            .get_or_try_load((), || async { Ok::<_, String>(7) })
            .await;
        assert_eq!(first, Ok((7, false)));

        let second = cache
            .get_or_try_load((), || async { Ok::<_, String>(8) })
            .await;
        assert_eq!(second, Ok((7, true)));

        assert_eq!(cache.clear().await, 1);
        let third = cache
            .get_or_try_load((), || async { Ok::<_, String>(9) })
            .await;
        assert_eq!(third, Ok((9, false)));
    }

    #[tokio::test]
    async fn failed_load_is_not_cached() {
        let cache: TtlCache<(), i32> = TtlCache::new(Duration::from_secs(60));
        let err = cache
            .get_or_try_load((), || async { Err::<i32, _>("db down".to_string()) })
            .await;
        assert_eq!(err, Err("db down".to_string()));
        assert!(cache.is_empty().await);
    }
}
