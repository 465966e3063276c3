use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tabula_config::shared::CacheTtl;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, trace};

use crate::statement::Statement;
use crate::types::Row;

/// Fingerprint of a read: the table it targets, the statement shape and its parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    table: String,
    shape: String,
    params: String,
}

impl CacheKey {
    pub fn new(table: impl Into<String>, statement: &Statement) -> Self {
        Self {
            table: table.into(),
            shape: statement.sql.clone(),
            params: format!("{:?}", statement.params),
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }
}

/// A decoded read result as stored in the cache.
#[derive(Debug, Clone, PartialEq)]
pub enum CachedResult {
    /// Result of a lookup by primary key.
    One(Option<Row>),
    /// Result of a lookup by a non-primary column.
    Many(Vec<Row>),
}

#[derive(Debug)]
struct CacheEntry {
    value: CachedResult,
    expires_at: Instant,
}

/// Snapshot of a table's invalidation state, taken before a read is executed.
///
/// A read result is only stored if no invalidation happened since its snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Generation {
    epoch: u64,
    table: u64,
}

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<CacheKey, CacheEntry>,
    /// Bumped by [`QueryCache::clear`], which invalidates every table at once.
    epoch: u64,
    generations: HashMap<String, u64>,
    /// When [`QueryCache::store`] next sweeps expired entries.
    next_purge: Option<Instant>,
}

impl Inner {
    fn purge(&mut self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| now < entry.expires_at);

        before - self.entries.len()
    }

    fn generation(&self, table: &str) -> Generation {
        Generation {
            epoch: self.epoch,
            table: self.generations.get(table).copied().unwrap_or(0),
        }
    }
}

/// Read-result cache shared by every table of a database.
///
/// Entries expire after the configured TTL and every write to a table removes the entries of
/// that table. With [`CacheTtl::Disabled`] all operations are no-ops and lookups always miss.
#[derive(Debug, Clone)]
pub struct QueryCache {
    ttl: Option<Duration>,
    inner: Arc<Mutex<Inner>>,
}

impl QueryCache {
    pub fn new(ttl: CacheTtl) -> Self {
        let ttl = match ttl {
            CacheTtl::Disabled => None,
            CacheTtl::Expiring(ttl) => Some(ttl),
        };

        Self {
            ttl,
            inner: Arc::new(Mutex::new(Inner::default())),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.ttl.is_some()
    }

    /// Returns the cached result for `key` if it has not expired yet.
    ///
    /// An expired entry is removed by the lookup that finds it.
    pub async fn lookup(&self, key: &CacheKey) -> Option<CachedResult> {
        if !self.is_enabled() {
            return None;
        }

        let mut inner = self.inner.lock().await;
        let now = Instant::now();

        let Some(entry) = inner.entries.get(key) else {
            trace!(table = key.table(), "cache miss");
            return None;
        };

        if now < entry.expires_at {
            debug!(table = key.table(), "cache hit");
            return Some(entry.value.clone());
        }

        inner.entries.remove(key);
        debug!(table = key.table(), "cache entry expired");

        None
    }

    /// Returns the current invalidation state of `table`, to be passed to
    /// [`QueryCache::store`] once the read completes.
    pub async fn generation(&self, table: &str) -> Generation {
        let inner = self.inner.lock().await;
        inner.generation(table)
    }

    /// Stores a read result unless `table` was invalidated after `generation` was taken.
    ///
    /// At most once per TTL interval, storing also sweeps every expired entry, so keys that
    /// are never read again do not outlive their TTL by more than one interval.
    ///
    /// Returns whether the result was stored.
    pub async fn store(&self, key: CacheKey, value: CachedResult, generation: Generation) -> bool {
        let Some(ttl) = self.ttl else {
            return false;
        };

        let mut inner = self.inner.lock().await;
        if inner.generation(key.table()) != generation {
            debug!(
                table = key.table(),
                "table was invalidated during the read, not caching the result"
            );
            return false;
        }

        let now = Instant::now();
        if inner.next_purge.is_none_or(|at| now >= at) {
            let removed = inner.purge(now);
            if removed > 0 {
                debug!(removed, "purged expired cache entries");
            }
            inner.next_purge = Some(now + ttl);
        }

        trace!(table = key.table(), ttl_secs = ttl.as_secs(), "caching read result");
        inner.entries.insert(
            key,
            CacheEntry {
                value,
                expires_at: now + ttl,
            },
        );

        true
    }

    /// Removes every entry of `table` and prevents in-flight reads of it from being stored.
    pub async fn invalidate_table(&self, table: &str) {
        if !self.is_enabled() {
            return;
        }

        let mut inner = self.inner.lock().await;
        *inner.generations.entry(table.to_string()).or_insert(0) += 1;

        let before = inner.entries.len();
        inner.entries.retain(|key, _| key.table() != table);
        debug!(
            table,
            removed = before - inner.entries.len(),
            "invalidated cached reads"
        );
    }

    /// Removes every entry and prevents all in-flight reads from being stored.
    pub async fn clear(&self) {
        let mut inner = self.inner.lock().await;
        inner.epoch += 1;

        let removed = inner.entries.len();
        inner.entries.clear();
        debug!(removed, "cleared the query cache");
    }

    /// Removes every expired entry, returning how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let mut inner = self.inner.lock().await;

        let removed = inner.purge(Instant::now());
        if removed > 0 {
            debug!(removed, "purged expired cache entries");
        }

        removed
    }

    /// Returns the number of stored entries, including expired ones not yet purged.
    pub async fn len(&self) -> usize {
        let inner = self.inner.lock().await;
        inner.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BackendValue;

    fn cache(secs: u64) -> QueryCache {
        QueryCache::new(CacheTtl::Expiring(Duration::from_secs(secs)))
    }

    fn key(table: &str, value: i64) -> CacheKey {
        CacheKey::new(
            table,
            &Statement::new(
                format!("SELECT id FROM {table} WHERE id = ?"),
                vec![BackendValue::Int(value)],
            ),
        )
    }

    fn rows() -> CachedResult {
        CachedResult::Many(vec![Row::new().with("id", 1)])
    }

    #[test]
    fn test_key_depends_on_params() {
        assert_eq!(key("people", 1), key("people", 1));
        assert_ne!(key("people", 1), key("people", 2));
        assert_ne!(key("people", 1), key("pets", 1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_entries_expire_after_ttl() {
        let cache = cache(300);
        let generation = cache.generation("people").await;
        assert!(cache.store(key("people", 1), rows(), generation).await);

        tokio::time::advance(Duration::from_secs(299)).await;
        assert_eq!(cache.lookup(&key("people", 1)).await, Some(rows()));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(cache.lookup(&key("people", 1)).await, None);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_invalidation_is_per_table() {
        let cache = cache(300);
        let people = cache.generation("people").await;
        let pets = cache.generation("pets").await;
        cache.store(key("people", 1), rows(), people).await;
        cache.store(key("pets", 1), rows(), pets).await;

        cache.invalidate_table("people").await;

        assert_eq!(cache.lookup(&key("people", 1)).await, None);
        assert_eq!(cache.lookup(&key("pets", 1)).await, Some(rows()));
    }

    #[tokio::test]
    async fn test_stale_read_is_not_stored_after_invalidation() {
        let cache = cache(300);
        let generation = cache.generation("people").await;

        cache.invalidate_table("people").await;

        assert!(!cache.store(key("people", 1), rows(), generation).await);
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test]
    async fn test_clear_blocks_in_flight_reads_of_every_table() {
        let cache = cache(300);
        let generation = cache.generation("pets").await;

        cache.clear().await;

        assert!(!cache.store(key("pets", 1), rows(), generation).await);
    }

    #[tokio::test]
    async fn test_disabled_cache_never_stores() {
        let cache = QueryCache::new(CacheTtl::Disabled);
        let generation = cache.generation("people").await;

        assert!(!cache.is_enabled());
        assert!(!cache.store(key("people", 1), rows(), generation).await);
        assert_eq!(cache.lookup(&key("people", 1)).await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_purge_expired_keeps_fresh_entries() {
        let cache = cache(10);
        let generation = cache.generation("people").await;
        cache.store(key("people", 1), rows(), generation).await;

        tokio::time::advance(Duration::from_secs(5)).await;
        cache.store(key("people", 2), rows(), generation).await;

        tokio::time::advance(Duration::from_secs(6)).await;
        assert_eq!(cache.purge_expired().await, 1);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_sweeps_expired_entries() {
        let cache = cache(1);
        let generation = cache.generation("people").await;
        for id in 0..1000 {
            cache.store(key("people", id), rows(), generation).await;
        }
        assert_eq!(cache.len().await, 1000);

        tokio::time::advance(Duration::from_secs(3600)).await;
        cache.store(key("people", 1000), rows(), generation).await;

        assert_eq!(cache.len().await, 1);
        assert_eq!(cache.lookup(&key("people", 1000)).await, Some(rows()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_sweeps_at_most_once_per_ttl() {
        let cache = cache(10);
        let generation = cache.generation("people").await;
        cache.store(key("people", 1), rows(), generation).await;
        tokio::time::advance(Duration::from_secs(5)).await;
        cache.store(key("people", 2), rows(), generation).await;

        // Sweeps the first entry; the next sweep is due at 21s.
        tokio::time::advance(Duration::from_secs(6)).await;
        cache.store(key("people", 3), rows(), generation).await;
        assert_eq!(cache.len().await, 2);

        // The second entry expired at 15s but stays until the next sweep.
        tokio::time::advance(Duration::from_secs(5)).await;
        cache.store(key("people", 4), rows(), generation).await;
        assert_eq!(cache.len().await, 3);

        tokio::time::advance(Duration::from_secs(5)).await;
        cache.store(key("people", 5), rows(), generation).await;
        assert_eq!(cache.len().await, 2);
    }
}
