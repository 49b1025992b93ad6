use crate::entry::CacheEntry;
use async_trait::async_trait;
use clipper_core::cache::Result;
use clipper_core::{ShortCode, UrlCache, UrlRecord};
use moka::future::Cache;
use moka::Expiry;
use std::time::{Duration, Instant};
use tracing::trace;

const DEFAULT_MAX_CAPACITY: u64 = 10_000;

#[derive(Debug, Clone)]
struct TimedEntry {
    entry: CacheEntry,
    ttl: Duration,
}

/// Expires each entry after the TTL it was written with.
struct PerEntryTtl;

impl Expiry<ShortCode, TimedEntry> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &ShortCode,
        value: &TimedEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &ShortCode,
        value: &TimedEntry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// An in-memory cache implementation using Moka.
///
/// Suitable for single-node deployments and development, where no Redis is
/// configured. Entries live for the TTL passed to [`UrlCache::set_url`].
#[derive(Debug, Clone)]
pub struct MokaUrlCache {
    cache: Cache<ShortCode, TimedEntry>,
}

impl MokaUrlCache {
    /// Creates a new Moka URL cache with a default capacity of 10,000 entries.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_CAPACITY)
    }

    /// Creates a new Moka URL cache with a custom maximum capacity.
    pub fn with_capacity(max_capacity: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(PerEntryTtl)
            .build();
        Self { cache }
    }
}

impl Default for MokaUrlCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UrlCache for MokaUrlCache {
    async fn get_url(&self, code: &ShortCode) -> Result<Option<UrlRecord>> {
        let cached = self.cache.get(code).await;
        trace!(code = %code, hit = cached.is_some(), "Looked up URL record in Moka cache");
        Ok(cached.map(|timed| timed.entry.into_record(code.clone())))
    }

    async fn set_url(&self, record: &UrlRecord, ttl: Duration) -> Result<()> {
        trace!(code = %record.code, ttl_secs = ttl.as_secs(), "Storing URL record in Moka cache");
        let timed = TimedEntry {
            entry: CacheEntry::from(record),
            ttl,
        };
        self.cache.insert(record.code.clone(), timed).await;
        Ok(())
    }
}
