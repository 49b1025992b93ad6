use crate::ttl::CacheTtl;
use async_trait::async_trait;
use clipper_core::repository::Result;
use clipper_core::{Repository, ShortCode, UrlCache, UrlRecord};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

/// A cache write that has been dispatched but not yet applied.
#[derive(Debug, Clone)]
struct PendingWrite {
    record: UrlRecord,
    seq: u64,
}

type PendingWrites = DashMap<ShortCode, PendingWrite>;

/// A repository decorator that adds cache-aside reads and write-through
/// refreshes.
///
/// This implementation composes any [`Repository`] with any [`UrlCache`]:
///
/// - reads check the cache first and fall back to the inner repository on
///   a miss, a malformed entry or an unreachable cache, backfilling the
///   cache on success;
/// - `save` and `update` go to the inner repository first and refresh the
///   cache afterwards.
///
/// Cache writes are fire-and-forget but ordered: they are queued to a
/// single writer task per decorator, which applies them one at a time.
/// Until a write lands, reads are answered from the queued record, so a
/// read never observes an older record than one this decorator already
/// wrote to the inner repository. Neither a queued write nor the cached
/// entry is ever replaced by a record with a lower `access_count`. Write
/// failures are logged and otherwise dropped.
#[derive(Debug)]
pub struct CachedRepository<R, C> {
    inner: R,
    cache: Arc<C>,
    ttl: CacheTtl,
    pending: Arc<PendingWrites>,
    seq: AtomicU64,
    writer: OnceLock<mpsc::UnboundedSender<ShortCode>>,
}

impl<R: Repository, C: UrlCache> CachedRepository<R, C> {
    /// Creates a new cached repository decorator with the default TTL.
    ///
    /// # Arguments
    ///
    /// * `inner` - The underlying repository implementation
    /// * `cache` - The cache implementation (e.g., [`RedisUrlCache`](crate::RedisUrlCache))
    pub fn new(inner: R, cache: C) -> Self {
        Self::with_ttl(inner, cache, CacheTtl::default())
    }

    /// Creates a new cached repository decorator with an explicit TTL.
    ///
    /// The writer task is started on the first cache write, so this can be
    /// called outside a runtime.
    pub fn with_ttl(inner: R, cache: C, ttl: CacheTtl) -> Self {
        Self {
            inner,
            cache: Arc::new(cache),
            ttl,
            pending: Arc::new(DashMap::new()),
            seq: AtomicU64::new(0),
            writer: OnceLock::new(),
        }
    }

    /// Returns a reference to the inner repository.
    pub fn inner(&self) -> &R {
        &self.inner
    }

    /// Returns a reference to the cache.
    pub fn cache(&self) -> &C {
        &self.cache
    }

    pub fn ttl(&self) -> CacheTtl {
        self.ttl
    }

    /// Number of codes whose latest cache write has not been applied yet.
    pub fn pending_writes(&self) -> usize {
        self.pending.len()
    }

    fn writer(&self) -> &mpsc::UnboundedSender<ShortCode> {
        self.writer.get_or_init(|| {
            let (tx, rx) = mpsc::unbounded_channel();
            tokio::spawn(apply_writes(
                rx,
                Arc::clone(&self.cache),
                Arc::clone(&self.pending),
                self.ttl.as_duration(),
            ));
            tx
        })
    }

    /// Queues `record` for the cache without waiting for the outcome.
    fn refresh(&self, record: &UrlRecord) {
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        let write = PendingWrite {
            record: record.clone(),
            seq,
        };

        match self.pending.entry(record.code.clone()) {
            Entry::Occupied(mut queued) => {
                if queued.get().record.access_count > record.access_count {
                    trace!(code = %record.code, "Newer cache write already queued");
                    return;
                }
                queued.insert(write);
            }
            Entry::Vacant(slot) => {
                slot.insert(write);
            }
        }

        if self.writer().send(record.code.clone()).is_err() {
            warn!(code = %record.code, "Cache writer stopped, dropping cache write");
            self.pending.remove_if(&record.code, |_, queued| queued.seq == seq);
        }
    }
}

/// Applies queued cache writes in dispatch order.
///
/// The channel carries codes only; the record written is whatever is
/// pending for that code when its turn comes, so bursts collapse into the
/// latest write. A record is not written over a cached one with a higher
/// `access_count`.
async fn apply_writes<C: UrlCache>(
    mut rx: mpsc::UnboundedReceiver<ShortCode>,
    cache: Arc<C>,
    pending: Arc<PendingWrites>,
    ttl: Duration,
) {
    while let Some(code) = rx.recv().await {
        let Some(write) = pending.get(&code).map(|queued| queued.value().clone()) else {
            continue;
        };

        if is_cached_at_least(cache.as_ref(), &write.record).await {
            trace!(code = %code, "Cache already holds this or a newer record");
        } else {
            match cache.set_url(&write.record, ttl).await {
                Ok(()) => trace!(code = %code, "Refreshed cache entry"),
                Err(e) => warn!(code = %code, error = %e, "Failed to refresh cache entry"),
            }
        }

        pending.remove_if(&code, |_, queued| queued.seq == write.seq);
    }
}

/// Whether the cache already holds `record` or a later version of it.
async fn is_cached_at_least<C: UrlCache>(cache: &C, record: &UrlRecord) -> bool {
    matches!(
        cache.get_url(&record.code).await,
        Ok(Some(cached)) if cached.access_count >= record.access_count
    )
}

#[async_trait]
impl<R: Repository, C: UrlCache> Repository for CachedRepository<R, C> {
    async fn save(&self, record: UrlRecord) -> Result<UrlRecord> {
        let saved = self.inner.save(record).await?;
        self.refresh(&saved);
        Ok(saved)
    }

    async fn get(&self, code: &ShortCode) -> Result<Option<UrlRecord>> {
        trace!(code = %code, "Fetching URL record with cache");

        if let Some(queued) = self.pending.get(code) {
            debug!(code = %code, "Served from queued cache write");
            return Ok(Some(queued.record.clone()));
        }

        match self.cache.get_url(code).await {
            Ok(Some(record)) => {
                debug!(code = %code, "Cache hit");
                return Ok(Some(record));
            }
            Ok(None) => {
                trace!(code = %code, "Cache miss, fetching from inner repository");
            }
            Err(e) => {
                warn!(code = %code, error = %e, "Cache error on get, falling back to inner repository");
            }
        }

        let result = self.inner.get(code).await?;
        if let Some(ref record) = result {
            self.refresh(record);
        }
        Ok(result)
    }

    async fn update(&self, record: &UrlRecord) -> Result<()> {
        self.inner.update(record).await?;
        self.refresh(record);
        Ok(())
    }
}
