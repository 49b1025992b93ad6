use async_trait::async_trait;
use clipper_core::repository::{Repository, Result, UrlRecord};
use clipper_core::ShortCode;
use dashmap::DashMap;
use tracing::trace;

/// In-memory implementation of the Repository trait using DashMap.
///
/// DashMap provides better concurrency than RwLock<HashMap> because it
/// uses sharded locks, allowing concurrent reads and writes to different
/// buckets without blocking. Data is lost when the process exits.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    storage: DashMap<ShortCode, UrlRecord>,
}

impl InMemoryRepository {
    /// Creates a new in-memory repository.
    pub fn new() -> Self {
        Self {
            storage: DashMap::new(),
        }
    }

    /// Creates a new in-memory repository with the specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            storage: DashMap::with_capacity(capacity),
        }
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn save(&self, record: UrlRecord) -> Result<UrlRecord> {
        trace!(code = %record.code, "saving record in memory");
        // The entry lock makes check-and-insert atomic per code.
        let stored = self
            .storage
            .entry(record.code.clone())
            .or_insert(record)
            .value()
            .clone();
        Ok(stored)
    }

    async fn get(&self, code: &ShortCode) -> Result<Option<UrlRecord>> {
        Ok(self.storage.get(code).map(|entry| entry.value().clone()))
    }

    async fn update(&self, record: &UrlRecord) -> Result<()> {
        // Only the counter moves; an unknown code is left absent.
        if let Some(mut stored) = self.storage.get_mut(&record.code) {
            stored.access_count = record.access_count;
        } else {
            trace!(code = %record.code, "ignoring update for unknown code");
        }
        Ok(())
    }
}
