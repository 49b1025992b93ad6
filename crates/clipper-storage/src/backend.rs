use crate::dynamo::DynamoRepository;
use crate::memory::InMemoryRepository;
use async_trait::async_trait;
use clipper_core::repository::{Repository, Result, UrlRecord};
use clipper_core::ShortCode;

/// A persistent backend chosen at runtime.
#[derive(Debug)]
pub enum StorageBackend {
    InMemory(InMemoryRepository),
    DynamoDb(DynamoRepository),
}

impl StorageBackend {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            StorageBackend::InMemory(_) => "in-memory",
            StorageBackend::DynamoDb(_) => "dynamodb",
        }
    }
}

impl From<InMemoryRepository> for StorageBackend {
    fn from(repository: InMemoryRepository) -> Self {
        Self::InMemory(repository)
    }
}

impl From<DynamoRepository> for StorageBackend {
    fn from(repository: DynamoRepository) -> Self {
        Self::DynamoDb(repository)
    }
}

#[async_trait]
impl Repository for StorageBackend {
    async fn save(&self, record: UrlRecord) -> Result<UrlRecord> {
        match self {
            StorageBackend::InMemory(repository) => repository.save(record).await,
            StorageBackend::DynamoDb(repository) => repository.save(record).await,
        }
    }

    async fn get(&self, code: &ShortCode) -> Result<Option<UrlRecord>> {
        match self {
            StorageBackend::InMemory(repository) => repository.get(code).await,
            StorageBackend::DynamoDb(repository) => repository.get(code).await,
        }
    }

    async fn update(&self, record: &UrlRecord) -> Result<()> {
        match self {
            StorageBackend::InMemory(repository) => repository.update(record).await,
            StorageBackend::DynamoDb(repository) => repository.update(record).await,
        }
    }
}
