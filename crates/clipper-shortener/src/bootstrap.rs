use crate::config::{Settings, StorageBackendArg};
use crate::service::ShortenerService;
use anyhow::Context;
use clipper_cache::{CacheBackend, CachedRepository, MokaUrlCache, RedisUrlCache};
use clipper_core::Shortener;
use clipper_generator::HmacGenerator;
use clipper_storage::{DynamoRepository, InMemoryRepository, StorageBackend};
use std::sync::Arc;
use tracing::info;

/// Builds the shortening service described by `settings`.
///
/// The storage backend is wrapped in the cache-aside decorator. Redis is
/// used when a URL is configured, otherwise an in-process Moka cache. No
/// network connection is opened here; an unreachable Redis degrades reads
/// to the storage backend.
pub async fn build_service(settings: &Settings) -> anyhow::Result<Arc<dyn Shortener>> {
    let storage = build_storage(settings).await;
    let cache = build_cache(settings)?;
    let ttl = settings.cache_ttl();

    info!(
        storage_backend = storage.name(),
        cache_backend = cache.name(),
        cache_ttl_secs = ttl.as_secs(),
        "building shortener service"
    );

    let repository = CachedRepository::with_ttl(storage, cache, ttl);
    let generator = HmacGenerator::new(settings.generator_settings());
    Ok(Arc::new(ShortenerService::new(repository, generator)))
}

async fn build_storage(settings: &Settings) -> StorageBackend {
    match settings.storage {
        StorageBackendArg::InMemory => InMemoryRepository::new().into(),
        StorageBackendArg::DynamoDb => {
            let config = settings.dynamo_config();
            info!(
                table = %config.table_name,
                endpoint = config.endpoint_url.as_deref().unwrap_or("default"),
                "using DynamoDB storage"
            );
            DynamoRepository::connect(config).await.into()
        }
    }
}

fn build_cache(settings: &Settings) -> anyhow::Result<CacheBackend> {
    match settings.redis_url.as_deref() {
        Some(url) => {
            let cache = RedisUrlCache::open(url)
                .with_context(|| format!("invalid {}", crate::config::REDIS_URL_ENV))?;
            Ok(cache.into())
        }
        None => Ok(MokaUrlCache::new().into()),
    }
}
