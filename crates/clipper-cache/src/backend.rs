use crate::moka::MokaUrlCache;
use crate::redis::RedisUrlCache;
use async_trait::async_trait;
use clipper_core::cache::Result;
use clipper_core::{ShortCode, UrlCache, UrlRecord};
use std::time::Duration;

/// A cache chosen at runtime: shared Redis when configured, otherwise a
/// per-process Moka cache.
#[derive(Debug, Clone)]
pub enum CacheBackend {
    Redis(RedisUrlCache),
    Moka(MokaUrlCache),
}

impl CacheBackend {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            CacheBackend::Redis(_) => "redis",
            CacheBackend::Moka(_) => "moka",
        }
    }
}

impl From<RedisUrlCache> for CacheBackend {
    fn from(cache: RedisUrlCache) -> Self {
        Self::Redis(cache)
    }
}

impl From<MokaUrlCache> for CacheBackend {
    fn from(cache: MokaUrlCache) -> Self {
        Self::Moka(cache)
    }
}

#[async_trait]
impl UrlCache for CacheBackend {
    async fn get_url(&self, code: &ShortCode) -> Result<Option<UrlRecord>> {
        match self {
            CacheBackend::Redis(cache) => cache.get_url(code).await,
            CacheBackend::Moka(cache) => cache.get_url(code).await,
        }
    }

    async fn set_url(&self, record: &UrlRecord, ttl: Duration) -> Result<()> {
        match self {
            CacheBackend::Redis(cache) => cache.set_url(record, ttl).await,
            CacheBackend::Moka(cache) => cache.set_url(record, ttl).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::Timestamp;

    #[tokio::test]
    async fn delegates_to_moka() {
        let cache = CacheBackend::from(MokaUrlCache::new());
        assert_eq!(cache.name(), "moka");

        let record = UrlRecord::new(
            ShortCode::new_unchecked("abc"),
            "https://example.com",
            Timestamp::now(),
        );
        cache.set_url(&record, Duration::from_secs(60)).await.unwrap();
        assert_eq!(cache.get_url(&record.code).await.unwrap(), Some(record));
    }

    #[test]
    fn redis_variant_name() {
        let cache = CacheBackend::from(RedisUrlCache::open("redis://127.0.0.1:1").unwrap());
        assert_eq!(cache.name(), "redis");
    }
}
