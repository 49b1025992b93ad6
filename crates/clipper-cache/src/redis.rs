use crate::entry::CacheEntry;
use async_trait::async_trait;
use clipper_core::cache::Result;
use clipper_core::{CacheError, ShortCode, UrlCache, UrlRecord};
use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use redis::AsyncCommands;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, trace, warn};

/// Key prefix used by [`RedisUrlCache::new`].
pub const DEFAULT_KEY_PREFIX: &str = "clipper:url:";

// Reads fall through to storage while Redis is down, so keep the connect
// backoff short.
const CONNECT_RETRIES: usize = 1;

/// A Redis-based implementation of [`UrlCache`].
///
/// Records are stored as JSON [`CacheEntry`] payloads under a prefixed key.
/// The connection is established on first use and re-established by the
/// connection manager afterwards, so an unreachable Redis only ever shows
/// up as failed cache calls.
#[derive(Clone)]
pub struct RedisUrlCache {
    client: redis::Client,
    conn: Arc<OnceCell<ConnectionManager>>,
    key_prefix: String,
}

fn map_redis_error(operation: &str, err: redis::RedisError) -> CacheError {
    let message = format!("{operation}: {err}");
    if err.is_timeout() {
        CacheError::Timeout(message)
    } else if err.is_connection_refusal() || err.is_connection_dropped() {
        CacheError::Unavailable(message)
    } else {
        CacheError::Operation(message)
    }
}

impl RedisUrlCache {
    /// Creates a new Redis URL cache.
    ///
    /// # Arguments
    ///
    /// * `client` - A Redis client; no connection is opened yet
    pub fn new(client: redis::Client) -> Self {
        Self::with_prefix(client, DEFAULT_KEY_PREFIX)
    }

    /// Creates a new Redis URL cache with a custom key prefix.
    ///
    /// # Arguments
    ///
    /// * `client` - A Redis client
    /// * `key_prefix` - Custom prefix for cache keys (e.g., "myapp:url:")
    pub fn with_prefix(client: redis::Client, key_prefix: impl Into<String>) -> Self {
        Self {
            client,
            conn: Arc::new(OnceCell::new()),
            key_prefix: key_prefix.into(),
        }
    }

    /// Parses `url` (e.g. `redis://127.0.0.1:6379`) and creates the cache.
    pub fn open(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)
            .map_err(|e| CacheError::Initialization(format!("invalid Redis url: {e}")))?;
        Ok(Self::new(client))
    }

    /// Generates the cache key for a short code.
    pub fn cache_key(&self, code: &ShortCode) -> String {
        format!("{}{}", self.key_prefix, code.as_str())
    }

    async fn connection(&self) -> Result<ConnectionManager> {
        self.conn
            .get_or_try_init(|| {
                let config = ConnectionManagerConfig::new().set_number_of_retries(CONNECT_RETRIES);
                ConnectionManager::new_with_config(self.client.clone(), config)
            })
            .await
            .cloned()
            .map_err(|e| map_redis_error("failed to connect to Redis", e))
    }
}

impl std::fmt::Debug for RedisUrlCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisUrlCache")
            .field("key_prefix", &self.key_prefix)
            .field("connected", &self.conn.initialized())
            .finish()
    }
}

#[async_trait]
impl UrlCache for RedisUrlCache {
    async fn get_url(&self, code: &ShortCode) -> Result<Option<UrlRecord>> {
        let key = self.cache_key(code);
        trace!(code = %code, "Fetching URL record from Redis cache");

        let mut conn = self.connection().await?;
        match conn.get::<_, Option<String>>(&key).await {
            Ok(Some(cached)) => {
                debug!(code = %code, "Cache hit in Redis");
                match serde_json::from_str::<CacheEntry>(&cached) {
                    Ok(entry) => Ok(Some(entry.into_record(code.clone()))),
                    Err(e) => {
                        warn!(code = %code, error = %e, "Failed to deserialize cached record");
                        Err(CacheError::InvalidData(format!(
                            "invalid cached value for key '{key}': {e}"
                        )))
                    }
                }
            }
            Ok(None) => {
                trace!(code = %code, "Cache miss in Redis");
                Ok(None)
            }
            Err(e) => {
                warn!(code = %code, error = %e, "Redis error on get");
                Err(map_redis_error("failed to fetch value from Redis", e))
            }
        }
    }

    async fn set_url(&self, record: &UrlRecord, ttl: Duration) -> Result<()> {
        let key = self.cache_key(&record.code);
        trace!(code = %record.code, ttl_secs = ttl.as_secs(), "Storing URL record in Redis cache");

        let json = serde_json::to_string(&CacheEntry::from(record)).map_err(|e| {
            CacheError::Serialization(format!("failed to serialize cache value: {e}"))
        })?;

        let mut conn = self.connection().await?;
        conn.set_ex::<_, _, ()>(&key, json, ttl.as_secs())
            .await
            .map_err(|e| map_redis_error("failed to write value to Redis", e))?;

        debug!(code = %record.code, "Cached record in Redis");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache() -> RedisUrlCache {
        RedisUrlCache::open("redis://127.0.0.1:6379").unwrap()
    }

    #[test]
    fn cache_key_format() {
        let c = ShortCode::new_unchecked("abc123");
        assert_eq!(cache().cache_key(&c), "clipper:url:abc123");
    }

    #[test]
    fn cache_key_with_custom_prefix() {
        let client = redis::Client::open("redis://127.0.0.1:6379").unwrap();
        let cache = RedisUrlCache::with_prefix(client, "app:");
        assert_eq!(cache.cache_key(&ShortCode::new_unchecked("x")), "app:x");
    }

    #[test]
    fn open_rejects_bad_url() {
        let err = RedisUrlCache::open("not a url").unwrap_err();
        assert!(matches!(err, CacheError::Initialization(_)));
    }

    fn io_error(kind: std::io::ErrorKind) -> redis::RedisError {
        redis::RedisError::from(std::io::Error::new(kind, "simulated"))
    }

    #[test]
    fn refused_connection_is_unavailable() {
        let err = map_redis_error("get", io_error(std::io::ErrorKind::ConnectionRefused));
        assert!(matches!(err, CacheError::Unavailable(_)));
    }

    #[test]
    fn timed_out_request_is_timeout() {
        let err = map_redis_error("get", io_error(std::io::ErrorKind::TimedOut));
        assert!(matches!(err, CacheError::Timeout(_)));
    }

    #[test]
    fn other_failures_are_operation_errors() {
        let err = map_redis_error("get", io_error(std::io::ErrorKind::InvalidData));
        assert!(matches!(err, CacheError::Operation(msg) if msg.starts_with("get: ")));
    }

    #[test]
    fn opening_does_not_connect() {
        // nothing listens here; creating the cache must still succeed
        let cache = RedisUrlCache::open("redis://127.0.0.1:1").unwrap();
        assert!(format!("{cache:?}").contains("connected: false"));
    }
}
