use crate::error::CacheError;
use crate::repository::UrlRecord;
use crate::shortcode::ShortCode;
use async_trait::async_trait;
use std::time::Duration;

pub type Result<T> = std::result::Result<T, CacheError>;

/// Short-lived copies of [`UrlRecord`]s keyed by [`ShortCode`].
///
/// A cache is never the system of record. Entries may vanish or lag behind
/// the repository at any time, and callers treat every error as a miss.
#[async_trait]
pub trait UrlCache: Send + Sync + 'static {
    /// Returns `Ok(None)` when nothing is cached for `code`.
    async fn get_url(&self, code: &ShortCode) -> Result<Option<UrlRecord>>;

    /// Caches `record` under its own code for `ttl`, replacing any entry.
    async fn set_url(&self, record: &UrlRecord, ttl: Duration) -> Result<()>;
}
