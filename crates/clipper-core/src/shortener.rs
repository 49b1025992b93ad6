use crate::error::ShortenerError;
use crate::repository::UrlRecord;
use crate::shortcode::ShortCode;
use async_trait::async_trait;

type Result<T> = std::result::Result<T, ShortenerError>;

/// The operations the HTTP layer calls into.
#[async_trait]
pub trait Shortener: Send + Sync + 'static {
    /// Shortens a URL and returns its record.
    ///
    /// Shortening the same URL twice within one code window returns the
    /// same record; no duplicate is ever created.
    async fn shorten(&self, url: &str) -> Result<UrlRecord>;

    /// Resolves a short code to its stored record.
    /// Returns `None` if the code does not exist.
    async fn lookup(&self, code: &ShortCode) -> Result<Option<UrlRecord>>;

    /// Counts one access to a short code. Unknown codes are ignored.
    async fn record_access(&self, code: &ShortCode) -> Result<()>;
}
