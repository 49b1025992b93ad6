use crate::error::StorageError;
use crate::shortcode::ShortCode;
use async_trait::async_trait;
use jiff::Timestamp;

/// Type alias for repository results.
pub type Result<T> = std::result::Result<T, StorageError>;

/// A stored URL record in the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlRecord {
    /// The short code, unique key of the record.
    pub code: ShortCode,
    /// The original URL that was shortened.
    pub original_url: String,
    /// When the record was first created.
    pub created_at: Timestamp,
    /// How many times the short code has been resolved.
    pub access_count: u64,
}

impl UrlRecord {
    /// Creates a fresh record with no recorded accesses.
    pub fn new(code: ShortCode, original_url: impl Into<String>, created_at: Timestamp) -> Self {
        Self {
            code,
            original_url: original_url.into(),
            created_at,
            access_count: 0,
        }
    }

    /// Counts one more access.
    pub fn record_access(&mut self) {
        self.access_count = self.access_count.saturating_add(1);
    }
}

/// Durable storage of [`UrlRecord`]s.
///
/// Every backend implements the same contract:
///
/// - [`save`](Repository::save) is a conditional create. An existing record
///   with the same code is never overwritten; the record that is
///   authoritative after the call is returned.
/// - [`get`](Repository::get) is strongly consistent and returns `Ok(None)`
///   for an unknown code.
/// - [`update`](Repository::update) persists `access_count` only and never
///   creates a record that does not already exist.
#[async_trait]
pub trait Repository: Send + Sync + 'static {
    /// Inserts a new record unless one with the same code already exists.
    async fn save(&self, record: UrlRecord) -> Result<UrlRecord>;

    /// Retrieves the record for a given short code.
    async fn get(&self, code: &ShortCode) -> Result<Option<UrlRecord>>;

    /// Persists the access counter of an existing record.
    async fn update(&self, record: &UrlRecord) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_record_starts_without_accesses() {
        let record = UrlRecord::new(
            ShortCode::new_unchecked("abc"),
            "https://example.com",
            Timestamp::UNIX_EPOCH,
        );
        assert_eq!(record.access_count, 0);
        assert_eq!(record.original_url, "https://example.com");
    }

    #[test]
    fn record_access_increments_by_one() {
        let mut record = UrlRecord::new(
            ShortCode::new_unchecked("abc"),
            "https://example.com",
            Timestamp::UNIX_EPOCH,
        );
        record.record_access();
        record.record_access();
        assert_eq!(record.access_count, 2);
    }

    #[test]
    fn record_access_saturates() {
        let mut record = UrlRecord {
            code: ShortCode::new_unchecked("abc"),
            original_url: String::new(),
            created_at: Timestamp::UNIX_EPOCH,
            access_count: u64::MAX,
        };
        record.record_access();
        assert_eq!(record.access_count, u64::MAX);
    }
}
