use clipper_core::{ShortCode, UrlRecord};
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// The cached projection of a [`UrlRecord`].
///
/// The code is not part of the payload; it is recovered from the cache key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub original_url: String,
    pub created_at: Timestamp,
    pub access_count: u64,
}

impl CacheEntry {
    pub fn into_record(self, code: ShortCode) -> UrlRecord {
        UrlRecord {
            code,
            original_url: self.original_url,
            created_at: self.created_at,
            access_count: self.access_count,
        }
    }
}

impl From<&UrlRecord> for CacheEntry {
    fn from(record: &UrlRecord) -> Self {
        Self {
            original_url: record.original_url.clone(),
            created_at: record.created_at,
            access_count: record.access_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_shape() {
        let record = UrlRecord {
            code: ShortCode::new_unchecked("GCORf76Q"),
            original_url: "https://example.com/article".to_string(),
            created_at: "2024-06-15T13:05:00Z".parse().unwrap(),
            access_count: 2,
        };

        let json = serde_json::to_string(&CacheEntry::from(&record)).unwrap();
        assert_eq!(
            json,
            r#"{"originalUrl":"https://example.com/article","createdAt":"2024-06-15T13:05:00Z","accessCount":2}"#
        );
    }

    #[test]
    fn code_comes_from_the_caller() {
        let entry: CacheEntry = serde_json::from_str(
            r#"{"originalUrl":"https://example.com","createdAt":"2024-06-15T13:05:00Z","accessCount":0}"#,
        )
        .unwrap();

        let record = entry.into_record(ShortCode::new_unchecked("abc"));
        assert_eq!(record.code.as_str(), "abc");
        assert_eq!(record.original_url, "https://example.com");
    }

    #[test]
    fn negative_count_is_rejected() {
        let parsed = serde_json::from_str::<CacheEntry>(
            r#"{"originalUrl":"https://example.com","createdAt":"2024-06-15T13:05:00Z","accessCount":-1}"#,
        );
        assert!(parsed.is_err());
    }
}
