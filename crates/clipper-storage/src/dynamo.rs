use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_dynamodb::error::{BuildError, DisplayErrorContext, SdkError};
use aws_sdk_dynamodb::types::{
    AttributeDefinition, AttributeValue, BillingMode, KeySchemaElement, KeyType,
    ScalarAttributeType,
};
use aws_sdk_dynamodb::Client;
use clipper_core::repository::{Repository, Result, UrlRecord};
use clipper_core::{ShortCode, StorageError};
use jiff::civil::DateTime;
use jiff::tz::TimeZone;
use jiff::Timestamp;
use std::collections::HashMap;
use tracing::{debug, trace, warn};
use typed_builder::TypedBuilder;

/// Table used when none is configured.
pub const DEFAULT_TABLE_NAME: &str = "clipper-urls";

// Composite key: the code as partition key plus a fixed sort key value,
// leaving room for other item kinds under the same code.
const PK_NAME: &str = "id";
const SK_NAME: &str = "urls";
const SK_VALUE: &str = "details";

const CODE_FIELD: &str = "code";
const ORIGINAL_URL_FIELD: &str = "originalUrl";
const CREATED_AT_FIELD: &str = "createdAt";
const ACCESS_COUNT_FIELD: &str = "accessCount";

type Item = HashMap<String, AttributeValue>;

/// Connection settings for [`DynamoRepository::connect`].
#[derive(Debug, Clone, TypedBuilder)]
pub struct DynamoConfig {
    #[builder(default = DEFAULT_TABLE_NAME.to_string(), setter(into))]
    pub table_name: String,
    /// Endpoint override, e.g. a DynamoDB Local instance.
    #[builder(default, setter(into))]
    pub endpoint_url: Option<String>,
}

/// DynamoDB implementation of the repository contract.
///
/// One item per code. Creates are conditional puts, reads are strongly
/// consistent, and updates only ever touch the access counter. Every
/// request is awaited, so failures always surface as [`StorageError`].
#[derive(Debug, Clone)]
pub struct DynamoRepository {
    client: Client,
    table: String,
}

impl DynamoRepository {
    /// Creates a repository from an existing DynamoDB client.
    pub fn new(client: Client, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
        }
    }

    /// Creates a repository from the ambient AWS configuration
    /// (environment, profile, instance metadata).
    pub async fn connect(config: DynamoConfig) -> Self {
        let sdk_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
        let mut builder = aws_sdk_dynamodb::config::Builder::from(&sdk_config);
        if let Some(endpoint_url) = config.endpoint_url {
            builder = builder.endpoint_url(endpoint_url);
        }
        Self::new(Client::from_conf(builder.build()), config.table_name)
    }

    /// Returns the table name.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Returns a reference to the underlying client.
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Creates the table with the expected key schema.
    ///
    /// An already existing table is not an error.
    pub async fn create_table(&self) -> Result<()> {
        let result = self
            .client
            .create_table()
            .table_name(&self.table)
            .attribute_definitions(
                AttributeDefinition::builder()
                    .attribute_name(PK_NAME)
                    .attribute_type(ScalarAttributeType::S)
                    .build()
                    .map_err(map_build_error)?,
            )
            .attribute_definitions(
                AttributeDefinition::builder()
                    .attribute_name(SK_NAME)
                    .attribute_type(ScalarAttributeType::S)
                    .build()
                    .map_err(map_build_error)?,
            )
            .key_schema(
                KeySchemaElement::builder()
                    .attribute_name(PK_NAME)
                    .key_type(KeyType::Hash)
                    .build()
                    .map_err(map_build_error)?,
            )
            .key_schema(
                KeySchemaElement::builder()
                    .attribute_name(SK_NAME)
                    .key_type(KeyType::Range)
                    .build()
                    .map_err(map_build_error)?,
            )
            .billing_mode(BillingMode::PayPerRequest)
            .send()
            .await;

        match result {
            Ok(_) => {
                debug!(table = %self.table, "created table");
                Ok(())
            }
            Err(err)
                if err
                    .as_service_error()
                    .is_some_and(|e| e.is_resource_in_use_exception()) =>
            {
                debug!(table = %self.table, "table already exists");
                Ok(())
            }
            Err(err) => Err(map_sdk_error("failed to create table", err)),
        }
    }
}

fn key(code: &ShortCode) -> Item {
    HashMap::from([
        (PK_NAME.to_string(), AttributeValue::S(code.as_str().to_string())),
        (SK_NAME.to_string(), AttributeValue::S(SK_VALUE.to_string())),
    ])
}

fn record_to_item(record: &UrlRecord) -> Item {
    let mut item = key(&record.code);
    item.insert(
        CODE_FIELD.to_string(),
        AttributeValue::S(record.code.as_str().to_string()),
    );
    item.insert(
        ORIGINAL_URL_FIELD.to_string(),
        AttributeValue::S(record.original_url.clone()),
    );
    item.insert(
        CREATED_AT_FIELD.to_string(),
        AttributeValue::S(record.created_at.to_string()),
    );
    item.insert(
        ACCESS_COUNT_FIELD.to_string(),
        AttributeValue::N(record.access_count.to_string()),
    );
    item
}

/// Rebuilds a record from a stored item.
///
/// Missing or unreadable fields fall back to an empty URL, `now` and zero
/// accesses, so a damaged item still resolves.
fn record_from_item(code: &ShortCode, item: &Item, now: Timestamp) -> UrlRecord {
    let original_url = item
        .get(ORIGINAL_URL_FIELD)
        .and_then(|value| value.as_s().ok())
        .cloned()
        .unwrap_or_default();

    let created_at = item
        .get(CREATED_AT_FIELD)
        .and_then(|value| value.as_s().ok())
        .map(String::as_str)
        .and_then(parse_created_at)
        .unwrap_or(now);

    let access_count = item
        .get(ACCESS_COUNT_FIELD)
        .and_then(|value| value.as_n().or_else(|value| value.as_s()).ok())
        .and_then(|raw| raw.trim().parse::<u64>().ok())
        .unwrap_or(0);

    UrlRecord {
        code: code.clone(),
        original_url,
        created_at,
        access_count,
    }
}

/// Parses an RFC 3339 timestamp. Values written without an offset are
/// taken as UTC wall-clock time.
fn parse_created_at(raw: &str) -> Option<Timestamp> {
    raw.parse::<Timestamp>().ok().or_else(|| {
        raw.parse::<DateTime>()
            .ok()
            .and_then(|civil| civil.to_zoned(TimeZone::UTC).ok())
            .map(|zoned| zoned.timestamp())
    })
}

fn map_build_error(err: BuildError) -> StorageError {
    StorageError::Operation(format!("invalid request: {err}"))
}

fn map_sdk_error<E, R>(operation: &str, err: SdkError<E, R>) -> StorageError
where
    E: std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug + Send + Sync + 'static,
{
    let message = format!("{operation}: {}", DisplayErrorContext(&err));

    match err {
        SdkError::TimeoutError(_) => StorageError::Timeout(message),
        SdkError::DispatchFailure(failure) if failure.is_timeout() => {
            StorageError::Timeout(message)
        }
        SdkError::DispatchFailure(_) => StorageError::Unavailable(message),
        SdkError::ResponseError(_) => StorageError::InvalidData(message),
        SdkError::ServiceError(_) => StorageError::Query(message),
        _ => StorageError::Operation(message),
    }
}

#[async_trait]
impl Repository for DynamoRepository {
    async fn save(&self, record: UrlRecord) -> Result<UrlRecord> {
        trace!(code = %record.code, table = %self.table, "putting item");

        let result = self
            .client
            .put_item()
            .table_name(&self.table)
            .set_item(Some(record_to_item(&record)))
            .condition_expression("attribute_not_exists(#pk) AND attribute_not_exists(#sk)")
            .expression_attribute_names("#pk", PK_NAME)
            .expression_attribute_names("#sk", SK_NAME)
            .send()
            .await;

        match result {
            Ok(_) => {
                debug!(code = %record.code, "stored new record");
                Ok(record)
            }
            Err(err)
                if err
                    .as_service_error()
                    .is_some_and(|e| e.is_conditional_check_failed_exception()) =>
            {
                warn!(code = %record.code, "record already exists, keeping the stored one");
                let stored = self.get(&record.code).await?;
                Ok(stored.unwrap_or(record))
            }
            Err(err) => Err(map_sdk_error("failed to put item", err)),
        }
    }

    async fn get(&self, code: &ShortCode) -> Result<Option<UrlRecord>> {
        trace!(code = %code, table = %self.table, "getting item");

        let output = self
            .client
            .get_item()
            .table_name(&self.table)
            .set_key(Some(key(code)))
            .consistent_read(true)
            .send()
            .await
            .map_err(|err| map_sdk_error("failed to get item", err))?;

        let Some(item) = output.item().filter(|item| !item.is_empty()) else {
            trace!(code = %code, "item not found");
            return Ok(None);
        };

        Ok(Some(record_from_item(code, item, Timestamp::now())))
    }

    async fn update(&self, record: &UrlRecord) -> Result<()> {
        trace!(code = %record.code, access_count = record.access_count, "updating access count");

        let result = self
            .client
            .update_item()
            .table_name(&self.table)
            .set_key(Some(key(&record.code)))
            .update_expression("SET #count = :count")
            .condition_expression("attribute_exists(#pk)")
            .expression_attribute_names("#count", ACCESS_COUNT_FIELD)
            .expression_attribute_names("#pk", PK_NAME)
            .expression_attribute_values(":count", AttributeValue::N(record.access_count.to_string()))
            .send()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(err)
                if err
                    .as_service_error()
                    .is_some_and(|e| e.is_conditional_check_failed_exception()) =>
            {
                warn!(code = %record.code, "ignoring update for missing item");
                Ok(())
            }
            Err(err) => Err(map_sdk_error("failed to update item", err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(s: &str) -> ShortCode {
        ShortCode::new_unchecked(s)
    }

    fn now() -> Timestamp {
        "2030-01-01T00:00:00Z".parse().unwrap()
    }

    #[test]
    fn item_layout() {
        let record = UrlRecord {
            code: code("GCORf76Q"),
            original_url: "https://example.com/article".to_string(),
            created_at: "2024-06-15T13:05:00Z".parse().unwrap(),
            access_count: 3,
        };

        let item = record_to_item(&record);

        assert_eq!(item.get("id"), Some(&AttributeValue::S("GCORf76Q".into())));
        assert_eq!(item.get("urls"), Some(&AttributeValue::S("details".into())));
        assert_eq!(item.get("code"), Some(&AttributeValue::S("GCORf76Q".into())));
        assert_eq!(
            item.get("originalUrl"),
            Some(&AttributeValue::S("https://example.com/article".into()))
        );
        assert_eq!(
            item.get("createdAt"),
            Some(&AttributeValue::S("2024-06-15T13:05:00Z".into()))
        );
        assert_eq!(item.get("accessCount"), Some(&AttributeValue::N("3".into())));
        assert_eq!(item.len(), 6);
    }

    #[test]
    fn item_reads_back() {
        let record = UrlRecord {
            code: code("abc"),
            original_url: "https://example.com".to_string(),
            created_at: "2024-06-15T13:05:00.123456789Z".parse().unwrap(),
            access_count: 42,
        };

        let item = record_to_item(&record);
        assert_eq!(record_from_item(&record.code, &item, now()), record);
    }

    #[test]
    fn missing_fields_use_defaults() {
        let item = key(&code("abc"));
        let record = record_from_item(&code("abc"), &item, now());

        assert_eq!(record.code, code("abc"));
        assert_eq!(record.original_url, "");
        assert_eq!(record.created_at, now());
        assert_eq!(record.access_count, 0);
    }

    #[test]
    fn unreadable_fields_use_defaults() {
        let mut item = key(&code("abc"));
        item.insert("originalUrl".into(), AttributeValue::N("12".into()));
        item.insert("createdAt".into(), AttributeValue::S("yesterday".into()));
        item.insert("accessCount".into(), AttributeValue::N("-4".into()));

        let record = record_from_item(&code("abc"), &item, now());

        assert_eq!(record.original_url, "");
        assert_eq!(record.created_at, now());
        assert_eq!(record.access_count, 0);
    }

    #[test]
    fn textual_access_count_is_accepted() {
        let mut item = key(&code("abc"));
        item.insert("accessCount".into(), AttributeValue::S("9".into()));

        let record = record_from_item(&code("abc"), &item, now());
        assert_eq!(record.access_count, 9);
    }

    #[test]
    fn item_with_offsetless_created_at_reads_as_utc() {
        let mut item = key(&code("abc"));
        item.insert("createdAt".into(), AttributeValue::S("2024-06-15T13:05:00".into()));

        let record = record_from_item(&code("abc"), &item, now());
        assert_eq!(record.created_at, "2024-06-15T13:05:00Z".parse().unwrap());
    }

    #[test]
    fn created_at_without_offset_is_utc() {
        assert_eq!(
            parse_created_at("2024-06-15T13:05:00.1234567"),
            Some("2024-06-15T13:05:00.1234567Z".parse().unwrap())
        );
        assert_eq!(
            parse_created_at("2024-06-15T15:05:00+02:00"),
            Some("2024-06-15T13:05:00Z".parse().unwrap())
        );
        assert_eq!(parse_created_at("not a date"), None);
    }

    #[test]
    fn config_defaults() {
        let config = DynamoConfig::builder().build();
        assert_eq!(config.table_name, DEFAULT_TABLE_NAME);
        assert!(config.endpoint_url.is_none());

        let config = DynamoConfig::builder()
            .table_name("urls")
            .endpoint_url(Some("http://localhost:8000".to_string()))
            .build();
        assert_eq!(config.table_name, "urls");
        assert_eq!(config.endpoint_url.as_deref(), Some("http://localhost:8000"));
    }
}
