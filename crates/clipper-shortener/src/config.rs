use clap::{Args, ValueEnum};
use clipper_cache::ttl::DEFAULT_TTL_SECS;
use clipper_cache::CacheTtl;
use clipper_generator::{HmacGeneratorSettings, DEFAULT_SECRET};
use clipper_storage::dynamo::{DynamoConfig, DEFAULT_TABLE_NAME};
use std::fmt::{Display, Formatter};

pub const STORAGE_BACKEND_ENV: &str = "CLIPPER_STORAGE_BACKEND";
pub const DYNAMO_TABLE_ENV: &str = "CLIPPER_DYNAMO_TABLE";
pub const DYNAMO_ENDPOINT_ENV: &str = "CLIPPER_DYNAMO_ENDPOINT";
pub const REDIS_URL_ENV: &str = "CLIPPER_REDIS_URL";
pub const CACHE_TTL_SECS_ENV: &str = "CLIPPER_CACHE_TTL_SECS";
pub const CODE_SECRET_ENV: &str = "CLIPPER_CODE_SECRET";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageBackendArg {
    #[value(name = "in-memory")]
    InMemory,
    #[value(name = "dynamodb")]
    DynamoDb,
}

impl Display for StorageBackendArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackendArg::InMemory => write!(f, "in-memory"),
            StorageBackendArg::DynamoDb => write!(f, "dynamodb"),
        }
    }
}

/// Settings for building the shortening service.
///
/// Flatten into the host binary's parser with `#[command(flatten)]`; every
/// flag also reads from its `CLIPPER_*` environment variable.
#[derive(Debug, Clone, Args)]
pub struct Settings {
    #[arg(
        long,
        env = STORAGE_BACKEND_ENV,
        value_enum,
        default_value_t = StorageBackendArg::InMemory
    )]
    pub storage: StorageBackendArg,

    #[arg(long, env = DYNAMO_TABLE_ENV, default_value = DEFAULT_TABLE_NAME)]
    pub dynamo_table: String,

    /// Overrides the DynamoDB endpoint, e.g. for DynamoDB Local.
    #[arg(long, env = DYNAMO_ENDPOINT_ENV)]
    pub dynamo_endpoint: Option<String>,

    /// Shared Redis cache. Without it each process caches in memory.
    #[arg(long, env = REDIS_URL_ENV)]
    pub redis_url: Option<String>,

    #[arg(long, env = CACHE_TTL_SECS_ENV, default_value_t = DEFAULT_TTL_SECS)]
    pub cache_ttl_secs: u64,

    #[arg(
        long,
        env = CODE_SECRET_ENV,
        default_value = DEFAULT_SECRET,
        hide_default_value = true,
        hide_env_values = true
    )]
    pub code_secret: String,
}

impl Settings {
    pub fn dynamo_config(&self) -> DynamoConfig {
        DynamoConfig::builder()
            .table_name(self.dynamo_table.clone())
            .endpoint_url(self.dynamo_endpoint.clone())
            .build()
    }

    pub fn cache_ttl(&self) -> CacheTtl {
        CacheTtl::from_secs(self.cache_ttl_secs)
    }

    pub fn generator_settings(&self) -> HmacGeneratorSettings {
        HmacGeneratorSettings::builder()
            .secret(self.code_secret.clone())
            .build()
    }
}
