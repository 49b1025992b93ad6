pub mod backend;
pub mod dynamo;
pub mod memory;

pub use backend::StorageBackend;
pub use clipper_core::repository::{Repository, Result, UrlRecord};
pub use clipper_core::StorageError;
pub use dynamo::{DynamoConfig, DynamoRepository};
pub use memory::InMemoryRepository;
