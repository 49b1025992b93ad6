//! Disposable containers for integration tests.

pub mod dynamodb;
pub mod error;
pub mod redis;

pub use error::{Result, TestInfraError};
