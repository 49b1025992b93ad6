use thiserror::Error;

/// Failure to start a fixture or to read its mapped address.
#[derive(Debug, Error)]
pub enum TestInfraError {
    #[error("container fixture failed: {0}")]
    Container(#[from] testcontainers::TestcontainersError),
}

pub type Result<T, E = TestInfraError> = std::result::Result<T, E>;
