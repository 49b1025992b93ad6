use crate::Result;
use testcontainers::core::{IntoContainerPort, WaitFor};
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, GenericImage};
use typed_builder::TypedBuilder;

const DYNAMODB_PORT: u16 = 8000;

#[derive(TypedBuilder)]
pub struct DynamoDbConfig {
    #[builder(default = "2.5.4".to_string(), setter(into))]
    tag: String,
}

/// Test fixture for a disposable DynamoDB Local server.
pub struct DynamoDbLocal {
    container: ContainerAsync<GenericImage>,
}

impl DynamoDbLocal {
    /// Starts an in-memory DynamoDB Local container.
    pub async fn new(config: DynamoDbConfig) -> Result<Self> {
        let container = GenericImage::new("amazon/dynamodb-local", &config.tag)
            .with_exposed_port(DYNAMODB_PORT.tcp())
            .with_wait_for(WaitFor::message_on_stdout("Initializing DynamoDB Local"))
            .start()
            .await?;

        Ok(Self { container })
    }

    pub async fn host(&self) -> Result<String> {
        let host = self.container.get_host().await?.to_string();
        Ok(match host.as_str() {
            "localhost" => String::from("127.0.0.1"),
            _ => host,
        })
    }

    pub async fn port(&self) -> Result<u16> {
        Ok(self.container.get_host_port_ipv4(DYNAMODB_PORT).await?)
    }

    /// Endpoint to point an SDK client at.
    pub async fn endpoint_url(&self) -> Result<String> {
        let host = self.host().await?;
        let port = self.port().await?;
        Ok(format!("http://{host}:{port}"))
    }

    /// Returns the underlying container reference.
    pub fn container(&self) -> &ContainerAsync<GenericImage> {
        &self.container
    }
}
