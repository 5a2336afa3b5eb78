//! `QueueControlPlane` over the AWS SDK

use async_trait::async_trait;
use aws_config::{retry::RetryConfig, BehaviorVersion, Region};
use aws_sdk_sqs::{
    config::Credentials,
    error::{DisplayErrorContext, ProvideErrorMetadata, SdkError},
    types::QueueAttributeName,
    Client,
};
use std::collections::HashMap;
use tracing::{debug, info};

use sqsprov_core::{QueueAttributes, QueueControlPlane, RemoteCallError};

/// Where to reach SQS. Unset fields fall back to the ambient AWS
/// configuration (environment, profile files, instance metadata).
#[derive(Debug, Clone, Default)]
pub struct ClientOptions {
    pub region: Option<String>,
    pub endpoint_url: Option<String>,
    /// Static credentials in place of the default provider chain
    pub credentials: Option<Credentials>,
}

/// Control plane backed by a real SQS client
#[derive(Debug, Clone)]
pub struct SqsControlPlane {
    client: Client,
}

impl SqsControlPlane {
    /// Wrap an already configured client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from the ambient AWS configuration with retries disabled
    pub async fn connect(options: &ClientOptions) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .retry_config(RetryConfig::disabled());

        if let Some(region) = &options.region {
            loader = loader.region(Region::new(region.clone()));
        }
        if let Some(endpoint_url) = &options.endpoint_url {
            loader = loader.endpoint_url(endpoint_url);
        }
        if let Some(credentials) = &options.credentials {
            loader = loader.credentials_provider(credentials.clone());
        }

        let config = loader.load().await;
        info!(
            region = config.region().map_or("<unset>", |r| r.as_ref()),
            endpoint_url = options.endpoint_url.as_deref().unwrap_or("<default>"),
            "SQS client configured"
        );

        Self::new(Client::new(&config))
    }
}

#[async_trait]
impl QueueControlPlane for SqsControlPlane {
    async fn create_queue(
        &self,
        name: &str,
        attributes: &QueueAttributes,
    ) -> Result<String, RemoteCallError> {
        let attributes: HashMap<QueueAttributeName, String> = attributes
            .iter()
            .map(|(k, v)| (QueueAttributeName::from(k), v.to_string()))
            .collect();

        let output = self
            .client
            .create_queue()
            .queue_name(name)
            .set_attributes(Some(attributes))
            .send()
            .await
            .map_err(remote_error)?;

        debug!(queue = %name, "CreateQueue succeeded");
        output
            .queue_url()
            .map(str::to_string)
            .ok_or_else(|| RemoteCallError::new("CreateQueue response carried no QueueUrl"))
    }

    async fn get_queue_attributes(
        &self,
        queue_url: &str,
        attribute_names: &[&str],
    ) -> Result<HashMap<String, String>, RemoteCallError> {
        let names = attribute_names
            .iter()
            .map(|name| QueueAttributeName::from(*name))
            .collect();

        let output = self
            .client
            .get_queue_attributes()
            .queue_url(queue_url)
            .set_attribute_names(Some(names))
            .send()
            .await
            .map_err(remote_error)?;

        Ok(output
            .attributes()
            .map(|attrs| {
                attrs
                    .iter()
                    .map(|(k, v)| (k.as_str().to_string(), v.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }
}

/// Collapse an SDK error into the single remote error type, keeping the
/// service error code when there is one.
fn remote_error<E, R>(err: SdkError<E, R>) -> RemoteCallError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    let message = err
        .message()
        .map_or_else(|| DisplayErrorContext(&err).to_string(), str::to_string);

    match err.code() {
        Some(code) => RemoteCallError::new(message).with_code(code),
        None => RemoteCallError::new(message),
    }
}
