//! The queue provisioning procedure

use tracing::{debug, info};

use crate::attributes::{QueueAttributes, RedrivePolicy, QUEUE_ARN};
use crate::control_plane::QueueControlPlane;
use crate::error::ProvisionError;
use crate::output::{OutputTarget, ProvisioningResult};

pub const DEFAULT_MAX_RECEIVE_COUNT: u32 = 5;
pub const DEFAULT_VISIBILITY_TIMEOUT_SECONDS: u32 = 180;
pub const DEFAULT_MESSAGE_RETENTION_SECONDS: u32 = 345_600;

/// Dead-letter queue settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeadLetterOptions {
    pub name: String,
    pub max_receive_count: u32,
}

impl DeadLetterOptions {
    /// Dead-letter options for `main_queue`, named `<main_queue>-dlq`
    pub fn for_queue(main_queue: &str) -> Self {
        Self {
            name: default_dead_letter_name(main_queue),
            max_receive_count: DEFAULT_MAX_RECEIVE_COUNT,
        }
    }
}

pub fn default_dead_letter_name(main_queue: &str) -> String {
    format!("{main_queue}-dlq")
}

/// What to provision
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionRequest {
    pub name: String,
    pub visibility_timeout_seconds: u32,
    pub message_retention_seconds: u32,
    pub dead_letter: Option<DeadLetterOptions>,
}

impl ProvisionRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visibility_timeout_seconds: DEFAULT_VISIBILITY_TIMEOUT_SECONDS,
            message_retention_seconds: DEFAULT_MESSAGE_RETENTION_SECONDS,
            dead_letter: None,
        }
    }

    pub fn with_dead_letter(mut self, dead_letter: DeadLetterOptions) -> Self {
        self.dead_letter = Some(dead_letter);
        self
    }

    pub fn with_visibility_timeout(mut self, seconds: u32) -> Self {
        self.visibility_timeout_seconds = seconds;
        self
    }

    pub fn with_message_retention(mut self, seconds: u32) -> Self {
        self.message_retention_seconds = seconds;
        self
    }

    fn base_attributes(&self) -> QueueAttributes {
        QueueAttributes::base(
            self.visibility_timeout_seconds,
            self.message_retention_seconds,
        )
    }
}

/// Runs a [`ProvisionRequest`] against a control plane.
///
/// Calls are issued one at a time and the first error aborts the run. A
/// dead-letter queue created before a failing main-queue call stays in
/// place; re-running with the same request picks it up again.
pub struct Provisioner<'a, C: ?Sized> {
    plane: &'a C,
}

impl<'a, C> Provisioner<'a, C>
where
    C: QueueControlPlane + ?Sized,
{
    pub fn new(plane: &'a C) -> Self {
        Self { plane }
    }

    pub async fn provision(
        &self,
        request: &ProvisionRequest,
    ) -> Result<ProvisioningResult, ProvisionError> {
        let mut attributes = request.base_attributes();

        let dead_letter = match &request.dead_letter {
            Some(options) => {
                info!(queue = %options.name, "Creating dead-letter queue");
                let url = self
                    .create_queue(&options.name, &request.base_attributes())
                    .await?;
                let arn = self.queue_arn(&url).await?;

                let policy = RedrivePolicy::new(arn.clone(), options.max_receive_count);
                attributes = attributes.with_redrive_policy(&policy)?;
                Some((url, arn))
            }
            None => None,
        };

        info!(queue = %request.name, "Creating queue");
        let queue_url = self.create_queue(&request.name, &attributes).await?;
        let queue_arn = self.queue_arn(&queue_url).await?;

        let result = ProvisioningResult::new(queue_url, queue_arn);
        Ok(match dead_letter {
            Some((url, arn)) => result.with_dead_letter(url, arn),
            None => result,
        })
    }

    /// Provision, then write the result to `target`. Nothing is written
    /// when provisioning fails.
    pub async fn provision_to(
        &self,
        request: &ProvisionRequest,
        target: &OutputTarget,
    ) -> Result<ProvisioningResult, ProvisionError> {
        let result = self.provision(request).await?;
        result.write_to(target)?;
        Ok(result)
    }

    async fn create_queue(
        &self,
        name: &str,
        attributes: &QueueAttributes,
    ) -> Result<String, ProvisionError> {
        debug!(queue = %name, attributes = ?attributes, "CreateQueue");
        let url = self
            .plane
            .create_queue(name, attributes)
            .await
            .map_err(|source| ProvisionError::CreateQueue {
                queue: name.to_string(),
                source,
            })?;

        info!(queue = %name, url = %url, "Queue ready");
        Ok(url)
    }

    async fn queue_arn(&self, queue_url: &str) -> Result<String, ProvisionError> {
        let mut attrs = self
            .plane
            .get_queue_attributes(queue_url, &[QUEUE_ARN])
            .await
            .map_err(|source| ProvisionError::GetQueueAttributes {
                queue_url: queue_url.to_string(),
                source,
            })?;

        attrs
            .remove(QUEUE_ARN)
            .ok_or_else(|| ProvisionError::MissingAttribute {
                queue_url: queue_url.to_string(),
                attribute: QUEUE_ARN,
            })
    }
}
