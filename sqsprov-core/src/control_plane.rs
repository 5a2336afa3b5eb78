//! The remote queue control plane seam

use async_trait::async_trait;
use std::collections::HashMap;

use crate::attributes::QueueAttributes;
use crate::error::RemoteCallError;

/// The two control-plane operations provisioning needs.
///
/// Implementations must not retry: every error is returned to the caller as
/// soon as it happens.
#[async_trait]
pub trait QueueControlPlane: Send + Sync {
    /// Create a queue (or return the existing one with identical attributes)
    /// and return its URL.
    async fn create_queue(
        &self,
        name: &str,
        attributes: &QueueAttributes,
    ) -> Result<String, RemoteCallError>;

    /// Fetch the named attributes of the queue at `queue_url`.
    async fn get_queue_attributes(
        &self,
        queue_url: &str,
        attribute_names: &[&str],
    ) -> Result<HashMap<String, String>, RemoteCallError>;
}

