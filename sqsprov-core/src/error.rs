//! Error types for queue provisioning

use std::path::PathBuf;
use thiserror::Error;

/// A failed call against the queue control plane.
///
/// Authentication, authorization, name conflicts, throttling and transport
/// failures all surface as this one type. `code` carries the service error
/// code when the remote side returned one.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{}: {message}", .code.as_deref().unwrap_or("RemoteCallError"))]
pub struct RemoteCallError {
    pub code: Option<String>,
    pub message: String,
}

impl RemoteCallError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

/// Everything that can abort a provisioning run
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("failed to create queue {queue}")]
    CreateQueue {
        queue: String,
        #[source]
        source: RemoteCallError,
    },

    #[error("failed to read attributes of {queue_url}")]
    GetQueueAttributes {
        queue_url: String,
        #[source]
        source: RemoteCallError,
    },

    #[error("attribute {attribute} missing from {queue_url}")]
    MissingAttribute {
        queue_url: String,
        attribute: &'static str,
    },

    #[error("failed to serialize provisioning result")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write {}", .path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
