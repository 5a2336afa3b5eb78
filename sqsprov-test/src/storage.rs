//! In-memory SQS control plane

use async_trait::async_trait;
use dashmap::{mapref::entry::Entry, DashMap};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;
use tracing::{info, warn};

use sqsprov_core::{QueueAttributes, QueueControlPlane, RemoteCallError};

pub const ACCOUNT_ID: &str = "000000000000";
pub const REGION: &str = "us-east-1";
pub const DEFAULT_ENDPOINT: &str = "http://localhost:4566";

const MAX_QUEUE_NAME_LEN: usize = 80;
const FIFO_SUFFIX: &str = ".fifo";

#[derive(Error, Debug, Clone)]
pub enum StoreError {
    #[error("A queue already exists with the same name and a different value for attribute(s) {0}")]
    QueueNameExists(String),
    #[error("The specified queue does not exist: {0}")]
    QueueDoesNotExist(String),
    #[error("Invalid queue name: {0}")]
    InvalidQueueName(String),
    #[error("{}", .0.message)]
    Injected(RemoteCallError),
}

impl StoreError {
    /// SQS error code for this failure
    pub fn code(&self) -> &str {
        match self {
            Self::QueueNameExists(_) => "QueueNameExists",
            Self::QueueDoesNotExist(_) => "QueueDoesNotExist",
            Self::InvalidQueueName(_) => "InvalidParameterValue",
            Self::Injected(err) => err.code.as_deref().unwrap_or("InternalFailure"),
        }
    }
}

impl From<StoreError> for RemoteCallError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Injected(err) => err,
            other => RemoteCallError::new(other.to_string()).with_code(other.code()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Queue {
    pub name: String,
    pub url: String,
    pub arn: String,
    pub created_timestamp: i64,
    attributes: BTreeMap<String, String>,
}

impl Queue {
    fn new(name: &str, endpoint: &str, requested: &QueueAttributes) -> Self {
        let mut attributes: BTreeMap<String, String> = [
            ("DelaySeconds", "0"),
            ("MaximumMessageSize", "262144"),
            ("MessageRetentionPeriod", "345600"),
            ("ReceiveMessageWaitTimeSeconds", "0"),
            ("VisibilityTimeout", "30"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        attributes.extend(requested.iter().map(|(k, v)| (k.to_string(), v.to_string())));

        Self {
            url: format!("{endpoint}/{ACCOUNT_ID}/{name}"),
            arn: format!("arn:aws:sqs:{REGION}:{ACCOUNT_ID}:{name}"),
            name: name.to_string(),
            created_timestamp: chrono::Utc::now().timestamp(),
            attributes,
        }
    }

    /// Configured attributes plus the read-only ones SQS reports
    pub fn attributes(&self) -> BTreeMap<String, String> {
        let mut all = self.attributes.clone();
        all.insert("QueueArn".to_string(), self.arn.clone());
        all.insert(
            "CreatedTimestamp".to_string(),
            self.created_timestamp.to_string(),
        );
        all.insert("ApproximateNumberOfMessages".to_string(), "0".to_string());
        all
    }

    /// Names of requested attributes whose value differs from this queue's
    fn conflicts_with(&self, requested: &QueueAttributes) -> Vec<String> {
        requested
            .iter()
            .filter(|(k, v)| self.attributes.get(*k).map(String::as_str) != Some(*v))
            .map(|(k, _)| k.to_string())
            .collect()
    }
}

/// A control-plane call as it reached the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
    CreateQueue {
        name: String,
        attributes: QueueAttributes,
    },
    GetQueueAttributes {
        queue_url: String,
        attribute_names: Vec<String>,
    },
}

#[derive(Debug)]
pub struct QueueStore {
    endpoint: String,
    queues: DashMap<String, Queue>,
    failures: DashMap<String, RemoteCallError>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl Default for QueueStore {
    fn default() -> Self {
        Self::with_endpoint(DEFAULT_ENDPOINT)
    }
}

impl QueueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose queue URLs are rooted at `endpoint`
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            queues: DashMap::new(),
            failures: DashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Make every create call for `name` fail with `error`
    pub fn fail_create(&self, name: &str, error: RemoteCallError) {
        self.failures.insert(name.to_string(), error);
    }

    pub fn create_queue(&self, name: &str, attributes: &QueueAttributes) -> Result<Queue, StoreError> {
        self.calls.lock().push(RecordedCall::CreateQueue {
            name: name.to_string(),
            attributes: attributes.clone(),
        });

        if let Some(err) = self.failures.get(name) {
            warn!(name = %name, "Failing create by request");
            return Err(StoreError::Injected(err.value().clone()));
        }
        validate_queue_name(name)?;

        match self.queues.entry(name.to_string()) {
            Entry::Occupied(entry) => {
                let conflicts = entry.get().conflicts_with(attributes);
                if conflicts.is_empty() {
                    Ok(entry.get().clone())
                } else {
                    Err(StoreError::QueueNameExists(conflicts.join(", ")))
                }
            }
            Entry::Vacant(entry) => {
                let queue = Queue::new(name, &self.endpoint, attributes);
                info!(name = %name, url = %queue.url, "Creating queue");
                entry.insert(queue.clone());
                Ok(queue)
            }
        }
    }

    pub fn get_queue(&self, name: &str) -> Result<Queue, StoreError> {
        self.queues
            .get(name)
            .map(|q| q.value().clone())
            .ok_or_else(|| StoreError::QueueDoesNotExist(name.to_string()))
    }

    /// Look up attributes by queue URL. `All` selects every attribute.
    pub fn queue_attributes(
        &self,
        queue_url: &str,
        attribute_names: &[String],
    ) -> Result<HashMap<String, String>, StoreError> {
        self.calls.lock().push(RecordedCall::GetQueueAttributes {
            queue_url: queue_url.to_string(),
            attribute_names: attribute_names.to_vec(),
        });

        let queue_name = queue_url.split('/').next_back().unwrap_or(queue_url);
        let queue = self
            .get_queue(queue_name)
            .map_err(|_| StoreError::QueueDoesNotExist(queue_url.to_string()))?;

        let all = attribute_names.iter().any(|n| n == "All");
        Ok(queue
            .attributes()
            .into_iter()
            .filter(|(k, _)| all || attribute_names.contains(k))
            .collect())
    }

    pub fn queue_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.queues.iter().map(|q| q.key().clone()).collect();
        names.sort();
        names
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    /// Create calls in the order they arrived
    pub fn create_calls(&self) -> Vec<(String, QueueAttributes)> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                RecordedCall::CreateQueue { name, attributes } => {
                    Some((name.clone(), attributes.clone()))
                }
                RecordedCall::GetQueueAttributes { .. } => None,
            })
            .collect()
    }
}

fn validate_queue_name(name: &str) -> Result<(), StoreError> {
    let stem = name.strip_suffix(FIFO_SUFFIX).unwrap_or(name);
    let valid = !stem.is_empty()
        && name.len() <= MAX_QUEUE_NAME_LEN
        && stem
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidQueueName(name.to_string()))
    }
}

#[async_trait]
impl QueueControlPlane for QueueStore {
    async fn create_queue(
        &self,
        name: &str,
        attributes: &QueueAttributes,
    ) -> Result<String, RemoteCallError> {
        Ok(QueueStore::create_queue(self, name, attributes)?.url)
    }

    async fn get_queue_attributes(
        &self,
        queue_url: &str,
        attribute_names: &[&str],
    ) -> Result<HashMap<String, String>, RemoteCallError> {
        let names: Vec<String> = attribute_names.iter().map(|n| (*n).to_string()).collect();
        Ok(self.queue_attributes(queue_url, &names)?)
    }
}
