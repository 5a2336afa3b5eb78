//! Queue attribute model

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const VISIBILITY_TIMEOUT: &str = "VisibilityTimeout";
pub const MESSAGE_RETENTION_PERIOD: &str = "MessageRetentionPeriod";
pub const REDRIVE_POLICY: &str = "RedrivePolicy";
pub const QUEUE_ARN: &str = "QueueArn";

/// Redrive policy attached to a main queue.
///
/// Serializes to the compact form SQS expects, keys in this order:
/// `{"deadLetterTargetArn":"...","maxReceiveCount":5}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedrivePolicy {
    pub dead_letter_target_arn: String,
    pub max_receive_count: u32,
}

impl RedrivePolicy {
    pub fn new(dead_letter_target_arn: impl Into<String>, max_receive_count: u32) -> Self {
        Self {
            dead_letter_target_arn: dead_letter_target_arn.into(),
            max_receive_count,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Attribute mapping sent with a create-queue request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueueAttributes {
    entries: BTreeMap<String, String>,
}

impl QueueAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Base attributes shared by main and dead-letter queues
    pub fn base(visibility_timeout_seconds: u32, message_retention_seconds: u32) -> Self {
        Self::new()
            .with(VISIBILITY_TIMEOUT, visibility_timeout_seconds.to_string())
            .with(MESSAGE_RETENTION_PERIOD, message_retention_seconds.to_string())
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.insert(name.into(), value.into());
        self
    }

    pub fn with_redrive_policy(self, policy: &RedrivePolicy) -> Result<Self, serde_json::Error> {
        Ok(self.with(REDRIVE_POLICY, policy.to_json()?))
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<BTreeMap<String, String>> for QueueAttributes {
    fn from(entries: BTreeMap<String, String>) -> Self {
        Self { entries }
    }
}
