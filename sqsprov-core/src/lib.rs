//! Core types for sqsprov
//!
//! This crate holds the provisioning procedure and everything it touches
//! that does not depend on a concrete SQS client.

pub mod attributes;
pub mod control_plane;
pub mod error;
pub mod output;
pub mod provision;

pub use attributes::{QueueAttributes, RedrivePolicy};
pub use control_plane::QueueControlPlane;
pub use error::{ProvisionError, RemoteCallError};
pub use output::{OutputTarget, ProvisioningResult};
pub use provision::{DeadLetterOptions, ProvisionRequest, Provisioner};
