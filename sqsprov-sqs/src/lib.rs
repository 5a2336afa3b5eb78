//! Amazon SQS control plane for sqsprov
//!
//! Provides a [`QueueControlPlane`](sqsprov_core::QueueControlPlane) backed
//! by `aws-sdk-sqs`, configured from the ambient AWS environment with
//! optional region and endpoint overrides.

mod client;

pub use client::{ClientOptions, SqsControlPlane};
