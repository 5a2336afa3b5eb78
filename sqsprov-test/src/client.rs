//! Client options for a local endpoint

use aws_sdk_sqs::config::Credentials;
use sqsprov_sqs::ClientOptions;

use crate::storage::REGION;

/// Options pointing the production client at `endpoint` with static test
/// credentials
pub fn client_options(endpoint: &str) -> ClientOptions {
    ClientOptions {
        region: Some(REGION.to_string()),
        endpoint_url: Some(endpoint.to_string()),
        credentials: Some(Credentials::new("test", "test", None, None, "test")),
    }
}
