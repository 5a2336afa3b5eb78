//! Test utilities for sqsprov
//!
//! - [`QueueStore`]: an in-memory control plane that records every call and
//!   can be told to fail creates for a given queue name
//! - [`TestServer`]: the same store behind an SQS JSON-protocol endpoint on a
//!   random local port, for driving the real SDK client
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sqsprov_core::{ProvisionRequest, Provisioner};
//! use sqsprov_test::TestServer;
//!
//! #[tokio::test]
//! async fn test_provision() {
//!     let server = TestServer::start().await.unwrap();
//!     let plane = server.control_plane().await;
//!
//!     Provisioner::new(&plane)
//!         .provision(&ProvisionRequest::new("orders"))
//!         .await
//!         .unwrap();
//!     assert_eq!(server.store().queue_names(), ["orders"]);
//! }
//! ```

pub mod client;
pub mod handlers;
pub mod server;
pub mod storage;

pub use client::client_options;
pub use server::{create_router, TestServer};
pub use storage::{QueueStore, RecordedCall, StoreError};
