//! Test server management

use axum::{routing::post, Router};
use std::sync::Arc;
use tokio::{net::TcpListener, task::JoinHandle};
use tracing::{info, warn};

use sqsprov_sqs::SqsControlPlane;

use crate::{client::client_options, handlers::handle_request, storage::QueueStore};

/// Router serving the SQS JSON protocol over `store`
pub fn create_router(store: Arc<QueueStore>) -> Router {
    Router::new()
        .route("/", post(handle_request))
        .with_state(store)
}

/// An SQS endpoint running on a random local port
pub struct TestServer {
    endpoint: String,
    store: Arc<QueueStore>,
    handle: JoinHandle<()>,
}

impl TestServer {
    pub async fn start() -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let endpoint = format!("http://{}", listener.local_addr()?);
        let store = Arc::new(QueueStore::with_endpoint(endpoint.clone()));

        let router = create_router(store.clone());
        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                warn!(error = %e, "Test SQS endpoint stopped");
            }
        });

        info!(endpoint = %endpoint, "Test SQS endpoint listening");
        Ok(Self {
            endpoint,
            store,
            handle,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// The queues and calls behind the endpoint
    pub fn store(&self) -> &QueueStore {
        &self.store
    }

    /// SDK-backed control plane pointed at this server, built the same way
    /// the binary builds it
    pub async fn control_plane(&self) -> SqsControlPlane {
        SqsControlPlane::connect(&client_options(&self.endpoint)).await
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
