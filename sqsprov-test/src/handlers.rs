//! HTTP handlers speaking the SQS JSON protocol
//!
//! Only the two operations provisioning uses are served. Requests are routed
//! on the `X-Amz-Target` header, the way the AWS SDK sends them.

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::Response,
};
use bytes::Bytes;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};

use sqsprov_core::QueueAttributes;

use crate::storage::{QueueStore, StoreError};

const JSON_CONTENT_TYPE: &str = "application/x-amz-json-1.0";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CreateQueueInput {
    queue_name: Option<String>,
    #[serde(default)]
    attributes: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GetQueueAttributesInput {
    queue_url: Option<String>,
    #[serde(default)]
    attribute_names: Vec<String>,
}

/// Handle SQS requests based on X-Amz-Target header
pub async fn handle_request(
    State(store): State<Arc<QueueStore>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let target = headers
        .get("x-amz-target")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    info!(target = %target, "SQS request");

    match target {
        "AmazonSQS.CreateQueue" => handle_create_queue(&store, &body),
        "AmazonSQS.GetQueueAttributes" => handle_get_queue_attributes(&store, &body),
        _ => {
            warn!(target = %target, "Unknown SQS operation");
            error_response(
                StatusCode::BAD_REQUEST,
                "UnknownOperationException",
                &format!("Unknown operation: {target}"),
            )
        }
    }
}

fn handle_create_queue(store: &QueueStore, body: &[u8]) -> Response {
    let input: CreateQueueInput = match serde_json::from_slice(body) {
        Ok(input) => input,
        Err(e) => return malformed(&e),
    };
    let Some(queue_name) = input.queue_name else {
        return error_response(
            StatusCode::BAD_REQUEST,
            "MissingParameter",
            "QueueName is required",
        );
    };

    match store.create_queue(&queue_name, &QueueAttributes::from(input.attributes)) {
        Ok(queue) => json_response(StatusCode::OK, &json!({ "QueueUrl": queue.url })),
        Err(e) => store_error_response(&e),
    }
}

fn handle_get_queue_attributes(store: &QueueStore, body: &[u8]) -> Response {
    let input: GetQueueAttributesInput = match serde_json::from_slice(body) {
        Ok(input) => input,
        Err(e) => return malformed(&e),
    };
    let Some(queue_url) = input.queue_url else {
        return error_response(
            StatusCode::BAD_REQUEST,
            "MissingParameter",
            "QueueUrl is required",
        );
    };

    match store.queue_attributes(&queue_url, &input.attribute_names) {
        Ok(attributes) => json_response(StatusCode::OK, &json!({ "Attributes": attributes })),
        Err(e) => store_error_response(&e),
    }
}

// === JSON Helpers ===

fn malformed(err: &serde_json::Error) -> Response {
    error_response(
        StatusCode::BAD_REQUEST,
        "InvalidParameterValue",
        &format!("Malformed request body: {err}"),
    )
}

fn store_error_response(err: &StoreError) -> Response {
    error_response(StatusCode::BAD_REQUEST, err.code(), &err.to_string())
}

fn json_response(status: StatusCode, body: &Value) -> Response {
    let mut response = Response::new(Body::from(body.to_string()));
    *response.status_mut() = status;
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(JSON_CONTENT_TYPE),
    );
    if let Ok(request_id) = HeaderValue::from_str(&uuid::Uuid::new_v4().to_string()) {
        headers.insert("x-amzn-requestid", request_id);
    }
    response
}

fn error_response(status: StatusCode, code: &str, message: &str) -> Response {
    json_response(
        status,
        &json!({
            "__type": format!("com.amazonaws.sqs#{code}"),
            "message": message,
        }),
    )
}
