//! Provisioning runs against the in-memory control plane

use sqsprov_core::{
    DeadLetterOptions, OutputTarget, ProvisionError, ProvisionRequest, Provisioner,
    RedrivePolicy, RemoteCallError,
};
use sqsprov_test::QueueStore;

#[tokio::test]
async fn test_main_queue_only() {
    let store = QueueStore::new();

    let result = Provisioner::new(&store)
        .provision(&ProvisionRequest::new("orders"))
        .await
        .unwrap();

    let creates = store.create_calls();
    assert_eq!(creates.len(), 1);
    let (name, attributes) = &creates[0];
    assert_eq!(name, "orders");
    assert_eq!(attributes.len(), 2);
    assert_eq!(attributes.get("VisibilityTimeout"), Some("180"));
    assert_eq!(attributes.get("MessageRetentionPeriod"), Some("345600"));

    let json: serde_json::Value = serde_json::from_str(&result.render().unwrap()).unwrap();
    let keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
    assert_eq!(keys.len(), 2);
    assert_eq!(
        json["existing_queue_url"],
        "http://localhost:4566/000000000000/orders"
    );
    assert_eq!(
        json["existing_queue_arn"],
        "arn:aws:sqs:us-east-1:000000000000:orders"
    );
}

#[tokio::test]
async fn test_with_dead_letter_queue() {
    let store = QueueStore::new();
    let request = ProvisionRequest::new("orders").with_dead_letter(DeadLetterOptions {
        max_receive_count: 3,
        ..DeadLetterOptions::for_queue("orders")
    });

    let result = Provisioner::new(&store).provision(&request).await.unwrap();

    let creates = store.create_calls();
    assert_eq!(creates.len(), 2);
    assert_eq!(creates[0].0, "orders-dlq");
    assert_eq!(creates[0].1.get("RedrivePolicy"), None);
    assert_eq!(creates[1].0, "orders");
    assert_eq!(
        creates[1].1.get("RedrivePolicy"),
        Some(r#"{"deadLetterTargetArn":"arn:aws:sqs:us-east-1:000000000000:orders-dlq","maxReceiveCount":3}"#)
    );

    let json: serde_json::Value = serde_json::from_str(&result.render().unwrap()).unwrap();
    assert_eq!(json.as_object().unwrap().len(), 4);
    assert_eq!(
        json["existing_dlq_arn"],
        "arn:aws:sqs:us-east-1:000000000000:orders-dlq"
    );
    assert_eq!(
        json["existing_dlq_url"],
        "http://localhost:4566/000000000000/orders-dlq"
    );
}

#[tokio::test]
async fn test_custom_dead_letter_name_and_timeouts() {
    let store = QueueStore::new();
    let request = ProvisionRequest::new("payments")
        .with_visibility_timeout(45)
        .with_message_retention(86_400)
        .with_dead_letter(DeadLetterOptions {
            name: "payments-poison".to_string(),
            max_receive_count: 10,
        });

    Provisioner::new(&store).provision(&request).await.unwrap();

    assert_eq!(store.queue_names(), ["payments", "payments-poison"]);
    for (_, attributes) in store.create_calls() {
        assert_eq!(attributes.get("VisibilityTimeout"), Some("45"));
        assert_eq!(attributes.get("MessageRetentionPeriod"), Some("86400"));
    }

    let (_, main) = &store.create_calls()[1];
    let policy: RedrivePolicy =
        serde_json::from_str(main.get("RedrivePolicy").unwrap()).unwrap();
    assert_eq!(
        policy.dead_letter_target_arn,
        "arn:aws:sqs:us-east-1:000000000000:payments-poison"
    );
    assert_eq!(policy.max_receive_count, 10);
}

#[tokio::test]
async fn test_main_queue_failure_leaves_dead_letter_queue() {
    let store = QueueStore::new();
    store.fail_create(
        "orders",
        RemoteCallError::new("Access to the resource is denied").with_code("AccessDenied"),
    );
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("queue.tfvars.json");

    let request =
        ProvisionRequest::new("orders").with_dead_letter(DeadLetterOptions::for_queue("orders"));
    let err = Provisioner::new(&store)
        .provision_to(&request, &OutputTarget::File(out.clone()))
        .await
        .unwrap_err();

    match err {
        ProvisionError::CreateQueue { queue, source } => {
            assert_eq!(queue, "orders");
            assert_eq!(source.code.as_deref(), Some("AccessDenied"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(store.queue_names(), ["orders-dlq"]);
    assert_eq!(store.create_calls().len(), 2);
    assert!(!out.exists());
}

#[tokio::test]
async fn test_provision_to_file() {
    let store = QueueStore::new();
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("queue.tfvars.json");

    let result = Provisioner::new(&store)
        .provision_to(
            &ProvisionRequest::new("orders"),
            &OutputTarget::File(out.clone()),
        )
        .await
        .unwrap();

    let written = std::fs::read_to_string(&out).unwrap();
    assert_eq!(written, format!("{}\n", result.render().unwrap()));
    assert_eq!(store.queue_names(), ["orders"]);
}

#[tokio::test]
async fn test_rerun_reuses_existing_queues() {
    let store = QueueStore::new();
    let request =
        ProvisionRequest::new("orders").with_dead_letter(DeadLetterOptions::for_queue("orders"));

    let first = Provisioner::new(&store).provision(&request).await.unwrap();
    let second = Provisioner::new(&store).provision(&request).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(store.queue_names().len(), 2);
}

#[tokio::test]
async fn test_conflicting_rerun_fails() {
    let store = QueueStore::new();
    Provisioner::new(&store)
        .provision(&ProvisionRequest::new("orders"))
        .await
        .unwrap();

    let err = Provisioner::new(&store)
        .provision(&ProvisionRequest::new("orders").with_visibility_timeout(30))
        .await
        .unwrap_err();

    match err {
        ProvisionError::CreateQueue { source, .. } => {
            assert_eq!(source.code.as_deref(), Some("QueueNameExists"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
