use chrono::{DateTime, TimeZone, Utc};
use httpmock::prelude::*;
use serde_json::json;
use snapttl_compute::operation::CREATE_SNAPSHOT_METADATA_TYPE;
use snapttl_compute::ComputeError;
use snapttl_core::naming::describe_expiration;
use snapttl_core::CoreError;
use snapttl_handler::{
    disposition, Disposition, HandlerConfig, HandlerError, MessageQueueEvent, SnapshotHandler,
};

const TOKEN_PATH: &str = "/computeMetadata/v1/instance/service-accounts/default/token";
const JOB_BODY: &str = r#"{"folder_id":"b1g-folder","disk_id":"disk-xyz","disk_name":"web-01"}"#;

fn reference_time() -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000, 0).unwrap()
}

fn config_for(server: &MockServer, extra: &[(&str, &str)]) -> HandlerConfig {
    let base = server.base_url();
    HandlerConfig::from_lookup(|key| {
        if let Some((_, value)) = extra.iter().find(|(k, _)| *k == key) {
            return Some(value.to_string());
        }
        match key {
            "TTL" => Some("3600".to_string()),
            "COMPUTE_ENDPOINT" | "OPERATION_ENDPOINT" | "METADATA_ENDPOINT" => Some(base.clone()),
            "OPERATION_POLL_INTERVAL_MS" => Some("10".to_string()),
            _ => None,
        }
    })
    .unwrap()
}

fn static_token_handler(server: &MockServer, extra: &[(&str, &str)]) -> SnapshotHandler {
    let mut pairs = vec![("YC_IAM_TOKEN", "t1.static")];
    pairs.extend_from_slice(extra);
    SnapshotHandler::from_config(config_for(server, &pairs))
}

fn snapshot_operation(done: bool) -> serde_json::Value {
    json!({
        "id": "fd8op",
        "description": "Create snapshot",
        "createdAt": "2023-11-14T22:13:20Z",
        "done": done,
        "metadata": {
            "@type": CREATE_SNAPSHOT_METADATA_TYPE,
            "snapshotId": "snap-abc",
            "diskId": "disk-xyz"
        }
    })
}

// === End-to-end success with instance credentials ===
#[tokio::test]
async fn creates_snapshot_with_expiration_label() {
    let server = MockServer::start_async().await;

    let token = server.mock(|when, then| {
        when.method(GET)
            .path(TOKEN_PATH)
            .header("Metadata-Flavor", "Google");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({"access_token": "t1.instance", "expires_in": 43200}));
    });
    let create = server.mock(|when, then| {
        when.method(POST)
            .path("/compute/v1/snapshots")
            .header("authorization", "Bearer t1.instance")
            .json_body(json!({
                "folderId": "b1g-folder",
                "diskId": "disk-xyz",
                "name": "snapshot-1700003600-web-01",
                "description": describe_expiration(1_700_003_600),
                "labels": {"expiration_ts": "1700003600"}
            }));
        then.status(200)
            .header("content-type", "application/json")
            .json_body(snapshot_operation(false));
    });
    let poll = server.mock(|when, then| {
        when.method(GET)
            .path("/operations/fd8op")
            .header("authorization", "Bearer t1.instance");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(snapshot_operation(true));
    });

    let handler = SnapshotHandler::from_config(config_for(&server, &[]));
    let result = handler
        .handle_at(&MessageQueueEvent::single(JOB_BODY), reference_time())
        .await;
    assert_eq!(disposition(&result), Disposition::Acknowledge);

    let resp = result.unwrap();
    assert_eq!(resp.status_code, 200);
    assert_eq!(resp.body, "Created snapshot snap-abc from disk disk-xyz");
    token.assert();
    create.assert();
    poll.assert();
}

// === The create call is refused synchronously ===
#[tokio::test]
async fn refused_create_is_acknowledged_with_error_text() {
    let server = MockServer::start_async().await;
    server.mock(|when, then| {
        when.method(POST).path("/compute/v1/snapshots");
        then.status(403)
            .header("content-type", "application/json")
            .json_body(json!({"code": 7, "message": "Permission denied to folder b1g-folder"}));
    });

    let handler = static_token_handler(&server, &[]);
    let resp = handler
        .handle_at(&MessageQueueEvent::single(JOB_BODY), reference_time())
        .await
        .unwrap();

    assert_eq!(resp.status_code, 200);
    assert!(resp.body.starts_with("Error create snapshot"));
    assert!(resp.body.contains("Permission denied"));
}

// === The operation finishes with an error ===
#[tokio::test]
async fn failed_operation_is_acknowledged_with_its_error() {
    let server = MockServer::start_async().await;
    server.mock(|when, then| {
        when.method(POST).path("/compute/v1/snapshots");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(snapshot_operation(false));
    });
    server.mock(|when, then| {
        when.method(GET).path("/operations/fd8op");
        let mut op = snapshot_operation(true);
        op["error"] = json!({"code": 8, "message": "Quota limit snapshots.count exceeded"});
        then.status(200)
            .header("content-type", "application/json")
            .json_body(op);
    });

    let handler = static_token_handler(&server, &[]);
    let resp = handler
        .handle_at(&MessageQueueEvent::single(JOB_BODY), reference_time())
        .await
        .unwrap();

    assert_eq!(resp.status_code, 200);
    assert_eq!(
        resp.body,
        "Failed to create snapshot: code 8: Quota limit snapshots.count exceeded"
    );
}

// === Opt-in redelivery of snapshot failures ===
#[tokio::test]
async fn redeliver_policy_fails_invocation_on_refused_create() {
    let server = MockServer::start_async().await;
    server.mock(|when, then| {
        when.method(POST).path("/compute/v1/snapshots");
        then.status(429)
            .json_body(json!({"code": 8, "message": "Too many requests"}));
    });

    let handler = static_token_handler(&server, &[("SNAPSHOT_FAILURE_POLICY", "redeliver")]);
    let result = handler
        .handle_at(&MessageQueueEvent::single(JOB_BODY), reference_time())
        .await;

    assert_eq!(disposition(&result), Disposition::Redeliver);
    assert!(matches!(result, Err(HandlerError::SnapshotFailed(ref msg)) if msg.contains("Too many requests")));
}

// === Metadata of the wrong type is an error, not a guess ===
#[tokio::test]
async fn unexpected_metadata_type_fails_invocation() {
    let server = MockServer::start_async().await;
    server.mock(|when, then| {
        when.method(POST).path("/compute/v1/snapshots");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({
                "id": "fd8op",
                "done": true,
                "metadata": {
                    "@type": "type.googleapis.com/yandex.cloud.compute.v1.CreateImageMetadata",
                    "imageId": "fd8img"
                }
            }));
    });

    let handler = static_token_handler(&server, &[]);
    let err = handler
        .handle_at(&MessageQueueEvent::single(JOB_BODY), reference_time())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        HandlerError::Operation(ComputeError::UnexpectedMetadata { .. })
    ));
}

// === Credentials cannot be obtained ===
#[tokio::test]
async fn credential_failure_fails_invocation() {
    let server = MockServer::start_async().await;
    server.mock(|when, then| {
        when.method(GET).path(TOKEN_PATH);
        then.status(500);
    });

    let handler = SnapshotHandler::from_config(config_for(&server, &[]));
    let result = handler
        .handle_at(&MessageQueueEvent::single(JOB_BODY), reference_time())
        .await;

    assert_eq!(disposition(&result), Disposition::Redeliver);
    assert!(matches!(result, Err(HandlerError::Credentials(_))));
}

// === Malformed job body never reaches the network ===
#[tokio::test]
async fn malformed_body_fails_before_any_call() {
    // No mocks: any request would come back 404 and surface as a different error.
    let server = MockServer::start_async().await;
    let handler = SnapshotHandler::from_config(config_for(&server, &[]));

    let err = handler
        .handle_at(
            &MessageQueueEvent::single(r#"{"folder_id":"b1g-folder","disk_id":"disk-xyz"}"#),
            reference_time(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, HandlerError::Core(CoreError::Decode(_))));
}

// === Full trigger payload, long disk name ===
#[tokio::test]
async fn trigger_event_with_long_disk_name_is_truncated() {
    let server = MockServer::start_async().await;
    let long_name = "postgres-primary-replica-in-ru-central1-a-with-a-very-long-suffix";
    let expected_name = &format!("snapshot-1700003600-{long_name}")[..63];

    let create = server.mock(|when, then| {
        when.method(POST)
            .path("/compute/v1/snapshots")
            .json_body(json!({
                "folderId": "b1g-folder",
                "diskId": "disk-xyz",
                "name": expected_name,
                "description": describe_expiration(1_700_003_600),
                "labels": {"expiration_ts": "1700003600"}
            }));
        then.status(200)
            .header("content-type", "application/json")
            .json_body(snapshot_operation(true));
    });

    let body = json!({"folder_id": "b1g-folder", "disk_id": "disk-xyz", "disk_name": long_name});
    let event = MessageQueueEvent::from_json(
        &json!({
            "messages": [{
                "event_metadata": {
                    "event_id": "cce76685",
                    "event_type": "yandex.cloud.events.messagequeue.QueueMessage",
                    "created_at": "2023-11-14T22:13:20Z",
                    "cloud_id": "b1gcloud",
                    "folder_id": "b1g-folder"
                },
                "details": {
                    "queue_id": "yrn:yc:ymq:ru-central1:b1g-folder:snapshot-jobs",
                    "message": {"message_id": "m1", "body": body.to_string()}
                }
            }]
        })
        .to_string(),
    )
    .unwrap();

    let handler = static_token_handler(&server, &[]);
    let resp = handler.handle_at(&event, reference_time()).await.unwrap();

    assert_eq!(resp.body, "Created snapshot snap-abc from disk disk-xyz");
    create.assert();
}
