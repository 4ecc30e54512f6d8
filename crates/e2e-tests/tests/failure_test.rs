//! Error-path tests: dropped events, malformed input and unknown codes.

use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;

use e2e_tests::{fixed_vector, TestHarness};
use tasksync_embeddings::MockEmbedder;
use tasksync_stream::StreamMessage;

#[tokio::test(start_paused = true)]
async fn test_counter_counts_only_successful_upserts() {
    let harness = TestHarness::with_embedder(
        MockEmbedder::fixed(fixed_vector()).fail_when_contains("unembeddable"),
    );
    for id in 1..=5 {
        harness.push_upsert(json!({"id": id, "title": format!("Task {}", id)}));
    }
    harness.push_upsert(json!({"id": 6, "title": "unembeddable one"}));
    harness.push_upsert(json!({"id": 7, "title": "unembeddable two"}));

    let report = harness.run_for(true, Duration::from_secs(10)).await;

    let consumer = report.consumer.unwrap();
    assert_eq!(consumer.events_processed(), 5);
    assert_eq!(consumer.failed, 2);
    assert_eq!(harness.index.ids(), vec![1, 2, 3, 4, 5]);
}

#[tokio::test(start_paused = true)]
async fn test_exhausted_embedding_causes_no_mutation() {
    let harness = TestHarness::with_embedder(MockEmbedder::failing());
    harness.push_upsert(json!({"id": 3, "title": "never indexed"}));

    let report = harness.run_for(true, Duration::from_secs(10)).await;

    assert_eq!(report.consumer.unwrap().failed, 1);
    assert!(harness.index.is_empty());
    assert_eq!(harness.index.writes(), 0);
    // Full retry budget spent on the one event
    assert_eq!(harness.embedder.calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_malformed_messages_are_skipped() {
    let harness = TestHarness::new();
    harness.stream.push(StreamMessage::tombstone());
    harness.stream.push_json("{not json");
    harness.stream.push_json(r#"{"payload": {}}"#);
    harness.stream.push_json(r#"{"payload": {"op": "d", "before": null}}"#);
    harness.stream.push_json(r#"{"payload": {"op": "u", "after": null}}"#);
    harness.stream.push_json(r#"{"payload": {"op": "c", "after": {"title": "no id"}}}"#);
    harness.push_upsert(json!({"id": 8, "title": "valid"}));

    let report = harness.run_for(true, Duration::from_secs(3)).await;

    let consumer = report.consumer.unwrap();
    assert_eq!(consumer.skipped, 6);
    assert_eq!(consumer.upserted, 1);
    assert_eq!(harness.index.ids(), vec![8]);
}

#[tokio::test(start_paused = true)]
async fn test_unknown_codes_project_to_absent() {
    let harness = TestHarness::new();
    harness.push_upsert(json!({
        "id": 11,
        "title": "odd codes",
        "priority": 9,
        "status": 42,
        "progress": -1,
        "by_user_id": 0,
        "to_user_id": 12345,
        "target_date": "not a date"
    }));

    harness.run_for(true, Duration::from_secs(3)).await;

    let payload = harness.index.get(11).unwrap().payload;
    assert_eq!(payload.priority, None);
    assert_eq!(payload.status, None);
    assert_eq!(payload.progress, None);
    assert_eq!(payload.assigned_by_name, None);
    assert_eq!(payload.assigned_to_name, None);
    assert_eq!(payload.target_date_ts, None);
}

#[tokio::test(start_paused = true)]
async fn test_wrong_dimension_is_dropped() {
    let harness = TestHarness::with_embedder(MockEmbedder::fixed(vec![1.0, 2.0]));
    harness.push_upsert(json!({"id": 1, "title": "short vector"}));

    let report = harness.run_for(true, Duration::from_secs(3)).await;

    assert_eq!(report.consumer.unwrap().failed, 1);
    assert!(harness.index.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_user_lookup_failure_drops_only_that_event() {
    let harness = TestHarness::new();
    harness.store.fail_lookups(true);
    harness.push_upsert(json!({"id": 1, "by_user_id": 7}));
    harness.push_upsert(json!({"id": 2, "title": "no user refs"}));

    let report = harness.run_for(true, Duration::from_secs(3)).await;

    let consumer = report.consumer.unwrap();
    assert_eq!(consumer.failed, 1);
    assert_eq!(consumer.upserted, 1);
    assert_eq!(harness.index.ids(), vec![2]);
}
