use crate::tests::sample_record;
use crate::{Broadcaster, BroadcasterStatus, ConnectionState, RetryConfig, StreamingBroadcaster};

use googletest::assert_that;
use googletest::prelude::eq;
use herald_config::StreamingConfig;
use serde_json::json;

fn config(endpoint: Option<&str>, api_key: Option<&str>) -> StreamingConfig {
    StreamingConfig {
        endpoint: endpoint.map(str::to_string),
        api_key: api_key.map(str::to_string),
        ..StreamingConfig::default()
    }
}

#[tokio::test]
async fn given_missing_api_key_when_constructed_then_disabled_and_refuses() {
    // Given
    let broadcaster = StreamingBroadcaster::new(
        "streaming",
        "acme",
        &config(Some("https://x-api.example.com"), None),
        RetryConfig::no_retry(),
    );

    // When
    let accepted = broadcaster.broadcast_log(&sample_record("x")).await;

    // Then
    assert_that!(accepted, eq(false));
    assert_that!(broadcaster.status().status, eq(BroadcasterStatus::Disabled));
    assert_that!(broadcaster.queued_events(), eq(0));
}

#[tokio::test]
async fn given_unparseable_endpoint_when_constructed_then_disabled() {
    // Given
    let broadcaster = StreamingBroadcaster::new(
        "streaming",
        "acme",
        &config(Some("https://"), Some("key")),
        RetryConfig::no_retry(),
    );

    // Then
    assert_that!(broadcaster.is_available(), eq(false));
}

#[tokio::test]
async fn given_active_broadcaster_when_enqueued_then_accepted_before_any_connection() {
    // Given
    let broadcaster = StreamingBroadcaster::new(
        "streaming",
        "acme",
        &StreamingConfig {
            batch_interval_ms: 60_000,
            ..config(Some("http://127.0.0.1:9"), Some("key"))
        },
        RetryConfig::no_retry(),
    );

    // When
    let log = broadcaster.broadcast_log(&sample_record("x")).await;
    let admin = broadcaster.broadcast_admin_event(&json!({"a": 1})).await;

    // Then
    assert_that!(log, eq(true));
    assert_that!(admin, eq(true));
    assert_that!(broadcaster.queued_events(), eq(2));
    assert_that!(broadcaster.connection_state(), eq(ConnectionState::Disconnected));

    let details = broadcaster.status().details;
    assert_that!(details["queued_events"].as_u64(), eq(Some(2)));
    assert_that!(details["namespace"].as_str(), eq(Some("acme")));
    assert_that!(
        details["endpoint"].as_str(),
        eq(Some("ws://127.0.0.1:9/event/realtime"))
    );
    assert_that!(details["batch_interval_ms"].as_u64(), eq(Some(60_000)));
    assert_that!(details["running"].as_bool(), eq(Some(true)));
}

#[tokio::test]
async fn given_disabled_broadcaster_when_shutdown_twice_then_no_op() {
    // Given
    let broadcaster = StreamingBroadcaster::new(
        "streaming",
        "acme",
        &config(None, None),
        RetryConfig::no_retry(),
    );

    // When
    broadcaster.shutdown().await;
    broadcaster.shutdown().await;

    // Then
    assert_that!(broadcaster.status().status, eq(BroadcasterStatus::Disabled));
}
