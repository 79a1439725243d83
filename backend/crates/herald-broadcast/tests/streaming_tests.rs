mod common;

use common::realtime_server::{RealtimeServer, Reply};
use common::{eventually, record};

use std::time::{Duration, Instant};

use herald_broadcast::{
    Broadcaster, BroadcasterStatus, ConnectionState, RetryConfig, StreamingBroadcaster,
};
use herald_config::StreamingConfig;
use serde_json::{Value, json};

const WAIT: Duration = Duration::from_secs(5);

fn broadcaster(endpoint: &str, namespace: &str, batch_interval_ms: u64) -> StreamingBroadcaster {
    let config = StreamingConfig {
        endpoint: Some(endpoint.to_string()),
        api_key: Some("test-api-key".to_string()),
        region: Some("local-1".to_string()),
        batch_interval_ms,
        connect_timeout_secs: 2,
        ..StreamingConfig::default()
    };
    StreamingBroadcaster::new("streaming", namespace, &config, RetryConfig::no_retry())
}

fn decode_events(frame: &Value) -> Vec<Value> {
    frame["events"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| serde_json::from_str(e.as_str().unwrap()).unwrap())
        .collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn given_namespace_acme_when_log_broadcast_then_one_publish_frame_on_logs_channel() {
    // Given
    let server = RealtimeServer::start(Reply::Success).await;
    let broadcaster = broadcaster(&server.endpoint(), "acme", 50);

    // When
    let accepted = broadcaster.broadcast_log(&record("hi")).await;

    // Then
    assert!(accepted);
    assert!(eventually(WAIT, || server.publishes().len() == 1).await);

    let frame = &server.publishes()[0];
    assert_eq!(frame["type"], "publish");
    assert_eq!(frame["channel"], "acme/logs");
    assert_eq!(frame["authorization"]["host"], json!(server.host()));
    assert_eq!(frame["authorization"]["x-api-key"], "test-api-key");

    let events = decode_events(frame);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["event"], "log");
    assert_eq!(events[0]["data"]["text"], "hi");
    assert_eq!(events[0]["data"]["threadId"], "worker-1");

    let protocols = server.protocols();
    assert!(protocols.iter().any(|p| p == "aws-appsync-event-ws"));
    assert!(protocols.iter().any(|p| p.starts_with("header-")));

    broadcaster.shutdown().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn given_three_entries_before_flush_when_flushed_then_single_frame_in_order() {
    // Given
    let server = RealtimeServer::start(Reply::Success).await;
    let broadcaster = broadcaster(&server.endpoint(), "acme", 300);

    // When
    for text in ["e1", "e2", "e3"] {
        assert!(broadcaster.broadcast_log(&record(text)).await);
    }

    // Then
    assert!(eventually(WAIT, || server.publishes().len() == 1).await);
    let texts: Vec<String> = decode_events(&server.publishes()[0])
        .iter()
        .map(|e| e["data"]["text"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(texts, vec!["e1", "e2", "e3"]);

    broadcaster.shutdown().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn given_admin_event_when_flushed_then_run_event_on_admin_channel() {
    // Given
    let server = RealtimeServer::start(Reply::Success).await;
    let broadcaster = broadcaster(&server.endpoint(), "ops", 50);

    // When
    assert!(broadcaster.broadcast_admin_event(&json!({"runId": "r-9"})).await);

    // Then
    assert!(eventually(WAIT, || server.publishes().len() == 1).await);
    let frame = &server.publishes()[0];
    assert_eq!(frame["channel"], "ops/admin");
    let events = decode_events(frame);
    assert_eq!(events[0]["event"], "run_event");
    assert_eq!(events[0]["data"]["runId"], "r-9");

    broadcaster.shutdown().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn given_seven_pending_entries_when_shutdown_then_drained_as_five_and_two() {
    // Given
    let server = RealtimeServer::start(Reply::Success).await;
    let broadcaster = broadcaster(&server.endpoint(), "acme", 60_000);
    for n in 0..7 {
        assert!(broadcaster.broadcast_log(&record(&format!("m{}", n))).await);
    }
    assert!(server.publishes().is_empty());

    // When
    broadcaster.shutdown().await;

    // Then
    assert!(eventually(WAIT, || server.publishes().len() == 2).await);
    let sizes: Vec<usize> = server
        .publishes()
        .iter()
        .map(|f| f["events"].as_array().unwrap().len())
        .collect();
    assert_eq!(sizes, vec![5, 2]);

    assert_eq!(broadcaster.queued_events(), 0);
    assert_eq!(broadcaster.connection_state(), ConnectionState::Disconnected);
    assert!(!broadcaster.is_available());
    assert!(!broadcaster.broadcast_log(&record("late")).await);
    assert_eq!(broadcaster.status().details["running"], false);

    // Second shutdown is a no-op
    broadcaster.shutdown().await;
    assert_eq!(broadcaster.status().message_count, 7);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn given_successful_publishes_when_acknowledged_then_in_flight_table_empties() {
    // Given
    let server = RealtimeServer::start(Reply::Success).await;
    let broadcaster = broadcaster(&server.endpoint(), "acme", 50);

    // When
    assert!(broadcaster.broadcast_log(&record("ack me")).await);

    // Then
    assert!(eventually(WAIT, || broadcaster.status().message_count == 1).await);
    assert!(eventually(WAIT, || broadcaster.in_flight_publishes() == 0).await);
    assert_eq!(broadcaster.connection_state(), ConnectionState::Connected);
    assert_eq!(broadcaster.status().error_count, 0);
    assert_eq!(server.connections(), 1);

    broadcaster.shutdown().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn given_throttling_publish_error_when_flushed_then_limit_reached() {
    // Given
    let server = RealtimeServer::start(Reply::Error("ThrottlingException", "Rate exceeded")).await;
    let broadcaster = broadcaster(&server.endpoint(), "acme", 50);

    // When
    assert!(broadcaster.broadcast_log(&record("too much")).await);

    // Then
    assert!(
        eventually(WAIT, || broadcaster.status().status == BroadcasterStatus::LimitReached).await
    );
    assert!(!broadcaster.is_available());
    assert!(!broadcaster.broadcast_log(&record("refused")).await);

    broadcaster.shutdown().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn given_generic_publish_error_when_flushed_then_error_counted_but_still_active() {
    // Given
    let server = RealtimeServer::start(Reply::Error("BadRequestException", "Invalid payload")).await;
    let broadcaster = broadcaster(&server.endpoint(), "acme", 50);

    // When
    assert!(broadcaster.broadcast_log(&record("bad")).await);

    // Then
    assert!(eventually(WAIT, || broadcaster.status().error_count == 1).await);
    assert_eq!(broadcaster.status().status, BroadcasterStatus::Active);

    broadcaster.shutdown().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn given_failed_entries_in_success_frame_when_acknowledged_then_one_error_recorded() {
    // Given
    let server = RealtimeServer::start(Reply::PartialFailure).await;
    let broadcaster = broadcaster(&server.endpoint(), "acme", 50);

    // When
    assert!(broadcaster.broadcast_log(&record("a")).await);
    assert!(broadcaster.broadcast_log(&record("b")).await);

    // Then
    assert!(eventually(WAIT, || broadcaster.status().error_count == 1).await);
    assert!(broadcaster.is_available());

    broadcaster.shutdown().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn given_unreachable_endpoint_when_flushed_then_error_recorded_and_disconnected() {
    // Given
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let endpoint = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);
    let broadcaster = broadcaster(&endpoint, "acme", 50);

    // When
    assert!(broadcaster.broadcast_log(&record("lost")).await);

    // Then
    assert!(eventually(WAIT, || broadcaster.status().error_count >= 1).await);
    assert_eq!(broadcaster.connection_state(), ConnectionState::Disconnected);
    assert_eq!(broadcaster.status().message_count, 0);

    broadcaster.shutdown().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn given_rate_limit_in_top_level_message_when_flushed_then_limit_reached() {
    // Given
    let server = RealtimeServer::start(Reply::ErrorMessage("Rate limit exceeded")).await;
    let broadcaster = broadcaster(&server.endpoint(), "acme", 50);

    // When
    assert!(broadcaster.broadcast_log(&record("too much")).await);

    // Then
    assert!(
        eventually(WAIT, || broadcaster.status().status == BroadcasterStatus::LimitReached).await
    );
    assert_eq!(broadcaster.in_flight_publishes(), 0);

    broadcaster.shutdown().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn given_connect_in_progress_when_log_broadcast_then_enqueue_returns_promptly() {
    // Given
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let endpoint = format!("http://{}", listener.local_addr().unwrap());
    // Accept TCP but never answer the websocket handshake.
    let stalled = tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((stream, _)) = listener.accept().await {
            held.push(stream);
        }
    });
    let broadcaster = broadcaster(&endpoint, "acme", 50);
    assert!(broadcaster.broadcast_log(&record("first")).await);
    assert!(
        eventually(WAIT, || broadcaster.connection_state() == ConnectionState::Connecting).await
    );

    // When
    let started = Instant::now();
    let accepted = broadcaster.broadcast_log(&record("second")).await;
    let elapsed = started.elapsed();

    // Then
    assert!(accepted);
    assert!(
        elapsed < Duration::from_millis(500),
        "enqueue waited {:?} behind the connect",
        elapsed
    );
    assert_eq!(broadcaster.queued_events(), 1);

    broadcaster.shutdown().await;
    stalled.abort();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn given_unacknowledged_publish_when_shutdown_then_in_flight_table_cleared() {
    // Given
    let server = RealtimeServer::start(Reply::Silent).await;
    let broadcaster = broadcaster(&server.endpoint(), "acme", 50);
    assert!(broadcaster.broadcast_log(&record("no ack")).await);
    assert!(eventually(WAIT, || broadcaster.in_flight_publishes() == 1).await);
    assert_eq!(broadcaster.status().details["in_flight_publishes"], 1);

    // When
    broadcaster.shutdown().await;

    // Then
    assert_eq!(broadcaster.in_flight_publishes(), 0);
    assert_eq!(broadcaster.status().details["in_flight_publishes"], 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn given_socket_dropped_before_ack_when_reader_notices_then_in_flight_table_cleared() {
    // Given
    let server = RealtimeServer::start(Reply::Disconnect).await;
    let broadcaster = broadcaster(&server.endpoint(), "acme", 50);

    // When
    assert!(broadcaster.broadcast_log(&record("lost ack")).await);

    // Then
    assert!(eventually(WAIT, || server.publishes().len() == 1).await);
    assert!(
        eventually(WAIT, || broadcaster.connection_state() == ConnectionState::Disconnected).await
    );
    assert!(eventually(WAIT, || broadcaster.in_flight_publishes() == 0).await);
    assert_eq!(broadcaster.status().message_count, 1);

    broadcaster.shutdown().await;
}
