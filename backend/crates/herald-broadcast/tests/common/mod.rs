#![allow(dead_code)]

pub mod realtime_server;

use std::time::Duration;

use herald_core::LogRecord;

pub fn record(text: &str) -> LogRecord {
    LogRecord::new(text, "worker-1", "info", "2026-01-01T00:00:00Z")
}

/// Poll `check` until it returns true or `timeout` elapses.
pub async fn eventually<F>(timeout: Duration, mut check: F) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if check() {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
