use std::time::Duration;

use metrics::{counter, gauge, histogram};

/// Metrics recorder for broadcaster activity
#[derive(Clone)]
pub struct Metrics {
    prefix: &'static str,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            prefix: "herald_broadcast",
        }
    }

    /// Event accepted into a batch queue
    pub fn event_queued(&self, broadcaster: &str) {
        counter!(format!("{}.events.queued", self.prefix), "broadcaster" => broadcaster.to_string())
            .increment(1);
    }

    /// Event refused because the broadcaster was unavailable
    pub fn event_rejected(&self, broadcaster: &str) {
        counter!(format!("{}.events.rejected", self.prefix), "broadcaster" => broadcaster.to_string())
            .increment(1);
    }

    /// Frame or request handed to the transport
    pub fn published(&self, broadcaster: &str, events: usize) {
        counter!(format!("{}.publish.sent", self.prefix), "broadcaster" => broadcaster.to_string())
            .increment(1);
        counter!(format!("{}.events.sent", self.prefix), "broadcaster" => broadcaster.to_string())
            .increment(events as u64);
    }

    pub fn publish_failed(&self, broadcaster: &str) {
        counter!(format!("{}.publish.failed", self.prefix), "broadcaster" => broadcaster.to_string())
            .increment(1);
    }

    pub fn ack_received(&self, broadcaster: &str, outcome: &str) {
        counter!(
            format!("{}.acks.{}", self.prefix, outcome),
            "broadcaster" => broadcaster.to_string()
        )
        .increment(1);
    }

    pub fn error_recorded(&self, broadcaster: &str, class: &str) {
        counter!(
            format!("{}.errors.{}", self.prefix, class),
            "broadcaster" => broadcaster.to_string()
        )
        .increment(1);
    }

    pub fn status_changed(&self, broadcaster: &str, status: &str) {
        counter!(
            format!("{}.status.{}", self.prefix, status),
            "broadcaster" => broadcaster.to_string()
        )
        .increment(1);
    }

    pub fn queue_depth(&self, broadcaster: &str, depth: usize) {
        gauge!(format!("{}.queue.depth", self.prefix), "broadcaster" => broadcaster.to_string())
            .set(depth as f64);
    }

    pub fn flush_latency(&self, broadcaster: &str, duration: Duration) {
        histogram!(format!("{}.flush.latency_ms", self.prefix), "broadcaster" => broadcaster.to_string())
            .record(duration.as_millis() as f64);
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
