pub mod broadcaster;
pub mod broadcaster_manager;
pub mod broadcaster_snapshot;
pub mod broadcaster_status;
pub mod error;
pub mod error_class;
pub mod manager_snapshot;
pub mod metrics;
pub mod null_broadcaster;
pub mod retry;
pub mod shutdown_coordinator;
pub mod shutdown_guard;
pub mod status_tracker;
pub mod streaming;
pub mod trigger;

pub use broadcaster::Broadcaster;
pub use broadcaster_manager::BroadcasterManager;
pub use broadcaster_snapshot::BroadcasterSnapshot;
pub use broadcaster_status::BroadcasterStatus;
pub use error::{BroadcastError, Result};
pub use error_class::{
    ErrorClass, RATE_LIMIT_STATUS_CODES, STREAMING_RATE_LIMIT_KEYWORDS,
    TRIGGER_RATE_LIMIT_KEYWORDS,
};
pub use manager_snapshot::ManagerSnapshot;
pub use metrics::Metrics;
pub use null_broadcaster::NullBroadcaster;
pub use retry::{IsRetryable, RetryConfig, with_retry};
pub use shutdown_coordinator::ShutdownCoordinator;
pub use shutdown_guard::ShutdownGuard;
pub use status_tracker::{ERROR_THRESHOLD, StatusTracker};
pub use streaming::{
    BatchEntry, BatchQueue, ConnectionState, InboundFrame, MAX_EVENTS_PER_PUBLISH, PublishFrame,
    RealtimeEndpoint, StreamingBroadcaster,
};
pub use trigger::{
    AUTH_VERSION, HttpTriggerTransport, RequestSignature, TriggerBroadcaster, TriggerRequest,
    TriggerTransport,
};

#[cfg(test)]
mod tests;

use tracing::info_span;

/// Span wrapping one flush cycle of a batching provider.
pub fn create_flush_span(broadcaster: &str, queued: usize) -> tracing::Span {
    info_span!("broadcast_flush", broadcaster = %broadcaster, queued = queued)
}
