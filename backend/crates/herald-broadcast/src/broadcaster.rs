use crate::BroadcasterSnapshot;

use async_trait::async_trait;
use herald_core::LogRecord;
use serde_json::Value;

/// A delivery provider.
///
/// Submission methods never fail loudly: a refused or failed delivery is
/// `false`, with the cause folded into the provider's status and counters.
#[async_trait]
pub trait Broadcaster: Send + Sync {
    fn name(&self) -> &str;

    /// Provider type, e.g. `streaming` or `trigger`.
    fn provider(&self) -> &'static str;

    /// `true` once the record is accepted for delivery. Batching providers
    /// accept on enqueue; synchronous providers only after transmission.
    async fn broadcast_log(&self, record: &LogRecord) -> bool;

    async fn broadcast_admin_event(&self, payload: &Value) -> bool;

    fn is_available(&self) -> bool;

    fn status(&self) -> BroadcasterSnapshot;

    /// Stop background work. Safe to call more than once.
    async fn shutdown(&self) {}
}
