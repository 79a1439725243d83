use crate::BroadcasterStatus;

use serde::Serialize;
use serde_json::{Map, Value};

/// Point-in-time view of one broadcaster.
#[derive(Debug, Clone, Serialize)]
pub struct BroadcasterSnapshot {
    pub name: String,
    pub provider: String,
    pub status: BroadcasterStatus,
    pub available: bool,
    pub message_count: u64,
    pub error_count: u64,
    /// Provider specific fields
    pub details: Map<String, Value>,
}
