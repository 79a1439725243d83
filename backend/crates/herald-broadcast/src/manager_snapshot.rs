use crate::BroadcasterSnapshot;

use serde::Serialize;

/// Aggregated view over every registered broadcaster.
#[derive(Debug, Clone, Serialize)]
pub struct ManagerSnapshot {
    pub primary: Option<String>,
    pub primary_available: bool,
    pub total_broadcasters: usize,
    pub available_broadcasters: usize,
    pub broadcast_to_all: bool,
    pub broadcasters: Vec<BroadcasterSnapshot>,
}
