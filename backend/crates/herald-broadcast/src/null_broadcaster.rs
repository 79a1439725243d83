use crate::{Broadcaster, BroadcasterSnapshot, BroadcasterStatus};

use async_trait::async_trait;
use herald_core::LogRecord;
use serde_json::{Map, Value};

/// Placeholder registered when no real provider is configured.
/// Always unavailable; every submission is refused.
pub struct NullBroadcaster {
    name: String,
}

impl NullBroadcaster {
    pub fn new() -> Self {
        Self {
            name: String::from("null"),
        }
    }
}

impl Default for NullBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Broadcaster for NullBroadcaster {
    fn name(&self) -> &str {
        &self.name
    }

    fn provider(&self) -> &'static str {
        "null"
    }

    async fn broadcast_log(&self, _record: &LogRecord) -> bool {
        log::debug!("Null broadcaster dropped log record");
        false
    }

    async fn broadcast_admin_event(&self, _payload: &Value) -> bool {
        log::debug!("Null broadcaster dropped admin event");
        false
    }

    fn is_available(&self) -> bool {
        false
    }

    fn status(&self) -> BroadcasterSnapshot {
        BroadcasterSnapshot {
            name: self.name.clone(),
            provider: self.provider().to_string(),
            status: BroadcasterStatus::Disabled,
            available: false,
            message_count: 0,
            error_count: 0,
            details: Map::new(),
        }
    }
}
