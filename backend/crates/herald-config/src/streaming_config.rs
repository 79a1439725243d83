use crate::{ConfigError, ConfigErrorResult};

use serde::Deserialize;

// Flush interval constraints (milliseconds)
pub const MIN_BATCH_INTERVAL_MS: u64 = 10;
pub const MAX_BATCH_INTERVAL_MS: u64 = 60_000;
pub const DEFAULT_BATCH_INTERVAL_MS: u64 = 200;

// Connect timeout constraints (seconds)
pub const MIN_CONNECT_TIMEOUT_SECS: u64 = 1;
pub const MAX_CONNECT_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Settings for the persistent realtime (WebSocket) publisher.
///
/// `endpoint` and `api_key` are required for the provider to become active.
/// Their absence is not a validation error: the provider starts `Disabled`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StreamingConfig {
    pub enabled: bool,
    /// HTTP or realtime URL of the events API
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub region: Option<String>,
    pub batch_interval_ms: u64,
    pub connect_timeout_secs: u64,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: None,
            api_key: None,
            region: None,
            batch_interval_ms: DEFAULT_BATCH_INTERVAL_MS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
        }
    }
}

impl StreamingConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if !(MIN_BATCH_INTERVAL_MS..=MAX_BATCH_INTERVAL_MS).contains(&self.batch_interval_ms) {
            return Err(ConfigError::streaming(format!(
                "streaming.batch_interval_ms must be {}-{}, got {}",
                MIN_BATCH_INTERVAL_MS, MAX_BATCH_INTERVAL_MS, self.batch_interval_ms
            )));
        }

        if !(MIN_CONNECT_TIMEOUT_SECS..=MAX_CONNECT_TIMEOUT_SECS)
            .contains(&self.connect_timeout_secs)
        {
            return Err(ConfigError::streaming(format!(
                "streaming.connect_timeout_secs must be {}-{}, got {}",
                MIN_CONNECT_TIMEOUT_SECS, MAX_CONNECT_TIMEOUT_SECS, self.connect_timeout_secs
            )));
        }

        Ok(())
    }

    /// Names of required settings that are missing or blank.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if is_blank(&self.endpoint) {
            missing.push("endpoint");
        }
        if is_blank(&self.api_key) {
            missing.push("api_key");
        }
        missing
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(|v| v.trim().is_empty())
}
