use crate::{ConfigError, ConfigErrorResult};

use serde::Deserialize;

pub const MIN_TRIGGER_TIMEOUT_SECS: u64 = 1;
pub const MAX_TRIGGER_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_TRIGGER_TIMEOUT_SECS: u64 = 10;

/// Settings for the synchronous HTTP trigger publisher.
///
/// `app_id`, `key`, `secret` and `cluster` are all required for the
/// provider to become active.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TriggerConfig {
    pub enabled: bool,
    pub app_id: Option<String>,
    pub key: Option<String>,
    pub secret: Option<String>,
    pub cluster: Option<String>,
    /// Overrides the base URL derived from `cluster`
    pub endpoint: Option<String>,
    pub timeout_secs: u64,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            app_id: None,
            key: None,
            secret: None,
            cluster: None,
            endpoint: None,
            timeout_secs: DEFAULT_TRIGGER_TIMEOUT_SECS,
        }
    }
}

impl TriggerConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if !(MIN_TRIGGER_TIMEOUT_SECS..=MAX_TRIGGER_TIMEOUT_SECS).contains(&self.timeout_secs) {
            return Err(ConfigError::trigger(format!(
                "trigger.timeout_secs must be {}-{}, got {}",
                MIN_TRIGGER_TIMEOUT_SECS, MAX_TRIGGER_TIMEOUT_SECS, self.timeout_secs
            )));
        }

        if let Some(endpoint) = self.endpoint.as_deref()
            && !(endpoint.starts_with("http://") || endpoint.starts_with("https://"))
        {
            return Err(ConfigError::trigger(format!(
                "trigger.endpoint must be an http(s) URL, got {}",
                endpoint
            )));
        }

        Ok(())
    }

    /// Names of required settings that are missing or blank.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("app_id", &self.app_id),
            ("key", &self.key),
            ("secret", &self.secret),
            ("cluster", &self.cluster),
        ]
        .into_iter()
        .filter(|(_, value)| value.as_deref().is_none_or(|v| v.trim().is_empty()))
        .map(|(name, _)| name)
        .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// Base URL for the trigger REST API.
    pub fn base_url(&self) -> Option<String> {
        if let Some(endpoint) = self.endpoint.as_deref() {
            return Some(endpoint.trim_end_matches('/').to_string());
        }
        self.cluster
            .as_deref()
            .map(|cluster| format!("https://api-{}.pusher.com", cluster.trim()))
    }
}
