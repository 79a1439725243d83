use crate::{ConfigError, ConfigErrorResult, ProviderKind};

use herald_core::{Channel, DEFAULT_NAMESPACE};

use serde::Deserialize;

/// Delivery policy and channel naming shared by every provider.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BroadcastConfig {
    /// First segment of every channel name
    pub namespace: String,
    /// Fan out to every available provider instead of falling back in order
    pub broadcast_to_all: bool,
    /// Provider tried first under the fallback policy
    pub primary: ProviderKind,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            namespace: String::from(DEFAULT_NAMESPACE),
            broadcast_to_all: false,
            primary: ProviderKind::default(),
        }
    }
}

impl BroadcastConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        Channel::validate_namespace(&self.namespace)
            .map_err(|e| ConfigError::broadcast(format!("broadcast.namespace: {}", e)))
    }
}
