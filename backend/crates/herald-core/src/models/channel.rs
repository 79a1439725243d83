use crate::{CoreError, CoreResult, EventKind};

use std::fmt;
use std::panic::Location;

use error_location::ErrorLocation;

pub const DEFAULT_NAMESPACE: &str = "default";

/// Routing key for published events: `<namespace>/<kind suffix>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Channel(String);

impl Channel {
    /// Build the channel for `kind`. An empty namespace falls back to `"default"`.
    pub fn new(namespace: &str, kind: EventKind) -> Self {
        let namespace = namespace.trim().trim_matches('/');
        let namespace = if namespace.is_empty() {
            DEFAULT_NAMESPACE
        } else {
            namespace
        };

        Self(format!("{}/{}", namespace, kind.channel_suffix()))
    }

    /// Check a namespace is usable as the first channel segment.
    #[track_caller]
    pub fn validate_namespace(namespace: &str) -> CoreResult<()> {
        if namespace.trim().is_empty() {
            return Err(CoreError::InvalidNamespace {
                value: namespace.to_string(),
                message: "must not be empty".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        if let Some(bad) = namespace
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
        {
            return Err(CoreError::InvalidNamespace {
                value: namespace.to_string(),
                message: format!("contains unsupported character '{}'", bad),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok(())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Channel> for String {
    fn from(channel: Channel) -> Self {
        channel.0
    }
}
