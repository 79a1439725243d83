use serde::Serialize;
use uuid::Uuid;

/// Credentials attached to every publish frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Authorization {
    pub host: String,
    #[serde(rename = "x-api-key")]
    pub api_key: String,
}

/// One outbound `publish` message. `events` holds JSON-encoded batch entries.
#[derive(Debug, Clone, Serialize)]
pub struct PublishFrame {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub channel: String,
    pub events: Vec<String>,
    pub authorization: Authorization,
}

impl PublishFrame {
    pub fn new(channel: impl Into<String>, events: Vec<String>, authorization: Authorization) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            kind: "publish",
            channel: channel.into(),
            events,
            authorization,
        }
    }
}

#[derive(Serialize)]
pub(crate) struct ConnectionInit {
    #[serde(rename = "type")]
    kind: &'static str,
}

impl ConnectionInit {
    pub(crate) fn new() -> Self {
        Self {
            kind: "connection_init",
        }
    }
}
