use serde::Deserialize;
use serde_json::Value;

/// Frames the realtime service sends back, keyed by `type`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundFrame {
    ConnectionAck {
        #[serde(rename = "connectionTimeoutMs", default)]
        connection_timeout_ms: Option<u64>,
    },
    Ka,
    PublishSuccess {
        #[serde(default)]
        id: Option<String>,
        #[serde(default)]
        successful: Vec<Value>,
        #[serde(default)]
        failed: Vec<Value>,
    },
    PublishError {
        #[serde(default)]
        id: Option<String>,
        #[serde(default)]
        errors: Vec<FrameError>,
        /// Top-level description some services send instead of `errors`
        #[serde(default)]
        message: Option<String>,
    },
    ConnectionError {
        #[serde(default)]
        errors: Vec<FrameError>,
        /// Top-level description some services send instead of `errors`
        #[serde(default)]
        message: Option<String>,
    },
    Error {
        #[serde(default)]
        id: Option<String>,
        #[serde(default)]
        errors: Vec<FrameError>,
        /// Top-level description some services send instead of `errors`
        #[serde(default)]
        message: Option<String>,
    },
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FrameError {
    #[serde(rename = "errorType", default)]
    pub error_type: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl FrameError {
    /// Join error types, messages and the frame's top-level message into one
    /// line for logging and classification.
    pub fn describe_all(errors: &[FrameError], message: Option<&str>) -> String {
        let mut parts: Vec<String> = errors
            .iter()
            .map(|e| match (&e.error_type, &e.message) {
                (Some(t), Some(m)) => format!("{}: {}", t, m),
                (Some(t), None) => t.clone(),
                (None, Some(m)) => m.clone(),
                (None, None) => String::from("unspecified error"),
            })
            .collect();

        if let Some(message) = message.map(str::trim).filter(|m| !m.is_empty()) {
            parts.push(message.to_string());
        }

        if parts.is_empty() {
            return String::from("unspecified error");
        }
        parts.join("; ")
    }
}
