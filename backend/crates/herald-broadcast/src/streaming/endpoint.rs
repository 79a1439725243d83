use crate::{BroadcastError, Result};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::json;
use url::Url;

use super::Authorization;

/// Sub-protocol that selects the realtime events wire format.
pub const SUBPROTOCOL: &str = "aws-appsync-event-ws";

/// Path every realtime URL ends with.
pub const REALTIME_PATH: &str = "/event/realtime";

const REALTIME_HOST_MARKER: &str = "-realtime-api.";
const API_HOST_MARKER: &str = "-api.";

/// Realtime socket URL and the API host used for authorization, both derived
/// from one configured endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RealtimeEndpoint {
    realtime_url: String,
    api_host: String,
}

impl RealtimeEndpoint {
    /// Accepts the HTTP API URL or the realtime URL, with or without a scheme.
    ///
    /// `http` and `ws` map to `ws`; everything else to `wss`. Explicit ports
    /// carry over to both the socket URL and the API host.
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(BroadcastError::configuration("streaming endpoint is empty"));
        }

        let with_scheme = if raw.contains("://") {
            raw.to_string()
        } else {
            format!("https://{}", raw)
        };

        let url = Url::parse(&with_scheme).map_err(|e| {
            BroadcastError::configuration(format!("invalid streaming endpoint '{}': {}", raw, e))
        })?;

        let host = url.host_str().ok_or_else(|| {
            BroadcastError::configuration(format!("streaming endpoint '{}' has no host", raw))
        })?;

        let (realtime_host, api_host) = if host.contains(REALTIME_HOST_MARKER) {
            (
                host.to_string(),
                host.replacen(REALTIME_HOST_MARKER, API_HOST_MARKER, 1),
            )
        } else if host.contains(API_HOST_MARKER) {
            (
                host.replacen(API_HOST_MARKER, REALTIME_HOST_MARKER, 1),
                host.to_string(),
            )
        } else {
            (host.to_string(), host.to_string())
        };

        let scheme = match url.scheme() {
            "http" | "ws" => "ws",
            _ => "wss",
        };

        let port = url.port().map(|p| format!(":{}", p)).unwrap_or_default();

        Ok(Self {
            realtime_url: format!(
                "{}://{}{}{}",
                scheme,
                realtime_host,
                port,
                normalize_path(url.path())
            ),
            api_host: format!("{}{}", api_host, port),
        })
    }

    pub fn realtime_url(&self) -> &str {
        &self.realtime_url
    }

    pub fn api_host(&self) -> &str {
        &self.api_host
    }

    /// `header-` sub-protocol carrying the API host and key, base64url encoded
    /// without padding.
    pub fn auth_protocol(&self, api_key: &str) -> String {
        let header = json!({
            "host": self.api_host,
            "x-api-key": api_key,
        });
        format!("header-{}", URL_SAFE_NO_PAD.encode(header.to_string()))
    }

    pub fn authorization(&self, api_key: &str) -> Authorization {
        Authorization {
            host: self.api_host.clone(),
            api_key: api_key.to_string(),
        }
    }
}

fn normalize_path(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.ends_with(REALTIME_PATH) {
        trimmed.to_string()
    } else if trimmed.ends_with("/event") {
        format!("{}/realtime", trimmed)
    } else {
        format!("{}{}", trimmed, REALTIME_PATH)
    }
}
