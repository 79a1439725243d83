use std::panic::Location;
use std::time::Duration;

use error_location::ErrorLocation;
use thiserror::Error;
use tokio_tungstenite::tungstenite;

#[derive(Error, Debug)]
pub enum BroadcastError {
    #[error("Configuration error: {message} {location}")]
    Configuration {
        message: String,
        location: ErrorLocation,
    },

    #[error("Rate limited: {message} {location}")]
    RateLimited {
        message: String,
        location: ErrorLocation,
    },

    #[error("Transport error: {message} {location}")]
    Transport {
        message: String,
        location: ErrorLocation,
    },

    #[error("Connection closed: {reason} {location}")]
    ConnectionClosed {
        reason: String,
        location: ErrorLocation,
    },

    #[error("WebSocket error: {source} {location}")]
    WebSocket {
        #[source]
        source: tungstenite::Error,
        location: ErrorLocation,
    },

    #[error("HTTP error: {source} {location}")]
    Http {
        #[source]
        source: reqwest::Error,
        location: ErrorLocation,
    },

    #[error("API error ({status}): {message} {location}")]
    Api {
        status: u16,
        message: String,
        location: ErrorLocation,
    },

    #[error("Serialization failed: {source} {location}")]
    Serialization {
        #[source]
        source: serde_json::Error,
        location: ErrorLocation,
    },

    #[error("{operation} timed out after {timeout_ms}ms {location}")]
    Timeout {
        operation: String,
        timeout_ms: u64,
        location: ErrorLocation,
    },

    #[error("Background task failed: {source} {location}")]
    TaskJoin {
        #[source]
        source: tokio::task::JoinError,
        location: ErrorLocation,
    },
}

impl BroadcastError {
    #[track_caller]
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn rate_limited<S: Into<String>>(message: S) -> Self {
        Self::RateLimited {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn transport<S: Into<String>>(message: S) -> Self {
        Self::Transport {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn connection_closed<S: Into<String>>(reason: S) -> Self {
        Self::ConnectionClosed {
            reason: reason.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn api<S: Into<String>>(status: u16, message: S) -> Self {
        Self::Api {
            status,
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn timeout<S: Into<String>>(operation: S, after: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            timeout_ms: after.as_millis() as u64,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Configuration { .. } => "CONFIGURATION",
            Self::RateLimited { .. } => "RATE_LIMITED",
            Self::Transport { .. } => "TRANSPORT",
            Self::ConnectionClosed { .. } => "CONNECTION_CLOSED",
            Self::WebSocket { .. } => "WEBSOCKET",
            Self::Http { .. } => "HTTP",
            Self::Api { .. } => "API",
            Self::Serialization { .. } => "SERIALIZATION",
            Self::Timeout { .. } => "TIMEOUT",
            Self::TaskJoin { .. } => "TASK_JOIN",
        }
    }

    /// HTTP status carried by the error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Http { source, .. } => source.status().map(|s| s.as_u16()),
            Self::WebSocket {
                source: tungstenite::Error::Http(response),
                ..
            } => Some(response.status().as_u16()),
            _ => None,
        }
    }

    /// Error text without the source location, used for classification.
    pub fn detail(&self) -> String {
        match self {
            Self::Configuration { message, .. }
            | Self::RateLimited { message, .. }
            | Self::Transport { message, .. }
            | Self::Api { message, .. } => message.clone(),
            Self::ConnectionClosed { reason, .. } => reason.clone(),
            Self::WebSocket { source, .. } => source.to_string(),
            Self::Http { source, .. } => source.to_string(),
            Self::Serialization { source, .. } => source.to_string(),
            Self::Timeout {
                operation,
                timeout_ms,
                ..
            } => format!("{} timed out after {}ms", operation, timeout_ms),
            Self::TaskJoin { source, .. } => source.to_string(),
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport { .. }
            | Self::ConnectionClosed { .. }
            | Self::Timeout { .. }
            | Self::Http { .. } => true,
            Self::WebSocket { source, .. } => !matches!(
                source,
                tungstenite::Error::Http(_)
                    | tungstenite::Error::Url(_)
                    | tungstenite::Error::Protocol(_)
            ),
            _ => false,
        }
    }
}

impl From<tungstenite::Error> for BroadcastError {
    #[track_caller]
    fn from(source: tungstenite::Error) -> Self {
        Self::WebSocket {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<reqwest::Error> for BroadcastError {
    #[track_caller]
    fn from(source: reqwest::Error) -> Self {
        Self::Http {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<serde_json::Error> for BroadcastError {
    #[track_caller]
    fn from(source: serde_json::Error) -> Self {
        Self::Serialization {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<tokio::task::JoinError> for BroadcastError {
    #[track_caller]
    fn from(source: tokio::task::JoinError) -> Self {
        Self::TaskJoin {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

pub type Result<T> = std::result::Result<T, BroadcastError>;
