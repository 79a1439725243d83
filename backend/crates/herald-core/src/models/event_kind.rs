use crate::{CoreError, CoreResult};

use std::fmt;
use std::panic::Location;
use std::str::FromStr;

use error_location::ErrorLocation;
use serde::{Deserialize, Serialize};

/// The two event classes a broadcaster delivers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Log,
    Admin,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Log => "log",
            Self::Admin => "admin",
        }
    }

    /// Last segment of the channel this kind is published on.
    pub fn channel_suffix(&self) -> &'static str {
        match self {
            Self::Log => "logs",
            Self::Admin => "admin",
        }
    }

    /// Event name carried on the wire.
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::Log => "log",
            Self::Admin => "run_event",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = CoreError;

    #[track_caller]
    fn from_str(s: &str) -> CoreResult<Self> {
        match s {
            "log" | "logs" => Ok(Self::Log),
            "admin" => Ok(Self::Admin),
            _ => Err(CoreError::UnknownEventKind {
                value: s.to_string(),
                location: ErrorLocation::from(Location::caller()),
            }),
        }
    }
}
