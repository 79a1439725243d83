use std::fmt;

use serde::Serialize;

/// Operational state of a broadcaster.
///
/// Only `Active` accepts work. The other three states are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BroadcasterStatus {
    Active,
    LimitReached,
    Error,
    Disabled,
}

impl BroadcasterStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::LimitReached => "limit_reached",
            Self::Error => "error",
            Self::Disabled => "disabled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Active)
    }

    pub(crate) fn to_u8(self) -> u8 {
        match self {
            Self::Active => 0,
            Self::LimitReached => 1,
            Self::Error => 2,
            Self::Disabled => 3,
        }
    }

    pub(crate) fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Active,
            1 => Self::LimitReached,
            2 => Self::Error,
            _ => Self::Disabled,
        }
    }
}

impl fmt::Display for BroadcasterStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
