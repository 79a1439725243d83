use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// Delivery providers that can be configured as primary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    #[default]
    Streaming,
    Trigger,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Streaming => "streaming",
            Self::Trigger => "trigger",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "streaming" => Ok(Self::Streaming),
            "trigger" => Ok(Self::Trigger),
            other => Err(format!("unknown provider '{}'", other)),
        }
    }
}
