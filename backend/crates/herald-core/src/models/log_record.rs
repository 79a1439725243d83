use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single log line emitted by a producer.
///
/// Fields beyond the four required ones are kept in `extra` and
/// serialized back at the top level.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LogRecord {
    pub text: String,
    pub thread_id: String,
    pub level: String,
    pub timestamp: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LogRecord {
    pub fn new(
        text: impl Into<String>,
        thread_id: impl Into<String>,
        level: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            thread_id: thread_id.into(),
            level: level.into(),
            timestamp: timestamp.into(),
            extra: Map::new(),
        }
    }

    /// Attach an additional top-level field.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    pub fn to_value(&self) -> Value {
        // A struct of strings and a JSON map always serializes.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
