//! Messages emitted by the CLI
//!
//! With `--output-format stream-json` the CLI prints one JSON object per
//! line. The shape varies by message type, so a [`Message`] keeps the decoded
//! value intact and offers typed accessors for the fields every consumer
//! looks at.
//!
//! # Message Types
//!
//! - `system`: session setup (tools, model, session id)
//! - `assistant`: model output
//! - `user`: tool results fed back to the model
//! - `result`: final message with cost, duration and outcome

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Kind of a message, read from its `type` field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageKind {
    /// System message
    System,
    /// Assistant message
    Assistant,
    /// User message
    User,
    /// Result message
    Result,
    /// Any other or missing type
    Other(String),
}

/// One decoded line of CLI output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Message(Value);

impl Message {
    /// Wrap a decoded JSON value
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Decode a single line of CLI output
    pub fn from_line(line: &str) -> serde_json::Result<Self> {
        serde_json::from_str(line).map(Self)
    }

    /// The message's `type` field
    pub fn kind(&self) -> MessageKind {
        match self.get_str("type") {
            Some("system") => MessageKind::System,
            Some("assistant") => MessageKind::Assistant,
            Some("user") => MessageKind::User,
            Some("result") => MessageKind::Result,
            Some(other) => MessageKind::Other(other.to_string()),
            None => MessageKind::Other(String::new()),
        }
    }

    /// Session id, present on most message types
    pub fn session_id(&self) -> Option<&str> {
        self.get_str("session_id")
    }

    /// Whether this is the final `result` message
    pub fn is_result(&self) -> bool {
        self.kind() == MessageKind::Result
    }

    /// Whether this is a `result` message reporting failure
    pub fn is_error_result(&self) -> bool {
        self.is_result()
            && (self.0.get("is_error").and_then(Value::as_bool) == Some(true)
                || self
                    .get_str("subtype")
                    .is_some_and(|subtype| subtype.starts_with("error")))
    }

    /// Final text of a `result` message
    pub fn result_text(&self) -> Option<&str> {
        if self.is_result() {
            self.get_str("result")
        } else {
            None
        }
    }

    /// Borrow the raw JSON value
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Take the raw JSON value
    pub fn into_value(self) -> Value {
        self.0
    }

    fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }
}

impl From<Value> for Message {
    fn from(value: Value) -> Self {
        Self::new(value)
    }
}
