//! Event types for the conversation log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Key under which a conversation's turns are stored.
///
/// Unlike a per-run identifier this is a stable, human-chosen string
/// (e.g. `travel_assistant`) so separate requests share one history.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// The role of a message in the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

/// The kind of event that occurred.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventKind {
    /// A text message was added to the conversation.
    Message { role: Role, content: String },
    /// The model asked for a tool to be invoked.
    ToolCall {
        call_id: String,
        name: String,
        input: serde_json::Value,
    },
    /// A tool returned its output.
    ToolResult {
        call_id: String,
        output: String,
        #[serde(default)]
        is_error: bool,
    },
}

impl EventKind {
    /// Name stored in the `kind` column.
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::Message { .. } => "message",
            EventKind::ToolCall { .. } => "tool_call",
            EventKind::ToolResult { .. } => "tool_result",
        }
    }
}

/// An event in the session log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub session_id: SessionId,
    pub timestamp: DateTime<Utc>,
    pub kind: EventKind,
}

impl Event {
    pub fn new(session_id: SessionId, kind: EventKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            session_id,
            timestamp: Utc::now(),
            kind,
        }
    }

    pub fn message(session_id: SessionId, role: Role, content: impl Into<String>) -> Self {
        Self::new(
            session_id,
            EventKind::Message {
                role,
                content: content.into(),
            },
        )
    }

    pub fn tool_call(
        session_id: SessionId,
        call_id: impl Into<String>,
        name: impl Into<String>,
        input: serde_json::Value,
    ) -> Self {
        Self::new(
            session_id,
            EventKind::ToolCall {
                call_id: call_id.into(),
                name: name.into(),
                input,
            },
        )
    }

    pub fn tool_result(
        session_id: SessionId,
        call_id: impl Into<String>,
        output: impl Into<String>,
        is_error: bool,
    ) -> Self {
        Self::new(
            session_id,
            EventKind::ToolResult {
                call_id: call_id.into(),
                output: output.into(),
                is_error,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_serializes_with_tag() {
        let kind = EventKind::ToolResult {
            call_id: "call_1".into(),
            output: "ok".into(),
            is_error: false,
        };
        let json = serde_json::to_value(&kind).unwrap();
        assert_eq!(json["kind"], "tool_result");
        assert_eq!(kind.name(), "tool_result");
    }

    #[test]
    fn session_id_displays_raw_key() {
        let id = SessionId::from("travel_assistant");
        assert_eq!(id.to_string(), "travel_assistant");
        assert_eq!(id.as_str(), "travel_assistant");
    }
}
