//! Conversation turn types.

use crate::result::StructuredResult;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Author of a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageRole {
    /// Message from the user.
    User,
    /// Message from the model.
    Assistant,
}

impl MessageRole {
    /// Label used when a turn is replayed into a prompt transcript.
    pub fn transcript_label(self) -> &'static str {
        match self {
            MessageRole::User => "USER",
            MessageRole::Assistant => "MODEL",
        }
    }
}

/// Body of a turn: plain text or a structured integration result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum MessageContent {
    Text(String),
    Structured(Box<StructuredResult>),
}

impl MessageContent {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            MessageContent::Text(text) => Some(text),
            MessageContent::Structured(_) => None,
        }
    }

    pub fn as_structured(&self) -> Option<&StructuredResult> {
        match self {
            MessageContent::Text(_) => None,
            MessageContent::Structured(result) => Some(result),
        }
    }
}

/// A single exchange entry in the session log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub id: String,
    pub role: MessageRole,
    pub content: MessageContent,
    /// Set on synthetic turns that report a failed request.
    #[serde(default)]
    pub error: bool,
    /// Creation time (RFC 3339).
    pub timestamp: String,
}

impl ConversationTurn {
    fn new(role: MessageRole, content: MessageContent, error: bool) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content,
            error,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(MessageRole::User, MessageContent::Text(text.into()), false)
    }

    pub fn assistant_text(text: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, MessageContent::Text(text.into()), false)
    }

    pub fn assistant_structured(result: StructuredResult) -> Self {
        Self::new(
            MessageRole::Assistant,
            MessageContent::Structured(Box::new(result)),
            false,
        )
    }

    pub fn assistant_error(message: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, MessageContent::Text(message.into()), true)
    }
}
