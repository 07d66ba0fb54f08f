/// Domain models for chat sessions.
///
/// A session is an ordered conversation history keyed by an id. It grows by
/// exactly one user message and one assistant message per completed turn.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::chunking::Metadata;

/// Author of a conversation message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::System => write!(f, "system"),
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub role: Role,
    pub content: String,
}

impl ConversationMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Conversation session living for the lifetime of the process
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Session identifier, never changes once created
    pub id: String,

    /// Alternating user/assistant messages
    pub history: Vec<ConversationMessage>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Creates an empty session
    pub fn new(id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            history: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Append a completed turn: the user message then the assistant reply.
    pub fn record_turn(&mut self, user: impl Into<String>, assistant: impl Into<String>) {
        self.history.push(ConversationMessage::user(user));
        self.history.push(ConversationMessage::assistant(assistant));
        self.updated_at = Utc::now();
    }

    /// Reset history, keeping the id
    pub fn clear(&mut self) {
        self.history.clear();
        self.updated_at = Utc::now();
    }

    /// Number of completed turns
    pub fn turn_count(&self) -> usize {
        self.history.len() / 2
    }
}

/// Assistant reply returned from a chat turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistantMessage {
    pub role: Role,
    pub content: String,
    #[serde(default)]
    pub metadata: Metadata,
}

impl AssistantMessage {
    pub fn new(content: impl Into<String>, metadata: Metadata) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            metadata,
        }
    }

    /// Whether this reply reports a failed turn
    pub fn is_error(&self) -> bool {
        self.metadata
            .get("error")
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_empty() {
        let session = Session::new("s1");
        assert_eq!(session.id, "s1");
        assert!(session.history.is_empty());
        assert_eq!(session.turn_count(), 0);
    }

    #[test]
    fn test_record_turn_alternates() {
        let mut session = Session::new("s1");
        session.record_turn("What is X?", "X is a letter.");
        session.record_turn("And Y?", "Also a letter.");

        assert_eq!(session.history.len(), 4);
        assert_eq!(session.turn_count(), 2);
        let roles: Vec<Role> = session.history.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![Role::User, Role::Assistant, Role::User, Role::Assistant]
        );
    }

    #[test]
    fn test_clear_keeps_id() {
        let mut session = Session::new("s1");
        session.record_turn("hi", "hello");
        session.clear();
        assert_eq!(session.id, "s1");
        assert!(session.history.is_empty());
    }

    #[test]
    fn test_role_serde() {
        let msg = ConversationMessage::assistant("ok");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["role"], "assistant");
        assert_eq!(json["content"], "ok");
    }

    #[test]
    fn test_assistant_error_flag() {
        let mut metadata = Metadata::new();
        metadata.insert("error".to_string(), serde_json::Value::Bool(true));
        assert!(AssistantMessage::new("Error: boom", metadata).is_error());
        assert!(!AssistantMessage::new("fine", Metadata::new()).is_error());
    }
}
