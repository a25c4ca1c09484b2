//! Identity types for the fraudlens client
//!
//! Strongly typed wrappers around the server's integer and string ids to
//! prevent accidental mixing of user, conversation, and thread identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Backend user id, as embedded in REST paths and the WebSocket URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Server-assigned conversation id; assigned on the first message of a
/// new conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationId(pub i64);

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Server-side correlation id for the underlying agent run, paired 1:1
/// with a [`ConversationId`]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ThreadId(pub String);

impl ThreadId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The `(conversationId, threadId)` tuple identifying the active
/// conversation on both client and server.
///
/// Both halves are `None` until the server assigns them via a
/// `conversation_started` frame. The pair is always replaced as a whole:
/// selecting a history entry or starting a new conversation installs a
/// fresh pair rather than mutating the old one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionPair {
    pub conversation_id: Option<ConversationId>,
    pub thread_id: Option<ThreadId>,
}

impl SessionPair {
    /// Pair for a conversation that has not been started on the server yet
    pub fn unstarted() -> Self {
        Self::default()
    }

    /// Pair for an existing conversation selected from history
    pub fn started(conversation_id: ConversationId, thread_id: ThreadId) -> Self {
        Self {
            conversation_id: Some(conversation_id),
            thread_id: Some(thread_id),
        }
    }

    /// Whether the server has assigned ids for this conversation
    pub fn is_started(&self) -> bool {
        self.conversation_id.is_some()
    }
}
