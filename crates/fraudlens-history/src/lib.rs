//! Fraudlens History - Conversation Store Client
//!
//! This crate provides the REST client for the backend conversation store:
//! listing a user's conversations, fetching the full message history of one
//! conversation, and deleting conversations.
//!
//! Failures here are transient: a failed history fetch surfaces a notice
//! and leaves the transcript alone, and a failed delete never touches
//! the WebSocket.
//!
//! # Endpoints
//!
//! - `GET /chat/{userId}`: conversation summaries
//! - `GET /chat/{userId}/{conversationId}`: ordered stored messages
//! - `DELETE /chat/{userId}/{conversationId}`: delete a conversation
//!
//! # Example
//!
//! ```ignore
//! use fraudlens_history::HistoryClient;
//! use fraudlens_types::{ConversationId, UserId};
//!
//! let client = HistoryClient::new("http://localhost:8000", token);
//! let summaries = client.list_conversations(UserId(7)).await?;
//! let messages = client.conversation_messages(UserId(7), ConversationId(42)).await?;
//! ```

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use fraudlens_types::{
    ChatMessage, ConversationId, ReasoningStep, Role, ThreadId, UserId,
};

/// History client errors
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("failed to decode response: {0}")]
    Decode(String),
}

/// Result type for history operations
pub type HistoryResult<T> = Result<T, HistoryError>;

/// One entry of the conversation history sidebar.
///
/// Timestamps stay as server-controlled strings; the backend emits naive
/// ISO-8601 without an offset.
#[derive(Debug, Clone, Deserialize)]
pub struct ConversationSummary {
    pub id: ConversationId,
    pub title: Option<String>,
    pub thread_id: ThreadId,
    pub updated_at: String,
}

/// A stored message record as persisted by the backend
#[derive(Debug, Clone, Deserialize)]
pub struct StoredMessage {
    pub role: String,
    pub content: String,
    pub created_at: String,
    #[serde(default)]
    pub reasoning_steps: Option<Vec<ReasoningStep>>,
}

impl StoredMessage {
    /// Map a stored record to a transcript message.
    ///
    /// The store only distinguishes `user` from everything else; anything
    /// non-user renders as an Agent message, carrying through any
    /// persisted reasoning steps.
    pub fn into_chat_message(self) -> ChatMessage {
        let role = if self.role.eq_ignore_ascii_case("user") {
            Role::User
        } else {
            Role::Agent
        };
        let mut message = ChatMessage::new(role, self.content, self.created_at);
        if let Some(steps) = self.reasoning_steps {
            message.reasoning_steps = steps;
        }
        message
    }
}

/// HTTP client for the conversation store
pub struct HistoryClient {
    base_url: String,
    token: String,
    client: reqwest::Client,
}

impl HistoryClient {
    /// Create a client against a backend base URL with a bearer token
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.into(),
            client: reqwest::Client::new(),
        }
    }

    /// List the user's conversation summaries for the history sidebar
    pub async fn list_conversations(
        &self,
        user: UserId,
    ) -> HistoryResult<Vec<ConversationSummary>> {
        let url = format!("{}/chat/{}", self.base_url, user);
        debug!(%url, "listing conversations");
        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(HistoryError::Status(resp.status()));
        }
        resp.json()
            .await
            .map_err(|e| HistoryError::Decode(e.to_string()))
    }

    /// Fetch the full ordered message history of one conversation
    pub async fn conversation_messages(
        &self,
        user: UserId,
        conversation: ConversationId,
    ) -> HistoryResult<Vec<StoredMessage>> {
        let url = format!("{}/chat/{}/{}", self.base_url, user, conversation);
        debug!(%url, "fetching conversation history");
        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(HistoryError::Status(resp.status()));
        }
        resp.json()
            .await
            .map_err(|e| HistoryError::Decode(e.to_string()))
    }

    /// Delete a conversation; the transcript and socket are untouched
    pub async fn delete_conversation(
        &self,
        user: UserId,
        conversation: ConversationId,
    ) -> HistoryResult<()> {
        let url = format!("{}/chat/{}/{}", self.base_url, user, conversation);
        debug!(%url, "deleting conversation");
        let resp = self
            .client
            .delete(&url)
            .bearer_auth(&self.token)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(HistoryError::Status(resp.status()));
        }
        Ok(())
    }
}
