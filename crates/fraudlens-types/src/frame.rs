//! Wire frames for the agent WebSocket
//!
//! Outbound frames are a fixed JSON shape. Inbound frames carry an open
//! `type` tag, so they are classified from raw JSON at this boundary:
//! anything that fails to parse, lacks a `type`, or carries a tag the
//! client does not know becomes a [`FrameError`] for the caller to log and
//! drop. A malformed frame never reaches the transcript.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::identity::{ConversationId, ThreadId};
use crate::message::{ProgressKind, Role};

/// Frame classification errors
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("frame is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("frame has no string `type` field")]
    MissingType,

    #[error("unrecognized frame type: {0}")]
    UnknownType(String),

    #[error("frame `{0}` is missing required field `{1}`")]
    MissingField(&'static str, &'static str),
}

/// Client → server frame.
///
/// Both ids serialize as explicit `null` when absent; the server uses
/// null to detect the first message of a new conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientFrame {
    pub content: String,
    pub conversation_id: Option<ConversationId>,
    pub thread_id: Option<ThreadId>,
}

/// Server → client frame, classified by its `type` tag
#[derive(Debug, Clone, PartialEq)]
pub enum ServerFrame {
    /// Server assigned ids for a freshly started conversation
    ConversationStarted {
        conversation_id: ConversationId,
        thread_id: ThreadId,
    },
    /// Lightweight "agent is working" signal; no transcript entry
    Typing,
    /// In-flight agent work; supersedes the previous progress message
    Progress {
        content: String,
        kind: ProgressKind,
        tool_name: Option<String>,
        tool_args: Option<serde_json::Value>,
        timestamp: String,
    },
    /// Echo of the user's own message; dropped (rendered optimistically)
    UserEcho { content: String },
    /// A frame that ends the current agent turn
    Terminal {
        role: Role,
        content: String,
        timestamp: String,
    },
}

impl ServerFrame {
    /// Classify a raw WebSocket text payload.
    ///
    /// Known terminal tags map to roles (`Agent` → Agent, `system` and
    /// `auth_success` → System, `error` → Error); anything else is an
    /// [`FrameError::UnknownType`].
    pub fn parse(payload: &str) -> Result<Self, FrameError> {
        let value: serde_json::Value = serde_json::from_str(payload)?;

        let tag = value
            .get("type")
            .and_then(|t| t.as_str())
            .ok_or(FrameError::MissingType)?;

        match tag {
            "conversation_started" => {
                let conversation_id = value
                    .get("conversation_id")
                    .and_then(|v| v.as_i64())
                    .map(ConversationId)
                    .ok_or(FrameError::MissingField("conversation_started", "conversation_id"))?;
                let thread_id = value
                    .get("thread_id")
                    .and_then(|v| v.as_str())
                    .map(ThreadId::new)
                    .ok_or(FrameError::MissingField("conversation_started", "thread_id"))?;
                Ok(Self::ConversationStarted {
                    conversation_id,
                    thread_id,
                })
            }
            "typing" => Ok(Self::Typing),
            "progress" => Ok(Self::Progress {
                content: string_field(&value, "progress", "content")?,
                kind: value
                    .get("progress_type")
                    .and_then(|v| v.as_str())
                    .map(ProgressKind::parse)
                    .unwrap_or(ProgressKind::Other("unknown".to_string())),
                tool_name: value
                    .get("tool_name")
                    .and_then(|v| v.as_str())
                    .map(String::from),
                tool_args: value.get("tool_args").cloned().filter(|v| !v.is_null()),
                timestamp: timestamp_field(&value),
            }),
            "User" | "user" => Ok(Self::UserEcho {
                content: string_field(&value, "user", "content")?,
            }),
            "Agent" | "agent" => Ok(Self::Terminal {
                role: Role::Agent,
                content: string_field(&value, "agent", "content")?,
                timestamp: timestamp_field(&value),
            }),
            "system" | "auth_success" => Ok(Self::Terminal {
                role: Role::System,
                content: string_field(&value, "system", "content")?,
                timestamp: timestamp_field(&value),
            }),
            "error" => Ok(Self::Terminal {
                role: Role::Error,
                content: string_field(&value, "error", "content")?,
                timestamp: timestamp_field(&value),
            }),
            other => Err(FrameError::UnknownType(other.to_string())),
        }
    }
}

fn string_field(
    value: &serde_json::Value,
    frame: &'static str,
    field: &'static str,
) -> Result<String, FrameError> {
    value
        .get(field)
        .and_then(|v| v.as_str())
        .map(String::from)
        .ok_or(FrameError::MissingField(frame, field))
}

fn timestamp_field(value: &serde_json::Value) -> String {
    value
        .get("timestamp")
        .and_then(|v| v.as_str())
        .map(String::from)
        .unwrap_or_default()
}
