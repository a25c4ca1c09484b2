//! Transcript message types
//!
//! A transcript is an ordered sequence of [`ChatMessage`]s. Progress
//! messages are transient: each new progress frame supersedes the previous
//! one in the displayed transcript, while every progress frame is retained
//! as a [`ReasoningStep`] on the terminal Agent message that ends the turn.

use serde::{Deserialize, Serialize};

/// Role of a transcript message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    /// Sent by the local user (appended optimistically)
    User,
    /// Terminal agent response ending a turn
    Agent,
    /// Server system notice (includes auth confirmations)
    System,
    /// Transient in-flight agent work; at most one per transcript
    Progress,
    /// Server-reported error ending a turn
    Error,
    /// Marker role for session-pair adoption; never displayed
    ConversationStarted,
}

/// Kind of in-flight agent work described by a progress frame.
///
/// Parsed from the wire `progress_type` string. The backend emits kinds
/// beyond the documented set (e.g. `initializing`), so unknown strings are
/// preserved in `Other` rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressKind {
    Thinking,
    ToolCall,
    ToolProgress,
    ToolResult,
    AgentThinking,
    FinalResponse,
    #[serde(untagged)]
    Other(String),
}

impl ProgressKind {
    /// Parse a wire `progress_type` string
    pub fn parse(s: &str) -> Self {
        match s {
            "thinking" => Self::Thinking,
            "tool_call" => Self::ToolCall,
            "tool_progress" => Self::ToolProgress,
            "tool_result" => Self::ToolResult,
            "agent_thinking" => Self::AgentThinking,
            "final_response" => Self::FinalResponse,
            other => Self::Other(other.to_string()),
        }
    }

    /// Wire representation of this kind
    pub fn as_str(&self) -> &str {
        match self {
            Self::Thinking => "thinking",
            Self::ToolCall => "tool_call",
            Self::ToolProgress => "tool_progress",
            Self::ToolResult => "tool_result",
            Self::AgentThinking => "agent_thinking",
            Self::FinalResponse => "final_response",
            Self::Other(s) => s,
        }
    }
}

/// One retained record of a progress frame, kept on the terminal Agent
/// message after the turn completes for later display and audit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReasoningStep {
    #[serde(rename = "type")]
    pub kind: ProgressKind,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_args: Option<serde_json::Value>,
    pub timestamp: String,
}

/// One entry of the displayed transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    /// ISO-8601, as received from the server
    pub timestamp: String,
    /// Present only on Progress messages
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<ProgressKind>,
    /// Non-empty only on terminal Agent messages
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reasoning_steps: Vec<ReasoningStep>,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: timestamp.into(),
            progress: None,
            reasoning_steps: Vec::new(),
        }
    }

    pub fn is_progress(&self) -> bool {
        self.role == Role::Progress
    }
}

/// Convert literal `\n` escape sequences received over the wire into real
/// line breaks for display
pub fn unescape_newlines(content: &str) -> String {
    content.replace("\\n", "\n")
}
