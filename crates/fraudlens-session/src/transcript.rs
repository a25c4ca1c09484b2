//! Transcript mutation engine
//!
//! The pure, single-threaded heart of the session controller: inbound
//! frames are applied here in receipt order, and every transcript
//! invariant lives in this module.
//!
//! # Invariants
//!
//! - At most one Progress-role message exists in the transcript at any
//!   time; each progress frame replaces the previous one while being
//!   appended (non-destructively) to the in-flight reasoning accumulator.
//! - A terminal frame strips all Progress messages, attaches the drained
//!   accumulator iff its role is Agent, and resets the accumulator.
//! - The session pair is adopted wholesale from `conversation_started`
//!   and replaced wholesale on conversation switch.
//! - Frames are never reordered or buffered; WebSocket in-order delivery
//!   is trusted.

use chrono::Utc;
use fraudlens_types::{
    unescape_newlines, ChatMessage, ClientFrame, ReasoningStep, Role, ServerFrame, SessionPair,
};

/// Observable effect of applying a frame, consumed by the controller to
/// drive notifications, history refresh, and the typing reveal
#[derive(Debug, Clone, PartialEq)]
pub enum TranscriptEvent {
    /// Visible transcript or typing flag changed
    Changed,
    /// The server adopted a new session pair; history list should refresh
    ConversationStarted(SessionPair),
    /// A terminal message was appended at this index (reveal trigger for
    /// Agent messages)
    TerminalAppended { index: usize, role: Role },
}

/// Conversation state owned by one session controller
#[derive(Debug, Default)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
    /// Reasoning steps accumulated for the in-flight agent turn
    reasoning: Vec<ReasoningStep>,
    is_typing: bool,
    session: SessionPair,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_typing(&self) -> bool {
        self.is_typing
    }

    pub fn session(&self) -> &SessionPair {
        &self.session
    }

    /// Append the user's message optimistically. Returns the appended
    /// index, or `None` when the content is blank after trimming.
    pub fn push_user(&mut self, content: &str) -> Option<usize> {
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return None;
        }
        self.messages.push(ChatMessage::new(
            Role::User,
            trimmed,
            Utc::now().to_rfc3339(),
        ));
        Some(self.messages.len() - 1)
    }

    /// Build the outbound frame for the given content under the current
    /// session pair; `None` when the content is blank.
    pub fn outbound(&self, content: &str) -> Option<ClientFrame> {
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(ClientFrame {
            content: trimmed.to_string(),
            conversation_id: self.session.conversation_id,
            thread_id: self.session.thread_id.clone(),
        })
    }

    /// Apply one inbound frame in receipt order
    pub fn apply(&mut self, frame: ServerFrame) -> Vec<TranscriptEvent> {
        match frame {
            ServerFrame::ConversationStarted {
                conversation_id,
                thread_id,
            } => {
                // Adopt the pair wholesale; no visible transcript entry.
                self.session = SessionPair::started(conversation_id, thread_id);
                vec![TranscriptEvent::ConversationStarted(self.session.clone())]
            }
            ServerFrame::UserEcho { .. } => {
                // Already rendered optimistically; echoing would duplicate.
                Vec::new()
            }
            ServerFrame::Typing => {
                self.is_typing = true;
                vec![TranscriptEvent::Changed]
            }
            ServerFrame::Progress {
                content,
                kind,
                tool_name,
                tool_args,
                timestamp,
            } => {
                let content = unescape_newlines(&content);
                self.is_typing = true;

                self.reasoning.push(ReasoningStep {
                    kind: kind.clone(),
                    content: content.clone(),
                    tool_name,
                    tool_args,
                    timestamp: timestamp.clone(),
                });

                let mut message = ChatMessage::new(Role::Progress, content, timestamp);
                message.progress = Some(kind);

                // Replace the trailing progress message if one exists.
                if let Some(last) = self.messages.last_mut().filter(|m| m.is_progress()) {
                    *last = message;
                } else {
                    self.messages.push(message);
                }
                vec![TranscriptEvent::Changed]
            }
            ServerFrame::Terminal {
                role,
                content,
                timestamp,
            } => {
                let content = unescape_newlines(&content);
                self.is_typing = false;
                self.messages.retain(|m| !m.is_progress());

                let mut message = ChatMessage::new(role, content, timestamp);
                if role == Role::Agent {
                    message.reasoning_steps = std::mem::take(&mut self.reasoning);
                } else {
                    self.reasoning.clear();
                }
                self.messages.push(message);

                let index = self.messages.len() - 1;
                vec![
                    TranscriptEvent::Changed,
                    TranscriptEvent::TerminalAppended { index, role },
                ]
            }
        }
    }

    /// Switch to a different conversation: clear everything and install
    /// the new pair. The socket is untouched; subsequent sends simply
    /// carry the new pair.
    pub fn switch_conversation(&mut self, pair: SessionPair) {
        self.messages.clear();
        self.reasoning.clear();
        self.is_typing = false;
        self.session = pair;
    }

    /// Replace the transcript wholesale with hydrated history records
    pub fn hydrate(&mut self, messages: Vec<ChatMessage>) {
        self.messages = messages;
        self.reasoning.clear();
        self.is_typing = false;
    }

    /// Number of Progress-role messages currently displayed
    pub fn progress_count(&self) -> usize {
        self.messages.iter().filter(|m| m.is_progress()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fraudlens_types::{ConversationId, ProgressKind, ThreadId};

    fn progress(kind: &str, content: &str) -> ServerFrame {
        ServerFrame::Progress {
            content: content.to_string(),
            kind: ProgressKind::parse(kind),
            tool_name: None,
            tool_args: None,
            timestamp: "2024-01-01T00:00:00".to_string(),
        }
    }

    fn agent(content: &str) -> ServerFrame {
        ServerFrame::Terminal {
            role: Role::Agent,
            content: content.to_string(),
            timestamp: "2024-01-01T00:00:09".to_string(),
        }
    }

    #[test]
    fn test_at_most_one_progress_message() {
        let mut transcript = Transcript::new();
        transcript.push_user("show fraud stats");

        for i in 0..10 {
            transcript.apply(progress("thinking", &format!("step {i}")));
            assert_eq!(transcript.progress_count(), 1);
        }
        // Displayed progress carries the latest content.
        assert_eq!(transcript.messages().last().unwrap().content, "step 9");
    }

    #[test]
    fn test_reasoning_accumulation_in_receipt_order() {
        let mut transcript = Transcript::new();
        transcript.push_user("analyze");

        transcript.apply(progress("thinking", "a"));
        transcript.apply(progress("tool_call", "b"));
        transcript.apply(progress("tool_result", "c"));
        transcript.apply(agent("Result: 8 fraud cases"));

        assert_eq!(transcript.progress_count(), 0);
        let last = transcript.messages().last().unwrap();
        assert_eq!(last.role, Role::Agent);
        assert_eq!(last.content, "Result: 8 fraud cases");
        assert_eq!(last.reasoning_steps.len(), 3);
        assert_eq!(last.reasoning_steps[0].content, "a");
        assert_eq!(last.reasoning_steps[1].kind, ProgressKind::ToolCall);
        assert_eq!(last.reasoning_steps[2].content, "c");
    }

    #[test]
    fn test_accumulator_resets_between_turns() {
        let mut transcript = Transcript::new();
        transcript.apply(progress("thinking", "turn one"));
        transcript.apply(agent("first"));

        transcript.apply(progress("thinking", "turn two"));
        transcript.apply(agent("second"));

        let last = transcript.messages().last().unwrap();
        assert_eq!(last.reasoning_steps.len(), 1);
        assert_eq!(last.reasoning_steps[0].content, "turn two");
    }

    #[test]
    fn test_escape_normalization_progress_and_terminal() {
        let mut transcript = Transcript::new();
        transcript.apply(progress("thinking", "line1\\nline2"));
        assert_eq!(transcript.messages().last().unwrap().content, "line1\nline2");

        transcript.apply(agent("top\\nbottom"));
        assert_eq!(transcript.messages().last().unwrap().content, "top\nbottom");
    }

    #[test]
    fn test_user_echo_suppressed() {
        let mut transcript = Transcript::new();
        transcript.push_user("show fraud stats");
        let events = transcript.apply(ServerFrame::UserEcho {
            content: "show fraud stats".to_string(),
        });
        assert!(events.is_empty());
        assert_eq!(transcript.messages().len(), 1);
    }

    #[test]
    fn test_typing_sets_flag_without_entry() {
        let mut transcript = Transcript::new();
        transcript.apply(ServerFrame::Typing);
        assert!(transcript.is_typing());
        assert!(transcript.messages().is_empty());
    }

    #[test]
    fn test_terminal_clears_typing_flag() {
        let mut transcript = Transcript::new();
        transcript.apply(ServerFrame::Typing);
        transcript.apply(agent("done"));
        assert!(!transcript.is_typing());
    }

    #[test]
    fn test_conversation_started_adopts_pair() {
        let mut transcript = Transcript::new();
        assert!(!transcript.session().is_started());

        let events = transcript.apply(ServerFrame::ConversationStarted {
            conversation_id: ConversationId(42),
            thread_id: ThreadId::new("t-42"),
        });

        assert_eq!(
            events,
            vec![TranscriptEvent::ConversationStarted(SessionPair::started(
                ConversationId(42),
                ThreadId::new("t-42"),
            ))]
        );
        assert!(transcript.session().is_started());
        // No visible message was produced.
        assert!(transcript.messages().is_empty());
    }

    #[test]
    fn test_outbound_carries_current_pair() {
        let mut transcript = Transcript::new();

        let first = transcript.outbound("show fraud stats").unwrap();
        assert_eq!(first.conversation_id, None);
        assert_eq!(first.thread_id, None);

        transcript.apply(ServerFrame::ConversationStarted {
            conversation_id: ConversationId(42),
            thread_id: ThreadId::new("t-42"),
        });

        let second = transcript.outbound("and last week?").unwrap();
        assert_eq!(second.conversation_id, Some(ConversationId(42)));
        assert_eq!(second.thread_id, Some(ThreadId::new("t-42")));
    }

    #[test]
    fn test_outbound_blank_is_none() {
        let transcript = Transcript::new();
        assert!(transcript.outbound("   ").is_none());
        assert!(transcript.outbound("").is_none());
    }

    #[test]
    fn test_push_user_trims_and_rejects_blank() {
        let mut transcript = Transcript::new();
        assert!(transcript.push_user("  \n ").is_none());
        let index = transcript.push_user("  hello  ").unwrap();
        assert_eq!(transcript.messages()[index].content, "hello");
    }

    #[test]
    fn test_switch_conversation_clears_everything() {
        let mut transcript = Transcript::new();
        transcript.push_user("question about A");
        transcript.apply(progress("thinking", "working"));

        transcript.switch_conversation(SessionPair::started(
            ConversationId(7),
            ThreadId::new("t-7"),
        ));

        assert!(transcript.messages().is_empty());
        assert!(!transcript.is_typing());
        assert_eq!(
            transcript.session().conversation_id,
            Some(ConversationId(7))
        );

        // The next turn's accumulator starts empty.
        transcript.apply(agent("fresh"));
        assert!(transcript.messages().last().unwrap().reasoning_steps.is_empty());
    }

    #[test]
    fn test_non_agent_terminal_drops_accumulator() {
        let mut transcript = Transcript::new();
        transcript.apply(progress("thinking", "working"));
        transcript.apply(ServerFrame::Terminal {
            role: Role::Error,
            content: "agent unavailable".to_string(),
            timestamp: "t".to_string(),
        });

        let last = transcript.messages().last().unwrap();
        assert_eq!(last.role, Role::Error);
        assert!(last.reasoning_steps.is_empty());
        assert_eq!(transcript.progress_count(), 0);

        // A later Agent turn must not inherit the dropped steps.
        transcript.apply(agent("recovered"));
        assert!(transcript.messages().last().unwrap().reasoning_steps.is_empty());
    }

    #[test]
    fn test_hydrate_replaces_wholesale() {
        let mut transcript = Transcript::new();
        transcript.push_user("live message");
        transcript.apply(progress("thinking", "working"));

        transcript.hydrate(vec![
            ChatMessage::new(Role::User, "stored question", "2024-01-01T00:00:00"),
            ChatMessage::new(Role::Agent, "stored answer", "2024-01-01T00:00:05"),
        ]);

        assert_eq!(transcript.messages().len(), 2);
        assert_eq!(transcript.messages()[0].content, "stored question");
        assert!(!transcript.is_typing());
    }
}
