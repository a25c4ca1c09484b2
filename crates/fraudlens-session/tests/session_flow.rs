//! End-to-end frame-sequence scenarios for the transcript engine,
//! exercised exactly as the controller drives it: optimistic user append,
//! outbound frame construction, then inbound frames in receipt order.

use fraudlens_session::{Transcript, TranscriptEvent};
use fraudlens_types::{
    ClientFrame, ConversationId, ProgressKind, Role, ServerFrame, SessionPair, ThreadId,
};

fn parse(payload: &str) -> ServerFrame {
    ServerFrame::parse(payload).expect("frame should classify")
}

#[test]
fn first_message_starts_conversation_and_later_sends_carry_the_pair() {
    let mut transcript = Transcript::new();

    // User sends with no active conversation.
    transcript.push_user("show fraud stats");
    let first: ClientFrame = transcript.outbound("show fraud stats").unwrap();
    assert_eq!(
        serde_json::to_value(&first).unwrap(),
        serde_json::json!({
            "content": "show fraud stats",
            "conversation_id": null,
            "thread_id": null,
        })
    );

    // Server echoes the user message; it must not duplicate.
    transcript.apply(parse(
        r#"{"type":"User","content":"show fraud stats","timestamp":"2024-01-01T00:00:00"}"#,
    ));
    assert_eq!(transcript.messages().len(), 1);

    // Server starts the conversation.
    let events = transcript.apply(parse(
        r#"{"type":"conversation_started","conversation_id":42,"thread_id":"t-42","content":"Started conversation 42","timestamp":"2024-01-01T00:00:01"}"#,
    ));
    assert_eq!(
        events,
        vec![TranscriptEvent::ConversationStarted(SessionPair::started(
            ConversationId(42),
            ThreadId::new("t-42"),
        ))]
    );

    // The next outbound frame carries the adopted pair.
    let second = transcript.outbound("and by country?").unwrap();
    assert_eq!(second.conversation_id, Some(ConversationId(42)));
    assert_eq!(second.thread_id, Some(ThreadId::new("t-42")));
}

#[test]
fn progress_stream_collapses_into_one_agent_message_with_full_trace() {
    let mut transcript = Transcript::new();
    transcript.push_user("how many fraud cases today?");

    for (kind, content) in [
        ("thinking", "Looking at today's transactions"),
        ("tool_call", "Querying the fraud scorer"),
        ("tool_result", "Scorer returned 8 hits"),
    ] {
        transcript.apply(parse(&format!(
            r#"{{"type":"progress","content":"{content}","progress_type":"{kind}","timestamp":"2024-01-01T00:00:02"}}"#
        )));
        // Never more than one progress message on screen.
        assert_eq!(transcript.progress_count(), 1);
    }

    transcript.apply(parse(
        r#"{"type":"Agent","content":"Result: 8 fraud cases","timestamp":"2024-01-01T00:00:09"}"#,
    ));

    assert_eq!(transcript.progress_count(), 0);
    let agent_messages: Vec<_> = transcript
        .messages()
        .iter()
        .filter(|m| m.role == Role::Agent)
        .collect();
    assert_eq!(agent_messages.len(), 1);

    let agent = agent_messages[0];
    assert_eq!(agent.content, "Result: 8 fraud cases");
    assert_eq!(agent.reasoning_steps.len(), 3);
    assert_eq!(agent.reasoning_steps[0].kind, ProgressKind::Thinking);
    assert_eq!(agent.reasoning_steps[1].kind, ProgressKind::ToolCall);
    assert_eq!(agent.reasoning_steps[2].kind, ProgressKind::ToolResult);
    assert_eq!(agent.reasoning_steps[2].content, "Scorer returned 8 hits");
}

#[test]
fn escaped_newlines_render_as_line_breaks_end_to_end() {
    let mut transcript = Transcript::new();

    transcript.apply(parse(
        r#"{"type":"progress","content":"line1\\nline2","progress_type":"thinking","timestamp":"t"}"#,
    ));
    assert_eq!(transcript.messages().last().unwrap().content, "line1\nline2");

    transcript.apply(parse(
        r#"{"type":"Agent","content":"total: 8\\nflagged: 3","timestamp":"t"}"#,
    ));
    assert_eq!(
        transcript.messages().last().unwrap().content,
        "total: 8\nflagged: 3"
    );
}

#[test]
fn switching_conversations_leaves_nothing_behind() {
    let mut transcript = Transcript::new();

    // Conversation A in full flight.
    transcript.push_user("question about A");
    transcript.apply(parse(
        r#"{"type":"progress","content":"working on A","progress_type":"thinking","timestamp":"t"}"#,
    ));

    // User selects conversation B from history.
    transcript.switch_conversation(SessionPair::started(
        ConversationId(7),
        ThreadId::new("t-7"),
    ));
    assert!(transcript.messages().is_empty());

    // B's history hydrates; nothing from A reappears, and A's in-flight
    // progress never leaks into B's next agent turn.
    transcript.apply(parse(
        r#"{"type":"Agent","content":"answer for B","timestamp":"t"}"#,
    ));
    let last = transcript.messages().last().unwrap();
    assert_eq!(last.content, "answer for B");
    assert!(last.reasoning_steps.is_empty());
}

#[test]
fn malformed_frames_are_rejected_at_the_boundary() {
    // The controller drops these without touching the transcript; here we
    // assert classification itself refuses them.
    assert!(ServerFrame::parse("{{not json").is_err());
    assert!(ServerFrame::parse(r#"{"content":"missing type"}"#).is_err());
    assert!(ServerFrame::parse(r#"{"type":"mystery","content":"?"}"#).is_err());
}
