//! Chat session controller
//!
//! Owns exactly one WebSocket per authenticated user: translates inbound
//! frames into transcript mutations, user input into outbound frames, and
//! drives the typing reveal of terminal agent responses.
//!
//! All socket I/O runs in one spawned task; transcript state lives behind
//! a parking_lot mutex shared with the caller. Teardown aborts both the
//! I/O task and any pending reveal task so nothing fires after the view
//! is gone.

use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tracing::{debug, info, warn};

use fraudlens_alerts::NoticeKind;
use fraudlens_history::HistoryClient;
use fraudlens_types::{ChatMessage, Role, ServerFrame, SessionPair, UserId};

use crate::conn::{ConnState, SessionConfig};
use crate::reveal::RevealCursor;
use crate::transcript::{Transcript, TranscriptEvent};

/// Events delivered to the UI layer
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Socket opened
    Connected,
    /// Socket closed or errored; a reconnect may be scheduled
    Disconnected,
    /// Transcript, typing flag, or reveal cursor changed
    TranscriptChanged,
    /// Server assigned a session pair; the history sidebar should refresh
    ConversationStarted(SessionPair),
    /// Transient user-visible notification
    Notice { kind: NoticeKind, message: String },
}

/// State shared between the controller handle and its I/O task
struct Shared {
    conn: ConnState,
    intentional_close: bool,
    transcript: Transcript,
    reveal: Option<RevealCursor>,
}

/// Everything the I/O task needs, cheap to clone
#[derive(Clone)]
struct LoopCtx {
    config: SessionConfig,
    url: String,
    shared: Arc<Mutex<Shared>>,
    events: mpsc::UnboundedSender<SessionEvent>,
    outbound_rx: Arc<tokio::sync::Mutex<mpsc::UnboundedReceiver<String>>>,
    reveal_task: Arc<Mutex<Option<JoinHandle<()>>>>,
}

/// One live chat session for one authenticated user
pub struct ChatSession {
    config: SessionConfig,
    user: UserId,
    token: String,
    shared: Arc<Mutex<Shared>>,
    events: mpsc::UnboundedSender<SessionEvent>,
    outbound_tx: mpsc::UnboundedSender<String>,
    outbound_rx: Arc<tokio::sync::Mutex<mpsc::UnboundedReceiver<String>>>,
    io_task: Mutex<Option<JoinHandle<()>>>,
    reveal_task: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl ChatSession {
    /// Create a session for a user with a bearer token. The returned
    /// receiver delivers [`SessionEvent`]s until the session is dropped.
    pub fn new(
        config: SessionConfig,
        user: UserId,
        token: impl Into<String>,
    ) -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let session = Self {
            config,
            user,
            token: token.into(),
            shared: Arc::new(Mutex::new(Shared {
                conn: ConnState::Idle,
                intentional_close: false,
                transcript: Transcript::new(),
                reveal: None,
            })),
            events: events_tx,
            outbound_tx,
            outbound_rx: Arc::new(tokio::sync::Mutex::new(outbound_rx)),
            io_task: Mutex::new(None),
            reveal_task: Arc::new(Mutex::new(None)),
        };
        (session, events_rx)
    }

    /// Open the WebSocket. A second call while an attempt is already
    /// `Connecting` or the socket is `Open` is a no-op. Connecting from
    /// `Closed` supplants a reconnect loop still sleeping out its delay,
    /// so the controller never owns two sockets.
    pub fn connect(&self) {
        {
            let mut shared = self.shared.lock();
            if !shared.conn.can_connect() {
                debug!(state = ?shared.conn, "connect suppressed: attempt already live");
                return;
            }
            shared.conn = ConnState::Connecting;
            shared.intentional_close = false;
        }

        let ctx = LoopCtx {
            config: self.config.clone(),
            url: self.config.agent_url(self.user, &self.token),
            shared: Arc::clone(&self.shared),
            events: self.events.clone(),
            outbound_rx: Arc::clone(&self.outbound_rx),
            reveal_task: Arc::clone(&self.reveal_task),
        };
        info!(user = %self.user, "opening agent socket");
        let mut io_task = self.io_task.lock();
        if let Some(previous) = io_task.take() {
            previous.abort();
        }
        *io_task = Some(tokio::spawn(run_loop(ctx)));
    }

    /// Tear the session down: suppress reconnection, drop the socket,
    /// and cancel any pending reveal.
    pub fn disconnect(&self) {
        {
            let mut shared = self.shared.lock();
            shared.intentional_close = true;
            shared.conn = ConnState::Closed;
            shared.reveal = None;
        }
        if let Some(task) = self.io_task.lock().take() {
            task.abort();
        }
        if let Some(task) = self.reveal_task.lock().take() {
            task.abort();
        }
        let _ = self.events.send(SessionEvent::Disconnected);
        info!(user = %self.user, "agent socket closed by caller");
    }

    /// Send a user message. Appends it to the transcript optimistically
    /// and queues the frame; returns `false` when the socket is not open
    /// or the content is blank.
    pub fn send(&self, content: &str) -> bool {
        let frame = {
            let mut shared = self.shared.lock();
            if !shared.conn.is_open() {
                debug!("send ignored: socket not open");
                return false;
            }
            let Some(frame) = shared.transcript.outbound(content) else {
                return false;
            };
            shared.transcript.push_user(content);
            frame
        };

        let payload = match serde_json::to_string(&frame) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(error = %e, "failed to serialize outbound frame");
                return false;
            }
        };
        // The optimistic append stands regardless of send success.
        let _ = self.outbound_tx.send(payload);
        let _ = self.events.send(SessionEvent::TranscriptChanged);
        true
    }

    /// Select a different conversation. Clears the transcript and
    /// replaces the session pair without touching the socket.
    pub fn switch_conversation(&self, pair: SessionPair) {
        if let Some(task) = self.reveal_task.lock().take() {
            task.abort();
        }
        {
            let mut shared = self.shared.lock();
            shared.reveal = None;
            shared.transcript.switch_conversation(pair);
        }
        let _ = self.events.send(SessionEvent::TranscriptChanged);
    }

    /// Hydrate the transcript from the conversation store.
    ///
    /// The fetch is tagged with the conversation it targeted; a response
    /// arriving after the user switched away is discarded rather than
    /// applied to the wrong conversation. Fetch failure surfaces a
    /// transient notice and is not retried.
    pub async fn load_history(&self, history: &HistoryClient) {
        let target = self.shared.lock().transcript.session().conversation_id;
        let Some(target) = target else {
            return;
        };

        match history.conversation_messages(self.user, target).await {
            Ok(records) => {
                let messages: Vec<ChatMessage> = records
                    .into_iter()
                    .map(|record| record.into_chat_message())
                    .collect();
                let applied = {
                    let mut shared = self.shared.lock();
                    if shared.transcript.session().conversation_id == Some(target) {
                        shared.transcript.hydrate(messages);
                        true
                    } else {
                        false
                    }
                };
                if applied {
                    let _ = self.events.send(SessionEvent::TranscriptChanged);
                } else {
                    debug!(conversation = %target, "discarded stale history response");
                }
            }
            Err(e) => {
                warn!(conversation = %target, error = %e, "history fetch failed");
                let _ = self.events.send(SessionEvent::Notice {
                    kind: NoticeKind::Error,
                    message: "Failed to load conversation history".to_string(),
                });
            }
        }
    }

    /// Current connection state
    pub fn state(&self) -> ConnState {
        self.shared.lock().conn
    }

    /// Snapshot of the displayed transcript
    pub fn transcript_snapshot(&self) -> Vec<ChatMessage> {
        self.shared.lock().transcript.messages().to_vec()
    }

    /// Active session pair
    pub fn session_pair(&self) -> SessionPair {
        self.shared.lock().transcript.session().clone()
    }

    /// Whether the "agent is working" indicator should show
    pub fn is_typing(&self) -> bool {
        self.shared.lock().transcript.is_typing()
    }

    /// Cursor of the reveal animation, if one is running
    pub fn reveal_cursor(&self) -> Option<RevealCursor> {
        self.shared.lock().reveal.clone()
    }

    /// Input is disabled while a reveal is animating or the socket is
    /// not open
    pub fn input_enabled(&self) -> bool {
        let shared = self.shared.lock();
        shared.conn.is_open() && shared.reveal.is_none()
    }
}

impl Drop for ChatSession {
    fn drop(&mut self) {
        if let Some(task) = self.io_task.lock().take() {
            task.abort();
        }
        if let Some(task) = self.reveal_task.lock().take() {
            task.abort();
        }
    }
}

/// Connect / read / reconnect loop. One instance per session; the connect
/// guard in [`ChatSession::connect`] ensures it is never spawned twice
/// concurrently.
async fn run_loop(ctx: LoopCtx) {
    loop {
        match connect_async(ctx.url.as_str()).await {
            Ok((stream, _)) => {
                ctx.shared.lock().conn = ConnState::Open;
                let _ = ctx.events.send(SessionEvent::Connected);
                info!("agent socket open");

                let (mut write, mut read) = stream.split();
                let mut outbound = ctx.outbound_rx.lock().await;

                loop {
                    tokio::select! {
                        queued = outbound.recv() => {
                            match queued {
                                Some(payload) => {
                                    if let Err(e) = write.send(WsMessage::Text(payload)).await {
                                        warn!(error = %e, "outbound send failed");
                                        break;
                                    }
                                }
                                // Session handle dropped; nothing left to send.
                                None => break,
                            }
                        }
                        inbound = read.next() => {
                            match inbound {
                                Some(Ok(WsMessage::Text(payload))) => handle_payload(&ctx, &payload),
                                Some(Ok(WsMessage::Close(_))) | None => break,
                                Some(Ok(_)) => {}
                                Some(Err(e)) => {
                                    warn!(error = %e, "socket read failed");
                                    break;
                                }
                            }
                        }
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "agent socket connect failed");
            }
        }

        ctx.shared.lock().conn = ConnState::Closed;
        let _ = ctx.events.send(SessionEvent::Disconnected);

        if ctx.shared.lock().intentional_close {
            debug!("reconnect suppressed: intentional close");
            break;
        }
        if !ctx.config.reconnect {
            break;
        }
        tokio::time::sleep(ctx.config.reconnect_delay).await;
        if ctx.shared.lock().intentional_close {
            break;
        }
        ctx.shared.lock().conn = ConnState::Connecting;
        debug!("reconnecting agent socket");
    }
}

/// Classify one text payload and apply it to the transcript. Malformed
/// frames are logged and dropped, never applied.
fn handle_payload(ctx: &LoopCtx, payload: &str) {
    let frame = match ServerFrame::parse(payload) {
        Ok(frame) => frame,
        Err(e) => {
            warn!(error = %e, "dropping malformed frame");
            return;
        }
    };

    let events = ctx.shared.lock().transcript.apply(frame);
    for event in events {
        match event {
            TranscriptEvent::Changed => {
                let _ = ctx.events.send(SessionEvent::TranscriptChanged);
            }
            TranscriptEvent::ConversationStarted(pair) => {
                let _ = ctx.events.send(SessionEvent::ConversationStarted(pair));
            }
            TranscriptEvent::TerminalAppended { index, role } => {
                if role == Role::Agent {
                    start_reveal(ctx, index);
                }
                let _ = ctx.events.send(SessionEvent::TranscriptChanged);
            }
        }
    }
}

/// Start revealing the message at `index`, cancelling any reveal still
/// pending for a previous message.
fn start_reveal(ctx: &LoopCtx, index: usize) {
    let Some(interval) = ctx.config.reveal_interval else {
        return;
    };

    let cursor = {
        let mut shared = ctx.shared.lock();
        let Some(message) = shared.transcript.messages().get(index) else {
            return;
        };
        let cursor = RevealCursor::new(index, &message.content);
        shared.reveal = Some(cursor.clone());
        cursor
    };
    if cursor.is_done() {
        ctx.shared.lock().reveal = None;
        return;
    }

    let mut reveal_task = ctx.reveal_task.lock();
    if let Some(previous) = reveal_task.take() {
        previous.abort();
    }
    *reveal_task = Some(tokio::spawn(reveal_loop(
        Arc::clone(&ctx.shared),
        ctx.events.clone(),
        index,
        interval,
    )));
}

/// Per-character timer advancing the reveal cursor for one message index
async fn reveal_loop(
    shared: Arc<Mutex<Shared>>,
    events: mpsc::UnboundedSender<SessionEvent>,
    index: usize,
    interval: Duration,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.tick().await; // first tick completes immediately
    loop {
        ticker.tick().await;
        let done = {
            let mut guard = shared.lock();
            match guard.reveal.as_mut() {
                Some(cursor) if cursor.index == index => !cursor.advance(),
                // Superseded by a newer reveal or a teardown.
                _ => return,
            }
        };
        let _ = events.send(SessionEvent::TranscriptChanged);
        if done {
            let mut guard = shared.lock();
            if guard
                .reveal
                .as_ref()
                .map_or(false, |c| c.index == index && c.is_done())
            {
                guard.reveal = None;
            }
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fraudlens_types::{ConversationId, ThreadId};

    fn session() -> (ChatSession, mpsc::UnboundedReceiver<SessionEvent>) {
        ChatSession::new(SessionConfig::default(), UserId(7), "jwt")
    }

    #[tokio::test]
    async fn test_send_requires_open_socket() {
        let (session, _events) = session();
        assert_eq!(session.state(), ConnState::Idle);
        assert!(!session.send("hello"));
        // Nothing was appended optimistically for the refused send.
        assert!(session.transcript_snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_switch_conversation_replaces_pair() {
        let (session, mut events) = session();
        session.switch_conversation(SessionPair::started(
            ConversationId(42),
            ThreadId::new("t-42"),
        ));

        assert_eq!(
            session.session_pair().conversation_id,
            Some(ConversationId(42))
        );
        assert_eq!(events.recv().await, Some(SessionEvent::TranscriptChanged));
    }

    #[tokio::test]
    async fn test_disconnect_is_idempotent() {
        let (session, mut events) = session();
        session.disconnect();
        session.disconnect();
        assert_eq!(session.state(), ConnState::Closed);
        assert_eq!(events.recv().await, Some(SessionEvent::Disconnected));
        assert_eq!(events.recv().await, Some(SessionEvent::Disconnected));
    }

    #[tokio::test]
    async fn test_input_disabled_until_open() {
        let (session, _events) = session();
        assert!(!session.input_enabled());
    }

    #[tokio::test]
    async fn test_load_history_noop_without_conversation() {
        let (session, mut events) = session();
        // Unstarted pair: no fetch is attempted, no notice emitted.
        let history = HistoryClient::new("http://localhost:1", "jwt");
        session.load_history(&history).await;
        assert!(events.try_recv().is_err());
    }
}
