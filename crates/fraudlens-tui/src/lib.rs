//! Terminal UI for the fraudlens agent chat
//!
//! A thin rendering surface over the session controller: transcript pane
//! with the typing reveal applied, connection banner, history sidebar,
//! transient notices, and an input line. All state-machine behavior lives
//! in `fraudlens-session`; this crate only draws and forwards keys.

use std::time::Duration;

use chrono::Utc;
use crossterm::event::{self, Event as CEvent, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph, Wrap};
use ratatui::{Frame, Terminal};
use thiserror::Error;
use tracing::warn;

use fraudlens_alerts::{NoticeCenter, NoticeKind};
use fraudlens_api::DashboardClient;
use fraudlens_history::{ConversationSummary, HistoryClient};
use fraudlens_session::{ChatSession, ConnState, RevealCursor, SessionEvent};
use fraudlens_types::{ChatMessage, Role, SessionPair, UserId};

#[derive(Debug, Error)]
pub enum TuiError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

struct TuiState {
    input: String,
    conversations: Vec<ConversationSummary>,
    selected: usize,
    notices: NoticeCenter,
    transaction_count: Option<u64>,
}

impl TuiState {
    fn new() -> Self {
        Self {
            input: String::new(),
            conversations: Vec::new(),
            selected: 0,
            notices: NoticeCenter::default(),
            transaction_count: None,
        }
    }

    fn clamp_selection(&mut self) {
        if self.conversations.is_empty() {
            self.selected = 0;
        } else {
            self.selected = self.selected.min(self.conversations.len() - 1);
        }
    }
}

/// Run the chat TUI until the user quits. Tears the session down on exit.
pub async fn run_chat_tui(
    session: ChatSession,
    mut events: tokio::sync::mpsc::UnboundedReceiver<SessionEvent>,
    history: HistoryClient,
    dashboard: DashboardClient,
    user: UserId,
) -> Result<(), TuiError> {
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut state = TuiState::new();
    session.connect();
    refresh_history(&history, user, &mut state).await;
    refresh_stats(&dashboard, &mut state).await;

    let result = loop {
        // Drain session events queued since the last frame.
        while let Ok(event) = events.try_recv() {
            match event {
                // Connection status renders straight from the session state.
                SessionEvent::Connected | SessionEvent::Disconnected => {}
                SessionEvent::TranscriptChanged => {}
                SessionEvent::ConversationStarted(_) => {
                    refresh_history(&history, user, &mut state).await;
                }
                SessionEvent::Notice { kind, message } => {
                    state.notices.push(kind, message);
                }
            }
        }

        let messages = session.transcript_snapshot();
        let reveal = session.reveal_cursor();
        let is_typing = session.is_typing();
        let input_enabled = session.input_enabled();
        let conn = session.state();

        terminal.draw(|frame| {
            draw_ui(
                frame,
                &messages,
                reveal.as_ref(),
                is_typing,
                input_enabled,
                conn,
                &mut state,
            );
        })?;

        if event::poll(Duration::from_millis(50))? {
            if let CEvent::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match key.code {
                    KeyCode::Esc => break Ok(()),
                    KeyCode::Enter => {
                        if input_enabled && session.send(&state.input) {
                            state.input.clear();
                        }
                    }
                    KeyCode::Backspace => {
                        state.input.pop();
                    }
                    KeyCode::Up => {
                        state.selected = state.selected.saturating_sub(1);
                    }
                    KeyCode::Down => {
                        state.selected += 1;
                        state.clamp_selection();
                    }
                    KeyCode::Char('n') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        session.switch_conversation(SessionPair::unstarted());
                    }
                    KeyCode::Char('o') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        if let Some(summary) = state.conversations.get(state.selected) {
                            session.switch_conversation(SessionPair::started(
                                summary.id,
                                summary.thread_id.clone(),
                            ));
                            session.load_history(&history).await;
                        }
                    }
                    KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        delete_selected(&history, user, &mut state).await;
                    }
                    KeyCode::Char(c) => {
                        state.input.push(c);
                    }
                    _ => {}
                }
            }
        }
    };

    session.disconnect();
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    result
}

async fn refresh_history(history: &HistoryClient, user: UserId, state: &mut TuiState) {
    match history.list_conversations(user).await {
        Ok(conversations) => {
            state.conversations = conversations;
            state.clamp_selection();
        }
        Err(e) => {
            warn!(error = %e, "failed to refresh history list");
            state
                .notices
                .push(NoticeKind::Error, "Failed to load conversation list");
        }
    }
}

async fn refresh_stats(dashboard: &DashboardClient, state: &mut TuiState) {
    // The count is decoration on the banner; a failed fetch just leaves
    // it blank.
    match dashboard.transaction_count().await {
        Ok(count) => state.transaction_count = Some(count),
        Err(e) => warn!(error = %e, "failed to fetch transaction count"),
    }
}

async fn delete_selected(history: &HistoryClient, user: UserId, state: &mut TuiState) {
    let Some(summary) = state.conversations.get(state.selected) else {
        return;
    };
    match history.delete_conversation(user, summary.id).await {
        Ok(()) => {
            state
                .notices
                .push(NoticeKind::Success, "Conversation deleted");
            refresh_history(history, user, state).await;
        }
        Err(e) => {
            warn!(error = %e, "delete failed");
            state
                .notices
                .push(NoticeKind::Error, "Failed to delete conversation");
        }
    }
}

fn draw_ui(
    frame: &mut Frame<'_>,
    messages: &[ChatMessage],
    reveal: Option<&RevealCursor>,
    is_typing: bool,
    input_enabled: bool,
    conn: ConnState,
    state: &mut TuiState,
) {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(3),
        ])
        .split(frame.area());

    render_banner(frame, vertical[0], conn, state);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(75), Constraint::Percentage(25)])
        .split(vertical[1]);

    render_transcript(frame, body[0], messages, reveal, is_typing);
    render_sidebar(frame, body[1], state);
    render_input(frame, vertical[2], &state.input, input_enabled);
}

fn render_banner(frame: &mut Frame<'_>, area: Rect, conn: ConnState, state: &mut TuiState) {
    let (label, color) = match conn {
        ConnState::Open => ("Connected to AI Agent", Color::Green),
        ConnState::Connecting => ("Connecting...", Color::Yellow),
        ConnState::Idle | ConnState::Closed => {
            ("Disconnected - Attempting to reconnect...", Color::Red)
        }
    };

    let mut spans = vec![Span::styled(
        label,
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )];
    if let Some(stats) = stats_label(state.transaction_count) {
        spans.push(Span::raw("  |  "));
        spans.push(Span::styled(stats, Style::default().fg(Color::DarkGray)));
    }
    for notice in state.notices.active(Utc::now()) {
        spans.push(Span::raw("  |  "));
        spans.push(Span::styled(
            notice.message.clone(),
            Style::default().fg(match notice.kind {
                NoticeKind::Error => Color::Red,
                NoticeKind::Warning => Color::Yellow,
                NoticeKind::Success => Color::Green,
                NoticeKind::Info | NoticeKind::System => Color::Blue,
            }),
        ));
    }

    frame.render_widget(
        Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL)),
        area,
    );
}

fn stats_label(count: Option<u64>) -> Option<String> {
    count.map(|c| format!("{c} transactions monitored"))
}

fn render_transcript(
    frame: &mut Frame<'_>,
    area: Rect,
    messages: &[ChatMessage],
    reveal: Option<&RevealCursor>,
    is_typing: bool,
) {
    let mut lines: Vec<Line<'_>> = Vec::new();
    for (index, message) in messages.iter().enumerate() {
        let (prefix, style) = match message.role {
            Role::User => ("you", Style::default().fg(Color::White)),
            Role::Agent => ("agent", Style::default().fg(Color::Cyan)),
            Role::System => ("system", Style::default().fg(Color::Green)),
            Role::Progress => ("...", Style::default().fg(Color::Yellow)),
            Role::Error => ("error", Style::default().fg(Color::Red)),
            Role::ConversationStarted => continue,
        };

        let content = match reveal {
            Some(cursor) if cursor.index == index => cursor.visible(&message.content),
            _ => message.content.as_str(),
        };

        for (i, text) in content.split('\n').enumerate() {
            let head = if i == 0 {
                format!("{prefix}: ")
            } else {
                " ".repeat(prefix.len() + 2)
            };
            lines.push(Line::from(vec![
                Span::styled(head, style.add_modifier(Modifier::BOLD)),
                Span::styled(text.to_string(), style),
            ]));
        }
        if message.role == Role::Agent && !message.reasoning_steps.is_empty() {
            lines.push(Line::from(Span::styled(
                format!("  [{} reasoning steps]", message.reasoning_steps.len()),
                Style::default().fg(Color::DarkGray),
            )));
        }
    }
    if is_typing {
        lines.push(Line::from(Span::styled(
            "Agent is thinking...",
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        )));
    }

    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).title("Agent Chat")),
        area,
    );
}

fn render_sidebar(frame: &mut Frame<'_>, area: Rect, state: &TuiState) {
    let items: Vec<ListItem<'_>> = state
        .conversations
        .iter()
        .enumerate()
        .map(|(idx, summary)| {
            let marker = if idx == state.selected { ">" } else { " " };
            let title = summary.title.as_deref().unwrap_or("New Conversation");
            ListItem::new(format!("{marker} {title}"))
        })
        .collect();

    frame.render_widget(
        List::new(items).block(
            Block::default()
                .borders(Borders::ALL)
                .title("History (^O open, ^N new, ^D delete)"),
        ),
        area,
    );
}

fn render_input(frame: &mut Frame<'_>, area: Rect, input: &str, enabled: bool) {
    let placeholder = if enabled {
        "Ask about transactions, fraud detection, or analytics..."
    } else {
        "Waiting for the agent..."
    };
    let text = if input.is_empty() {
        Span::styled(placeholder, Style::default().fg(Color::DarkGray))
    } else {
        Span::raw(input)
    };

    frame.render_widget(
        Paragraph::new(Line::from(text)).block(
            Block::default()
                .borders(Borders::ALL)
                .title(if enabled { "Message (Enter to send, Esc to quit)" } else { "Message" }),
        ),
        area,
    );
}
