//! Fraudlens Alerts - Transient User Notifications
//!
//! This crate provides the in-memory notice center backing the client's
//! transient notifications: history-fetch failures, delete failures, and
//! connectivity changes all surface here rather than as fatal errors.
//!
//! Notices auto-dismiss after a fixed interval unless marked persistent.
//! Time is injected into the expiry sweep so behavior is fully testable.
//!
//! # Example
//!
//! ```ignore
//! use fraudlens_alerts::{NoticeCenter, NoticeKind};
//!
//! let mut center = NoticeCenter::default();
//! center.push(NoticeKind::Error, "Failed to load conversation history");
//!
//! for notice in center.active(chrono::Utc::now()) {
//!     println!("{}: {}", notice.kind, notice.message);
//! }
//! ```

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Notice identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NoticeId(pub Uuid);

impl NoticeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NoticeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for NoticeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Category of a notice, mapped to display styling by the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoticeKind {
    Info,
    Success,
    Warning,
    Error,
    System,
}

impl std::fmt::Display for NoticeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::System => "system",
        };
        write!(f, "{}", s)
    }
}

/// A single transient notification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notice {
    pub id: NoticeId,
    pub kind: NoticeKind,
    pub message: String,
    pub created_at: DateTime<Utc>,
    /// Persistent notices never auto-dismiss
    pub persistent: bool,
    /// Instant after which the notice is swept; `None` when persistent
    pub expires_at: Option<DateTime<Utc>>,
}

/// In-memory notice center with auto-dismiss
#[derive(Debug)]
pub struct NoticeCenter {
    notices: Vec<Notice>,
    dismiss_after: Duration,
}

impl Default for NoticeCenter {
    fn default() -> Self {
        Self::new(Duration::seconds(5))
    }
}

impl NoticeCenter {
    /// Create a center with the given auto-dismiss interval
    pub fn new(dismiss_after: Duration) -> Self {
        Self {
            notices: Vec::new(),
            dismiss_after,
        }
    }

    /// Push an auto-dismissing notice
    pub fn push(&mut self, kind: NoticeKind, message: impl Into<String>) -> NoticeId {
        self.push_at(kind, message, Utc::now(), false)
    }

    /// Push a notice that stays until explicitly dismissed
    pub fn push_persistent(&mut self, kind: NoticeKind, message: impl Into<String>) -> NoticeId {
        self.push_at(kind, message, Utc::now(), true)
    }

    /// Push with an explicit creation instant
    pub fn push_at(
        &mut self,
        kind: NoticeKind,
        message: impl Into<String>,
        now: DateTime<Utc>,
        persistent: bool,
    ) -> NoticeId {
        let id = NoticeId::new();
        self.notices.push(Notice {
            id,
            kind,
            message: message.into(),
            created_at: now,
            persistent,
            expires_at: (!persistent).then(|| now + self.dismiss_after),
        });
        id
    }

    /// Dismiss a notice by id; returns whether it existed
    pub fn dismiss(&mut self, id: NoticeId) -> bool {
        let before = self.notices.len();
        self.notices.retain(|n| n.id != id);
        self.notices.len() != before
    }

    /// Sweep expired notices and return the ones still visible at `now`
    pub fn active(&mut self, now: DateTime<Utc>) -> &[Notice] {
        self.notices
            .retain(|n| n.expires_at.map_or(true, |at| at > now));
        &self.notices
    }

    pub fn is_empty(&self) -> bool {
        self.notices.is_empty()
    }
}
