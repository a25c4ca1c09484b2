//! Connection lifecycle state machine
//!
//! One WebSocket per controller. A connect request while an attempt is
//! already in flight (or a socket is open) is suppressed; reconnection
//! after an unexpected close runs on a fixed delay and is suppressed
//! entirely once the caller has torn the session down.

use std::time::Duration;

use fraudlens_types::UserId;

/// Connection states for the agent socket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnState {
    /// No user identity or token available yet
    Idle,
    /// A connection attempt is in flight
    Connecting,
    /// Socket is open and sendable
    Open,
    /// Terminal per attempt; may re-enter Connecting on schedule
    Closed,
}

impl ConnState {
    /// Whether a new connection attempt may start from this state.
    ///
    /// Guards against duplicate sockets: a second connect while
    /// `Connecting` or `Open` is a no-op.
    pub fn can_connect(&self) -> bool {
        matches!(self, ConnState::Idle | ConnState::Closed)
    }

    pub fn is_open(&self) -> bool {
        *self == ConnState::Open
    }
}

/// Session controller configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// WebSocket base URL, e.g. `ws://localhost:8000`
    pub ws_url: String,
    /// Whether to reconnect after an unexpected close
    pub reconnect: bool,
    /// Fixed delay between reconnect attempts; no backoff, no cap
    pub reconnect_delay: Duration,
    /// Per-character delay of the typing reveal; `None` disables it
    pub reveal_interval: Option<Duration>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ws_url: "ws://localhost:8000".to_string(),
            reconnect: true,
            reconnect_delay: Duration::from_secs(3),
            reveal_interval: Some(Duration::from_millis(15)),
        }
    }
}

impl SessionConfig {
    /// Connection URL for a user: the id and bearer token travel as
    /// connection parameters; no message-level re-auth happens after
    /// connect.
    pub fn agent_url(&self, user: UserId, token: &str) -> String {
        format!(
            "{}/chat/ws/agent/{}?token={}",
            self.ws_url.trim_end_matches('/'),
            user,
            token
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_guard() {
        assert!(ConnState::Idle.can_connect());
        assert!(ConnState::Closed.can_connect());
        assert!(!ConnState::Connecting.can_connect());
        assert!(!ConnState::Open.can_connect());
    }

    #[test]
    fn test_default_reconnect_policy() {
        let config = SessionConfig::default();
        assert!(config.reconnect);
        assert_eq!(config.reconnect_delay, Duration::from_secs(3));
    }

    #[test]
    fn test_agent_url() {
        let config = SessionConfig {
            ws_url: "ws://localhost:8000/".to_string(),
            ..Default::default()
        };
        assert_eq!(
            config.agent_url(UserId(7), "jwt-token"),
            "ws://localhost:8000/chat/ws/agent/7?token=jwt-token"
        );
    }
}
