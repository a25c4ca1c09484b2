//! Fraudlens Session - Streaming Agent-Chat Session Controller
//!
//! This crate owns the one piece of the fraudlens client with real
//! state-machine behavior: the WebSocket session against the backend's
//! agent endpoint. It multiplexes streamed progress/reasoning events into
//! a coherent transcript, manages reconnection, and drives the incremental
//! typing reveal of agent responses.
//!
//! # Layers
//!
//! - [`Transcript`]: pure mutation engine; every transcript invariant
//!   (at-most-one-progress, reasoning accumulation, echo suppression)
//!   lives here and is unit-tested without any I/O.
//! - [`ChatSession`]: the controller. Socket lifecycle, outbound queue,
//!   reconnect-on-fixed-delay, history hydration with a stale-response
//!   guard, and reveal-task ownership.
//!
//! # Example
//!
//! ```ignore
//! use fraudlens_session::{ChatSession, SessionConfig};
//! use fraudlens_types::UserId;
//!
//! let (session, mut events) = ChatSession::new(SessionConfig::default(), UserId(7), token);
//! session.connect();
//!
//! while let Some(event) = events.recv().await {
//!     // redraw transcript, refresh history list, surface notices
//! }
//! ```

pub mod conn;
pub mod controller;
pub mod reveal;
pub mod transcript;

pub use conn::{ConnState, SessionConfig};
pub use controller::{ChatSession, SessionEvent};
pub use reveal::RevealCursor;
pub use transcript::{Transcript, TranscriptEvent};
