//! Fraudlens Types - Canonical domain types for the fraud-monitoring client
//!
//! This crate contains all foundational types for the fraudlens client with
//! zero dependencies on other fraudlens crates. It defines:
//!
//! - Identity types (UserId, ConversationId, ThreadId) and the session pair
//! - Transcript types (Role, ChatMessage, ReasoningStep, ProgressKind)
//! - Wire frames for the agent WebSocket (ClientFrame, ServerFrame)
//!
//! # Core Invariants
//!
//! 1. The session pair is replaced wholesale, never mutated field-by-field
//! 2. At most one Progress-role message exists in a transcript at a time
//!    (enforced by the session crate, expressible with these types)
//! 3. Inbound frames are validated at the deserialization boundary:
//!    malformed payloads become [`FrameError`], never a half-built message

pub mod frame;
pub mod identity;
pub mod message;

pub use frame::{ClientFrame, FrameError, ServerFrame};
pub use identity::{ConversationId, SessionPair, ThreadId, UserId};
pub use message::{unescape_newlines, ChatMessage, ProgressKind, ReasoningStep, Role};
