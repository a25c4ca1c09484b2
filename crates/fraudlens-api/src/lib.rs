//! Fraudlens API - Dashboard REST Collaborators
//!
//! This crate provides the typed HTTP clients for everything on the
//! dashboard other than the chat session: transaction listings with fraud
//! predictions, the stats overview, on-demand fraud analysis, report
//! generation, and the auth/session collaborator.
//!
//! All of these are opaque external collaborators: the client never
//! computes a fraud score itself, it only fetches and renders.
//!
//! Responses from the slow-moving stats endpoints pass through a
//! best-effort time-boxed cache (about two minutes); cached data is never
//! authoritative and expired entries are simply refetched.

pub mod auth;
pub mod cache;
pub mod client;

pub use auth::{AuthClient, Credentials, Token, TokenResponse};
pub use cache::TtlCache;
pub use client::{
    DashboardClient, FraudPrediction, ReportSummary, StatsOverview, TransactionPage,
    TransactionRecord, VelocityWindow,
};

use thiserror::Error;

/// API client errors
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("failed to decode response: {0}")]
    Decode(String),
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;
