//! Fraudlens - Terminal Client for the Fraud-Monitoring Dashboard
//!
//! Connects to the backend's agent WebSocket and conversation store and
//! runs the chat TUI.
//!
//! ```bash
//! # Log in and chat. The login response carries no user id, so the id
//! # is always passed explicitly.
//! fraudlens --user-id 7 --email analyst@example.com --password secret
//!
//! # Or reuse an existing token
//! fraudlens --user-id 7 --token $FRAUDLENS_TOKEN
//! ```

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;

use fraudlens_api::{AuthClient, Credentials, DashboardClient};
use fraudlens_history::HistoryClient;
use fraudlens_session::{ChatSession, SessionConfig};
use fraudlens_tui::run_chat_tui;
use fraudlens_types::UserId;

#[derive(Parser)]
#[command(name = "fraudlens")]
#[command(about = "Terminal client for the fraud-monitoring dashboard")]
struct Cli {
    /// Backend REST base URL
    #[arg(long, env = "FRAUDLENS_API_URL", default_value = "http://localhost:8000")]
    api_url: String,

    /// Backend WebSocket base URL
    #[arg(long, env = "FRAUDLENS_WS_URL", default_value = "ws://localhost:8000")]
    ws_url: String,

    /// Backend user id (skips login when paired with --token)
    #[arg(long, env = "FRAUDLENS_USER_ID")]
    user_id: Option<i64>,

    /// Bearer token (skips login when paired with --user-id)
    #[arg(long, env = "FRAUDLENS_TOKEN")]
    token: Option<String>,

    /// Login email
    #[arg(long, env = "FRAUDLENS_EMAIL")]
    email: Option<String>,

    /// Login password
    #[arg(long, env = "FRAUDLENS_PASSWORD")]
    password: Option<String>,

    /// Disable the character-by-character reveal of agent responses
    #[arg(long)]
    no_reveal: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let (user, token) = resolve_identity(&cli).await?;
    info!(%user, "starting fraudlens");

    let mut config = SessionConfig {
        ws_url: cli.ws_url.clone(),
        ..Default::default()
    };
    if cli.no_reveal {
        config.reveal_interval = None;
    }

    let (session, events) = ChatSession::new(config, user, token.clone());
    let history = HistoryClient::new(cli.api_url.clone(), token.clone());
    let dashboard = DashboardClient::new(cli.api_url.clone(), token);

    run_chat_tui(session, events, history, dashboard, user)
        .await
        .context("TUI failed")?;

    Ok(())
}

/// Resolve the user id and bearer token: either provided directly or
/// obtained by logging in with email + password.
async fn resolve_identity(cli: &Cli) -> Result<(UserId, String)> {
    if let (Some(user_id), Some(token)) = (cli.user_id, cli.token.as_ref()) {
        let auth = AuthClient::new(cli.api_url.clone());
        if !auth.verify_token(token).await.unwrap_or(false) {
            bail!("provided token was rejected by the backend");
        }
        return Ok((UserId(user_id), token.clone()));
    }

    let (Some(email), Some(password)) = (cli.email.as_ref(), cli.password.as_ref()) else {
        bail!("either --user-id with --token, or --email with --password is required");
    };

    let auth = AuthClient::new(cli.api_url.clone());
    let response = auth
        .login(&Credentials {
            email: email.clone(),
            password: password.clone(),
            name: None,
        })
        .await
        .context("login failed")?;

    let user_id = cli
        .user_id
        .context("backend login does not return a user id; pass --user-id")?;
    info!(email = %response.user_email, "logged in");
    Ok((UserId(user_id), response.token.access_token))
}
