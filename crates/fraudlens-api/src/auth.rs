//! Session collaborator client
//!
//! Login, registration, Google sign-in, and token verification. Token
//! storage is the caller's concern; this client only exchanges
//! credentials for tokens and checks their validity.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{ApiError, ApiResult};

/// Email + password credentials for login and registration
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Bearer token pair returned by the auth endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub token_type: String,
}

/// Full login response: user identity plus token
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub user_email: String,
    pub name: String,
    pub token: Token,
}

/// HTTP client for the auth endpoints
pub struct AuthClient {
    base_url: String,
    client: reqwest::Client,
}

impl AuthClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Exchange credentials for a token via `POST /auth/login`
    pub async fn login(&self, credentials: &Credentials) -> ApiResult<TokenResponse> {
        self.post_json("/auth/login", credentials).await
    }

    /// Register a new account via `POST /auth/register`
    pub async fn register(&self, credentials: &Credentials) -> ApiResult<TokenResponse> {
        self.post_json("/auth/register", credentials).await
    }

    /// Google sign-in with an id token via `POST /auth/google`
    pub async fn login_google(&self, id_token: &str) -> ApiResult<TokenResponse> {
        self.post_json("/auth/google", &serde_json::json!({ "token": id_token }))
            .await
    }

    /// Check whether a token is still valid via `GET /auth/verify-token`
    pub async fn verify_token(&self, token: &str) -> ApiResult<bool> {
        let url = format!("{}/auth/verify-token", self.base_url);
        debug!(%url, "verifying token");
        let resp = self.client.get(&url).bearer_auth(token).send().await?;
        Ok(resp.status().is_success())
    }

    async fn post_json<B: Serialize, T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "auth request");
        let resp = self.client.post(&url).json(body).send().await?;
        if !resp.status().is_success() {
            return Err(ApiError::Status(resp.status()));
        }
        resp.json().await.map_err(|e| ApiError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_omit_name_when_absent() {
        let creds = Credentials {
            email: "a@b.c".to_string(),
            password: "secret".to_string(),
            name: None,
        };
        let json = serde_json::to_string(&creds).unwrap();
        assert!(!json.contains("name"));
    }

    #[test]
    fn test_token_response_decodes() {
        let json = r#"{
            "user_email": "a@b.c",
            "name": "Ana",
            "token": {"access_token": "jwt", "token_type": "bearer"}
        }"#;
        let resp: TokenResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.token.token_type, "bearer");
        assert_eq!(resp.name, "Ana");
    }
}
