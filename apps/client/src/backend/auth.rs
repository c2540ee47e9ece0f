//! Identity-provider client. Authentication is a thin pass-through: the
//! provider owns credentials, tokens, and account state; this module only
//! shapes requests and maps provider error codes to the user-facing
//! messages shown on the sign-in screen — the one place in the app where
//! errors reach the user as text.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("wrong password")]
    WrongPassword,

    #[error("invalid email address")]
    InvalidEmail,

    #[error("user not found")]
    UserNotFound,

    #[error("account disabled")]
    UserDisabled,

    #[error("rate limited")]
    RateLimited,

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("auth service error: {0}")]
    Other(String),
}

impl AuthError {
    /// Maps a provider error code (plus its raw message, kept for the
    /// fallback) to a typed error.
    fn from_code(code: &str, message: String) -> AuthError {
        match code {
            "WRONG_PASSWORD" => AuthError::WrongPassword,
            "INVALID_EMAIL" => AuthError::InvalidEmail,
            "USER_NOT_FOUND" => AuthError::UserNotFound,
            "USER_DISABLED" => AuthError::UserDisabled,
            "TOO_MANY_REQUESTS" => AuthError::RateLimited,
            _ => AuthError::Other(message),
        }
    }

    /// The human-readable message shown to the user.
    pub fn user_message(&self) -> &'static str {
        match self {
            AuthError::WrongPassword => "Incorrect password. Please try again.",
            AuthError::InvalidEmail => "That email address is not valid.",
            AuthError::UserNotFound => "No account found for that email.",
            AuthError::UserDisabled => "This account has been disabled.",
            AuthError::RateLimited => "Too many attempts. Please wait a moment and try again.",
            AuthError::Network(_) => "Could not reach the server. Check your connection.",
            AuthError::Other(_) => "Something went wrong. Please try again.",
        }
    }
}

/// An authenticated (or guest) session.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: String,
    pub token: String,
    pub is_anonymous: bool,
}

#[derive(Debug, Serialize)]
struct CredentialsRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    user_id: String,
    token: String,
}

#[derive(Debug, Deserialize)]
struct AuthErrorResponse {
    error: AuthErrorBody,
}

#[derive(Debug, Deserialize)]
struct AuthErrorBody {
    code: String,
    #[serde(default)]
    message: String,
}

#[derive(Clone)]
pub struct AuthClient {
    client: Client,
    base_url: String,
}

impl AuthClient {
    pub fn new(base_url: String) -> AuthClient {
        AuthClient {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        self.session_request("/v1/accounts", email, password, false)
            .await
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        self.session_request("/v1/sessions", email, password, false)
            .await
    }

    pub async fn sign_in_anonymous(&self) -> Result<Identity, AuthError> {
        let response = self
            .client
            .post(format!("{}/v1/sessions/anonymous", self.base_url))
            .send()
            .await?;
        let session = Self::parse_session(response).await?;
        debug!(user_id = %session.user_id, "anonymous session started");
        Ok(Identity {
            user_id: session.user_id,
            token: session.token,
            is_anonymous: true,
        })
    }

    pub async fn sign_out(&self, token: &str) -> Result<(), AuthError> {
        let response = self
            .client
            .delete(format!("{}/v1/sessions", self.base_url))
            .bearer_auth(token)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::parse_error(response).await);
        }
        Ok(())
    }

    async fn session_request(
        &self,
        path: &str,
        email: &str,
        password: &str,
        is_anonymous: bool,
    ) -> Result<Identity, AuthError> {
        let response = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .json(&CredentialsRequest { email, password })
            .send()
            .await?;
        let session = Self::parse_session(response).await?;
        debug!(user_id = %session.user_id, "session established");
        Ok(Identity {
            user_id: session.user_id,
            token: session.token,
            is_anonymous,
        })
    }

    async fn parse_session(response: reqwest::Response) -> Result<SessionResponse, AuthError> {
        if !response.status().is_success() {
            return Err(Self::parse_error(response).await);
        }
        response.json().await.map_err(AuthError::from)
    }

    async fn parse_error(response: reqwest::Response) -> AuthError {
        let body = response.text().await.unwrap_or_default();
        match serde_json::from_str::<AuthErrorResponse>(&body) {
            Ok(parsed) => AuthError::from_code(&parsed.error.code, parsed.error.message),
            Err(_) => AuthError::Other(body),
        }
    }
}
