//! Identity backend client
//!
//! REST client for the email/password + OAuth identity service, plus the
//! session types shared with shells. Sign-in state is broadcast on a watch
//! channel; the session manager consumes it and reloads scope data.

use std::fmt;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::watch;

use crate::models::User;
use crate::util::is_http_url;

const EXPIRY_SKEW_SECONDS: i64 = 60;

/// Errors surfaced by the auth client.
///
/// The first three API variants are the causes recognized well enough to
/// show the user a specific message; everything else collapses into `Api`.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Sign-in is not configured for this build.")]
    NotConfigured,
    #[error("Invalid auth configuration: {0}")]
    InvalidConfiguration(&'static str),
    #[error("Invalid email or password.")]
    InvalidCredentials,
    #[error("Email already in use.")]
    EmailInUse,
    #[error("Password should be at least 6 characters.")]
    WeakPassword,
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Failed to parse JSON payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Authentication failed: {0}")]
    Api(String),
    #[error("Secure storage error: {0}")]
    SecureStorage(String),
}

pub type AuthResult<T> = Result<T, AuthError>;

/// An established sign-in.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    /// Unix seconds after which the token is no longer usable
    pub expires_at: i64,
    pub user: User,
}

impl AuthSession {
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at <= unix_timestamp_now() + EXPIRY_SKEW_SECONDS
    }
}

impl fmt::Debug for AuthSession {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("AuthSession")
            .field("access_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .field("user", &self.user)
            .finish()
    }
}

/// Where shells keep the session between runs (keychain, kv store, ...).
pub trait SessionPersistence: Clone + Send + Sync + 'static {
    fn load_session(&self) -> AuthResult<Option<AuthSession>>;
    fn save_session(&self, session: &AuthSession) -> AuthResult<()>;
    fn clear_session(&self) -> AuthResult<()>;
}

/// Client for the identity REST endpoints.
#[derive(Clone)]
pub struct AuthClient<S: SessionPersistence> {
    auth_url: String,
    api_key: String,
    client: Client,
    store: S,
    identity_tx: watch::Sender<Option<AuthSession>>,
}

impl<S: SessionPersistence> AuthClient<S> {
    pub fn new(url: impl AsRef<str>, api_key: impl Into<String>, store: S) -> AuthResult<Self> {
        let auth_url = normalize_auth_url(url.as_ref())?;
        let api_key = api_key.into().trim().to_string();
        if api_key.is_empty() {
            return Err(AuthError::InvalidConfiguration(
                "auth API key must not be empty",
            ));
        }

        let (identity_tx, _) = watch::channel(None);
        Ok(Self {
            auth_url,
            api_key,
            client: Client::builder().build()?,
            store,
            identity_tx,
        })
    }

    /// Subscribe to signed-in/signed-out transitions.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<AuthSession>> {
        self.identity_tx.subscribe()
    }

    /// Restore a persisted session, dropping it when expired.
    pub async fn restore_session(&self) -> AuthResult<Option<AuthSession>> {
        let Some(stored) = self.store.load_session()? else {
            return Ok(None);
        };

        if stored.is_expired() {
            tracing::debug!("Persisted session expired, clearing");
            self.store.clear_session()?;
            return Ok(None);
        }

        let _ = self.identity_tx.send(Some(stored.clone()));
        Ok(Some(stored))
    }

    /// Create an account with email and password.
    pub async fn sign_up(&self, email: &str, password: &str) -> AuthResult<AuthSession> {
        validate_credentials(email, password)?;
        let payload = serde_json::json!({
            "email": email,
            "password": password,
            "returnSecureToken": true,
        });
        self.establish_session("accounts:signUp", &payload).await
    }

    /// Sign in with email and password.
    pub async fn sign_in(&self, email: &str, password: &str) -> AuthResult<AuthSession> {
        validate_credentials(email, password)?;
        let payload = serde_json::json!({
            "email": email,
            "password": password,
            "returnSecureToken": true,
        });
        self.establish_session("accounts:signInWithPassword", &payload)
            .await
    }

    /// Sign in with an OAuth id token obtained out of band.
    pub async fn sign_in_with_id_token(
        &self,
        provider: &str,
        id_token: &str,
    ) -> AuthResult<AuthSession> {
        if id_token.trim().is_empty() {
            return Err(AuthError::Api("OAuth id token is required".to_string()));
        }
        let payload = serde_json::json!({
            "postBody": format!("id_token={id_token}&providerId={provider}"),
            "requestUri": "http://localhost",
            "returnSecureToken": true,
        });
        self.establish_session("accounts:signInWithIdp", &payload)
            .await
    }

    /// Sign out: drop the persisted session and notify subscribers.
    ///
    /// Sign-out is client-side; the token simply ages out server-side.
    pub fn sign_out(&self) -> AuthResult<()> {
        self.store.clear_session()?;
        let _ = self.identity_tx.send(None);
        Ok(())
    }

    async fn establish_session(
        &self,
        endpoint: &str,
        payload: &serde_json::Value,
    ) -> AuthResult<AuthSession> {
        let url = format!("{}/v1/{endpoint}?key={}", self.auth_url, self.api_key);
        let response = self.client.post(url).json(payload).send().await?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_error_body(&body));
        }

        let identity = response.json::<IdentityResponse>().await?;
        let session = identity.into_session()?;
        self.store.save_session(&session)?;
        let _ = self.identity_tx.send(Some(session.clone()));
        Ok(session)
    }
}

/// Normalize the identity endpoint base URL.
pub fn normalize_auth_url(url: &str) -> AuthResult<String> {
    let trimmed = url.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(AuthError::InvalidConfiguration("auth URL must not be empty"));
    }
    if !is_http_url(trimmed) {
        return Err(AuthError::InvalidConfiguration(
            "auth URL must include http:// or https://",
        ));
    }
    Ok(trimmed.to_string())
}

fn validate_credentials(email: &str, password: &str) -> AuthResult<()> {
    if email.trim().is_empty() {
        return Err(AuthError::Api("Email is required".to_string()));
    }
    if password.trim().is_empty() {
        return Err(AuthError::Api("Password is required".to_string()));
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IdentityResponse {
    local_id: String,
    email: Option<String>,
    display_name: Option<String>,
    #[serde(rename = "photoUrl")]
    photo_url: Option<String>,
    id_token: Option<String>,
    /// Seconds, delivered as a decimal string
    expires_in: Option<String>,
}

impl IdentityResponse {
    fn into_session(self) -> AuthResult<AuthSession> {
        let access_token = self.id_token.ok_or_else(|| {
            AuthError::Api("Auth response did not include a token".to_string())
        })?;
        let expires_in = self
            .expires_in
            .as_deref()
            .and_then(|raw| raw.parse::<i64>().ok())
            .unwrap_or(3600);

        Ok(AuthSession {
            access_token,
            expires_at: unix_timestamp_now().saturating_add(expires_in),
            user: User {
                id: self.local_id,
                email: self.email,
                display_name: self.display_name,
                avatar_url: self.photo_url,
            },
        })
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: Option<String>,
}

fn map_error_body(body: &str) -> AuthError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|payload| payload.error)
        .and_then(|detail| detail.message)
        .unwrap_or_else(|| body.trim().to_string());
    map_error_message(&message)
}

fn map_error_message(message: &str) -> AuthError {
    let code = message.split(&[' ', ':'][..]).next().unwrap_or(message);
    match code {
        "INVALID_LOGIN_CREDENTIALS" | "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" => {
            AuthError::InvalidCredentials
        }
        "EMAIL_EXISTS" => AuthError::EmailInUse,
        "WEAK_PASSWORD" => AuthError::WeakPassword,
        _ => AuthError::Api(message.to_string()),
    }
}

fn unix_timestamp_now() -> i64 {
    chrono::Utc::now().timestamp()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn normalize_auth_url_strips_trailing_slash() {
        assert_eq!(
            normalize_auth_url("https://identity.example.com/ ").unwrap(),
            "https://identity.example.com"
        );
        assert!(normalize_auth_url("identity.example.com").is_err());
        assert!(normalize_auth_url("  ").is_err());
    }

    #[test]
    fn recognized_error_codes_map_to_specific_variants() {
        assert!(matches!(
            map_error_message("INVALID_LOGIN_CREDENTIALS"),
            AuthError::InvalidCredentials
        ));
        assert!(matches!(
            map_error_message("EMAIL_EXISTS"),
            AuthError::EmailInUse
        ));
        assert!(matches!(
            map_error_message("WEAK_PASSWORD : Password should be at least 6 characters"),
            AuthError::WeakPassword
        ));
    }

    #[test]
    fn unknown_errors_fall_back_to_generic_api_variant() {
        assert!(matches!(
            map_error_message("TOO_MANY_ATTEMPTS_TRY_LATER"),
            AuthError::Api(_)
        ));
    }

    #[test]
    fn error_body_parsing_extracts_nested_message() {
        let body = r#"{"error": {"code": 400, "message": "EMAIL_EXISTS"}}"#;
        assert!(matches!(map_error_body(body), AuthError::EmailInUse));

        // Unparseable bodies become generic API errors.
        assert!(matches!(map_error_body("boom"), AuthError::Api(_)));
    }

    #[test]
    fn session_debug_redacts_token() {
        let session = AuthSession {
            access_token: "secret-token".to_string(),
            expires_at: 1_700_000_000,
            user: User {
                id: "u1".to_string(),
                email: None,
                display_name: None,
                avatar_url: None,
            },
        };
        let rendered = format!("{session:?}");
        assert!(!rendered.contains("secret-token"));
        assert!(rendered.contains("[REDACTED]"));
    }

    #[test]
    fn expiry_check_applies_skew() {
        let user = User {
            id: "u1".to_string(),
            email: None,
            display_name: None,
            avatar_url: None,
        };
        let live = AuthSession {
            access_token: "t".to_string(),
            expires_at: unix_timestamp_now() + 3_600,
            user: user.clone(),
        };
        assert!(!live.is_expired());

        // Within the skew window counts as expired.
        let expiring = AuthSession {
            access_token: "t".to_string(),
            expires_at: unix_timestamp_now() + 30,
            user,
        };
        assert!(expiring.is_expired());
    }

    #[test]
    fn identity_response_requires_token() {
        let response = IdentityResponse {
            local_id: "u1".to_string(),
            email: Some("u1@example.com".to_string()),
            display_name: None,
            photo_url: None,
            id_token: None,
            expires_in: None,
        };
        assert!(response.into_session().is_err());
    }

    #[test]
    fn identity_response_builds_session_with_profile() {
        let response = IdentityResponse {
            local_id: "u1".to_string(),
            email: Some("u1@example.com".to_string()),
            display_name: Some("U One".to_string()),
            photo_url: Some("https://example.com/a.png".to_string()),
            id_token: Some("token".to_string()),
            expires_in: Some("3600".to_string()),
        };
        let session = response.into_session().unwrap();
        assert_eq!(session.user.id, "u1");
        assert_eq!(session.user.display_name.as_deref(), Some("U One"));
        assert!(session.expires_at > unix_timestamp_now());
        assert!(!session.is_expired());
    }
}
