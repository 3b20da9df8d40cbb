//! Runtime configuration
//!
//! Backend endpoints and keys come from the environment. Everything is
//! optional: a build with nothing set runs guest/local-only, silently.

use std::env;
use std::path::PathBuf;

use crate::util::normalize_text_option;

/// Identity backend coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthConfig {
    pub url: String,
    pub api_key: String,
}

/// Assistant backend coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatConfig {
    pub api_key: String,
    pub model: Option<String>,
}

/// Resolved application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppConfig {
    /// Identity backend; `None` disables sign-in
    pub auth: Option<AuthConfig>,
    /// Remote document store base URL; `None` disables cloud persistence
    pub sync_url: Option<String>,
    /// Assistant backend; `None` disables chat
    pub chat: Option<ChatConfig>,
    /// Local database path override
    pub db_path: Option<PathBuf>,
}

impl AppConfig {
    /// Resolve configuration from `FLOW_*` environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::resolve(
            env::var("FLOW_AUTH_URL").ok(),
            env::var("FLOW_AUTH_API_KEY").ok(),
            env::var("FLOW_SYNC_URL").ok(),
            env::var("FLOW_CHAT_API_KEY").ok(),
            env::var("FLOW_CHAT_MODEL").ok(),
            env::var("FLOW_DB_PATH").ok(),
        )
    }

    fn resolve(
        auth_url: Option<String>,
        auth_api_key: Option<String>,
        sync_url: Option<String>,
        chat_api_key: Option<String>,
        chat_model: Option<String>,
        db_path: Option<String>,
    ) -> Self {
        let auth = match (
            normalize_text_option(auth_url),
            normalize_text_option(auth_api_key),
        ) {
            (Some(url), Some(api_key)) => Some(AuthConfig { url, api_key }),
            (None, None) => None,
            _ => {
                tracing::warn!(
                    "Ignoring partial auth configuration: FLOW_AUTH_URL and FLOW_AUTH_API_KEY must both be set"
                );
                None
            }
        };

        let chat = normalize_text_option(chat_api_key).map(|api_key| ChatConfig {
            api_key,
            model: normalize_text_option(chat_model),
        });

        Self {
            auth,
            sync_url: normalize_text_option(sync_url),
            chat,
            db_path: normalize_text_option(db_path).map(PathBuf::from),
        }
    }
}
