//! Shared command context
//!
//! Opens the local store, wires the storage router, engine, and session
//! manager, and restores any persisted sign-in before a command runs.

use std::path::PathBuf;
use std::sync::Arc;

use flow_core::auth::AuthClient;
use flow_core::config::AppConfig;
use flow_core::editor::EditorEngine;
use flow_core::session::SessionManager;
use flow_core::storage::{LocalStore, RemoteStore, Storage};

use crate::error::CliError;
use crate::session_store::KeyringSessionStore;

pub struct AppContext {
    pub engine: EditorEngine,
    pub session: SessionManager,
    pub auth: Option<AuthClient<KeyringSessionStore>>,
    pub config: AppConfig,
}

impl AppContext {
    /// Build the context for one command invocation.
    pub async fn init(config: AppConfig) -> Result<Self, CliError> {
        let db_path = config.db_path.clone().unwrap_or_else(default_db_path);
        let local = LocalStore::open(&db_path).await?;

        let remote = match &config.sync_url {
            Some(url) => Some(RemoteStore::new(url)?),
            None => None,
        };

        let storage = Arc::new(Storage::new(local, remote));
        let engine = EditorEngine::new(Arc::clone(&storage));
        let session = SessionManager::new(Arc::clone(&storage), engine.clone());

        let auth = match &config.auth {
            Some(auth_config) => Some(
                AuthClient::new(
                    &auth_config.url,
                    auth_config.api_key.clone(),
                    KeyringSessionStore::new(),
                )
                .map_err(|error| CliError::Auth(error.to_string()))?,
            ),
            None => None,
        };

        let restored = match &auth {
            Some(client) => client.restore_session().await.unwrap_or_else(|error| {
                tracing::warn!("Failed to restore persisted session: {error}");
                None
            }),
            None => None,
        };
        session.apply_session(restored.as_ref()).await;

        Ok(Self {
            engine,
            session,
            auth,
            config,
        })
    }
}

fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("flow")
        .join("flow.db")
}
