//! CLI error type

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] flow_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("{0}")]
    Auth(String),
    #[error("No entry content provided")]
    EmptyContent,
    #[error("Entry not found for id/prefix: {0}")]
    EntryNotFound(String),
    #[error("{0}")]
    AmbiguousEntryId(String),
    #[error("Editor command failed: {0}")]
    EditorFailed(String),
    #[error(
        "Sign-in is not configured. Set FLOW_AUTH_URL and FLOW_AUTH_API_KEY to enable `flow auth`."
    )]
    AuthNotConfigured,
    #[error("The assistant is not configured. Set FLOW_CHAT_API_KEY to enable `flow chat`.")]
    ChatNotConfigured,
}
