//! Command implementations

pub mod auth_cmd;
pub mod chat_cmd;
pub mod common;
pub mod completions;
pub mod entries;
pub mod settings_cmd;
pub mod write;
