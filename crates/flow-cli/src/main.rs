//! Flow CLI - timed freewriting sessions from the terminal
//!
//! `flow write` opens your editor for a session; entries autosave through
//! the same engine the graphical shells use.

mod cli;
mod commands;
mod context;
mod error;
mod session_store;

use clap::Parser;

use flow_core::config::AppConfig;

use crate::cli::{Cli, Commands};
use crate::commands::{auth_cmd, chat_cmd, completions, entries, settings_cmd, write};
use crate::context::AppContext;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("flow=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    // Completions need no storage or network.
    if let Commands::Completions { shell, output } = &cli.command {
        return completions::run_completions(*shell, output.as_deref());
    }

    let config = AppConfig::from_env();
    let ctx = AppContext::init(config).await?;

    match cli.command {
        Commands::Write { entry } => write::run_write(&ctx, entry.as_deref()).await?,
        Commands::List { limit, json } => entries::run_list(&ctx, limit, json).await?,
        Commands::Show { id } => entries::run_show(&ctx, &id).await?,
        Commands::Delete { id } => entries::run_delete(&ctx, &id).await?,
        Commands::Settings { command } => settings_cmd::run_settings(&ctx, command).await?,
        Commands::Auth { command } => auth_cmd::run_auth(&ctx, command).await?,
        Commands::Chat { message, entry } => {
            chat_cmd::run_chat(&ctx, &message, entry.as_deref()).await?;
        }
        Commands::Completions { .. } => unreachable!("handled above"),
    }

    Ok(())
}
