//! Writing assistant commands

use std::io::{self, BufRead, Write};

use flow_core::chat::{ChatClient, ChatSession};

use crate::commands::common::resolve_entry;
use crate::context::AppContext;
use crate::error::CliError;

/// Shown for any assistant failure; details go to the log only.
const GENERIC_CHAT_ERROR: &str = "Sorry, I ran into an error reaching the writing assistant.";

pub async fn run_chat(
    ctx: &AppContext,
    message_parts: &[String],
    entry_query: Option<&str>,
) -> Result<(), CliError> {
    let chat_config = ctx.config.chat.as_ref().ok_or(CliError::ChatNotConfigured)?;
    let client = ChatClient::new(chat_config.api_key.clone(), chat_config.model.clone())
        .map_err(|_| CliError::ChatNotConfigured)?;

    let document_context = match entry_query {
        Some(query) => resolve_entry(&ctx.engine.entries().await, query)?.content,
        None => ctx.engine.content().await,
    };

    let mut session = client.create_session("");
    let message = message_parts.join(" ");

    if message.trim().is_empty() {
        run_repl(&client, &mut session, &document_context).await
    } else {
        send_and_print(&client, &mut session, &message, &document_context).await;
        Ok(())
    }
}

async fn run_repl(
    client: &ChatClient,
    session: &mut ChatSession,
    document_context: &str,
) -> Result<(), CliError> {
    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            return Ok(()); // EOF
        }
        let message = line.trim();
        if message.is_empty() {
            continue;
        }
        send_and_print(client, session, message, document_context).await;
    }
}

async fn send_and_print(
    client: &ChatClient,
    session: &mut ChatSession,
    message: &str,
    document_context: &str,
) {
    match client.send_message(session, message, document_context).await {
        Ok(reply) => println!("{reply}"),
        Err(error) => {
            tracing::warn!("Assistant request failed: {error}");
            println!("{GENERIC_CHAT_ERROR}");
        }
    }
}
