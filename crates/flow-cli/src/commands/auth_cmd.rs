//! Account management commands

use crate::cli::AuthCommands;
use crate::commands::common::prompt_line;
use crate::context::AppContext;
use crate::error::CliError;

pub async fn run_auth(ctx: &AppContext, command: AuthCommands) -> Result<(), CliError> {
    match command {
        AuthCommands::Login { email, password } => {
            let client = ctx.auth.as_ref().ok_or(CliError::AuthNotConfigured)?;
            let password = resolve_password(password)?;
            let session = client
                .sign_in(&email, &password)
                .await
                .map_err(|error| CliError::Auth(error.to_string()))?;
            ctx.session.apply_session(Some(&session)).await;

            let email_label = session.user.email.as_deref().unwrap_or("(no email)");
            println!("Signed in as {email_label}");
        }
        AuthCommands::Signup { email, password } => {
            let client = ctx.auth.as_ref().ok_or(CliError::AuthNotConfigured)?;
            let password = resolve_password(password)?;
            let session = client
                .sign_up(&email, &password)
                .await
                .map_err(|error| CliError::Auth(error.to_string()))?;
            ctx.session.apply_session(Some(&session)).await;

            let email_label = session.user.email.as_deref().unwrap_or("(no email)");
            println!("Account created, signed in as {email_label}");
        }
        AuthCommands::Logout => {
            if let Some(client) = &ctx.auth {
                client
                    .sign_out()
                    .map_err(|error| CliError::Auth(error.to_string()))?;
            }
            ctx.session.apply_session(None).await;
            println!("Signed out");
        }
        AuthCommands::Status => match ctx.session.current_user().await {
            Some(user) => {
                let email_label = user.email.as_deref().unwrap_or("(no email)");
                println!("Signed in as {email_label}");
            }
            None => println!("Not signed in (guest scope)"),
        },
    }
    Ok(())
}

fn resolve_password(flag: Option<String>) -> Result<String, CliError> {
    match flag {
        Some(password) => Ok(password),
        None => prompt_line("Password: "),
    }
}
