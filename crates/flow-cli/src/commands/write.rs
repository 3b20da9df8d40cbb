//! The freewriting session command

use std::time::Instant;

use flow_core::timer::{format_clock, SESSION_SECONDS};

use crate::commands::common::{
    capture_editor_input_with_initial, read_piped_stdin, resolve_entry, short_id,
};
use crate::context::AppContext;
use crate::error::CliError;

/// Run one editor session and flush the result through the engine.
pub async fn run_write(ctx: &AppContext, entry_query: Option<&str>) -> Result<(), CliError> {
    if let Some(query) = entry_query {
        let entry = resolve_entry(&ctx.engine.entries().await, query)?;
        ctx.engine.load_entry(&entry).await;
    }

    let started = Instant::now();
    let edited = match read_piped_stdin()? {
        Some(piped) => Some(piped),
        None => {
            let initial = ctx.engine.content().await;
            capture_editor_input_with_initial(&initial)?
        }
    };

    let Some(edited) = edited else {
        // Blanking a resumed entry is not a save; delete it instead.
        if entry_query.is_some() {
            return Err(CliError::EmptyContent);
        }
        println!("Nothing to save");
        return Ok(());
    };

    ctx.engine.on_content_change(edited).await;

    // Account for the seconds spent in the editor: the timer armed on the
    // content change, so replay the elapsed wall clock through it.
    let elapsed = u32::try_from(started.elapsed().as_secs()).unwrap_or(SESSION_SECONDS);
    for _ in 0..elapsed.min(SESSION_SECONDS) {
        ctx.engine.tick_timer().await;
    }

    match ctx.engine.save_now().await? {
        Some(entry) => {
            let timer = ctx.engine.timer().await;
            let clock = if timer.is_expired() {
                "session complete".to_string()
            } else {
                format!("{} left", format_clock(timer.remaining()))
            };
            println!("{}  {}  ({clock})", short_id(&entry.id), entry.snippet);
        }
        None => println!("Nothing to save"),
    }

    Ok(())
}
