//! History listing, display, and deletion

use chrono::Utc;
use serde::Serialize;

use flow_core::models::NoteEntry;

use crate::commands::common::{format_relative_time, resolve_entry, short_id};
use crate::context::AppContext;
use crate::error::CliError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EntryListItem {
    id: String,
    snippet: String,
    created_at: i64,
    updated_at: i64,
    relative_time: String,
}

pub async fn run_list(ctx: &AppContext, limit: usize, as_json: bool) -> Result<(), CliError> {
    let entries = ctx.engine.entries().await;
    let shown: Vec<&NoteEntry> = entries.iter().take(limit).collect();

    if as_json {
        let now_ms = Utc::now().timestamp_millis();
        let items: Vec<EntryListItem> = shown
            .iter()
            .map(|entry| EntryListItem {
                id: entry.id.to_string(),
                snippet: entry.snippet.clone(),
                created_at: entry.created_at,
                updated_at: entry.updated_at,
                relative_time: format_relative_time(entry.updated_at, now_ms),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&items)?);
    } else {
        for line in format_entry_lines(&shown) {
            println!("{line}");
        }
    }

    Ok(())
}

pub async fn run_show(ctx: &AppContext, id_query: &str) -> Result<(), CliError> {
    let entry = resolve_entry(&ctx.engine.entries().await, id_query)?;
    println!("{}", entry.content);
    Ok(())
}

pub async fn run_delete(ctx: &AppContext, id_query: &str) -> Result<(), CliError> {
    let entry = resolve_entry(&ctx.engine.entries().await, id_query)?;
    ctx.engine.delete_entry(&entry.id).await;
    println!("{}", entry.id);
    Ok(())
}

fn format_entry_lines(entries: &[&NoteEntry]) -> Vec<String> {
    let now_ms = Utc::now().timestamp_millis();
    entries
        .iter()
        .map(|entry| {
            let relative_time = format_relative_time(entry.updated_at, now_ms);
            format!(
                "{:<8}  {:<36}  {relative_time}",
                short_id(&entry.id),
                entry.snippet
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use flow_core::models::derive_snippet;
    use pretty_assertions::assert_eq;

    use super::*;

    fn entry(id: &str, content: &str, updated_at: i64) -> NoteEntry {
        NoteEntry {
            id: id.parse().unwrap(),
            content: content.to_string(),
            created_at: updated_at,
            updated_at,
            snippet: derive_snippet(content),
        }
    }

    #[test]
    fn lines_show_short_id_snippet_and_age() {
        let newest = entry("aaaaaaaa-1111", "Morning pages", Utc::now().timestamp_millis());
        let lines = format_entry_lines(&[&newest]);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("aaaaaaaa"));
        assert!(lines[0].contains("Morning pages"));
        assert!(lines[0].ends_with("just now"));
    }

    #[test]
    fn list_item_serializes_camel_case() {
        let item = EntryListItem {
            id: "x".to_string(),
            snippet: "s".to_string(),
            created_at: 1,
            updated_at: 2,
            relative_time: "just now".to_string(),
        };
        let json = serde_json::to_string(&item).unwrap();
        assert!(json.contains("\"createdAt\":1"));
        assert!(json.contains("\"relativeTime\":\"just now\""));
    }
}
