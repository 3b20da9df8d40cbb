//! Helpers shared between commands

use std::env;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

use flow_core::models::{EntryId, NoteEntry};

use crate::error::CliError;

/// Characters of an entry id shown in list output.
pub const SHORT_ID_CHARS: usize = 8;

#[must_use]
pub fn short_id(id: &EntryId) -> String {
    id.as_str().chars().take(SHORT_ID_CHARS).collect()
}

/// Find an entry by exact id or unique id prefix in the loaded list.
pub fn resolve_entry(entries: &[NoteEntry], query: &str) -> Result<NoteEntry, CliError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(CliError::EntryNotFound(query.to_string()));
    }

    if let Some(entry) = entries.iter().find(|entry| entry.id.as_str() == query) {
        return Ok(entry.clone());
    }

    let matches: Vec<&NoteEntry> = entries
        .iter()
        .filter(|entry| entry.id.as_str().starts_with(query))
        .collect();

    match matches.len() {
        0 => Err(CliError::EntryNotFound(query.to_string())),
        1 => Ok(matches[0].clone()),
        _ => {
            let options = matches
                .iter()
                .take(3)
                .map(|entry| short_id(&entry.id))
                .collect::<Vec<_>>()
                .join(", ");
            Err(CliError::AmbiguousEntryId(format!(
                "ID prefix '{query}' is ambiguous; matches: {options}"
            )))
        }
    }
}

/// Render how long ago a timestamp was, coarsely.
#[must_use]
pub fn format_relative_time(timestamp_ms: i64, now_ms: i64) -> String {
    const MINUTE: i64 = 60_000;
    const HOUR: i64 = 60 * MINUTE;
    const DAY: i64 = 24 * HOUR;
    const YEAR: i64 = 365 * DAY;

    let diff = now_ms.saturating_sub(timestamp_ms);
    match diff {
        d if d < MINUTE => "just now".to_string(),
        d if d < HOUR => format!("{}m ago", d / MINUTE),
        d if d < DAY => format!("{}h ago", d / HOUR),
        d if d < YEAR => format!("{}d ago", d / DAY),
        d => format!("{}y ago", d / YEAR),
    }
}

/// Trim content and reject an effectively empty buffer.
#[must_use]
pub fn normalize_content(content: &str) -> Option<String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Read a line from stdin after printing a prompt.
pub fn prompt_line(prompt: &str) -> Result<String, CliError> {
    use std::io::Write;
    print!("{prompt}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\n', '\r']).to_string())
}

/// Read piped stdin in full, if stdin is not a terminal.
pub fn read_piped_stdin() -> Result<Option<String>, CliError> {
    use std::io::IsTerminal;
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }
    let mut buffer = String::new();
    stdin.lock().read_to_string(&mut buffer)?;
    Ok(normalize_content(&buffer))
}

/// Open `$VISUAL`/`$EDITOR` on a temp file seeded with `initial_content` and
/// return the edited text, `None` when the result is empty.
pub fn capture_editor_input_with_initial(
    initial_content: &str,
) -> Result<Option<String>, CliError> {
    let editor = preferred_editor();
    let temp_file = create_temp_entry_file_path();
    std::fs::write(&temp_file, initial_content)?;

    let launch_result = launch_editor(&editor, &temp_file);
    let content = std::fs::read_to_string(&temp_file)?;
    let _ = std::fs::remove_file(&temp_file);

    launch_result?;
    Ok(normalize_content(&content))
}

fn launch_editor(editor: &str, file_path: &Path) -> Result<(), CliError> {
    match Command::new(editor).arg(file_path).status() {
        Ok(status) => {
            if status.success() {
                Ok(())
            } else {
                Err(CliError::EditorFailed(format!(
                    "`{editor}` exited with status {status}"
                )))
            }
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            // Fallback for editor commands with args, e.g. "code --wait"
            let mut parts = editor.split_whitespace();
            let Some(program) = parts.next() else {
                return Err(CliError::EditorFailed("empty EDITOR command".into()));
            };

            let status = Command::new(program).args(parts).arg(file_path).status()?;
            if status.success() {
                Ok(())
            } else {
                Err(CliError::EditorFailed(format!(
                    "`{editor}` exited with status {status}"
                )))
            }
        }
        Err(err) => Err(CliError::Io(err)),
    }
}

fn preferred_editor() -> String {
    env::var("VISUAL")
        .or_else(|_| env::var("EDITOR"))
        .unwrap_or_else(|_| default_editor().to_string())
}

const fn default_editor() -> &'static str {
    if cfg!(windows) {
        "notepad"
    } else {
        "vi"
    }
}

fn create_temp_entry_file_path() -> PathBuf {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| duration.as_nanos());
    env::temp_dir().join(format!("flow-entry-{}-{now}.md", std::process::id()))
}

#[cfg(test)]
mod tests {
    use flow_core::models::derive_snippet;
    use pretty_assertions::assert_eq;

    use super::*;

    fn entry(id: &str) -> NoteEntry {
        NoteEntry {
            id: id.parse().unwrap(),
            content: "text".to_string(),
            created_at: 1,
            updated_at: 1,
            snippet: derive_snippet("text"),
        }
    }

    #[test]
    fn resolve_entry_prefers_exact_match() {
        let entries = vec![entry("abc"), entry("abcd")];
        assert_eq!(resolve_entry(&entries, "abc").unwrap().id.as_str(), "abc");
    }

    #[test]
    fn resolve_entry_accepts_unique_prefix() {
        let entries = vec![entry("abc-1"), entry("xyz-2")];
        assert_eq!(resolve_entry(&entries, "xy").unwrap().id.as_str(), "xyz-2");
    }

    #[test]
    fn resolve_entry_rejects_ambiguous_prefix() {
        let entries = vec![entry("abc-1"), entry("abc-2")];
        assert!(matches!(
            resolve_entry(&entries, "abc"),
            Err(CliError::AmbiguousEntryId(_))
        ));
    }

    #[test]
    fn resolve_entry_rejects_missing_and_empty() {
        let entries = vec![entry("abc")];
        assert!(matches!(
            resolve_entry(&entries, "zzz"),
            Err(CliError::EntryNotFound(_))
        ));
        assert!(matches!(
            resolve_entry(&entries, "  "),
            Err(CliError::EntryNotFound(_))
        ));
    }

    #[test]
    fn relative_time_units() {
        let now = 10_000_000_000;
        assert_eq!(format_relative_time(now - 30_000, now), "just now");
        assert_eq!(format_relative_time(now - 120_000, now), "2m ago");
        assert_eq!(format_relative_time(now - 3 * 60 * 60_000, now), "3h ago");
        assert_eq!(
            format_relative_time(now - 2 * 24 * 60 * 60_000, now),
            "2d ago"
        );
    }

    #[test]
    fn normalize_content_trims_and_rejects_empty() {
        assert_eq!(normalize_content("  hello  "), Some("hello".to_string()));
        assert_eq!(normalize_content(" \n\t "), None);
        assert_eq!(
            normalize_content("line 1\nline 2\n"),
            Some("line 1\nline 2".to_string())
        );
    }

    #[test]
    fn short_id_truncates() {
        let id: EntryId = "0123456789abcdef".parse().unwrap();
        assert_eq!(short_id(&id), "01234567");
    }
}
