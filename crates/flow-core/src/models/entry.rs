//! Note entry model

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Error;
use crate::util::now_millis;

/// Maximum number of characters kept in a derived snippet.
pub const SNIPPET_MAX_CHARS: usize = 30;

/// Reserved id of the seeded guest welcome entry.
pub const WELCOME_ENTRY_ID: &str = "welcome";

/// A unique identifier for an entry.
///
/// Freshly created entries get a UUID v7 (time-sortable); the seeded guest
/// entry uses the reserved literal id `"welcome"`, so the type wraps an
/// opaque string rather than a parsed UUID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    /// Generate a new unique entry id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// The id of the seeded welcome entry.
    #[must_use]
    pub fn welcome() -> Self {
        Self(WELCOME_ENTRY_ID.to_string())
    }

    #[must_use]
    pub fn is_welcome(&self) -> bool {
        self.0 == WELCOME_ENTRY_ID
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EntryId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidInput("entry id must not be empty".into()));
        }
        Ok(Self(trimmed.to_string()))
    }
}

/// A persisted freewriting entry.
///
/// The JSON representation uses camelCase keys; this is the on-disk format of
/// the guest entry list and the wire format of remote entry documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteEntry {
    /// Unique identifier, assigned once at creation
    pub id: EntryId,
    /// Full text body, replaced wholesale on every save
    pub content: String,
    /// Creation timestamp (Unix ms), never changes after the first save
    pub created_at: i64,
    /// Last save timestamp (Unix ms)
    pub updated_at: i64,
    /// Derived list preview
    pub snippet: String,
}

impl NoteEntry {
    /// Build the snapshot persisted when a debounced save fires.
    ///
    /// `created_at` is carried over from the previously stored entry with the
    /// same id; pass `None` for a first save.
    #[must_use]
    pub fn snapshot(id: EntryId, content: &str, created_at: Option<i64>, now: i64) -> Self {
        Self {
            id,
            content: content.to_string(),
            created_at: created_at.unwrap_or(now),
            updated_at: now,
            snippet: derive_snippet(content),
        }
    }

    /// The entry seeded into an empty guest store.
    #[must_use]
    pub fn seeded_welcome() -> Self {
        let now = now_millis();
        Self {
            id: EntryId::welcome(),
            content: WELCOME_CONTENT.to_string(),
            created_at: now,
            updated_at: now,
            snippet: derive_snippet(WELCOME_CONTENT),
        }
    }
}

/// Derive the short list preview for an entry body.
///
/// First 30 characters with newlines collapsed to spaces; `"..."` appended
/// iff the content is longer than 30 characters.
#[must_use]
pub fn derive_snippet(content: &str) -> String {
    let mut snippet: String = content
        .chars()
        .take(SNIPPET_MAX_CHARS)
        .map(|c| if c == '\n' { ' ' } else { c })
        .collect();
    if content.chars().count() > SNIPPET_MAX_CHARS {
        snippet.push_str("...");
    }
    snippet
}

const WELCOME_CONTENT: &str = "Welcome to Flow.

This is not a note-taking app. It is a tool for freewriting: pick a topic, \
start the timer, and write continuously until it runs out. No backspaces, no \
fixing spelling, no stopping to think. Let your mind wander off topic if it \
wants to.

How a session works:

1. Think of a starting prompt (a decision, a feeling, an idea)
2. Start writing - the timer arms itself on your first keystroke
3. Keep typing until the 15 minutes are up

Your words are saved automatically a moment after you pause. Open the \
history drawer to revisit past sessions, or sign in to keep entries synced \
across machines.

Start a fresh entry whenever you are ready. This one will stay in your \
history.";

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn entry_id_generate_is_unique() {
        let a = EntryId::generate();
        let b = EntryId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn entry_id_parse_rejects_empty() {
        assert!("  ".parse::<EntryId>().is_err());
        assert_eq!("welcome".parse::<EntryId>().unwrap(), EntryId::welcome());
    }

    #[test]
    fn snippet_short_content_is_verbatim() {
        assert_eq!(derive_snippet("Hello"), "Hello");
    }

    #[test]
    fn snippet_exactly_thirty_chars_has_no_ellipsis() {
        let content = "a".repeat(30);
        assert_eq!(derive_snippet(&content), content);
    }

    #[test]
    fn snippet_truncates_with_ellipsis() {
        let content = "a".repeat(40);
        let snippet = derive_snippet(&content);
        assert_eq!(snippet.len(), 33);
        assert_eq!(snippet, format!("{}...", "a".repeat(30)));
    }

    #[test]
    fn snippet_collapses_newlines() {
        assert_eq!(derive_snippet("one\ntwo\nthree"), "one two three");
    }

    #[test]
    fn snapshot_first_save_pins_created_at_to_now() {
        let entry = NoteEntry::snapshot(EntryId::generate(), "Hello", None, 1_000);
        assert_eq!(entry.created_at, 1_000);
        assert_eq!(entry.updated_at, 1_000);
        assert_eq!(entry.snippet, "Hello");
    }

    #[test]
    fn snapshot_resave_keeps_created_at() {
        let entry = NoteEntry::snapshot(EntryId::generate(), "Hello again", Some(500), 2_000);
        assert_eq!(entry.created_at, 500);
        assert_eq!(entry.updated_at, 2_000);
        assert!(entry.created_at <= entry.updated_at);
    }

    #[test]
    fn seeded_welcome_uses_reserved_id() {
        let entry = NoteEntry::seeded_welcome();
        assert!(entry.id.is_welcome());
        assert_eq!(entry.created_at, entry.updated_at);
        assert!(!entry.content.is_empty());
    }

    #[test]
    fn json_uses_camel_case_keys() {
        let entry = NoteEntry::snapshot(EntryId::welcome(), "hi", Some(1), 2);
        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("\"createdAt\":1"));
        assert!(json.contains("\"updatedAt\":2"));

        let parsed: NoteEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, entry);
    }
}
