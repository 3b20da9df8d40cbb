//! In-memory entry collection
//!
//! All optimistic mutations of the entry list (autosave, delete, scope
//! reload) funnel through this one type so uniqueness-by-id holds no matter
//! which call site fires first.

use crate::models::{EntryId, NoteEntry};

/// Newest-first list of entries, unique by id.
#[derive(Debug, Clone, Default)]
pub struct EntryCollection {
    entries: Vec<NoteEntry>,
}

impl EntryCollection {
    /// Build from a loaded list, keeping order and dropping duplicate ids
    /// (first occurrence wins).
    #[must_use]
    pub fn new(entries: Vec<NoteEntry>) -> Self {
        let mut collection = Self::default();
        for entry in entries {
            if collection.find(&entry.id).is_none() {
                collection.entries.push(entry);
            }
        }
        collection
    }

    /// Replace the entry with the same id, or prepend a new one.
    pub fn apply_update(&mut self, entry: NoteEntry) {
        if let Some(existing) = self.entries.iter_mut().find(|e| e.id == entry.id) {
            *existing = entry;
        } else {
            self.entries.insert(0, entry);
        }
    }

    /// Remove the entry with the given id, if present.
    pub fn apply_delete(&mut self, id: &EntryId) {
        self.entries.retain(|entry| &entry.id != id);
    }

    #[must_use]
    pub fn find(&self, id: &EntryId) -> Option<&NoteEntry> {
        self.entries.iter().find(|entry| &entry.id == id)
    }

    #[must_use]
    pub fn first(&self) -> Option<&NoteEntry> {
        self.entries.first()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn to_vec(&self) -> Vec<NoteEntry> {
        self.entries.clone()
    }
}
