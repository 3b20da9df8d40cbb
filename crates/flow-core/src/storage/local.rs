//! Local key-value store
//!
//! Guest-scope persistence: a small libSQL database holding JSON values
//! under string keys. The full entry list lives under one key and is
//! rewritten wholesale on every mutation, which is O(n) per save and fine
//! for expected note counts.

use std::path::Path;

use libsql::{Builder, Connection, Database};

use crate::error::Result;
use crate::models::{AppSettings, EntryId, NoteEntry};

/// Key holding the guest entry list (a JSON array).
pub const ENTRIES_KEY: &str = "flow-entries";
/// Key holding the cached settings document (a JSON object).
pub const SETTINGS_KEY: &str = "flow-settings";

const CURRENT_SCHEMA_VERSION: i32 = 1;

/// Local libSQL-backed key-value store.
pub struct LocalStore {
    _db: Database,
    conn: Connection,
}

impl LocalStore {
    /// Open (and migrate) the store at the given path, creating it if needed.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        let path_str = path.as_ref().to_string_lossy().to_string();
        let db = Builder::new_local(&path_str).build().await?;
        let conn = db.connect()?;

        let store = Self { _db: db, conn };
        store.configure().await?;
        store.migrate().await?;
        Ok(store)
    }

    /// Open an in-memory store (useful for testing).
    pub async fn open_in_memory() -> Result<Self> {
        let db = Builder::new_local(":memory:").build().await?;
        let conn = db.connect()?;

        let store = Self { _db: db, conn };
        store.configure().await?;
        store.migrate().await?;
        Ok(store)
    }

    async fn configure(&self) -> Result<()> {
        self.conn
            .execute("PRAGMA journal_mode = WAL;", ())
            .await
            .ok(); // in-memory databases reject WAL
        self.conn
            .execute("PRAGMA synchronous = NORMAL;", ())
            .await
            .ok();
        Ok(())
    }

    async fn migrate(&self) -> Result<()> {
        let version = self.schema_version().await?;
        if version < 1 {
            self.conn.execute("BEGIN TRANSACTION", ()).await?;
            self.conn
                .execute(
                    "CREATE TABLE IF NOT EXISTS schema_version (
                        version INTEGER PRIMARY KEY
                    )",
                    (),
                )
                .await?;
            self.conn
                .execute(
                    "CREATE TABLE IF NOT EXISTS kv (
                        key TEXT PRIMARY KEY,
                        value TEXT NOT NULL
                    )",
                    (),
                )
                .await?;
            self.conn
                .execute(
                    "INSERT OR REPLACE INTO schema_version (version) VALUES (?)",
                    [CURRENT_SCHEMA_VERSION],
                )
                .await?;
            self.conn.execute("COMMIT", ()).await?;
        }
        Ok(())
    }

    async fn schema_version(&self) -> Result<i32> {
        let mut rows = self
            .conn
            .query(
                "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
                (),
            )
            .await?;

        let exists = if let Some(row) = rows.next().await? {
            row.get::<i32>(0)? != 0
        } else {
            false
        };
        if !exists {
            return Ok(0);
        }

        let mut rows = self
            .conn
            .query("SELECT COALESCE(MAX(version), 0) FROM schema_version", ())
            .await?;
        let version = if let Some(row) = rows.next().await? {
            row.get(0)?
        } else {
            0
        };
        Ok(version)
    }

    /// Read a raw value by key.
    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut rows = self
            .conn
            .query("SELECT value FROM kv WHERE key = ?", [key])
            .await?;

        if let Some(row) = rows.next().await? {
            Ok(Some(row.get(0)?))
        } else {
            Ok(None)
        }
    }

    /// Upsert a raw value under a key.
    pub async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.conn
            .execute(
                "INSERT OR REPLACE INTO kv (key, value) VALUES (?, ?)",
                [key, value],
            )
            .await?;
        Ok(())
    }

    /// Remove a key.
    pub async fn remove(&self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?", [key])
            .await?;
        Ok(())
    }

    /// The guest entry list.
    ///
    /// Empty or unreadable storage yields exactly the seeded welcome entry;
    /// the seed is returned, not written back.
    pub async fn entries(&self) -> Result<Vec<NoteEntry>> {
        if let Some(raw) = self.get(ENTRIES_KEY).await? {
            match serde_json::from_str::<Vec<NoteEntry>>(&raw) {
                Ok(entries) => return Ok(entries),
                Err(error) => {
                    tracing::warn!("Stored entry list is not valid JSON, reseeding: {error}");
                }
            }
        }
        Ok(vec![NoteEntry::seeded_welcome()])
    }

    /// Upsert one entry in the guest list (read-modify-write).
    pub async fn save_entry(&self, entry: &NoteEntry) -> Result<()> {
        let mut entries = match self.get(ENTRIES_KEY).await? {
            Some(raw) => serde_json::from_str::<Vec<NoteEntry>>(&raw).unwrap_or_default(),
            None => Vec::new(),
        };

        if let Some(existing) = entries.iter_mut().find(|e| e.id == entry.id) {
            *existing = entry.clone();
        } else {
            entries.insert(0, entry.clone());
        }

        self.set(ENTRIES_KEY, &serde_json::to_string(&entries)?).await
    }

    /// Remove one entry from the guest list.
    pub async fn delete_entry(&self, id: &EntryId) -> Result<()> {
        let entries = match self.get(ENTRIES_KEY).await? {
            Some(raw) => serde_json::from_str::<Vec<NoteEntry>>(&raw).unwrap_or_default(),
            None => Vec::new(),
        };
        let remaining: Vec<NoteEntry> = entries.into_iter().filter(|e| &e.id != id).collect();
        self.set(ENTRIES_KEY, &serde_json::to_string(&remaining)?)
            .await
    }

    /// The cached settings document, if one has been saved.
    pub async fn settings(&self) -> Result<Option<AppSettings>> {
        let Some(raw) = self.get(SETTINGS_KEY).await? else {
            return Ok(None);
        };
        match serde_json::from_str::<AppSettings>(&raw) {
            Ok(settings) => Ok(Some(settings.normalized())),
            Err(error) => {
                tracing::warn!("Stored settings are not valid JSON, using defaults: {error}");
                Ok(None)
            }
        }
    }

    /// Cache a settings document.
    pub async fn save_settings(&self, settings: &AppSettings) -> Result<()> {
        self.set(SETTINGS_KEY, &serde_json::to_string(settings)?)
            .await
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::models::derive_snippet;
    use crate::util::now_millis;

    fn entry(id: &str, content: &str) -> NoteEntry {
        let now = now_millis();
        NoteEntry {
            id: id.parse().unwrap(),
            content: content.to_string(),
            created_at: now,
            updated_at: now,
            snippet: derive_snippet(content),
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn raw_get_set_round_trip() {
        let store = LocalStore::open_in_memory().await.unwrap();

        assert_eq!(store.get("missing").await.unwrap(), None);
        store.set("k", "v1").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some("v1".to_string()));
        store.set("k", "v2").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some("v2".to_string()));
        store.remove("k").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn empty_store_seeds_welcome_entry() {
        let store = LocalStore::open_in_memory().await.unwrap();

        let entries = store.entries().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].id.is_welcome());

        // The seed is derived, not persisted.
        assert_eq!(store.get(ENTRIES_KEY).await.unwrap(), None);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn corrupt_entry_list_falls_back_to_seed() {
        let store = LocalStore::open_in_memory().await.unwrap();
        store.set(ENTRIES_KEY, "{not json").await.unwrap();

        let entries = store.entries().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].id.is_welcome());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn save_entry_rewrites_whole_list() {
        let store = LocalStore::open_in_memory().await.unwrap();
        let first = entry("11111111-0000-7000-8000-000000000001", "one");
        let second = entry("11111111-0000-7000-8000-000000000002", "two");

        store.save_entry(&first).await.unwrap();
        store.save_entry(&second).await.unwrap();

        let raw = store.get(ENTRIES_KEY).await.unwrap().unwrap();
        let stored: Vec<NoteEntry> = serde_json::from_str(&raw).unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].id, second.id);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flow.db");

        {
            let store = LocalStore::open(&path).await.unwrap();
            store
                .save_entry(&entry("11111111-0000-7000-8000-000000000001", "kept"))
                .await
                .unwrap();
        }

        let store = LocalStore::open(&path).await.unwrap();
        let entries = store.entries().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].content, "kept");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn settings_round_trip_and_clamp() {
        let store = LocalStore::open_in_memory().await.unwrap();
        assert_eq!(store.settings().await.unwrap(), None);

        let settings = AppSettings::default();
        store.save_settings(&settings).await.unwrap();
        assert_eq!(store.settings().await.unwrap(), Some(settings));

        // Out-of-range stored sizes are clamped on load.
        store
            .set(
                SETTINGS_KEY,
                r#"{"fontSize":99,"fontFamily":"serif","theme":"light","isZenMode":false}"#,
            )
            .await
            .unwrap();
        let loaded = store.settings().await.unwrap().unwrap();
        assert_eq!(loaded.font_size, crate::models::MAX_FONT_SIZE);
    }
}
