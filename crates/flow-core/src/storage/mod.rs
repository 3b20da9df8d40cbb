//! Persistence adapter
//!
//! Routes entry and settings reads/writes to the local key-value store
//! (guest scope) or the remote document store (authenticated scope).

mod local;
mod remote;

use crate::models::{AppSettings, EntryId, NoteEntry, Scope};
use crate::Result;

pub use local::{LocalStore, ENTRIES_KEY, SETTINGS_KEY};
pub use remote::RemoteStore;

/// Uniform storage front door for entries and settings.
///
/// Read failures degrade to empty/default results (logged, indistinguishable
/// from a first run); write failures propagate so callers can surface a
/// failed save.
pub struct Storage {
    local: LocalStore,
    remote: Option<RemoteStore>,
}

impl Storage {
    #[must_use]
    pub fn new(local: LocalStore, remote: Option<RemoteStore>) -> Self {
        Self { local, remote }
    }

    /// Install the bearer token used for authenticated remote calls.
    pub async fn set_access_token(&self, token: Option<String>) {
        if let Some(remote) = &self.remote {
            remote.set_access_token(token).await;
        }
    }

    /// Whether a remote document store is configured.
    #[must_use]
    pub const fn is_remote_configured(&self) -> bool {
        self.remote.is_some()
    }

    fn remote_for<'a, 'b>(&'a self, scope: &'b Scope) -> Option<(&'a RemoteStore, &'b str)> {
        let remote = self.remote.as_ref()?;
        let uid = scope.user_id()?;
        Some((remote, uid))
    }

    /// List entries for a scope, newest first.
    ///
    /// Guest scope with empty (or unreadable) storage yields exactly the
    /// seeded welcome entry. Authenticated read failures degrade to an empty
    /// list.
    pub async fn entries(&self, scope: &Scope) -> Vec<NoteEntry> {
        if let Some((remote, uid)) = self.remote_for(scope) {
            match remote.list_entries(uid).await {
                Ok(entries) => entries,
                Err(error) => {
                    tracing::warn!("Failed to fetch entries from remote store: {error}");
                    Vec::new()
                }
            }
        } else {
            match self.local.entries().await {
                Ok(entries) => entries,
                Err(error) => {
                    tracing::warn!("Failed to read local entry list: {error}");
                    vec![NoteEntry::seeded_welcome()]
                }
            }
        }
    }

    /// Upsert an entry in the scope's backing store.
    pub async fn save_entry(&self, scope: &Scope, entry: &NoteEntry) -> Result<()> {
        if let Some((remote, uid)) = self.remote_for(scope) {
            remote.put_entry(uid, entry).await
        } else {
            self.local.save_entry(entry).await
        }
    }

    /// Delete an entry from the scope's backing store.
    pub async fn delete_entry(&self, scope: &Scope, id: &EntryId) -> Result<()> {
        if let Some((remote, uid)) = self.remote_for(scope) {
            remote.delete_entry(uid, id).await
        } else {
            self.local.delete_entry(id).await
        }
    }

    /// Load settings for a scope.
    ///
    /// The local cache is read first for a fast initial paint; when
    /// authenticated, a remote copy (if one exists) unconditionally replaces
    /// it and is written back through to the cache.
    pub async fn settings(&self, scope: &Scope) -> AppSettings {
        let mut settings = match self.local.settings().await {
            Ok(Some(settings)) => settings,
            Ok(None) => AppSettings::default(),
            Err(error) => {
                tracing::warn!("Failed to read cached settings: {error}");
                AppSettings::default()
            }
        };

        if let Some((remote, uid)) = self.remote_for(scope) {
            match remote.get_settings(uid).await {
                Ok(Some(cloud)) => {
                    settings = cloud.normalized();
                    if let Err(error) = self.local.save_settings(&settings).await {
                        tracing::warn!("Failed to refresh settings cache: {error}");
                    }
                }
                Ok(None) => {}
                Err(error) => {
                    tracing::warn!("Failed to fetch settings from remote store: {error}");
                }
            }
        }

        settings
    }

    /// Persist settings for a scope.
    ///
    /// The local cache is always written; the remote document is written
    /// additionally when authenticated (remote failures are logged, the
    /// cached copy still lands).
    pub async fn save_settings(&self, scope: &Scope, settings: &AppSettings) -> Result<()> {
        if let Some((remote, uid)) = self.remote_for(scope) {
            if let Err(error) = remote.put_settings(uid, settings).await {
                tracing::warn!("Failed to save settings to remote store: {error}");
            }
        }
        self.local.save_settings(settings).await
    }
}
