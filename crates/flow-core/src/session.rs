//! Session management
//!
//! Tracks the signed-in identity (or guest) and swaps the engine's scope
//! data when it changes. Both the entries reload and the settings reload are
//! awaited before anything is installed, so the engine never observes a
//! partially initialized scope.

use std::sync::Arc;

use tokio::sync::{watch, Mutex};

use crate::auth::AuthSession;
use crate::editor::EditorEngine;
use crate::models::{Scope, User};
use crate::storage::Storage;

/// Orchestrates identity changes and the data reloads they trigger.
pub struct SessionManager {
    storage: Arc<Storage>,
    engine: EditorEngine,
    user: Mutex<Option<User>>,
}

impl SessionManager {
    #[must_use]
    pub fn new(storage: Arc<Storage>, engine: EditorEngine) -> Self {
        Self {
            storage,
            engine,
            user: Mutex::new(None),
        }
    }

    /// Apply a restored or freshly established auth session (or its absence).
    ///
    /// Installs the session's bearer token before reloading so the reload
    /// itself is authenticated.
    pub async fn apply_session(&self, session: Option<&AuthSession>) {
        self.storage
            .set_access_token(session.map(|s| s.access_token.clone()))
            .await;
        self.on_identity_changed(session.map(|s| s.user.clone()))
            .await;
    }

    /// Handle a signed-in/signed-out transition.
    ///
    /// Cancels any pending autosave, reloads the target scope's entries and
    /// settings concurrently, and installs both atomically. The first call
    /// initializes the engine; later calls re-trigger the reload without
    /// resetting initialization. The in-progress text buffer is left alone;
    /// its next save lands in the new scope.
    pub async fn on_identity_changed(&self, user: Option<User>) {
        self.engine.cancel_pending_save().await;

        let scope = Scope::from_user(user.as_ref());
        let (entries, settings) = tokio::join!(
            self.storage.entries(&scope),
            self.storage.settings(&scope)
        );

        let first_init = !self.engine.is_initialized().await;
        let welcome = entries
            .first()
            .filter(|entry| entry.id.is_welcome())
            .cloned();

        self.engine.install_scope(scope, entries, settings).await;

        // On the very first load, surface the guest welcome entry in the
        // buffer; returning users start with a fresh one.
        if first_init {
            if let Some(entry) = welcome {
                self.engine.load_entry(&entry).await;
            }
        }

        *self.user.lock().await = user;
    }

    /// Drive the manager from an identity stream until the sender goes away.
    ///
    /// Applies the current value immediately, then every change.
    pub async fn run(&self, mut identity_rx: watch::Receiver<Option<AuthSession>>) {
        loop {
            let session = identity_rx.borrow_and_update().clone();
            self.apply_session(session.as_ref()).await;
            if identity_rx.changed().await.is_err() {
                break;
            }
        }
    }

    pub async fn current_user(&self) -> Option<User> {
        self.user.lock().await.clone()
    }

    pub async fn is_initialized(&self) -> bool {
        self.engine.is_initialized().await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use pretty_assertions::assert_eq;
    use tokio::time::sleep;

    use super::*;
    use crate::editor::SaveStatus;
    use crate::models::AppSettings;
    use crate::storage::LocalStore;

    const TEST_DEBOUNCE: Duration = Duration::from_millis(40);
    const SETTLE: Duration = Duration::from_millis(200);

    async fn setup() -> (SessionManager, EditorEngine, Arc<Storage>) {
        let storage = Arc::new(Storage::new(
            LocalStore::open_in_memory().await.unwrap(),
            None,
        ));
        let engine = EditorEngine::with_debounce(Arc::clone(&storage), TEST_DEBOUNCE);
        let manager = SessionManager::new(Arc::clone(&storage), engine.clone());
        (manager, engine, storage)
    }

    fn user(id: &str) -> User {
        User {
            id: id.to_string(),
            email: Some(format!("{id}@example.com")),
            display_name: None,
            avatar_url: None,
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn first_init_enters_guest_scope_with_welcome_open() {
        let (manager, engine, _storage) = setup().await;
        assert!(!manager.is_initialized().await);

        manager.on_identity_changed(None).await;

        assert!(manager.is_initialized().await);
        assert_eq!(engine.scope().await, Scope::Guest);
        let entries = engine.entries().await;
        assert_eq!(entries.len(), 1);
        assert!(entries[0].id.is_welcome());

        // The welcome entry is open in the buffer.
        assert_eq!(engine.current_entry_id().await, Some(entries[0].id.clone()));
        assert_eq!(engine.content().await, entries[0].content);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn identity_switch_discards_prior_scope_state() {
        let (manager, engine, _storage) = setup().await;
        manager.on_identity_changed(None).await;

        engine.new_entry().await;
        engine.on_content_change("guest words").await;
        engine.save_now().await.unwrap();
        assert!(engine
            .entries()
            .await
            .iter()
            .any(|e| e.content == "guest words"));

        // Sign in: no remote store configured, the user scope falls back to
        // the same local list, but the reload replaces in-memory state
        // wholesale rather than merging.
        manager.on_identity_changed(Some(user("u1"))).await;

        assert_eq!(engine.scope().await, Scope::User("u1".to_string()));
        assert!(manager.is_initialized().await);
        assert_eq!(manager.current_user().await.unwrap().id, "u1");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn logout_keeps_in_progress_buffer_and_retargets_guest() {
        let (manager, engine, storage) = setup().await;
        manager.on_identity_changed(Some(user("u1"))).await;

        engine.on_content_change("written while signed in").await;
        manager.on_identity_changed(None).await;

        // Buffer survives the scope switch.
        assert_eq!(engine.content().await, "written while signed in");
        assert_eq!(engine.scope().await, Scope::Guest);

        // The next save lands in guest scope.
        engine.save_now().await.unwrap();
        let stored = storage.entries(&Scope::Guest).await;
        assert!(stored.iter().any(|e| e.content == "written while signed in"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn scope_switch_cancels_pending_autosave() {
        let (manager, engine, storage) = setup().await;
        manager.on_identity_changed(None).await;
        engine.new_entry().await;

        engine.on_content_change("mid-flight").await;
        manager.on_identity_changed(Some(user("u1"))).await;
        sleep(SETTLE).await;

        // The debounced guest save was cancelled by the switch.
        let guest_entries = storage.entries(&Scope::Guest).await;
        assert!(guest_entries.iter().all(|e| e.content != "mid-flight"));
        assert_eq!(*engine.save_status().borrow(), SaveStatus::Saved);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn second_init_does_not_reopen_welcome() {
        let (manager, engine, _storage) = setup().await;
        manager.on_identity_changed(None).await;
        engine.new_entry().await;

        manager.on_identity_changed(None).await;

        // Initialization is one-way: the welcome entry is only auto-opened
        // on the very first load.
        assert_eq!(engine.current_entry_id().await, None);
        assert_eq!(engine.content().await, "");
    }
}
