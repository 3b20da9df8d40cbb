//! Entry lifecycle engine
//!
//! Keeps the in-progress text buffer reflected, within a bounded delay, as a
//! persisted, uniquely identified entry: implicit id assignment on the first
//! keystroke of a fresh note, debounced autosave with optimistic in-memory
//! update, and explicit cancellation on edit bursts, entry switches, and
//! scope changes.

mod collection;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;

use crate::models::{AppSettings, EntryId, NoteEntry, Scope};
use crate::storage::Storage;
use crate::timer::SessionTimer;
use crate::util::now_millis;
use crate::Result;

pub use collection::EntryCollection;

/// Quiet period after the last edit before a save fires.
pub const AUTOSAVE_DEBOUNCE: Duration = Duration::from_millis(1000);

/// Outcome of the most recent save attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStatus {
    Saved,
    /// A debounced save is past its quiet period and awaiting the store
    Saving,
    /// The last persist failed; the optimistic in-memory copy is ahead of
    /// the backing store
    Error,
}

struct EditorState {
    scope: Scope,
    content: String,
    current_entry_id: Option<EntryId>,
    entries: EntryCollection,
    settings: AppSettings,
    initialized: bool,
}

#[derive(Default)]
struct PendingSave {
    handle: Option<JoinHandle<()>>,
    /// Monotonic sequence; a sleeping save task re-checks it after the quiet
    /// period so a superseded timer that escaped abort cannot land
    seq: u64,
}

struct EngineInner {
    storage: Arc<Storage>,
    state: Mutex<EditorState>,
    pending: Mutex<PendingSave>,
    timer: Mutex<SessionTimer>,
    status_tx: watch::Sender<SaveStatus>,
    debounce: Duration,
}

/// The editor engine. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct EditorEngine {
    inner: Arc<EngineInner>,
}

impl EditorEngine {
    #[must_use]
    pub fn new(storage: Arc<Storage>) -> Self {
        Self::with_debounce(storage, AUTOSAVE_DEBOUNCE)
    }

    /// Engine with a custom debounce interval (tests use a short one).
    #[must_use]
    pub fn with_debounce(storage: Arc<Storage>, debounce: Duration) -> Self {
        let (status_tx, _) = watch::channel(SaveStatus::Saved);
        Self {
            inner: Arc::new(EngineInner {
                storage,
                state: Mutex::new(EditorState {
                    scope: Scope::Guest,
                    content: String::new(),
                    current_entry_id: None,
                    entries: EntryCollection::default(),
                    settings: AppSettings::default(),
                    initialized: false,
                }),
                pending: Mutex::new(PendingSave::default()),
                timer: Mutex::new(SessionTimer::new()),
                status_tx,
                debounce,
            }),
        }
    }

    /// Replace the active scope's data wholesale.
    ///
    /// Cancels any pending autosave from the previous scope, discards its
    /// entries and settings, and marks the engine initialized (a one-way
    /// flag). The text buffer and current entry id survive so an in-progress
    /// note follows the user across a scope switch.
    pub async fn install_scope(
        &self,
        scope: Scope,
        entries: Vec<NoteEntry>,
        settings: AppSettings,
    ) {
        self.cancel_pending_save().await;
        let mut state = self.inner.state.lock().await;
        state.scope = scope;
        state.entries = EntryCollection::new(entries);
        state.settings = settings.normalized();
        state.initialized = true;
    }

    pub async fn is_initialized(&self) -> bool {
        self.inner.state.lock().await.initialized
    }

    /// Replace the text buffer with the latest edit.
    ///
    /// Assigns a fresh entry id when the buffer becomes non-empty with no
    /// current id (the sole creation path), auto-arms the session timer, and
    /// (re)starts the debounce for the persist.
    pub async fn on_content_change(&self, text: impl Into<String>) {
        let text = text.into();
        let entry_id = {
            let mut state = self.inner.state.lock().await;
            if !state.initialized {
                return;
            }
            state.content = text;
            Self::ensure_entry_id(&mut state)
        };

        self.inner.timer.lock().await.auto_arm();

        if let Some(entry_id) = entry_id {
            self.schedule_save(entry_id).await;
        }
    }

    /// Assign an id on the transition from empty to non-empty; return the
    /// current id either way.
    fn ensure_entry_id(state: &mut EditorState) -> Option<EntryId> {
        if state.current_entry_id.is_none() && !state.content.is_empty() {
            let id = EntryId::generate();
            tracing::debug!("Assigned new entry id {id}");
            state.current_entry_id = Some(id);
        }
        state.current_entry_id.clone()
    }

    async fn schedule_save(&self, entry_id: EntryId) {
        let seq = {
            let mut pending = self.inner.pending.lock().await;
            if let Some(handle) = pending.handle.take() {
                handle.abort();
            }
            pending.seq = pending.seq.wrapping_add(1);
            pending.seq
        };

        let inner = Arc::clone(&self.inner);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(inner.debounce).await;
            if inner.pending.lock().await.seq != seq {
                return;
            }
            let _ = inner.persist(&entry_id).await;
        });
        self.inner.pending.lock().await.handle = Some(handle);
    }

    /// Discard the pending debounced save, if any.
    ///
    /// Called on entry switches and scope changes; further edits cancel
    /// implicitly by rescheduling.
    pub async fn cancel_pending_save(&self) {
        let mut pending = self.inner.pending.lock().await;
        if let Some(handle) = pending.handle.take() {
            handle.abort();
        }
        pending.seq = pending.seq.wrapping_add(1);
    }

    /// Persist the current buffer immediately, skipping the quiet period.
    ///
    /// Used when an editing session ends. Returns the saved entry, or `None`
    /// when there is nothing to save.
    pub async fn save_now(&self) -> Result<Option<NoteEntry>> {
        self.cancel_pending_save().await;
        let entry_id = self.inner.state.lock().await.current_entry_id.clone();
        match entry_id {
            Some(id) => self.inner.persist(&id).await.map(Some),
            None => Ok(None),
        }
    }

    /// Start a fresh note: clear the buffer and current id, reset the
    /// session timer. Deletes nothing.
    pub async fn new_entry(&self) {
        self.cancel_pending_save().await;
        {
            let mut state = self.inner.state.lock().await;
            state.content.clear();
            state.current_entry_id = None;
        }
        self.inner.timer.lock().await.reset();
    }

    /// Open an existing entry, superseding any unsaved debounce for the
    /// previous buffer, and reset the session timer.
    pub async fn load_entry(&self, entry: &NoteEntry) {
        self.cancel_pending_save().await;
        {
            let mut state = self.inner.state.lock().await;
            state.content = entry.content.clone();
            state.current_entry_id = Some(entry.id.clone());
        }
        self.inner.timer.lock().await.reset();
    }

    /// Remove an entry: optimistic removal from the in-memory list first,
    /// then the backing delete. Deleting the open entry starts a fresh one.
    pub async fn delete_entry(&self, id: &EntryId) {
        let scope = {
            let mut state = self.inner.state.lock().await;
            state.entries.apply_delete(id);
            state.scope.clone()
        };

        if let Err(error) = self.inner.storage.delete_entry(&scope, id).await {
            tracing::warn!("Failed to delete entry {id}: {error}");
        }

        let was_current =
            self.inner.state.lock().await.current_entry_id.as_ref() == Some(id);
        if was_current {
            self.new_entry().await;
        }
    }

    /// Update settings for the active scope, clamped and persisted.
    pub async fn update_settings(&self, settings: AppSettings) -> Result<()> {
        let settings = settings.normalized();
        let scope = {
            let mut state = self.inner.state.lock().await;
            state.settings = settings;
            state.scope.clone()
        };
        self.inner.storage.save_settings(&scope, &settings).await
    }

    pub async fn content(&self) -> String {
        self.inner.state.lock().await.content.clone()
    }

    pub async fn current_entry_id(&self) -> Option<EntryId> {
        self.inner.state.lock().await.current_entry_id.clone()
    }

    pub async fn scope(&self) -> Scope {
        self.inner.state.lock().await.scope.clone()
    }

    pub async fn entries(&self) -> Vec<NoteEntry> {
        self.inner.state.lock().await.entries.to_vec()
    }

    pub async fn settings(&self) -> AppSettings {
        self.inner.state.lock().await.settings
    }

    /// Subscribe to save status changes.
    #[must_use]
    pub fn save_status(&self) -> watch::Receiver<SaveStatus> {
        self.inner.status_tx.subscribe()
    }

    pub async fn timer(&self) -> SessionTimer {
        *self.inner.timer.lock().await
    }

    /// Advance the session timer by one elapsed second (shell-driven).
    pub async fn tick_timer(&self) {
        self.inner.timer.lock().await.tick();
    }

    pub async fn reset_timer(&self) {
        self.inner.timer.lock().await.reset();
    }
}

impl EngineInner {
    /// Build the snapshot for the current buffer, apply it optimistically,
    /// then persist it to the active scope's store.
    async fn persist(&self, entry_id: &EntryId) -> Result<NoteEntry> {
        let _ = self.status_tx.send(SaveStatus::Saving);

        let (scope, entry) = {
            let mut state = self.state.lock().await;
            let created_at = state.entries.find(entry_id).map(|e| e.created_at);
            let entry =
                NoteEntry::snapshot(entry_id.clone(), &state.content, created_at, now_millis());
            state.entries.apply_update(entry.clone());
            (state.scope.clone(), entry)
        };

        match self.storage.save_entry(&scope, &entry).await {
            Ok(()) => {
                tracing::debug!("Autosaved entry {}", entry.id);
                let _ = self.status_tx.send(SaveStatus::Saved);
                Ok(entry)
            }
            Err(error) => {
                tracing::warn!("Failed to persist entry {}: {error}", entry.id);
                let _ = self.status_tx.send(SaveStatus::Error);
                Err(error)
            }
        }
    }
}
