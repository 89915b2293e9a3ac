//! The Document Store: single mutation entry point plus read-only views.

use crate::action::EditorAction;
use crate::history::{DEFAULT_HISTORY_LIMIT, History};
use crate::state::{EditorState, ResponsiveMode, reduce};
use pb_core::id::ComponentId;
use pb_core::model::{Forest, NodeRef};
use pb_core::tree;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Store configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoreConfig {
    /// Undo depth. `0` disables undo.
    pub history_limit: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

/// Owns the editor state. `dispatch` is the only writer.
#[derive(Debug, Clone, Default)]
pub struct DocumentStore {
    state: EditorState,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            state: EditorState::new(config.history_limit),
        }
    }

    /// Apply an action. The new state replaces the old one in a single
    /// assignment, so readers never see a half-applied edit.
    ///
    /// Returns `true` if anything observable changed.
    pub fn dispatch(&mut self, action: EditorAction) -> bool {
        let label = action.label();
        let next = reduce(&self.state, action);
        let changed = next.version != self.state.version;
        log::debug!(
            "{label}: {} (version {})",
            if changed { "applied" } else { "no-op" },
            next.version
        );
        self.state = next;
        changed
    }

    // ─── Derived views ───────────────────────────────────────────────────

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn components(&self) -> &Forest {
        self.state.components()
    }

    pub fn selected_id(&self) -> Option<ComponentId> {
        self.state.selected
    }

    pub fn selected_component(&self) -> Option<&NodeRef> {
        self.state.selected_component()
    }

    pub fn responsive_mode(&self) -> ResponsiveMode {
        self.state.responsive_mode
    }

    pub fn can_undo(&self) -> bool {
        self.state.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.state.history.can_redo()
    }

    pub fn is_dirty(&self) -> bool {
        self.state.is_dirty
    }

    pub fn history(&self) -> &History {
        &self.state.history
    }

    pub fn version(&self) -> u64 {
        self.state.version
    }

    pub fn find(&self, id: ComponentId) -> Option<&NodeRef> {
        tree::find(self.components(), id)
    }
}

/// Thread-safe handle. Dispatches are serialized behind a mutex; readers
/// take a snapshot of the whole state.
#[derive(Debug, Clone, Default)]
pub struct SharedStore {
    inner: Arc<Mutex<DocumentStore>>,
}

impl SharedStore {
    pub fn new(store: DocumentStore) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    pub fn dispatch(&self, action: EditorAction) -> bool {
        self.lock().dispatch(action)
    }

    /// A consistent copy of the current state. Cheap: the tree and the
    /// history snapshots are shared.
    pub fn snapshot(&self) -> EditorState {
        self.lock().state().clone()
    }

    /// Run `f` against the store while holding the lock.
    pub fn read<R>(&self, f: impl FnOnce(&DocumentStore) -> R) -> R {
        f(&self.lock())
    }

    fn lock(&self) -> MutexGuard<'_, DocumentStore> {
        // State is swapped in one assignment, so a poisoned lock still holds
        // a whole state.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pb_core::model::ComponentInstance;
    use std::thread;

    fn add_root(name: &str) -> EditorAction {
        EditorAction::add(ComponentInstance::new(ComponentId::intern(name), "text"), None)
    }

    #[test]
    fn dispatch_reports_change() {
        let mut store = DocumentStore::new();
        assert!(store.dispatch(add_root("st_one")));
        assert_eq!(store.version(), 1);
        assert!(!store.dispatch(EditorAction::Redo));
        assert_eq!(store.version(), 1);
        assert_eq!(
            store.selected_component().map(|n| n.id),
            Some(ComponentId::intern("st_one"))
        );
    }

    #[test]
    fn config_controls_history_depth() {
        let config: StoreConfig = serde_json::from_str(r#"{"historyLimit":2}"#).unwrap();
        let mut store = DocumentStore::with_config(config);
        for name in ["st_h1", "st_h2", "st_h3", "st_h4"] {
            store.dispatch(add_root(name));
        }
        assert_eq!(store.history().past().len(), 2);
        assert_eq!(store.history().limit(), 2);

        let defaulted: StoreConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(defaulted.history_limit, DEFAULT_HISTORY_LIMIT);
    }

    #[test]
    fn zero_limit_disables_undo() {
        let mut store = DocumentStore::with_config(StoreConfig { history_limit: 0 });
        store.dispatch(add_root("st_nolimit"));
        assert!(!store.can_undo());
        assert!(!store.dispatch(EditorAction::Undo));
        assert_eq!(store.components().len(), 1);
    }

    #[test]
    fn shared_store_serializes_dispatch() {
        let shared = SharedStore::default();
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let shared = shared.clone();
                thread::spawn(move || {
                    for i in 0..10 {
                        shared.dispatch(add_root(&format!("st_t{t}_{i}")));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        let snapshot = shared.snapshot();
        assert_eq!(snapshot.components().len(), 40);
        assert_eq!(snapshot.version, 40);
        assert_eq!(shared.read(|s| s.history().past().len()), 40);
    }
}
