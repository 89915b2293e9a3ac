//! WASM bridge for the page builder: exposes the Document Store to the web
//! editor.
//!
//! Compiled via `wasm-pack build --target web`. Everything crosses the
//! boundary as JSON strings, booleans, or byte arrays.

use pb_core::id::ComponentId;
use pb_core::model::{Forest, Props};
use pb_core::registry::{ComponentRegistry, InMemoryRegistry};
use pb_editor::drop::{DropEvent, palette_drop, translate_drop};
use pb_editor::{DocumentStore, EditorAction, ResponsiveMode, StoreConfig};
use serde_json::json;
use wasm_bindgen::prelude::*;

/// The main WASM-facing editor controller.
///
/// Holds the document store and the component catalog. Every edit from the
/// frontend goes through `dispatch` or one of the helpers that build an
/// action for it.
#[wasm_bindgen]
pub struct PageEditor {
    store: DocumentStore,
    catalog: InMemoryRegistry,
}

impl Default for PageEditor {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl PageEditor {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        console_error_panic_hook_setup();
        Self {
            store: DocumentStore::new(),
            catalog: InMemoryRegistry::default(),
        }
    }

    /// Create an editor with a custom undo depth.
    pub fn with_history_limit(history_limit: usize) -> Self {
        console_error_panic_hook_setup();
        Self {
            store: DocumentStore::with_config(StoreConfig { history_limit }),
            catalog: InMemoryRegistry::default(),
        }
    }

    // ─── Actions ─────────────────────────────────────────────────────────

    /// Dispatch a JSON-encoded action (`{"type":"...","payload":{...}}`).
    /// Returns `true` if the state changed, `false` on no-op or bad input.
    pub fn dispatch(&mut self, action_json: &str) -> bool {
        match serde_json::from_str::<EditorAction>(action_json) {
            Ok(action) => self.store.dispatch(action),
            Err(e) => {
                log::warn!("dispatch: malformed action: {e}");
                false
            }
        }
    }

    /// Replace the document with a JSON array of components.
    /// Returns `false` if the JSON is malformed or ids are not unique.
    pub fn load(&mut self, json: &str) -> bool {
        match Forest::from_json(json) {
            Ok(components) => self.store.dispatch(EditorAction::LoadState { components }),
            Err(e) => {
                log::warn!("load rejected: {e}");
                false
            }
        }
    }

    /// Replace the document with a MessagePack snapshot.
    pub fn load_snapshot(&mut self, bytes: &[u8]) -> bool {
        match Forest::from_msgpack(bytes) {
            Ok(components) => self.store.dispatch(EditorAction::LoadState { components }),
            Err(e) => {
                log::warn!("snapshot rejected: {e}");
                false
            }
        }
    }

    pub fn undo(&mut self) -> bool {
        self.store.dispatch(EditorAction::Undo)
    }

    pub fn redo(&mut self) -> bool {
        self.store.dispatch(EditorAction::Redo)
    }

    /// Called by the persistence layer after a successful save.
    pub fn mark_clean(&mut self) -> bool {
        self.store.dispatch(EditorAction::MarkClean)
    }

    /// Select a node by id, or clear the selection with `None`.
    pub fn select(&mut self, id: Option<String>) -> bool {
        let id = id.as_deref().map(ComponentId::intern);
        self.store.dispatch(EditorAction::SelectComponent { id })
    }

    /// Set the preview mode (`desktop`, `tablet`, `mobile`).
    pub fn set_responsive_mode(&mut self, mode: &str) -> bool {
        match serde_json::from_value::<ResponsiveMode>(json!(mode)) {
            Ok(mode) => self.store.dispatch(EditorAction::SetResponsiveMode { mode }),
            Err(_) => {
                log::warn!("unknown responsive mode `{mode}`");
                false
            }
        }
    }

    // ─── Catalog ─────────────────────────────────────────────────────────

    /// Register component definitions from a JSON array. Types already
    /// registered are replaced.
    pub fn register_catalog(&mut self, json: &str) -> bool {
        match InMemoryRegistry::from_json(json) {
            Ok(loaded) => {
                for def in loaded.definitions() {
                    self.catalog.register(def.clone());
                }
                true
            }
            Err(e) => {
                log::warn!("catalog rejected: {e}");
                false
            }
        }
    }

    /// The catalog grouped by category, as a JSON object.
    pub fn catalog_json(&self) -> String {
        serde_json::to_string(&self.catalog.by_category()).unwrap_or_else(|_| "{}".to_string())
    }

    /// Create a component of `component_type` from the catalog and add it
    /// under `parent_id` (root when `None`). Returns the new id.
    pub fn add_component(
        &mut self,
        component_type: &str,
        parent_id: Option<String>,
    ) -> Option<String> {
        let parent = parent_id.as_deref().map(ComponentId::intern);
        let action = palette_drop(self.store.components(), &self.catalog, component_type, parent)?;
        let new_id = match &action {
            EditorAction::AddComponent { component, .. } => component.id,
            _ => return None,
        };
        self.store
            .dispatch(action)
            .then(|| new_id.to_string())
    }

    /// Apply a resolved drop descriptor
    /// (`{"movedId","sourceContainerId","targetContainerId","targetIndex"}`).
    pub fn handle_drop(&mut self, event_json: &str) -> bool {
        let event: DropEvent = match serde_json::from_str(event_json) {
            Ok(e) => e,
            Err(e) => {
                log::warn!("drop: malformed event: {e}");
                return false;
            }
        };
        match translate_drop(self.store.components(), &self.catalog, &event) {
            Some(action) => self.store.dispatch(action),
            None => false,
        }
    }

    /// Validate props against the catalog. Returns JSON:
    /// `{"ok":true}` or `{"ok":false,"errors":["..."]}`.
    pub fn validate_props(&self, component_type: &str, props_json: &str) -> String {
        let props: Props = match serde_json::from_str(props_json) {
            Ok(p) => p,
            Err(e) => return json!({ "ok": false, "error": e.to_string() }).to_string(),
        };
        match self.catalog.validate_props(component_type, &props) {
            Ok(()) => json!({ "ok": true }).to_string(),
            Err(errors) => {
                let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
                json!({ "ok": false, "errors": messages }).to_string()
            }
        }
    }

    // ─── Views ───────────────────────────────────────────────────────────

    /// The current tree as a JSON array.
    pub fn components_json(&self) -> String {
        self.store
            .components()
            .to_json()
            .unwrap_or_else(|_| "[]".to_string())
    }

    /// The current tree as MessagePack.
    pub fn snapshot(&self) -> Vec<u8> {
        self.store.components().to_msgpack().unwrap_or_default()
    }

    pub fn selected_id(&self) -> Option<String> {
        self.store.selected_id().map(|id| id.to_string())
    }

    /// The selected component as JSON, or `null`.
    pub fn selected_json(&self) -> String {
        self.store
            .selected_component()
            .and_then(|node| serde_json::to_string(node.as_ref()).ok())
            .unwrap_or_else(|| "null".to_string())
    }

    pub fn can_undo(&self) -> bool {
        self.store.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.store.can_redo()
    }

    pub fn is_dirty(&self) -> bool {
        self.store.is_dirty()
    }

    pub fn responsive_mode(&self) -> String {
        self.store.responsive_mode().as_str().to_string()
    }

    pub fn preview_width(&self) -> u32 {
        self.store.responsive_mode().preview_width()
    }

    /// Changes on every state change. Cheap polling for the frontend.
    pub fn version(&self) -> f64 {
        self.store.version() as f64
    }
}

// ─── Panic hook for WASM debugging ───────────────────────────────────────

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("page builder WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}

// ─── Standalone functions (no editor needed) ─────────────────────────────

/// Check a serialized document. Returns JSON:
/// `{"ok":true,"count":N}` or `{"ok":false,"error":"..."}`.
#[wasm_bindgen]
pub fn validate_document(json: &str) -> String {
    match Forest::from_json(json) {
        Ok(forest) => json!({ "ok": true, "count": forest.len() }).to_string(),
        Err(e) => json!({ "ok": false, "error": e.to_string() }).to_string(),
    }
}
